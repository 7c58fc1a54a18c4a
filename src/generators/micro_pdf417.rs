use core::iter;

use crate::generators::bitfield::Bitfield;
use crate::tables::{Variant, HL_TO_LL, M_PDF417_CENTER, M_PDF417_RAP, M_PDF417_SIDE,
    M_PDF417_VARIANTS_COUNT};

macro_rules! cw {
    ($tb:expr, $val:expr) => {
        Bitfield::new((1 << 16) | HL_TO_LL[$tb as usize * 929 + $val as usize] as u32, 17)
    }
}

/// RAP start values are 1-based and advance by one per row, wrapping from
/// 52 back to 1; the result is the 0-based pattern table index.
const fn rap_index(start: u8, row: u8) -> usize {
    (start as usize - 1 + row as usize) % 52
}

#[derive(Clone, Copy)]
enum RowPattern {
    LeftRap,
    Data,
    CentreRap,
    RightRap,
    None,
}

/// Iterator over the bar patterns of a single MicroPDF417 row: left row
/// address pattern, the row's codewords with a centre pattern mid-row on
/// three and four column variants, and the right pattern closed by a one
/// module stop bar.
#[derive(Clone)]
pub struct MicroPDF417Row<'a> {
    codewords: &'a [u16],
    next_pat: RowPattern,
    /// Codewords left to emit before the centre pattern, if any.
    until_centre: Option<u8>,
    left: usize,
    centre: usize,
    right: usize,
    table: u8,
}

impl<'a> MicroPDF417Row<'a> {
    /// `codewords` holds this row's slice of the symbol, `variant.cols()`
    /// codewords long.
    pub fn new(codewords: &'a [u16], variant: Variant, row: u8) -> Self {
        debug_assert_eq!(codewords.len(), variant.cols() as usize);
        let i = variant.index();
        let cluster = M_PDF417_RAP[3 * M_PDF417_VARIANTS_COUNT + i] / 3;

        // the centre pattern splits the wider variants after the first
        // codeword (three columns) or the second (four columns)
        let until_centre = match variant.cols() {
            3 => Some(1),
            4 => Some(2),
            _ => None,
        };
        let centre = match until_centre {
            Some(_) => rap_index(M_PDF417_RAP[M_PDF417_VARIANTS_COUNT + i], row),
            None => 0,
        };

        Self {
            codewords,
            next_pat: RowPattern::LeftRap,
            until_centre,
            left: rap_index(M_PDF417_RAP[i], row),
            centre,
            right: rap_index(M_PDF417_RAP[2 * M_PDF417_VARIANTS_COUNT + i], row),
            table: (cluster + row) % 3,
        }
    }
}

impl<'a> iter::Iterator for MicroPDF417Row<'a> {
    type Item = Bitfield;

    fn next(&mut self) -> Option<Self::Item> {
        let (item, next) = match self.next_pat {
            RowPattern::LeftRap => {
                (Bitfield::new(M_PDF417_SIDE[self.left] as u32, 10), RowPattern::Data)
            }
            RowPattern::CentreRap => {
                self.until_centre = None;
                (Bitfield::new(M_PDF417_CENTER[self.centre] as u32, 10), RowPattern::Data)
            }
            RowPattern::Data => {
                let cw = self.codewords[0];
                self.codewords = &self.codewords[1..];
                if let Some(n) = &mut self.until_centre {
                    *n -= 1;
                }

                let next = if self.until_centre == Some(0) {
                    RowPattern::CentreRap
                } else if self.codewords.is_empty() {
                    RowPattern::RightRap
                } else {
                    RowPattern::Data
                };
                (cw!(self.table, cw), next)
            }
            RowPattern::RightRap => {
                let pat = ((M_PDF417_SIDE[self.right] as u32) << 1) | 1;
                (Bitfield::new(pat, 11), RowPattern::None)
            }
            RowPattern::None => return None,
        };

        self.next_pat = next;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let pending = self.until_centre.is_some() as usize;
        let count = match self.next_pat {
            RowPattern::LeftRap => 2 + self.codewords.len() + pending,
            RowPattern::Data | RowPattern::CentreRap => 1 + self.codewords.len() + pending,
            RowPattern::RightRap => 1,
            RowPattern::None => 0,
        };
        (count, Some(count))
    }
}

impl<'a> ExactSizeIterator for MicroPDF417Row<'a> {}
impl<'a> iter::FusedIterator for MicroPDF417Row<'a> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_column_row() {
        let codewords = [42u16];
        let variant = Variant::new(1);
        let row = MicroPDF417Row::new(&codewords, variant, 0);
        assert_eq!(row.len(), 3);
        let items: Vec<Bitfield> = row.collect();

        assert_eq!(items[0], Bitfield::new(M_PDF417_SIDE[0] as u32, 10));
        assert_eq!(items[1], cw!(0, 42));
        assert_eq!(items[2].size(), 11);
        assert_eq!(items[2].bits() & 1, 1);

        let width: u32 = items.iter().map(|b| b.size() as u32).sum();
        assert_eq!(width, variant.width());
    }

    #[test]
    fn test_centre_pattern_placement() {
        // three columns: centre after the first codeword
        let codewords = [1u16, 2, 3];
        let variant = Variant::new(14);
        let items: Vec<Bitfield> = MicroPDF417Row::new(&codewords, variant, 0).collect();
        assert_eq!(items.len(), 6);
        assert_eq!(items[2].size(), 10);
        assert_eq!(items[2].bits(), M_PDF417_CENTER[rap_index(M_PDF417_RAP[34 + 13], 0)] as u32);
        assert_eq!(items.iter().map(|b| b.size() as u32).sum::<u32>(), variant.width());

        // four columns: centre after the second codeword
        let codewords = [1u16, 2, 3, 4];
        let variant = Variant::new(24);
        let items: Vec<Bitfield> = MicroPDF417Row::new(&codewords, variant, 0).collect();
        assert_eq!(items.len(), 7);
        assert_eq!(items[3].size(), 10);
        assert_eq!(items.iter().map(|b| b.size() as u32).sum::<u32>(), variant.width());
    }

    #[test]
    fn test_two_columns_have_no_centre_pattern() {
        let codewords = [1u16, 2];
        let variant = Variant::new(7);
        let items: Vec<Bitfield> = MicroPDF417Row::new(&codewords, variant, 0).collect();
        assert_eq!(items.len(), 4);
        assert_eq!(items.iter().map(|b| b.size() as u32).sum::<u32>(), variant.width());
    }

    #[test]
    fn test_rap_advances_and_wraps() {
        // variant 23's left pattern starts at 1 and advances one entry per
        // row; its right pattern starts at 49 and wraps past 52 on row 4
        let variant = Variant::new(23);
        assert_eq!(M_PDF417_RAP[22], 1);
        assert_eq!(M_PDF417_RAP[2 * M_PDF417_VARIANTS_COUNT + 22], 49);

        let codewords = [0u16, 0, 0];
        let items: Vec<Bitfield> = MicroPDF417Row::new(&codewords, variant, 1).collect();
        assert_eq!(items[0].bits(), M_PDF417_SIDE[1] as u32);

        let items: Vec<Bitfield> = MicroPDF417Row::new(&codewords, variant, 3).collect();
        assert_eq!(items[5].bits(), ((M_PDF417_SIDE[51] as u32) << 1) | 1);
        let items: Vec<Bitfield> = MicroPDF417Row::new(&codewords, variant, 4).collect();
        assert_eq!(items[5].bits(), ((M_PDF417_SIDE[0] as u32) << 1) | 1);
    }

    #[test]
    fn test_cluster_rotates_per_row() {
        let codewords = [42u16];
        let variant = Variant::new(1);
        let items: Vec<Bitfield> = MicroPDF417Row::new(&codewords, variant, 1).collect();
        assert_eq!(items[1], cw!(1, 42));
        let items: Vec<Bitfield> = MicroPDF417Row::new(&codewords, variant, 3).collect();
        assert_eq!(items[1], cw!(0, 42));
    }
}
