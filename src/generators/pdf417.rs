use core::iter;

use crate::generators::bitfield::Bitfield;
use crate::geometry::Geometry;
use crate::tables::HL_TO_LL;

/// Start pattern, shared by every row.
pub const START_PAT: Bitfield = Bitfield::new(0b11111111010101000, 17);
/// Stop pattern, shared by every row.
pub const END_PAT: Bitfield = Bitfield::new(0b111111101000101001, 18);

macro_rules! cw {
    ($tb:expr, $val:expr) => {
        Bitfield::new((1 << 16) | HL_TO_LL[$tb as usize * 929 + $val as usize] as u32, 17)
    }
}

#[derive(Clone)]
enum RowPattern {
    Start,
    Left,
    Data,
    Right,
    End,
    None,
}

/// Iterator over the bar patterns of a single row: start pattern, left row
/// indicator, the row's codewords, right row indicator and stop pattern.
/// The truncated form drops the right indicator and replaces the stop
/// pattern with a single bar.
#[derive(Clone)]
pub struct PDF417Row<'a, const TRUNCATED: bool> {
    codewords: &'a [u16],
    next_pat: RowPattern,
    table: u8,
    /// (left, right) row indicator values
    markers: (u16, u16),
}

impl<'a, const TRUNCATED: bool> PDF417Row<'a, TRUNCATED> {
    /// `codewords` holds this row's slice of the symbol, `geometry.cols`
    /// codewords long.
    pub fn new(codewords: &'a [u16], geometry: Geometry, row: u8) -> Self {
        debug_assert_eq!(codewords.len(), geometry.cols as usize);
        let table = row % 3;
        let row_id = (row / 3) as u16 * 30;

        let rows_val = (geometry.rows - 1) / 3;
        let cols_val = geometry.cols - 1;
        let level_val = geometry.level * 3 + (geometry.rows - 1) % 3;

        let (left, right) = match table {
            0 => (rows_val, cols_val),
            1 => (level_val, rows_val),
            _ => (cols_val, level_val),
        };
        Self {
            codewords,
            table,
            markers: (left as u16 + row_id, right as u16 + row_id),
            next_pat: RowPattern::Start,
        }
    }
}

impl<'a, const TRUNCATED: bool> iter::Iterator for PDF417Row<'a, TRUNCATED> {
    type Item = Bitfield;

    fn next(&mut self) -> Option<Self::Item> {
        let (item, next) = match self.next_pat {
            RowPattern::Start => (START_PAT, RowPattern::Left),
            RowPattern::Left => (cw!(self.table, self.markers.0), RowPattern::Data),
            RowPattern::Data => {
                let cw = self.codewords[0];
                self.codewords = &self.codewords[1..];

                let next = if !self.codewords.is_empty() {
                    RowPattern::Data
                } else if TRUNCATED {
                    RowPattern::End
                } else {
                    RowPattern::Right
                };
                (cw!(self.table, cw), next)
            }
            RowPattern::Right => (cw!(self.table, self.markers.1), RowPattern::End),
            RowPattern::End if TRUNCATED => (Bitfield::new(1, 1), RowPattern::None),
            RowPattern::End => (END_PAT, RowPattern::None),
            RowPattern::None => return None,
        };

        self.next_pat = next;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let tail = if TRUNCATED { 1 } else { 2 };
        let count = self.codewords.len() + match self.next_pat {
            RowPattern::Start => 2 + tail,
            RowPattern::Left => 1 + tail,
            RowPattern::Data => tail,
            RowPattern::Right => 2,
            RowPattern::End => 1,
            RowPattern::None => 0,
        };
        (count, Some(count))
    }
}

impl<'a, const TRUNCATED: bool> ExactSizeIterator for PDF417Row<'a, TRUNCATED> {}
impl<'a, const TRUNCATED: bool> iter::FusedIterator for PDF417Row<'a, TRUNCATED> {}

#[cfg(test)]
mod tests {
    use super::*;

    const GEOMETRY: Geometry = Geometry { rows: 6, cols: 2, level: 1 };

    #[test]
    fn test_row_structure() {
        let codewords = [8u16, 900];
        let row = PDF417Row::<false>::new(&codewords, GEOMETRY, 0);
        let items: Vec<Bitfield> = row.collect();

        // left: (rows - 1) / 3, right: cols - 1, both in table 0
        assert_eq!(items, [
            START_PAT,
            cw!(0, 1),
            cw!(0, 8),
            cw!(0, 900),
            cw!(0, 1),
            END_PAT,
        ]);
    }

    #[test]
    fn test_row_indicators_cycle_through_tables() {
        let codewords = [0u16, 0];

        // table 1: left carries the level, right the row count
        let items: Vec<Bitfield> = PDF417Row::<false>::new(&codewords, GEOMETRY, 1).collect();
        assert_eq!(items[1], cw!(1, 1 * 3 + (6 - 1) % 3));
        assert_eq!(items[4], cw!(1, (6 - 1) / 3));

        // table 2 with the row group offset
        let items: Vec<Bitfield> = PDF417Row::<false>::new(&codewords, GEOMETRY, 5).collect();
        assert_eq!(items[1], cw!(2, 30 + 2 - 1));
    }

    #[test]
    fn test_row_width() {
        let codewords = [0u16, 0];
        let width: u32 = PDF417Row::<false>::new(&codewords, GEOMETRY, 0)
            .map(|b| b.size() as u32)
            .sum();
        assert_eq!(width, GEOMETRY.width());
    }

    #[test]
    fn test_truncated_row() {
        let codewords = [8u16, 900];
        let row = PDF417Row::<true>::new(&codewords, GEOMETRY, 0);
        assert_eq!(row.len(), 5);
        let items: Vec<Bitfield> = row.collect();

        assert_eq!(items, [
            START_PAT,
            cw!(0, 1),
            cw!(0, 8),
            cw!(0, 900),
            Bitfield::new(1, 1),
        ]);

        let width: u32 = items.iter().map(|b| b.size() as u32).sum();
        assert_eq!(width, GEOMETRY.truncated_width());
    }

    #[test]
    fn test_size_hint_counts_down() {
        let codewords = [0u16, 0, 0];
        let geometry = Geometry { rows: 6, cols: 3, level: 1 };
        let mut row = PDF417Row::<false>::new(&codewords, geometry, 0);
        let mut remaining = 7;
        while let Some(_) = {
            assert_eq!(row.len(), remaining);
            row.next()
        } {
            remaining -= 1;
        }
        assert_eq!(remaining, 0);
    }
}
