//! Geometry resolution: a (rows, columns, ecc level) triple for PDF417, or
//! one of the 34 fixed variants for MicroPDF417.

use crate::error::{Error, Warning};
use crate::tables::Variant;

/// Minimum number of rows in a PDF417 barcode.
pub const MIN_ROWS: u8 = 3;
/// Maximum number of rows in a PDF417 barcode.
pub const MAX_ROWS: u8 = 90;
/// Minimum number of data columns in a PDF417 barcode.
pub const MIN_COLS: u8 = 1;
/// Maximum number of data columns in a PDF417 barcode.
pub const MAX_COLS: u8 = 30;
/// Maximum number of codewords in a PDF417 symbol.
pub const MAX_CODEWORDS: usize = 928;
/// Maximum number of data codewords in a MicroPDF417 symbol.
pub const MICRO_MAX_CODEWORDS: usize = 126;

/// Resolved PDF417 layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub rows: u8,
    pub cols: u8,
    pub level: u8,
}

impl Geometry {
    /// Total number of codeword slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Number of error correction codewords at this level.
    #[inline]
    pub const fn ecc_count(&self) -> usize {
        1 << (self.level as usize + 1)
    }

    /// Codeword slots left for the length descriptor, data and padding.
    #[inline]
    pub const fn data_capacity(&self) -> usize {
        self.capacity() - self.ecc_count()
    }

    /// Width of the symbol in modules: start pattern, left indicator, data
    /// columns, right indicator and stop pattern.
    #[inline]
    pub const fn width(&self) -> u32 {
        (self.cols as u32 + 4) * 17 + 1
    }

    /// Width of the truncated form: no right indicator, one-module stop.
    #[inline]
    pub const fn truncated_width(&self) -> u32 {
        (self.cols as u32 + 2) * 17 + 1
    }
}

/// Recommended minimum error correction level for a data codeword count
/// (ISO/IEC 15438 Annex E).
const fn recommended_level(data_len: usize) -> u8 {
    if data_len <= 40 {
        2
    } else if data_len <= 160 {
        3
    } else if data_len <= 320 {
        4
    } else if data_len <= 863 {
        5
    } else {
        6
    }
}

/// Resolves the PDF417 layout for `data_len` data codewords, growing
/// whichever dimension was not forced when the forced one is too small.
pub(crate) fn resolve_pdf417(
    data_len: usize,
    level: Option<u8>,
    cols: Option<u8>,
    rows: Option<u8>,
) -> Result<(Geometry, Vec<Warning>), Error> {
    let mut warnings = Vec::new();

    let auto_level = level.is_none();
    let mut level = level.unwrap_or_else(|| recommended_level(data_len));
    while auto_level && level > 0 && data_len + (1 << (level as usize + 1)) + 1 > MAX_CODEWORDS {
        level -= 1;
    }

    let k = 1usize << (level as usize + 1);
    let needed = data_len + 1 + k;
    if needed > MAX_CODEWORDS {
        return Err(Error::TooLong { required: needed, maximum: MAX_CODEWORDS });
    }

    let geometry = match (cols, rows) {
        (forced_cols, None) => {
            // near-square start unless the caller chose a column count
            let mut c = match forced_cols {
                Some(c) => c as usize,
                None => near_square_cols(data_len + k),
            };
            loop {
                let r = needed.div_ceil(c).max(MIN_ROWS as usize);
                if r <= MAX_ROWS as usize && r * c <= MAX_CODEWORDS {
                    break Geometry { rows: r as u8, cols: c as u8, level };
                }
                if c == MAX_COLS as usize {
                    return Err(Error::TooLong { required: needed, maximum: MAX_CODEWORDS });
                }
                c += 1;
            }
        }
        (None, Some(forced_rows)) => {
            let mut r = forced_rows as usize;
            loop {
                let c = needed.div_ceil(r).max(MIN_COLS as usize);
                if c <= MAX_COLS as usize && r * c <= MAX_CODEWORDS {
                    break Geometry { rows: r as u8, cols: c as u8, level };
                }
                if r == MAX_ROWS as usize {
                    return Err(Error::TooLong { required: needed, maximum: MAX_CODEWORDS });
                }
                r += 1;
            }
        }
        (Some(forced_cols), Some(forced_rows)) => {
            let (fc, fr) = (forced_cols as usize, forced_rows as usize);
            if fc * fr > MAX_CODEWORDS {
                return Err(Error::GridTooLarge { rows: forced_rows, cols: forced_cols });
            }
            let mut found = None;
            'search: for r in fr..=MAX_ROWS as usize {
                for c in fc..=MAX_COLS as usize {
                    if r * c >= needed && r * c <= MAX_CODEWORDS {
                        found = Some(Geometry { rows: r as u8, cols: c as u8, level });
                        break 'search;
                    }
                }
            }
            match found {
                Some(g) => g,
                None => return Err(Error::TooLong { required: needed, maximum: MAX_CODEWORDS }),
            }
        }
    };

    if let Some(fc) = cols {
        if geometry.cols > fc {
            warnings.push(Warning::ColumnsIncreased { from: fc, to: geometry.cols });
        }
    }
    if let Some(fr) = rows {
        if geometry.rows > fr {
            warnings.push(Warning::RowsIncreased { from: fr, to: geometry.rows });
        }
    }

    debug_assert!(needed <= geometry.capacity());
    Ok((geometry, warnings))
}

/// Starting column estimate keeping the symbol close to square given the
/// usual 3:1 module aspect ratio.
fn near_square_cols(codewords: usize) -> usize {
    let c = (0.5 + (codewords as f64 / 3.0).sqrt()) as usize;
    c.clamp(MIN_COLS as usize, MAX_COLS as usize)
}

/// Selects the MicroPDF417 variant for `data_len` data codewords. A forced
/// column count restricts the choice to that class, falling back to the
/// automatic choice when the class cannot hold the data.
pub(crate) fn resolve_micro(
    data_len: usize,
    cols: Option<u8>,
) -> Result<(Variant, Vec<Warning>), Error> {
    if data_len > MICRO_MAX_CODEWORDS {
        return Err(Error::TooLong { required: data_len, maximum: MICRO_MAX_CODEWORDS });
    }

    let mut warnings = Vec::new();
    let auto = || {
        Variant::with_capacity(data_len)
            .ok_or(Error::TooLong { required: data_len, maximum: MICRO_MAX_CODEWORDS })
    };

    let variant = match cols {
        None => auto()?,
        Some(c) if !(1..=4).contains(&c) => return Err(Error::ColumnsOutOfRange { max: 4 }),
        Some(c) => match smallest_in_class(c, data_len) {
            Some(v) => v,
            None => {
                let v = auto()?;
                warnings.push(Warning::ColumnsIncreased { from: c, to: v.cols() });
                v
            }
        },
    };

    Ok((variant, warnings))
}

/// Smallest variant with `cols` columns holding `data_len` codewords.
fn smallest_in_class(cols: u8, data_len: usize) -> Option<Variant> {
    let range = match cols {
        1 => 1..=6,
        2 => 7..=13,
        3 => 14..=23,
        _ => 24..=34,
    };
    range.map(Variant::new).find(|v| v.data_capacity() >= data_len)
}
