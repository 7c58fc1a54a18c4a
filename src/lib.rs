//! PDF417 and MicroPDF417 codeword encoder.
//!
//! Turns arbitrary byte input into a fully assembled symbol: the input is
//! split into text, byte and numeric compaction blocks, wrapped with ECI
//! switches and Structured Append linkage, sized to a row/column grid (or
//! one of the 34 MicroPDF417 variants), protected with Reed-Solomon error
//! correction over GF(929) and finally mapped to module bit patterns.
//!
//! ```
//! use pdf417_encode::{encode, Options};
//!
//! let symbol = encode(b"Test", &Options::default()).unwrap();
//! let render = symbol.render();
//! let mut pixels = vec![false; (render.width() * render.height()) as usize];
//! render.fill_bits(&mut pixels);
//! ```

pub mod ecc;
mod error;
mod generators;
mod geometry;
mod modes;
mod numeric;
mod plan;
mod segment;
mod symbol;
mod tables;

pub use error::{Error, ErrorKind, WarnLevel, Warning};
pub use generators::Bitfield;
pub use geometry::{Geometry, MAX_CODEWORDS, MAX_COLS, MAX_ROWS, MICRO_MAX_CODEWORDS, MIN_COLS,
    MIN_ROWS};
pub use segment::{Segment, StructuredAppend};
pub use symbol::{Layout, Render, Symbol};
pub use tables::Variant;

/// Maximum input length in bytes for a PDF417 symbol.
pub const MAX_INPUT_BYTES: usize = 2710;
/// Maximum input length in bytes for a MicroPDF417 symbol.
pub const MICRO_MAX_INPUT_BYTES: usize = 366;

/// Encoding options. The defaults produce an automatically sized PDF417
/// symbol at the recommended error correction level.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Error correction level 0 to 8, or automatic. MicroPDF417 derives
    /// its correction strength from the variant and ignores this.
    pub ecc_level: Option<u8>,
    /// Number of data columns (1 to 30 for PDF417, 1 to 4 for
    /// MicroPDF417), or automatic.
    pub columns: Option<u8>,
    /// Number of rows (3 to 90), or automatic. Not supported for
    /// MicroPDF417, whose variants fix the row count.
    pub rows: Option<u8>,
    /// Use the single-pass compaction heuristic instead of the optimal
    /// block split.
    pub fast: bool,
    /// Drop the right row indicators and shorten the stop pattern
    /// (PDF417 only).
    pub compact: bool,
    /// Prefix the stream with the reader initialisation codeword.
    pub reader_init: bool,
    /// Escalate auto-corrections into errors.
    pub warn_level: WarnLevel,
    /// Link this symbol into a Structured Append set.
    pub structured_append: Option<StructuredAppend>,
}

impl Options {
    fn validate(&self, micro: bool) -> Result<(), Error> {
        if micro {
            if self.rows.is_some() {
                return Err(Error::RowsNotSupported);
            }
            // columns are checked against the 1 to 4 range during variant
            // selection
            return Ok(());
        }
        if let Some(level) = self.ecc_level {
            if level > 8 {
                return Err(Error::EccLevelOutOfRange);
            }
        }
        if let Some(cols) = self.columns {
            if !(MIN_COLS..=MAX_COLS).contains(&cols) {
                return Err(Error::ColumnsOutOfRange { max: MAX_COLS });
            }
        }
        if let Some(rows) = self.rows {
            if !(MIN_ROWS..=MAX_ROWS).contains(&rows) {
                return Err(Error::RowsOutOfRange);
            }
        }
        Ok(())
    }
}

/// Encodes `data` as a PDF417 symbol.
pub fn encode(data: &[u8], options: &Options) -> Result<Symbol, Error> {
    encode_segments(&[Segment::new(data)], options)
}

/// Encodes `data` as a MicroPDF417 symbol.
pub fn encode_micro(data: &[u8], options: &Options) -> Result<Symbol, Error> {
    encode_micro_segments(&[Segment::new(data)], options)
}

/// Encodes a multi-segment message, with per-segment ECIs, as a PDF417
/// symbol.
pub fn encode_segments(segments: &[Segment<'_>], options: &Options) -> Result<Symbol, Error> {
    options.validate(false)?;
    check_input_length(segments, MAX_INPUT_BYTES)?;

    let append = options.structured_append.as_ref();
    let (mut data, mut warnings) =
        segment::assemble(segments, options.fast, options.reader_init, append, false)?;

    let resolve = |len| geometry::resolve_pdf417(len, options.ecc_level, options.columns,
        options.rows);
    let (geometry, sizing) = match resolve(data.len()) {
        // the fast heuristic may have overshot; the optimal split can
        // still fit
        Err(Error::TooLong { .. }) if options.fast => {
            let (tight, w) = segment::assemble(segments, false, options.reader_init, append,
                false)?;
            data = tight;
            warnings = w;
            resolve(data.len())?
        }
        other => other?,
    };
    warnings.extend(sizing);

    let capacity = geometry.capacity();
    let ecc_count = geometry.ecc_count();
    let mut codewords = Vec::with_capacity(capacity);
    codewords.push((capacity - ecc_count) as u16);
    codewords.extend_from_slice(&data);
    codewords.resize(capacity - ecc_count, plan::LATCH_TEXT);
    codewords.resize(capacity, 0);
    ecc::generate_ecc(&mut codewords, geometry.level);

    finish(Layout::Full { geometry, compact: options.compact }, codewords, warnings,
        options.warn_level)
}

/// Encodes a multi-segment message, with per-segment ECIs, as a
/// MicroPDF417 symbol.
pub fn encode_micro_segments(segments: &[Segment<'_>], options: &Options) -> Result<Symbol, Error> {
    options.validate(true)?;
    check_input_length(segments, MICRO_MAX_INPUT_BYTES)?;

    let append = options.structured_append.as_ref();
    let (mut data, mut warnings) =
        segment::assemble(segments, options.fast, options.reader_init, append, true)?;

    let (variant, sizing) = match geometry::resolve_micro(data.len(), options.columns) {
        Err(Error::TooLong { .. }) if options.fast => {
            let (tight, w) = segment::assemble(segments, false, options.reader_init, append,
                true)?;
            data = tight;
            warnings = w;
            geometry::resolve_micro(data.len(), options.columns)?
        }
        other => other?,
    };
    warnings.extend(sizing);

    let mut codewords = data;
    codewords.resize(variant.data_capacity(), plan::LATCH_TEXT);
    codewords.resize(variant.capacity(), 0);
    ecc::generate_micro_ecc(&mut codewords, variant);

    finish(Layout::Micro { variant }, codewords, warnings, options.warn_level)
}

fn check_input_length(segments: &[Segment<'_>], maximum: usize) -> Result<(), Error> {
    let length: usize = segments.iter().map(|s| s.bytes.len()).sum();
    if length > maximum {
        return Err(Error::InputTooLong { length, maximum });
    }
    Ok(())
}

fn finish(
    layout: Layout,
    codewords: Vec<u16>,
    warnings: Vec<Warning>,
    warn_level: WarnLevel,
) -> Result<Symbol, Error> {
    if warn_level == WarnLevel::FailAll {
        // UsesEci reports a switch the caller asked for, not a correction
        let fatal = warnings
            .iter()
            .copied()
            .find(|w| !matches!(w, Warning::UsesEci { .. }));
        if let Some(warning) = fatal {
            return Err(Error::FatalWarning(warning));
        }
    }
    Ok(Symbol::new(layout, codewords, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_small_text() {
        let symbol = encode(b"Test", &Options::default()).unwrap();
        assert!(matches!(symbol.layout(),
            Layout::Full { geometry: Geometry { rows: 6, cols: 2, level: 2 }, compact: false }));
        assert_eq!(symbol.width(), 103);
        assert_eq!(symbol.codewords(), [
            4, // length descriptor
            597, 138, 599,
            236, 550, 238, 593, 24, 377, 915, 119,
        ]);
    }

    #[test]
    fn test_encode_micro_small_text() {
        let symbol = encode_micro(b"Test", &Options::default()).unwrap();
        assert!(matches!(symbol.layout(), Layout::Micro { variant } if u8::from(variant) == 1));
        assert_eq!((symbol.rows(), symbol.cols(), symbol.width()), (11, 1, 38));
        assert_eq!(symbol.codewords(), [
            900, 597, 138, 599,
            120, 904, 384, 762, 920, 778, 47,
        ]);
    }

    #[test]
    fn test_level_drops_to_fit_at_the_limit() {
        let data = "A".repeat(1850);
        let symbol = encode(data.as_bytes(), &Options::default()).unwrap();
        assert!(matches!(symbol.layout(),
            Layout::Full { geometry: Geometry { rows: 32, cols: 29, level: 0 }, .. }));
        assert_eq!(symbol.width(), 562);

        let data = "A".repeat(1851);
        assert_eq!(
            encode(data.as_bytes(), &Options::default()),
            Err(Error::TooLong { required: 929, maximum: 928 })
        );
    }

    #[test]
    fn test_high_level_forces_wider_grid() {
        let options = Options {
            ecc_level: Some(8),
            columns: Some(2),
            fast: true,
            ..Options::default()
        };
        let symbol = encode(b"12345", &options).unwrap();
        assert!(matches!(symbol.layout(),
            Layout::Full { geometry: Geometry { rows: 86, cols: 6, level: 8 }, .. }));
        assert_eq!(symbol.width(), 171);
        assert_eq!(symbol.warnings(), [Warning::ColumnsIncreased { from: 2, to: 6 }]);
        assert_eq!(&symbol.codewords()[..4], [4, 902, 124, 745]);
    }

    #[test]
    fn test_warnings_escalate() {
        let options = Options {
            ecc_level: Some(8),
            columns: Some(2),
            warn_level: WarnLevel::FailAll,
            ..Options::default()
        };
        let err = encode(b"12345", &options).unwrap_err();
        assert_eq!(err, Error::FatalWarning(Warning::ColumnsIncreased { from: 2, to: 6 }));
        assert_eq!(err.to_string(), "number of columns increased from 2 to 6");
    }

    #[test]
    fn test_structured_append_fills_single_column() {
        let append = StructuredAppend { index: 1, count: 2, id: None };
        let options = Options {
            columns: Some(1),
            structured_append: Some(append),
            ..Options::default()
        };

        // 304 characters pair into 152 codewords; with the 7 codeword
        // control block and the text latch the stream holds exactly 160
        let data = "A".repeat(304);
        let symbol = encode(data.as_bytes(), &options).unwrap();
        assert!(matches!(symbol.layout(),
            Layout::Full { geometry: Geometry { rows: 89, cols: 2, level: 3 }, .. }));
        assert_eq!(symbol.width(), 103);
        assert_eq!(&symbol.codewords()[1..9], [928, 0, 0, 923, 1, 0, 2, 900]);

        // one more character crosses the level threshold
        let data = "A".repeat(305);
        let symbol = encode(data.as_bytes(), &options).unwrap();
        assert!(matches!(symbol.layout(),
            Layout::Full { geometry: Geometry { rows: 65, cols: 3, level: 4 }, .. }));
    }

    #[test]
    fn test_option_range_checks() {
        let base = Options::default();
        let d = b"x";

        let options = Options { ecc_level: Some(9), ..base.clone() };
        assert_eq!(encode(d, &options), Err(Error::EccLevelOutOfRange));

        for cols in [0, 31] {
            let options = Options { columns: Some(cols), ..base.clone() };
            assert_eq!(encode(d, &options), Err(Error::ColumnsOutOfRange { max: 30 }));
        }

        for rows in [2, 91] {
            let options = Options { rows: Some(rows), ..base.clone() };
            assert_eq!(encode(d, &options), Err(Error::RowsOutOfRange));
        }

        let options = Options { columns: Some(5), ..base.clone() };
        let err = encode_micro(d, &options).unwrap_err();
        assert_eq!(err, Error::ColumnsOutOfRange { max: 4 });
        assert_eq!(err.to_string(), "number of columns out of range (1 to 4)");

        let options = Options { rows: Some(11), ..base };
        assert_eq!(encode_micro(d, &options), Err(Error::RowsNotSupported));
    }

    #[test]
    fn test_explicit_eci_not_escalated() {
        let options = Options { warn_level: WarnLevel::FailAll, ..Options::default() };
        let segments = [Segment::with_eci(b"Test", 26)];
        let symbol = encode_segments(&segments, &options).unwrap();
        assert_eq!(symbol.warnings(), [Warning::UsesEci { eci: 26 }]);
    }

    #[test]
    fn test_structured_append_id_range() {
        let append = StructuredAppend { index: 1, count: 2, id: Some("900".into()) };
        let options = Options { structured_append: Some(append), ..Options::default() };
        assert_eq!(encode(b"x", &options), Err(Error::AppendIdTripletOutOfRange));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(encode(b"", &Options::default()), Err(Error::NoData));
        assert_eq!(encode_micro(b"", &Options::default()), Err(Error::NoData));
    }

    #[test]
    fn test_input_byte_caps() {
        let data = vec![b'A'; MAX_INPUT_BYTES + 1];
        assert_eq!(
            encode(&data, &Options::default()),
            Err(Error::InputTooLong { length: 2711, maximum: 2710 })
        );

        let data = vec![0u8; MICRO_MAX_INPUT_BYTES + 1];
        assert_eq!(
            encode_micro(&data, &Options::default()),
            Err(Error::InputTooLong { length: 367, maximum: 366 })
        );
    }

    #[test]
    fn test_reader_init_leads_the_stream() {
        let options = Options { reader_init: true, ..Options::default() };
        let symbol = encode(b"1234", &options).unwrap();
        assert_eq!(&symbol.codewords()[1..3], [921, 902]);

        let symbol = encode_micro(b"1234", &options).unwrap();
        assert_eq!(&symbol.codewords()[..2], [921, 902]);
    }

    #[test]
    fn test_compact_symbol() {
        let options = Options { compact: true, ..Options::default() };
        let symbol = encode(b"Test", &options).unwrap();
        assert_eq!(symbol.width(), 69);
        assert_eq!(symbol.bits().count() % symbol.width() as usize, 0);
    }

    proptest! {
        #[test]
        fn prop_encode_is_deterministic(data in proptest::collection::vec(any::<u8>(), 1..200)) {
            let a = encode(&data, &Options::default()).unwrap();
            let b = encode(&data, &Options::default()).unwrap();
            prop_assert_eq!(a.codewords(), b.codewords());
        }

        #[test]
        fn prop_matrix_fills_the_grid(data in proptest::collection::vec(any::<u8>(), 1..400)) {
            let symbol = encode(&data, &Options::default()).unwrap();
            let (rows, cols) = (symbol.rows() as usize, symbol.cols() as usize);
            prop_assert_eq!(symbol.codewords().len(), rows * cols);
            prop_assert_eq!(symbol.bits().count(), symbol.width() as usize * rows);
        }

        #[test]
        fn prop_descriptor_counts_the_data_section(
            data in proptest::collection::vec(any::<u8>(), 1..300),
        ) {
            let symbol = encode(&data, &Options::default()).unwrap();
            let Layout::Full { geometry, .. } = symbol.layout() else { unreachable!() };
            let expected = geometry.capacity() - geometry.ecc_count();
            prop_assert_eq!(symbol.codewords()[0] as usize, expected);
        }

        #[test]
        fn prop_optimal_never_loses_to_fast(
            data in proptest::collection::vec(any::<u8>(), 1..200),
        ) {
            let segments = [Segment::new(&data)];
            let (fast, _) = segment::assemble(&segments, true, false, None, false).unwrap();
            let (optimal, _) = segment::assemble(&segments, false, false, None, false).unwrap();
            prop_assert!(optimal.len() <= fast.len());
        }

        #[test]
        fn prop_ecc_reacts_to_data_changes(
            data in proptest::collection::vec(any::<u8>(), 2..100),
            flip in 0usize..100,
        ) {
            let symbol = encode(&data, &Options::default()).unwrap();
            let mut altered = data.clone();
            let i = flip % data.len();
            altered[i] = altered[i].wrapping_add(1);
            let other = encode(&altered, &Options::default()).unwrap();
            prop_assume!(symbol.rows() == other.rows() && symbol.cols() == other.cols());

            let Layout::Full { geometry, .. } = symbol.layout() else { unreachable!() };
            let tail = symbol.codewords().len() - geometry.ecc_count();
            prop_assert_ne!(&symbol.codewords()[..tail], &other.codewords()[..tail]);
            prop_assert_ne!(&symbol.codewords()[tail..], &other.codewords()[tail..]);
        }

        #[test]
        fn prop_micro_fits_its_variant(data in proptest::collection::vec(any::<u8>(), 1..80)) {
            let symbol = encode_micro(&data, &Options::default()).unwrap();
            let Layout::Micro { variant } = symbol.layout() else { unreachable!() };
            prop_assert_eq!(symbol.codewords().len(), variant.capacity());
            prop_assert_eq!(symbol.bits().count(),
                symbol.width() as usize * variant.rows() as usize);
        }
    }
}
