//! Error and warning taxonomy shared by both symbologies.

use thiserror::Error;

/// Broad category of an [Error], mirroring the result classes used by the
/// symbology conformance tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An option was outside its absolute valid range or malformed.
    InvalidOption,
    /// The data cannot fit the symbology or the forced geometry.
    TooLong,
    /// The input itself is unusable.
    InvalidData,
}

/// A hard failure. No symbol is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("error correction level out of range (0 to 8)")]
    EccLevelOutOfRange,

    /// `max` is 30 for PDF417 and 4 for MicroPDF417.
    #[error("number of columns out of range (1 to {max})")]
    ColumnsOutOfRange { max: u8 },

    #[error("number of rows out of range (3 to 90)")]
    RowsOutOfRange,

    #[error("explicit number of rows not supported for MicroPDF417")]
    RowsNotSupported,

    #[error("requested {rows} rows by {cols} columns exceeds the 928 codeword limit")]
    GridTooLarge { rows: u8, cols: u8 },

    #[error("input too long ({length} characters, maximum {maximum})")]
    InputTooLong { length: usize, maximum: usize },

    #[error("input too long, requires {required} codewords (maximum {maximum})")]
    TooLong { required: usize, maximum: usize },

    #[error("ECI value out of range (0 to 811799)")]
    InvalidEci,

    #[error("no input data")]
    NoData,

    #[error("structured append count out of range (2 to 99999)")]
    AppendCountOutOfRange,

    #[error("structured append index out of range (1 to {count})")]
    AppendIndexOutOfRange { count: u32 },

    #[error("structured append id must be 3 to 30 digits, in groups of 3")]
    AppendIdMalformed,

    #[error("structured append id triplet out of range (000 to 899)")]
    AppendIdTripletOutOfRange,

    /// A warning escalated by [WarnLevel::FailAll].
    #[error(transparent)]
    FatalWarning(#[from] Warning),
}

impl Error {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::EccLevelOutOfRange
            | Error::ColumnsOutOfRange { .. }
            | Error::RowsOutOfRange
            | Error::RowsNotSupported
            | Error::GridTooLarge { .. }
            | Error::InvalidEci
            | Error::AppendCountOutOfRange
            | Error::AppendIndexOutOfRange { .. }
            | Error::AppendIdMalformed
            | Error::AppendIdTripletOutOfRange => ErrorKind::InvalidOption,
            Error::InputTooLong { .. } | Error::TooLong { .. } => ErrorKind::TooLong,
            Error::NoData => ErrorKind::InvalidData,
            Error::FatalWarning(w) => match w {
                Warning::UsesEci { .. } => ErrorKind::InvalidData,
                _ => ErrorKind::InvalidOption,
            },
        }
    }
}

/// A condition that was auto-corrected, or a property of the stream worth
/// reporting. Attached to the returned symbol unless [WarnLevel::FailAll]
/// escalates it into [Error::FatalWarning].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("number of columns increased from {from} to {to}")]
    ColumnsIncreased { from: u8, to: u8 },

    #[error("number of rows increased from {from} to {to}")]
    RowsIncreased { from: u8, to: u8 },

    /// Informational: an ECI switch was written into the stream. Not an
    /// auto-correction, so [WarnLevel::FailAll] does not escalate it.
    #[error("ECI {eci} inserted into the codeword stream")]
    UsesEci { eci: u32 },
}

/// Controls whether auto-corrections are reported or fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WarnLevel {
    /// Apply the correction and report it on the symbol.
    #[default]
    Warn,
    /// Abort the encode on any auto-correction warning. Informational
    /// warnings ([Warning::UsesEci]) still produce a symbol.
    FailAll,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_micro_columns_message() {
        let msg = Error::ColumnsOutOfRange { max: 4 }.to_string();
        assert!(msg.contains("out of range (1 to 4)"), "{msg}");
    }

    #[test]
    fn test_too_long_message() {
        let msg = Error::TooLong { required: 929, maximum: 928 }.to_string();
        assert_eq!(msg, "input too long, requires 929 codewords (maximum 928)");
    }

    #[test]
    fn test_columns_increased_message() {
        let msg = Warning::ColumnsIncreased { from: 2, to: 6 }.to_string();
        assert_eq!(msg, "number of columns increased from 2 to 6");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Error::ColumnsOutOfRange { max: 4 }.kind(), ErrorKind::InvalidOption);
        assert_eq!(Error::TooLong { required: 1, maximum: 0 }.kind(), ErrorKind::TooLong);
        assert_eq!(Error::NoData.kind(), ErrorKind::InvalidData);
        let esc = Error::FatalWarning(Warning::ColumnsIncreased { from: 1, to: 2 });
        assert_eq!(esc.kind(), ErrorKind::InvalidOption);
    }
}
