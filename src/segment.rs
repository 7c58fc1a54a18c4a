//! Assembly of the data codeword stream: reader initialisation, Structured
//! Append linkage, per-segment ECI switches and compacted segment data.

use crate::error::{Error, Warning};
use crate::plan::{self, StreamState};

/// Codeword used to switch the character set (ECI 0 to 899).
pub const ECI_CHARSET: u16 = 927;
/// Codeword introducing a two-codeword ECI (900 to 810899).
pub const ECI_GENERAL: u16 = 926;
/// Codeword introducing a user-defined ECI (810900 to 811799).
pub const ECI_USER: u16 = 925;
/// Largest encodable ECI assignment number.
pub const ECI_MAX: u32 = 811_799;

/// Codeword enabling reader initialisation / programming mode.
pub const READER_INIT: u16 = 921;
/// Codeword opening a Structured Append control block.
pub const APPEND_START: u16 = 928;
/// Codeword tagging an optional Structured Append field.
pub const APPEND_FIELD: u16 = 923;
/// Codeword closing the Structured Append set on its last symbol.
pub const APPEND_TERMINATOR: u16 = 922;

/// A run of input bytes with an optional ECI interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub bytes: &'a [u8],
    pub eci: Option<u32>,
}

impl<'a> Segment<'a> {
    /// A segment in the default interpretation.
    pub const fn new(bytes: &'a [u8]) -> Self {
        Segment { bytes, eci: None }
    }

    /// A segment whose bytes are to be interpreted under the given ECI.
    pub const fn with_eci(bytes: &'a [u8], eci: u32) -> Self {
        Segment { bytes, eci: Some(eci) }
    }
}

/// Links this symbol into a multi-symbol set: its position, the set size
/// and an optional file id of 3 to 30 decimal digits (a whole number of
/// base-900 triplets, each below 900).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredAppend {
    /// Position of this symbol in the set, 1-based.
    pub index: u32,
    /// Number of symbols in the set, 2 to 99999.
    pub count: u32,
    pub id: Option<String>,
}

impl StructuredAppend {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !(2..=99_999).contains(&self.count) {
            return Err(Error::AppendCountOutOfRange);
        }
        if self.index < 1 || self.index > self.count {
            return Err(Error::AppendIndexOutOfRange { count: self.count });
        }
        if let Some(id) = &self.id {
            let id = id.as_bytes();
            if id.is_empty() || id.len() > 30 || id.len() % 3 != 0
                || !id.iter().all(u8::is_ascii_digit)
            {
                return Err(Error::AppendIdMalformed);
            }
            for triplet in id.chunks_exact(3) {
                if triplet_value(triplet) >= 900 {
                    return Err(Error::AppendIdTripletOutOfRange);
                }
            }
        }
        Ok(())
    }

    /// Control block: marker, zero-based index in base 900, the id
    /// triplets, the tagged segment count, and the set terminator on the
    /// last symbol.
    pub(crate) fn emit(&self, out: &mut Vec<u16>) {
        out.push(APPEND_START);
        let index = self.index - 1;
        out.push((index / 900) as u16);
        out.push((index % 900) as u16);
        if let Some(id) = &self.id {
            for triplet in id.as_bytes().chunks_exact(3) {
                out.push(triplet_value(triplet));
            }
        }
        out.push(APPEND_FIELD);
        out.push(1); // field designator: segment count
        out.push((self.count / 900) as u16);
        out.push((self.count % 900) as u16);
        if self.index == self.count {
            out.push(APPEND_TERMINATOR);
        }
    }
}

fn triplet_value(triplet: &[u8]) -> u16 {
    triplet.iter().fold(0, |v, d| v * 10 + (d - b'0') as u16)
}

fn push_eci(out: &mut Vec<u16>, eci: u32) -> Result<(), Error> {
    if eci <= 899 {
        out.push(ECI_CHARSET);
        out.push(eci as u16);
    } else if eci <= 810_899 {
        out.push(ECI_GENERAL);
        out.push((eci / 900 - 1) as u16);
        out.push((eci % 900) as u16);
    } else if eci <= ECI_MAX {
        out.push(ECI_USER);
        out.push((eci - 810_900) as u16);
    } else {
        return Err(Error::InvalidEci);
    }
    Ok(())
}

/// Builds the data codeword stream for a message, in stream order: reader
/// initialisation, Structured Append control block, then each segment with
/// its ECI switch.
pub(crate) fn assemble(
    segments: &[Segment<'_>],
    fast: bool,
    reader_init: bool,
    append: Option<&StructuredAppend>,
    micro: bool,
) -> Result<(Vec<u16>, Vec<Warning>), Error> {
    let total: usize = segments.iter().map(|s| s.bytes.len()).sum();
    if total == 0 {
        return Err(Error::NoData);
    }

    let mut out = Vec::with_capacity(total);
    let mut warnings = Vec::new();
    let base = if micro { StreamState::micro() } else { StreamState::pdf417() };

    if reader_init {
        out.push(READER_INIT);
    }
    if let Some(sa) = append {
        sa.validate()?;
        sa.emit(&mut out);
    }

    let mut state = base;
    let mut current_eci = None;
    for segment in segments {
        if let Some(eci) = segment.eci {
            if current_eci != Some(eci) {
                push_eci(&mut out, eci)?;
                warnings.push(Warning::UsesEci { eci });
                current_eci = Some(eci);
            }
        }
        if !out.is_empty() {
            state = state.after_prologue();
        }
        let plan = plan::plan(segment.bytes, fast, state);
        state = StreamState { mode: plan.final_mode(state), at_start: false };
        out.extend_from_slice(&plan.codewords);
    }

    Ok((out, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_prologue_not_last() {
        let sa = StructuredAppend { index: 1, count: 2, id: None };
        let mut out = Vec::new();
        sa.emit(&mut out);
        assert_eq!(out, [928, 0, 0, 923, 1, 0, 2]);
    }

    #[test]
    fn test_append_prologue_last_symbol() {
        let sa = StructuredAppend { index: 2, count: 2, id: None };
        let mut out = Vec::new();
        sa.emit(&mut out);
        assert_eq!(out, [928, 0, 1, 923, 1, 0, 2, 922]);
    }

    #[test]
    fn test_append_id_triplets() {
        let sa = StructuredAppend { index: 1, count: 3, id: Some("123899000".into()) };
        assert_eq!(sa.validate(), Ok(()));
        let mut out = Vec::new();
        sa.emit(&mut out);
        assert_eq!(out, [928, 0, 0, 123, 899, 0, 923, 1, 0, 3]);
    }

    #[test]
    fn test_append_id_triplet_900_rejected() {
        let sa = StructuredAppend { index: 1, count: 2, id: Some("900".into()) };
        assert_eq!(sa.validate(), Err(Error::AppendIdTripletOutOfRange));
    }

    #[test]
    fn test_append_id_not_triplet_aligned() {
        let sa = StructuredAppend { index: 1, count: 2, id: Some("12".into()) };
        assert_eq!(sa.validate(), Err(Error::AppendIdMalformed));
    }

    #[test]
    fn test_append_bad_index_and_count() {
        let sa = StructuredAppend { index: 3, count: 2, id: None };
        assert_eq!(sa.validate(), Err(Error::AppendIndexOutOfRange { count: 2 }));
        let sa = StructuredAppend { index: 1, count: 1, id: None };
        assert_eq!(sa.validate(), Err(Error::AppendCountOutOfRange));
    }

    #[test]
    fn test_eci_forms() {
        let mut out = Vec::new();
        push_eci(&mut out, 25).unwrap();
        assert_eq!(out, [927, 25]);

        out.clear();
        push_eci(&mut out, 900).unwrap();
        assert_eq!(out, [926, 0, 0]);

        out.clear();
        push_eci(&mut out, 810_899).unwrap();
        assert_eq!(out, [926, 899, 899]);

        out.clear();
        push_eci(&mut out, 810_900).unwrap();
        assert_eq!(out, [925, 0]);

        assert_eq!(push_eci(&mut out, 811_800), Err(Error::InvalidEci));
    }

    #[test]
    fn test_assemble_plain_text() {
        let segments = [Segment::new(b"Test")];
        let (out, warnings) = assemble(&segments, true, false, None, false).unwrap();
        assert_eq!(out, [19 * 30 + 27, 4 * 30 + 18, 19 * 30 + 29]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_assemble_eci_forces_text_latch() {
        let segments = [Segment::with_eci(b"Test", 26)];
        let (out, warnings) = assemble(&segments, true, false, None, false).unwrap();
        assert_eq!(out, [927, 26, 900, 19 * 30 + 27, 4 * 30 + 18, 19 * 30 + 29]);
        assert_eq!(warnings, [Warning::UsesEci { eci: 26 }]);
    }

    #[test]
    fn test_assemble_reader_init_first() {
        let segments = [Segment::new(b"12345")];
        let (out, _) = assemble(&segments, true, true, None, false).unwrap();
        assert_eq!(out[0], READER_INIT);
        assert_eq!(out[1], 902);
    }

    #[test]
    fn test_assemble_same_eci_not_repeated() {
        let segments = [Segment::with_eci(b"ab", 26), Segment::with_eci(b"cd", 26)];
        let (out, warnings) = assemble(&segments, true, false, None, false).unwrap();
        assert_eq!(out.iter().filter(|&&cw| cw == 927).count(), 1);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_assemble_empty_is_an_error() {
        let segments = [Segment::new(b"")];
        assert_eq!(assemble(&segments, true, false, None, false), Err(Error::NoData));
    }
}
