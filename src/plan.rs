//! Compaction planning: partitioning a segment into Text, Byte and Numeric
//! blocks and emitting the mode-switch and data codewords.

use crate::modes::{self, Mode, Submode, TEXT_CLASS, TEXT_VALUE, T_ALPHA, T_PUNCT};
use crate::numeric;

/// Codeword used to latch to text mode, also used as padding.
pub const LATCH_TEXT: u16 = 900;
/// Codeword used to latch to byte mode.
pub const LATCH_BYTE: u16 = 901;
/// Codeword used to latch to numeric mode.
pub const LATCH_NUMERIC: u16 = 902;
/// Codeword used to shift to byte mode for a single byte, from text mode.
pub const SHIFT_BYTE: u16 = 913;
/// Codeword used to latch to byte mode when the run length is a multiple
/// of 6 (five codewords per six bytes, no trailing single bytes).
pub const LATCH_BYTE_M6: u16 = 924;

/// The compaction chosen for one segment: the block partition and the
/// codewords it emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub blocks: Vec<(Mode, usize)>,
    pub codewords: Vec<u16>,
}

impl Plan {
    /// Number of data codewords this plan emits.
    #[inline]
    pub fn len(&self) -> usize {
        self.codewords.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codewords.is_empty()
    }

    /// Compaction mode the stream is in once this plan has been emitted.
    pub fn final_mode(&self, state: StreamState) -> Mode {
        let mut prev = state.mode;
        for &(mode, len) in &self.blocks {
            prev = mode_after(mode, len, prev);
        }
        prev
    }
}

/// Where the segment sits in the codeword stream. The implied start mode is
/// Text Alpha for PDF417 and Byte for MicroPDF417, and the very first
/// codeword of a PDF417 stream may start a text block without a latch.
#[derive(Debug, Clone, Copy)]
pub struct StreamState {
    pub mode: Mode,
    pub at_start: bool,
}

impl StreamState {
    pub const fn pdf417() -> Self {
        StreamState { mode: Mode::Text, at_start: true }
    }

    pub const fn micro() -> Self {
        StreamState { mode: Mode::Byte, at_start: false }
    }

    /// State once some prologue codewords (ECI, Structured Append, reader
    /// initialisation) have been emitted.
    pub const fn after_prologue(self) -> Self {
        StreamState { mode: self.mode, at_start: false }
    }
}

/// Plans one segment. `fast` selects the linear heuristic; otherwise the
/// partition is optimised and never emits more codewords than the
/// heuristic would.
pub fn plan(bytes: &[u8], fast: bool, state: StreamState) -> Plan {
    if bytes.is_empty() {
        return Plan { blocks: Vec::new(), codewords: Vec::new() };
    }
    let f = plan_fast(bytes, state);
    if fast {
        return f;
    }
    let o = plan_optimal(bytes, state);
    if o.len() <= f.len() {
        o
    } else {
        f
    }
}

/// Linear heuristic: classify into maximal class runs, then absorb short
/// runs into their neighbours before emitting block per block.
pub fn plan_fast(bytes: &[u8], state: StreamState) -> Plan {
    let mut blocks = class_runs(bytes);
    smooth(&mut blocks);
    let codewords = emit_blocks(&blocks, bytes, state);
    Plan { blocks, codewords }
}

/// Maximal runs of bytes sharing the same natural mode.
fn class_runs(bytes: &[u8]) -> Vec<(Mode, usize)> {
    let mut runs: Vec<(Mode, usize)> = Vec::new();
    for &b in bytes {
        let m = modes::classify(b);
        match runs.last_mut() {
            Some((mode, len)) if *mode == m => *len += 1,
            _ => runs.push((m, 1)),
        }
    }
    runs
}

fn merge_neighbours(runs: &mut Vec<(Mode, usize)>) {
    let mut i = 1;
    while i < runs.len() {
        if runs[i - 1].0 == runs[i].0 {
            runs[i - 1].1 += runs[i].1;
            runs.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Reclassifies runs that are too short to pay for their mode switches:
/// first short Numeric runs, then short Text runs squeezed between Byte
/// runs. Earlier entries are read after reclassification, as each decision
/// can cascade into the next.
fn smooth(runs: &mut Vec<(Mode, usize)>) {
    for i in 0..runs.len() {
        let (crnt, length) = runs[i];
        if crnt != Mode::Numeric {
            continue;
        }
        let last = if i > 0 { Some(runs[i - 1].0) } else { None };
        let next = if i + 1 < runs.len() { Some(runs[i + 1].0) } else { None };

        if i == 0 {
            match next {
                Some(Mode::Text) if length < 8 => runs[i].0 = Mode::Text,
                Some(Mode::Byte) if length == 1 => runs[i].0 = Mode::Byte,
                _ => (),
            }
        } else if i == runs.len() - 1 {
            match last {
                Some(Mode::Text) if length < 7 => runs[i].0 = Mode::Text,
                Some(Mode::Byte) if length == 1 => runs[i].0 = Mode::Byte,
                _ => (),
            }
        } else {
            match (last, next) {
                (Some(Mode::Byte), Some(Mode::Byte)) if length < 4 => runs[i].0 = Mode::Byte,
                (Some(Mode::Byte), Some(Mode::Text)) if length < 4 => runs[i].0 = Mode::Text,
                (Some(Mode::Text), Some(Mode::Byte)) if length < 5 => runs[i].0 = Mode::Text,
                (Some(Mode::Text), Some(Mode::Text)) if length < 8 => runs[i].0 = Mode::Text,
                _ => (),
            }
        }
    }
    merge_neighbours(runs);

    for i in 0..runs.len() {
        let (crnt, length) = runs[i];
        if crnt != Mode::Text || i == 0 {
            continue;
        }
        let last = runs[i - 1].0;
        if i == runs.len() - 1 {
            if last == Mode::Byte && length == 1 {
                runs[i].0 = Mode::Byte;
            }
        } else {
            let next = runs[i + 1].0;
            if last == Mode::Byte && next == Mode::Byte && length < 5 {
                runs[i].0 = Mode::Byte;
            } else if (last == Mode::Byte) != (next == Mode::Byte) && length < 3 {
                runs[i].0 = Mode::Byte;
            }
        }
    }
    merge_neighbours(runs);
}

/// How far back the optimiser considers merging runs into a single block.
/// Mode switches cost at most three codewords, so savings from merging
/// across more runs than this cannot outweigh the per-run re-encode cost.
const LOOKBACK: usize = 16;

/// Dynamic programming over class runs: each block is a span of runs
/// assigned one mode, costed by trial emission. Ties prefer staying in the
/// current mode, then Text over Numeric over Byte.
pub fn plan_optimal(bytes: &[u8], state: StreamState) -> Plan {
    let runs = class_runs(bytes);
    let n = runs.len();

    let mut starts = Vec::with_capacity(n + 1);
    let mut pos = 0;
    for &(_, len) in &runs {
        starts.push(pos);
        pos += len;
    }
    starts.push(pos);

    // dp[i][m]: cheapest encoding of runs[..i] with the stream in mode m,
    // plus the block that got us here.
    type Back = (usize, usize, Mode); // (start run, mode index, block mode)
    let mut dp: Vec<[Option<(usize, Back)>; 3]> = vec![[None; 3]; n + 1];
    let init = mode_index(state.mode);
    dp[0][init] = Some((0, (0, init, state.mode)));

    let mut scratch = Vec::new();
    for i in 0..n {
        for prev in 0..3 {
            let Some((cost, _)) = dp[i][prev] else { continue };
            let prev_mode = index_mode(prev);
            for j in (i + 1)..=n.min(i + LOOKBACK) {
                let span = &bytes[starts[i]..starts[j]];
                for &mode in &candidate_order(prev_mode) {
                    if !representable(mode, &runs[i..j]) {
                        continue;
                    }
                    scratch.clear();
                    emit_block(&mut scratch, mode, span, prev_mode, state.at_start && i == 0);
                    let total = cost + scratch.len();
                    let after = mode_after(mode, span.len(), prev_mode);
                    let slot = &mut dp[j][mode_index(after)];
                    if slot.map_or(true, |(c, _)| total < c) {
                        *slot = Some((total, (i, prev, mode)));
                    }
                }
            }
        }
    }

    // backtrack the cheapest end state
    let mut end = 0;
    for m in 0..3 {
        if let (Some((c, _)), best) = (dp[n][m], dp[n][end]) {
            if best.map_or(true, |(bc, _)| c < bc) {
                end = m;
            }
        }
    }

    let mut blocks = Vec::new();
    let (mut at, mut m) = (n, end);
    while at > 0 {
        let (_, (i, prev, mode)) = dp[at][m].expect("every reached state has a back pointer");
        blocks.push((mode, starts[at] - starts[i]));
        at = i;
        m = prev;
    }
    blocks.reverse();

    let codewords = emit_blocks(&blocks, bytes, state);
    Plan { blocks, codewords }
}

const fn mode_index(m: Mode) -> usize {
    match m {
        Mode::Text => 0,
        Mode::Byte => 1,
        Mode::Numeric => 2,
    }
}

const fn index_mode(i: usize) -> Mode {
    match i {
        0 => Mode::Text,
        1 => Mode::Byte,
        _ => Mode::Numeric,
    }
}

/// Candidate block modes, current mode first then by encodation preference.
fn candidate_order(current: Mode) -> [Mode; 3] {
    match current {
        Mode::Text => [Mode::Text, Mode::Numeric, Mode::Byte],
        Mode::Numeric => [Mode::Numeric, Mode::Text, Mode::Byte],
        Mode::Byte => [Mode::Byte, Mode::Text, Mode::Numeric],
    }
}

fn representable(mode: Mode, runs: &[(Mode, usize)]) -> bool {
    match mode {
        Mode::Byte => true,
        // digits are also text compactable (Mixed submode)
        Mode::Text => runs.iter().all(|&(m, _)| m != Mode::Byte),
        Mode::Numeric => runs.iter().all(|&(m, _)| m == Mode::Numeric),
    }
}

/// A single byte shift does not leave text mode; everything else latches.
fn mode_after(mode: Mode, len: usize, prev: Mode) -> Mode {
    if mode == Mode::Byte && len == 1 && prev == Mode::Text {
        Mode::Text
    } else {
        mode
    }
}

fn emit_blocks(blocks: &[(Mode, usize)], bytes: &[u8], state: StreamState) -> Vec<u16> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut prev = state.mode;
    let mut pos = 0;
    for (bi, &(mode, len)) in blocks.iter().enumerate() {
        let chunk = &bytes[pos..pos + len];
        emit_block(&mut out, mode, chunk, prev, state.at_start && bi == 0);
        prev = mode_after(mode, len, prev);
        pos += len;
    }
    out
}

fn emit_block(out: &mut Vec<u16>, mode: Mode, chunk: &[u8], prev: Mode, at_start: bool) {
    match mode {
        Mode::Text => emit_text(out, chunk, !at_start),
        Mode::Byte => emit_bytes(out, chunk, prev == Mode::Text),
        Mode::Numeric => {
            out.push(LATCH_NUMERIC);
            numeric::encode_digits(out, chunk);
        }
    }
}

/// Emits a text block: submode units with temporary shifts and submode
/// switches, padded to an even count with 29, packed two per codeword.
fn emit_text(out: &mut Vec<u16>, chunk: &[u8], latch: bool) {
    let mut units: Vec<u16> = Vec::with_capacity(chunk.len() * 2);
    let mut cur = Submode::Alpha;

    for (j, &c) in chunk.iter().enumerate() {
        debug_assert!(c < 127 && TEXT_CLASS[c as usize] != 0, "not text compactable");
        let mask = TEXT_CLASS[c as usize];
        let val = TEXT_VALUE[c as usize] as u16;

        if mask & cur.mask() != 0 {
            units.push(val);
            continue;
        }

        let next_mask = chunk.get(j + 1).map(|&n| TEXT_CLASS[n as usize]);
        // a lone stranger can use a temporary shift instead of a switch
        let lone = match next_mask {
            None => true,
            Some(nm) => mask & nm == 0,
        };
        if lone {
            if mask & T_ALPHA != 0 && cur == Submode::Lower {
                units.push(27);
                units.push(val);
                continue;
            }
            if mask & T_PUNCT != 0 {
                units.push(29);
                units.push(val);
                continue;
            }
        }

        let new_mask = match next_mask {
            Some(nm) if mask & nm != 0 => mask & nm,
            _ => mask,
        };
        let new = Submode::preferred(new_mask);
        push_switch(&mut units, cur, new);
        cur = new;
        units.push(val);
    }

    if units.len() % 2 == 1 {
        units.push(29);
    }
    if latch {
        out.push(LATCH_TEXT);
    }
    for pair in units.chunks_exact(2) {
        out.push(pair[0] * 30 + pair[1]);
    }
}

fn push_switch(units: &mut Vec<u16>, from: Submode, to: Submode) {
    use Submode::*;
    match (from, to) {
        (Alpha, Lower) | (Mixed, Lower) => units.push(27),
        (Alpha, Mixed) | (Lower, Mixed) | (Mixed, Alpha) => units.push(28),
        (Alpha, Punct) | (Lower, Punct) => units.extend([28, 25]),
        (Mixed, Punct) => units.push(25),
        (Lower, Alpha) => units.extend([28, 28]),
        (Punct, Alpha) => units.push(29),
        (Punct, Lower) => units.extend([29, 27]),
        (Punct, Mixed) => units.extend([29, 28]),
        _ => unreachable!("switch to the current submode"),
    }
}

/// Emits a byte block. A single byte after text mode uses the one-codeword
/// shift; otherwise the block latches (924 when the length is a multiple
/// of six) and packs six bytes into five base-900 codewords, trailing
/// bytes one per codeword.
fn emit_bytes(out: &mut Vec<u16>, chunk: &[u8], from_text: bool) {
    if chunk.len() == 1 && from_text {
        out.push(SHIFT_BYTE);
        out.push(chunk[0] as u16);
        return;
    }

    if chunk.len() == 1 {
        out.push(LATCH_BYTE);
        out.push(chunk[0] as u16);
        return;
    }

    out.push(if chunk.len() % 6 == 0 { LATCH_BYTE_M6 } else { LATCH_BYTE });

    let mut groups = chunk.chunks_exact(6);
    for group in &mut groups {
        let mut s: u64 = 0;
        for &b in group {
            s = (s << 8) | b as u64;
        }
        let start = out.len();
        out.resize(start + 5, 0);
        for n in (0..5).rev() {
            out[start + n] = (s % 900) as u16;
            s /= 900;
        }
    }
    for &b in groups.remainder() {
        out.push(b as u16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDF: StreamState = StreamState::pdf417();

    #[test]
    fn test_text_simple() {
        let plan = plan_fast(b"Test", PDF);
        assert_eq!(plan.blocks, [(Mode::Text, 4)]);
        assert_eq!(plan.codewords, [19 * 30 + 27, 4 * 30 + 18, 19 * 30 + 29]);
    }

    #[test]
    fn test_text_latches_after_start() {
        let plan = plan_fast(b"Test", PDF.after_prologue());
        assert_eq!(plan.codewords, [900, 19 * 30 + 27, 4 * 30 + 18, 19 * 30 + 29]);
    }

    #[test]
    fn test_smoothing_absorbs_short_runs() {
        // 'abc' text, '1' numeric, 'D' text, '234' numeric, ESC byte
        let plan = plan_fast(b"abc1D234\x1B", PDF);
        assert_eq!(plan.blocks, [(Mode::Text, 8), (Mode::Byte, 1)]);
        assert_eq!(plan.codewords,
            [27 * 30, 1 * 30 + 2, 28 * 30 + 1, 28 * 30 + 3, 28 * 30 + 2, 3 * 30 + 4, 913, 0x1B]);
    }

    #[test]
    fn test_long_digit_run_stays_numeric() {
        let plan = plan_fast(b"12345678987654321 num", PDF);
        assert_eq!(plan.blocks, [(Mode::Numeric, 17), (Mode::Text, 4)]);
        assert_eq!(plan.codewords,
            [902, 190, 232, 499, 20, 504, 721, 900, 26 * 30 + 27, 13 * 30 + 20, 12 * 30 + 29]);
    }

    #[test]
    fn test_byte_multiple_of_six() {
        let mut out = Vec::new();
        emit_bytes(&mut out, b"alcool", false);
        assert_eq!(out, [924, 163, 238, 432, 766, 244]);
    }

    #[test]
    fn test_byte_not_multiple_of_six() {
        let mut out = Vec::new();
        emit_bytes(&mut out, b"encode bin", false);
        assert_eq!(out, [901, 169, 883, 224, 680, 517, 32, 98, 105, 110]);
    }

    #[test]
    fn test_optimal_merges_digits_into_text() {
        // the heuristic keeps the 10-digit run numeric (5 + 5 + 7
        // codewords); one text block over everything costs 16
        let input = b"encoded 0123456789 as digits";
        let fast = plan_fast(input, PDF);
        assert_eq!(fast.len(), 17);

        let optimal = plan(input, false, PDF);
        assert_eq!(optimal.blocks, [(Mode::Text, input.len())]);
        assert_eq!(optimal.codewords,
            [27 * 30 + 4, 13 * 30 + 2, 14 * 30 + 3, 4 * 30 + 3, 26 * 30 + 28, 1, 2 * 30 + 3,
             4 * 30 + 5, 6 * 30 + 7, 8 * 30 + 9, 26 * 30 + 27, 18, 26 * 30 + 3, 8 * 30 + 6,
             8 * 30 + 19, 18 * 30 + 29]);
    }

    #[test]
    fn test_optimal_never_worse_than_fast() {
        let inputs: [&[u8]; 6] = [
            b"Test",
            b"12345678987654321 num",
            b"encoded 0123456789 as digits",
            b"abc1D234\x1B",
            b"PDF417 Symbology Standard",
            b"aa11aa11aa11aa11aa11",
        ];
        for input in inputs {
            let f = plan_fast(input, PDF);
            let o = plan(input, false, PDF);
            assert!(o.len() <= f.len(), "{:?}", input);
        }
    }

    #[test]
    fn test_micro_always_latches_text() {
        let plan = plan_fast(b"Test", StreamState::micro());
        assert_eq!(plan.codewords, [900, 19 * 30 + 27, 4 * 30 + 18, 19 * 30 + 29]);
    }

    #[test]
    fn test_empty_segment() {
        assert!(plan(b"", false, PDF).is_empty());
    }
}
