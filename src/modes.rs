//! Character classification for the three compaction modes and the four
//! text submodes.

/// Text submode bit: Alpha (upper case and space).
pub const T_ALPHA: u8 = 1;
/// Text submode bit: Lower (lower case and space).
pub const T_LOWER: u8 = 2;
/// Text submode bit: Mixed (digits and light punctuation).
pub const T_MIXED: u8 = 4;
/// Text submode bit: Punctuation.
pub const T_PUNCT: u8 = 8;

/// Submode membership bitmask per ASCII code. A character may belong to
/// several submodes (space is in Alpha, Lower and Mixed; CR and HT are in
/// Mixed and Punctuation). A zero entry means the character is not text
/// compactable.
pub const TEXT_CLASS: [u8; 127] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 12, 8, 0, 0, 12, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    7, 8, 8, 4, 12, 4, 4, 8, 8, 8, 12, 4, 12, 12, 12, 12, 4, 4, 4, 4, 4, 4, 4, 4,
    4, 4, 12, 8, 8, 4, 8, 8, 8, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 8, 8, 8, 4, 8, 8, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    2, 2, 2, 2, 8, 8, 8, 8,
];

/// In-submode value (0 to 29) per ASCII code, paired with [TEXT_CLASS].
pub const TEXT_VALUE: [u8; 127] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 12, 15, 0, 0, 11, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    26, 10, 20, 15, 18, 21, 10, 28, 23, 24, 22, 20, 13, 16, 17, 19, 0, 1, 2, 3,
    4, 5, 6, 7, 8, 9, 14, 0, 1, 23, 2, 25, 3, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,
    16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 4, 5, 6, 24, 7, 8, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10,
    11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 21, 27, 9,
];

/// One of the three compaction modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Mode {
    Text,
    Byte,
    Numeric,
}

/// Classifies a byte into the compaction mode it naturally belongs to:
/// digits are Numeric, text-compactable characters are Text, everything
/// else (including all bytes >= 0x80) is Byte.
pub const fn classify(b: u8) -> Mode {
    if b.is_ascii_digit() {
        Mode::Numeric
    } else if b < 127 && TEXT_CLASS[b as usize] != 0 {
        Mode::Text
    } else {
        Mode::Byte
    }
}

/// One of the four text submodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submode {
    Alpha,
    Lower,
    Mixed,
    Punct,
}

impl Submode {
    #[inline]
    pub const fn mask(self) -> u8 {
        match self {
            Submode::Alpha => T_ALPHA,
            Submode::Lower => T_LOWER,
            Submode::Mixed => T_MIXED,
            Submode::Punct => T_PUNCT,
        }
    }

    /// Picks the preferred submode out of a membership mask, in the
    /// standard's encodation preference order (Alpha first).
    pub const fn preferred(mask: u8) -> Submode {
        if mask & T_ALPHA != 0 {
            Submode::Alpha
        } else if mask & T_LOWER != 0 {
            Submode::Lower
        } else if mask & T_MIXED != 0 {
            Submode::Mixed
        } else {
            Submode::Punct
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(b'0'), Mode::Numeric);
        assert_eq!(classify(b'9'), Mode::Numeric);
        assert_eq!(classify(b'A'), Mode::Text);
        assert_eq!(classify(b'z'), Mode::Text);
        assert_eq!(classify(b' '), Mode::Text);
        assert_eq!(classify(b'\t'), Mode::Text);
        assert_eq!(classify(0x1B), Mode::Byte);
        assert_eq!(classify(0x80), Mode::Byte);
        assert_eq!(classify(0xFF), Mode::Byte);
    }

    #[test]
    fn test_space_in_three_submodes() {
        assert_eq!(TEXT_CLASS[b' ' as usize], T_ALPHA | T_LOWER | T_MIXED);
        assert_eq!(TEXT_VALUE[b' ' as usize], 26);
    }

    #[test]
    fn test_submode_values() {
        assert_eq!(TEXT_CLASS[b'A' as usize], T_ALPHA);
        assert_eq!(TEXT_VALUE[b'Z' as usize], 25);
        assert_eq!(TEXT_CLASS[b'a' as usize], T_LOWER);
        assert_eq!(TEXT_VALUE[b'5' as usize], 5);
        assert_eq!(TEXT_CLASS[b'\r' as usize], T_MIXED | T_PUNCT);
    }

    #[test]
    fn test_preferred_submode() {
        assert_eq!(Submode::preferred(T_ALPHA | T_LOWER | T_MIXED), Submode::Alpha);
        assert_eq!(Submode::preferred(T_MIXED | T_PUNCT), Submode::Mixed);
        assert_eq!(Submode::preferred(T_PUNCT), Submode::Punct);
    }
}
