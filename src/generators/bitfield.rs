use core::iter;

/// A run of up to 24 modules packed into a `u32`: the module bits in the
/// upper 24 bits, the run length in the lowest 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitfield(u32);

impl Bitfield {
    pub const fn new(bits: u32, count: u8) -> Self {
        debug_assert!(count <= 24, "count is too big");

        Self((bits << 8) | count as u32)
    }

    /// Number of modules in this run.
    #[inline]
    pub const fn size(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Module bits, most significant module first.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0 >> 8
    }
}

impl iter::IntoIterator for Bitfield {
    type Item = bool;
    type IntoIter = Bits;

    fn into_iter(self) -> Self::IntoIter {
        Bits { value: self.bits(), count: self.size() as u32 }
    }
}

/// Iterates over the modules of a [Bitfield], leftmost module first.
pub struct Bits {
    value: u32,
    count: u32,
}

impl iter::Iterator for Bits {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        if self.count > 0 {
            self.count -= 1;
            Some((self.value >> self.count) & 1 != 0)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.count as usize;
        (count, Some(count))
    }
}

impl iter::ExactSizeIterator for Bits {}
impl iter::FusedIterator for Bits {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_order() {
        let bits: Vec<bool> = Bitfield::new(0b10110, 5).into_iter().collect();
        assert_eq!(bits, [true, false, true, true, false]);
    }

    #[test]
    fn test_leading_zeros_kept() {
        let bits: Vec<bool> = Bitfield::new(0b1, 3).into_iter().collect();
        assert_eq!(bits, [false, false, true]);
    }

    #[test]
    fn test_exact_size() {
        assert_eq!(Bitfield::new(0x1FFFF, 17).into_iter().len(), 17);
    }
}
