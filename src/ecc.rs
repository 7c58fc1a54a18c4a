//! Reed-Solomon error correction over GF(929).

use crate::tables::{Variant, ECC_L0, ECC_L1, ECC_L2, ECC_L3, ECC_L4, ECC_L5, ECC_L6, ECC_L7,
    ECC_L8, M_PDF417_COEFFS};

/// Number of error correction codewords at `level` (0 to 8).
pub const fn ecc_count(level: u8) -> usize {
    assert!(level < 9, "ECC level must be between 0 and 8 inclusive");
    1 << (level as usize + 1)
}

/// Computes the error correction codewords for the data in
/// `codewords[..len - factors.len()]` and writes them to the tail.
fn generate(codewords: &mut [u16], factors: &[u16]) {
    assert!(codewords.len() >= factors.len());
    let (data, ecc) = codewords.split_at_mut(codewords.len() - factors.len());
    ecc.fill(0);

    for cw in data {
        let t = (*cw + ecc[0]) % 929;

        for i in (0..factors.len()).rev() {
            let factor = ((t as usize * factors[i] as usize) % 929) as u16;
            let d = if i > 0 { ecc[factors.len() - i] } else { 0 };
            ecc[factors.len() - 1 - i] = (d + 929 - factor) % 929;
        }
    }

    for e in ecc {
        if *e != 0 {
            *e = 929 - *e;
        }
    }
}

/// Fills the last `2^(level+1)` slots of `codewords` with the error
/// correction codewords for the preceding data.
pub fn generate_ecc(codewords: &mut [u16], level: u8) {
    let factors: &[u16] = match level {
        0 => &ECC_L0,
        1 => &ECC_L1,
        2 => &ECC_L2,
        3 => &ECC_L3,
        4 => &ECC_L4,
        5 => &ECC_L5,
        6 => &ECC_L6,
        7 => &ECC_L7,
        8 => &ECC_L8,
        _ => panic!("ECC level must be between 0 and 8 inclusive"),
    };
    generate(codewords, factors);
}

/// Fills the last `variant.ecc_count()` slots of `codewords` with the error
/// correction codewords for the preceding data. MicroPDF417 uses a fixed
/// count per variant rather than a power-of-two level.
pub fn generate_micro_ecc(codewords: &mut [u16], variant: Variant) {
    let offset = variant.coeff_offset();
    generate(codewords, &M_PDF417_COEFFS[offset..offset + variant.ecc_count()]);
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT_DATA: [u16; 16] = [16, 902, 1, 278, 827, 900, 295, 902, 2, 326, 823, 544, 900, 149, 900, 900];

    fn check_level(level: u8, expected: &[u16]) {
        let mut data = vec![0u16; INPUT_DATA.len() + expected.len()];
        data[..INPUT_DATA.len()].copy_from_slice(&INPUT_DATA);
        generate_ecc(&mut data, level);
        assert_eq!(&data[INPUT_DATA.len()..], expected);
    }

    #[test]
    fn test_ecc_l0() {
        check_level(0, &[156, 765]);
    }

    #[test]
    fn test_ecc_l1() {
        check_level(1, &[168, 875, 63, 355]);
    }

    #[test]
    fn test_ecc_l2() {
        check_level(2, &[628, 715, 393, 299, 863, 601, 169, 708]);
    }

    #[test]
    fn test_ecc_l3() {
        check_level(3, &[232, 176, 793, 616, 476, 406, 855, 445, 84, 518, 522, 721, 607, 2, 42, 578]);
    }

    #[test]
    fn test_ecc_l4() {
        check_level(4, &[281, 156, 276, 668, 44, 252, 877, 30, 549, 856, 773, 639, 420, 330,
            693, 329, 283, 723, 480, 482, 102, 925, 535, 892, 374, 472, 837, 331, 343, 608, 390, 364]);
    }

    #[test]
    fn test_ecc_count() {
        assert_eq!(ecc_count(0), 2);
        assert_eq!(ecc_count(8), 512);
    }

    #[test]
    fn test_micro_ecc_seven_codewords() {
        let data: [u16; 17] = [900, 597, 138, 599, 902, 142, 142,
            901, 169, 883, 224, 680, 517, 32, 98, 105, 110];
        let mut codewords = [0u16; 17 + 7];
        codewords[..17].copy_from_slice(&data);
        generate_micro_ecc(&mut codewords, Variant::new(1));
        assert_eq!(codewords[17..], [383, 745, 811, 163, 659, 400, 129]);
    }
}
