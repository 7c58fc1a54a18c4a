//! Base-900 compaction of decimal digit runs.

use awint_core::{Bits, InlAwi};

type U160 = InlAwi<160, { Bits::unstable_raw_digits(160) }>;

/// Digit runs are split into chunks of at most 44 digits; a 44-digit chunk
/// prefixed with 1 is a 45-digit number, which fits in 160 bits.
pub const MAX_CHUNK_DIGITS: usize = 44;

fn encode_chunk(out: &mut Vec<u16>, digits: &[u8]) {
    debug_assert!(!digits.is_empty() && digits.len() <= MAX_CHUNK_DIGITS);
    debug_assert!(digits.iter().all(u8::is_ascii_digit), "digit run contains a non-digit");

    let mut b = U160::zero();
    {
        let mut p0 = U160::zero();
        let mut p1 = U160::zero();
        b.bytes_radix_(None, digits, 10, &mut p0, &mut p1)
            .expect("45 digits base 10 should fit in 160 bits");

        // Prefix the run with a leading 1 so that leading zeros survive the
        // base conversion: add 10^len, computed as 2^len * 5^len.
        p1.uone_();
        p1.shl_(digits.len()).unwrap();
        for _ in 0..digits.len() {
            p0.copy_(&p1).unwrap();
            p0.shl_(2).unwrap();
            p1.add_(&p0).unwrap();
        }
        b.add_(&p1).unwrap();
    }

    let nb = digits.len() / 3 + 1;
    let start = out.len();
    out.resize(start + nb, 0);

    let mut count = 0;
    while !b.is_zero() {
        let r = b.digit_udivide_inplace_(900).expect("900 > 0");
        out[start + nb - count - 1] = r as u16;
        count += 1;
    }
}

/// Appends the base-900 expansion of a decimal digit run, most significant
/// codeword first, `len/3 + 1` codewords per chunk of at most 44 digits.
/// The mode latch is the caller's concern.
pub fn encode_digits(out: &mut Vec<u16>, digits: &[u8]) {
    for chunk in digits.chunks(MAX_CHUNK_DIGITS) {
        encode_chunk(out, chunk);
    }
}

/// Number of codewords [encode_digits] will emit for a run of `len` digits.
pub const fn codeword_count(len: usize) -> usize {
    let full = len / MAX_CHUNK_DIGITS;
    let rem = len % MAX_CHUNK_DIGITS;
    full * (MAX_CHUNK_DIGITS / 3 + 1) + if rem > 0 { rem / 3 + 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decodes base-900 codewords back into the decimal string they encode
    /// (including the leading 1 prefix).
    fn decode(codewords: &[u16]) -> String {
        let mut digits = vec![0u8; 1];
        for &cw in codewords {
            // digits = digits * 900 + cw
            let mut carry = cw as u32;
            for d in digits.iter_mut().rev() {
                let v = *d as u32 * 900 + carry;
                *d = (v % 10) as u8;
                carry = v / 10;
            }
            while carry > 0 {
                digits.insert(0, (carry % 10) as u8);
                carry /= 10;
            }
        }
        digits.iter().map(|d| (d + b'0') as char).collect()
    }

    #[test]
    fn test_known_value() {
        let mut out = Vec::new();
        encode_digits(&mut out, b"12345678987654321");
        assert_eq!(out, [190, 232, 499, 20, 504, 721]);
    }

    #[test]
    fn test_chunk_split() {
        let mut out = Vec::new();
        encode_digits(&mut out, b"123456789876543211234567898765432112345678987654321");
        assert_eq!(out, [491, 81, 137, 725, 651, 455, 511, 858, 135, 138, 488, 568,
            447, 553, 198, 21, 715, 821]);
    }

    #[test]
    fn test_leading_zeros_survive() {
        let mut out = Vec::new();
        encode_digits(&mut out, b"000");
        assert_eq!(decode(&out), "1000");
    }

    #[test]
    fn test_codeword_count() {
        assert_eq!(codeword_count(1), 1);
        assert_eq!(codeword_count(2), 1);
        assert_eq!(codeword_count(3), 2);
        assert_eq!(codeword_count(44), 15);
        assert_eq!(codeword_count(45), 16);
        assert_eq!(codeword_count(51), 18);
    }

    #[test]
    fn test_round_trip_all_lengths() {
        let digits: Vec<u8> = (0..60).map(|i| b'0' + (i * 7 % 10) as u8).collect();
        for len in 1..=digits.len() {
            let mut out = Vec::new();
            encode_digits(&mut out, &digits[..len]);
            assert_eq!(out.len(), codeword_count(len));

            // each chunk decodes independently
            let mut decoded = String::new();
            for (chunk, cws) in digits[..len]
                .chunks(MAX_CHUNK_DIGITS)
                .zip(out.chunks(MAX_CHUNK_DIGITS / 3 + 1))
            {
                let s = decode(cws);
                assert_eq!(s.as_bytes()[0], b'1');
                assert_eq!(&s.as_bytes()[1..], chunk);
                decoded.push_str(&s[1..]);
            }
            assert_eq!(decoded.as_bytes(), &digits[..len]);
        }
    }
}
