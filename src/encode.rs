use crate::error::{Error, Result};
use num_bigint::BigUint;

pub const ASCII_BITS: usize = 7;

/// Bits of `n`, most significant first, at least one bit long.
pub fn to_bits(n: &BigUint) -> Vec<u8> {
    let len = n.bits().max(1);
    (0..len).rev().map(|i| n.bit(i) as u8).collect()
}

pub fn from_bits(bits: &[u8]) -> BigUint {
    let mut n = BigUint::default();
    for (i, b) in bits.iter().rev().enumerate() {
        if *b == 1 {
            n.set_bit(i as u64, true);
        }
    }
    n
}

pub fn pad_bits(bits: &[u8], width: usize) -> Result<Vec<u8>> {
    if bits.len() > width {
        return Err(Error::PadOverflow {
            len: bits.len(),
            width,
        });
    }
    let mut res = vec![0; width - bits.len()];
    res.extend_from_slice(bits);
    Ok(res)
}

/// Low 7 bits of `v`, most significant first.
pub fn byte_to_bits(v: u8) -> [u8; ASCII_BITS] {
    let mut res = [0; ASCII_BITS];
    for (i, b) in res.iter_mut().enumerate() {
        *b = (v >> (ASCII_BITS - 1 - i)) & 1;
    }
    res
}

pub fn char_to_bits(c: char) -> Result<[u8; ASCII_BITS]> {
    if !c.is_ascii() {
        return Err(Error::NotAscii(c));
    }
    Ok(byte_to_bits(c as u8))
}

pub fn bits_to_char(bits: &[u8]) -> Result<char> {
    if bits.len() != ASCII_BITS {
        return Err(Error::RaggedBits(bits.len()));
    }
    Ok(bits.iter().fold(0u8, |v, b| (v << 1) | (b & 1)) as char)
}

pub fn string_to_bits(s: &str) -> Result<Vec<u8>> {
    let mut bits = Vec::with_capacity(s.len() * ASCII_BITS);
    for c in s.chars() {
        bits.extend(char_to_bits(c)?);
    }
    Ok(bits)
}

pub fn bits_to_string(bits: &[u8]) -> Result<String> {
    if bits.len() % ASCII_BITS != 0 {
        return Err(Error::RaggedBits(bits.len()));
    }
    bits.chunks(ASCII_BITS).map(bits_to_char).collect()
}

pub fn display_bits(bits: &[u8]) -> String {
    bits.iter().map(|b| if *b == 0 { '0' } else { '1' }).collect()
}

pub fn parse_bits(s: &str) -> Result<Vec<u8>> {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '0' => Ok(0),
            '1' => Ok(1),
            c => Err(Error::InvalidBit(c)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_bits_works() {
        assert_eq!(to_bits(&0u8.into()), vec![0]);
        assert_eq!(to_bits(&1u8.into()), vec![1]);
        assert_eq!(to_bits(&10u8.into()), vec![1, 0, 1, 0]);
        let p = BigUint::from(1267650600228229401496703205223u128);
        let bits = to_bits(&p);
        assert_eq!(bits.len(), 100);
        assert_eq!(from_bits(&bits), p);
    }

    #[test]
    fn pad_bits_works() {
        assert_eq!(pad_bits(&[1, 0], 4), Ok(vec![0, 0, 1, 0]));
        assert_eq!(pad_bits(&[1, 0], 2), Ok(vec![1, 0]));
        assert_eq!(
            pad_bits(&[1, 0, 1], 2),
            Err(Error::PadOverflow { len: 3, width: 2 })
        );
    }

    #[test]
    fn char_bits_work() {
        assert_eq!(char_to_bits('a'), Ok([1, 1, 0, 0, 0, 0, 1]));
        assert_eq!(char_to_bits('\0'), Ok([0; 7]));
        assert_eq!(byte_to_bits(b'a'), [1, 1, 0, 0, 0, 0, 1]);
        assert_eq!(byte_to_bits(0x7f), [1; 7]);
        assert_eq!(char_to_bits('é'), Err(Error::NotAscii('é')));
        assert_eq!(bits_to_char(&[1, 1, 0, 0, 0, 0, 1]), Ok('a'));
        assert_eq!(bits_to_char(&[1, 0]), Err(Error::RaggedBits(2)));
    }

    #[test]
    fn string_bits_work() {
        let s = "attack at dawn";
        let bits = string_to_bits(s).expect("ascii input");
        assert_eq!(bits.len(), 14 * ASCII_BITS);
        assert_eq!(bits_to_string(&bits), Ok(s.to_string()));
        let odd = " x\x0br\x1fu/W\x00gJ@h#";
        assert_eq!(bits_to_string(&string_to_bits(odd).unwrap()).unwrap(), odd);
        assert_eq!(bits_to_string(&bits[1..]), Err(Error::RaggedBits(97)));
        assert_eq!(bits_to_string(&[]), Ok(String::new()));
    }

    #[test]
    fn display_parse_works() {
        let bits = vec![1, 0, 1, 1, 0];
        assert_eq!(display_bits(&bits), "10110");
        assert_eq!(parse_bits("10110"), Ok(bits));
        assert_eq!(parse_bits("1011 0\n"), Ok(vec![1, 0, 1, 1, 0]));
        assert_eq!(parse_bits("10x"), Err(Error::InvalidBit('x')));
    }
}
