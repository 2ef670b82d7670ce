use crate::error::{Error, Result};
use std::ops::BitXorAssign;

/// XORs `key` into `v1` position by position; `key` must cover `v1`.
pub fn xor_slice<T: BitXorAssign + Copy>(v1: &mut [T], key: &[T]) {
    for (x, k) in v1.iter_mut().zip(key) {
        *x ^= *k;
    }
}

pub fn encode(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if plaintext.len() > key.len() {
        return Err(Error::KeyTooShort {
            message: plaintext.len(),
            key: key.len(),
        });
    }
    let mut res = Vec::from(plaintext);
    xor_slice(&mut res, key);
    Ok(res)
}

pub fn decode(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    encode(ciphertext, key)
}
