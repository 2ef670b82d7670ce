use crate::error::{Error, Result};
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Square-and-multiply exponentiation that also reports how many modular
/// multiplications it performed.
///
/// The low bit of the remaining exponent is consumed first. Multiplying the
/// first power into the unit accumulator is an assignment, not a
/// multiplication, and no squaring happens after the last set bit, so the
/// count is `bits + ones - 2` for every non-zero exponent.
///
/// Panics if `modulus` is zero.
pub fn mod_exp_traced(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> (BigUint, u64) {
    let mut acc: Option<BigUint> = None;
    let mut power = base % modulus;
    let mut exp = exponent.clone();
    let mut mults = 0;
    while !exp.is_zero() {
        if exp.bit(0) {
            acc = Some(match acc {
                None => power.clone(),
                Some(v) => {
                    mults += 1;
                    v * &power % modulus
                }
            });
            exp.set_bit(0, false);
        }
        if exp.is_zero() {
            break;
        }
        power = &power * &power % modulus;
        mults += 1;
        exp >>= 1;
    }
    let res = acc.unwrap_or_else(|| BigUint::one() % modulus);
    (res, mults)
}

/// `base^exponent mod modulus`, panics if `modulus` is zero.
pub fn mod_exp(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    mod_exp_traced(base, exponent, modulus).0
}

/// Closed form of the multiplications `mod_exp` spends on `exponent`.
pub fn multiplication_count(exponent: &BigUint) -> Result<u64> {
    if exponent.is_zero() {
        return Err(Error::ZeroExponent);
    }
    Ok(exponent.bits() + exponent.count_ones() - 2)
}
