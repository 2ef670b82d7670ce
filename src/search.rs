//! Candidate search over exponents that cost a fixed number of modular
//! multiplications.
//!
//! An exponent with bit length `L` and `w` set bits costs `L + w - 2`
//! multiplications, so a known count pins the weight for every bit length.
//! Each bit length is anchored at `2^(L-1)` and the remaining `w - 1` ones
//! are injected into the `L - 1` low positions, which walks the class in
//! descending order without touching the integers in between.

use crate::math::mod_exp;
use num_bigint::BigUint;
use tracing::{debug, info, trace};

/// Exclusive lower bound used unless another one is given.
pub const CANDIDATE_FLOOR: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightClass {
    multiplications: u64,
    floor: BigUint,
    upper: BigUint,
}

impl WeightClass {
    /// Every `x` in `(CANDIDATE_FLOOR, upper]` whose exponentiation takes
    /// `multiplications` steps.
    pub fn new(multiplications: u64, upper: BigUint) -> Self {
        Self {
            multiplications,
            floor: CANDIDATE_FLOOR.into(),
            upper,
        }
    }

    /// Replaces the exclusive lower bound.
    pub fn above(mut self, floor: BigUint) -> Self {
        self.floor = floor;
        self
    }

    pub fn multiplications(&self) -> u64 {
        self.multiplications
    }

    pub fn candidates(&self) -> Candidates<'_> {
        Candidates {
            class: self,
            bit_len: self.upper.bits(),
            positions: None,
            done: false,
        }
    }
}

/// Pull-based walk over a `WeightClass`, largest value first.
#[derive(Debug, Clone)]
pub struct Candidates<'a> {
    class: &'a WeightClass,
    bit_len: u64,
    // low bit positions injected under the current anchor, descending
    positions: Option<Vec<u64>>,
    done: bool,
}

impl Candidates<'_> {
    fn weight(&self, bit_len: u64) -> Option<u64> {
        let w = self.class.multiplications.checked_add(2)?.checked_sub(bit_len)?;
        (1..=bit_len).contains(&w).then_some(w)
    }

    /// Largest combination of `ones` low positions under the current anchor
    /// that does not exceed the upper bound.
    fn start(&self, ones: u64) -> Option<Vec<u64>> {
        let k = ones as usize;
        if self.bit_len < self.class.upper.bits() {
            return Some((0..ones).map(|i| self.bit_len - 2 - i).collect());
        }
        let set: Vec<u64> = (0..self.bit_len - 1)
            .rev()
            .filter(|i| self.class.upper.bit(*i))
            .collect();
        if set.len() >= k {
            return Some(set[..k].to_vec());
        }
        // clear the lowest usable one of the bound and pack the rest of the
        // weight right under it
        (0..set.len()).rev().find_map(|idx| {
            let j = set[idx];
            let need = (k - idx) as u64;
            (need <= j).then(|| {
                let mut c = set[..idx].to_vec();
                c.extend((1..=need).map(|d| j - d));
                c
            })
        })
    }

    fn compose(&self, positions: &[u64]) -> BigUint {
        let mut n = BigUint::default();
        n.set_bit(self.bit_len - 1, true);
        for p in positions {
            n.set_bit(*p, true);
        }
        n
    }
}

/// Moves `c` to the next smaller combination of the same size, keeping it
/// sorted descending. Returns false once the smallest one has been passed.
fn step_down(c: &mut [u64]) -> bool {
    let k = c.len();
    for i in (0..k).rev() {
        if c[i] > (k - 1 - i) as u64 {
            c[i] -= 1;
            for j in i + 1..k {
                c[j] = c[j - 1] - 1;
            }
            return true;
        }
    }
    false
}

fn binomial(n: u64, k: u64) -> Option<u128> {
    (0..k).try_fold(1u128, |acc, i| {
        Some(acc.checked_mul((n - i) as u128)? / (i + 1) as u128)
    })
}

impl Iterator for Candidates<'_> {
    type Item = BigUint;

    fn next(&mut self) -> Option<BigUint> {
        while !self.done {
            let Some(mut positions) = self.positions.take() else {
                if self.bit_len == 0 {
                    self.done = true;
                    break;
                }
                self.positions = self.weight(self.bit_len).and_then(|w| {
                    debug!(
                        bit_len = self.bit_len,
                        weight = w,
                        size = ?binomial(self.bit_len - 1, w - 1),
                        "searching bit length"
                    );
                    self.start(w - 1)
                });
                if self.positions.is_none() {
                    self.bit_len -= 1;
                }
                continue;
            };
            let n = self.compose(&positions);
            if step_down(&mut positions) {
                self.positions = Some(positions);
            } else {
                self.bit_len -= 1;
            }
            if n <= self.class.floor {
                self.done = true;
                break;
            }
            return Some(n);
        }
        None
    }
}

/// Lazily yields every exponent of `class` with `g^a mod p == public_key`,
/// in descending order.
pub struct PrivateExponents<'a> {
    g: &'a BigUint,
    p: &'a BigUint,
    public_key: &'a BigUint,
    candidates: Candidates<'a>,
    checked: u64,
}

impl PrivateExponents<'_> {
    /// Number of candidates tested so far.
    pub fn checked(&self) -> u64 {
        self.checked
    }
}

impl Iterator for PrivateExponents<'_> {
    type Item = BigUint;

    fn next(&mut self) -> Option<BigUint> {
        for a in self.candidates.by_ref() {
            self.checked += 1;
            if mod_exp(self.g, &a, self.p) == *self.public_key {
                info!(exponent = %a, checked = self.checked, "public key matched");
                return Some(a);
            }
            trace!(candidate = %a, "rejected");
        }
        None
    }
}

pub fn find_private_exponents<'a>(
    g: &'a BigUint,
    p: &'a BigUint,
    public_key: &'a BigUint,
    class: &'a WeightClass,
) -> PrivateExponents<'a> {
    PrivateExponents {
        g,
        p,
        public_key,
        candidates: class.candidates(),
        checked: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::multiplication_count;
    use num_bigint::RandBigInt;

    fn brute_force(multiplications: u64, floor: u32, upper: u32) -> Vec<BigUint> {
        (floor + 1..=upper)
            .rev()
            .map(BigUint::from)
            .filter(|x| multiplication_count(x) == Ok(multiplications))
            .collect()
    }

    #[test]
    fn step_down_works() {
        let mut c = vec![2, 1];
        assert!(step_down(&mut c));
        assert_eq!(c, vec![2, 0]);
        assert!(step_down(&mut c));
        assert_eq!(c, vec![1, 0]);
        assert!(!step_down(&mut c));
        assert!(!step_down(&mut []));
    }

    #[test]
    fn binomial_works() {
        assert_eq!(binomial(5, 0), Some(1));
        assert_eq!(binomial(5, 2), Some(10));
        assert_eq!(binomial(26, 13), Some(10400600));
        assert_eq!(binomial(4000, 2000), None);
    }

    #[test]
    fn candidates_match_brute_force() {
        for upper in 0..=300u32 {
            for m in 0..=16 {
                let class = WeightClass::new(m, upper.into());
                let got: Vec<_> = class.candidates().collect();
                assert_eq!(got, brute_force(m, CANDIDATE_FLOOR, upper), "m={m} upper={upper}");
            }
        }
    }

    #[test]
    fn candidates_respect_floor() {
        for floor in [0u32, 1, 5, 64, 100] {
            for m in 0..=12 {
                let class = WeightClass::new(m, 1000u32.into()).above(floor.into());
                let got: Vec<_> = class.candidates().collect();
                assert_eq!(got, brute_force(m, floor, 1000), "m={m} floor={floor}");
            }
        }
    }

    #[test]
    fn candidates_power_of_two_bound() {
        let class = WeightClass::new(20, (1u32 << 20).into());
        let got: Vec<_> = class.candidates().collect();
        assert_eq!(got[0], BigUint::from(1u32 << 20));
        assert!(got.windows(2).all(|w| w[0] > w[1]));
        assert!(got.iter().all(|x| multiplication_count(x) == Ok(20)));
        // sum over bit lengths of C(L-1, 21-L), a Fibonacci number
        assert_eq!(got.len(), 10946);
    }

    #[test]
    fn candidates_huge_count_is_empty() {
        let class = WeightClass::new(u64::MAX, 1000u32.into());
        assert_eq!(class.candidates().count(), 0);
        let class = WeightClass::new(u64::MAX - 1, 1000u32.into());
        assert_eq!(class.candidates().count(), 0);
    }

    #[test]
    fn candidates_are_lazy() {
        let class = WeightClass::new(90, BigUint::from(1u8) << 80);
        let first: Vec<_> = class.candidates().take(3).collect();
        assert_eq!(first.len(), 3);
        assert!(first.iter().all(|x| multiplication_count(x) == Ok(90)));
    }

    #[test]
    fn find_private_exponents_works() {
        let p = BigUint::from(1267650600228229401496703205223u128);
        let g = BigUint::from(3u8);
        let mut rng = rand::thread_rng();
        for upper in [0b1011_0110_0101u32, 0b1000_0000_0001, 0b1111_1111_1110] {
            let upper = BigUint::from(upper);
            for _ in 0..5 {
                let a = rng.gen_biguint_range(&BigUint::from(1u32 << 11), &(&upper + 1u8));
                assert_eq!(a.bits(), upper.bits());
                let g_a = mod_exp(&g, &a, &p);
                let m = multiplication_count(&a).expect("a is not zero");
                let class = WeightClass::new(m, upper.clone());
                let found: Vec<_> = find_private_exponents(&g, &p, &g_a, &class).collect();
                assert!(found.contains(&a));
            }
        }
    }

    #[test]
    fn find_private_exponents_tiny_bounds() {
        let p = BigUint::from(23u8);
        let g = BigUint::from(5u8);
        for upper in [1u8, 2] {
            for m in 0..4 {
                let class = WeightClass::new(m, upper.into());
                let g_a = mod_exp(&g, &upper.into(), &p);
                assert_eq!(find_private_exponents(&g, &p, &g_a, &class).next(), None);
            }
        }
    }

    #[test]
    fn find_private_exponents_reports_all() {
        // 5 has order 22 mod 23, so a and a + 22 share a public key
        let p = BigUint::from(23u8);
        let g = BigUint::from(5u8);
        let a = BigUint::from(26u8);
        let g_a = mod_exp(&g, &a, &p);
        let class = WeightClass::new(multiplication_count(&a).unwrap(), 255u8.into());
        let mut found = find_private_exponents(&g, &p, &g_a, &class);
        let all: Vec<_> = found.by_ref().collect();
        let expected: Vec<BigUint> = brute_force(class.multiplications(), CANDIDATE_FLOOR, 255)
            .into_iter()
            .filter(|x| mod_exp(&g, x, &p) == g_a)
            .collect();
        assert_eq!(all, vec![BigUint::from(48u8), a]);
        assert_eq!(all, expected);
        assert_eq!(found.checked(), class.candidates().count() as u64);
    }
}
