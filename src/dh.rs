use crate::encode::{
    bits_to_string, byte_to_bits, pad_bits, string_to_bits, to_bits, ASCII_BITS,
};
use crate::error::{Error, Result};
use crate::filter::is_plausible;
use crate::math::{mod_exp, multiplication_count};
use crate::search::{find_private_exponents, PrivateExponents, WeightClass, CANDIDATE_FLOOR};
use crate::xor::{decode, encode};
use num_bigint::{BigUint, RandBigInt};
use tracing::{instrument, warn};

/// 2^100 - 153, prime.
pub const MODULUS: u128 = 1267650600228229401496703205223;
/// Primitive root modulo `MODULUS`.
pub const GENERATOR: u8 = 3;
pub const ALICE_PUBLIC: u128 = 142621255265782287951127214876;
pub const BOB_PUBLIC: u128 = 609743693736442153553407144551;
/// Multiplications observed while Alice computed her side of the exchange.
pub const MULTIPLICATIONS: u64 = 26;
pub const SEARCH_BOUND: u32 = 1 << 26;
pub const CIPHERTEXT: &str = " x\x0br\x1fu/W\x00gJ@h#";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhGroup {
    p: BigUint,
    g: BigUint,
}

impl DhGroup {
    pub fn new(p: BigUint, g: BigUint) -> Result<Self> {
        if p <= BigUint::from(1u8) {
            return Err(Error::InvalidGroup);
        }
        Ok(Self { p, g })
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn g(&self) -> &BigUint {
        &self.g
    }

    pub fn public_key(&self, privkey: &BigUint) -> BigUint {
        mod_exp(&self.g, privkey, &self.p)
    }

    pub fn shared_secret(&self, other_public: &BigUint, privkey: &BigUint) -> BigUint {
        mod_exp(other_public, privkey, &self.p)
    }
}

impl Default for DhGroup {
    fn default() -> Self {
        Self {
            p: MODULUS.into(),
            g: GENERATOR.into(),
        }
    }
}

/// Random private key in `[2, bound)` together with its public key.
pub fn dh_keys(group: &DhGroup, bound: &BigUint, r: &mut impl rand::Rng) -> (BigUint, BigUint) {
    let privkey = r.gen_biguint_range(&2u8.into(), bound);
    let pubkey = group.public_key(&privkey);
    (privkey, pubkey)
}

/// Key stream for a shared secret: its bits, left padded only when the
/// ciphertext is longer.
pub fn session_key_bits(secret: &BigUint, min_len: usize) -> Result<Vec<u8>> {
    let bits = to_bits(secret);
    if bits.len() >= min_len {
        return Ok(bits);
    }
    pad_bits(&bits, min_len)
}

/// Everything a passive eavesdropper saw, plus where to look for Alice's key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackParams {
    pub group: DhGroup,
    pub alice_public: BigUint,
    pub bob_public: BigUint,
    pub multiplications: u64,
    pub search_bound: BigUint,
    pub floor: BigUint,
    pub ciphertext: Vec<u8>,
}

impl Default for AttackParams {
    fn default() -> Self {
        // CIPHERTEXT is 7-bit ascii, so this is string_to_bits without the check
        let ciphertext = CIPHERTEXT.bytes().flat_map(byte_to_bits).collect();
        Self {
            group: DhGroup::default(),
            alice_public: ALICE_PUBLIC.into(),
            bob_public: BOB_PUBLIC.into(),
            multiplications: MULTIPLICATIONS,
            search_bound: SEARCH_BOUND.into(),
            floor: CANDIDATE_FLOOR.into(),
            ciphertext,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovery {
    pub private_exponent: BigUint,
    pub shared_secret: BigUint,
    pub key: Vec<u8>,
    pub plaintext: String,
}

impl AttackParams {
    /// Transcript of an exchange between private keys `a` and `b` in which
    /// `plaintext` was sent under the shared key.
    pub fn from_exchange(
        group: DhGroup,
        a: &BigUint,
        b: &BigUint,
        plaintext: &str,
        search_bound: BigUint,
    ) -> Result<Self> {
        let alice_public = group.public_key(a);
        let bob_public = group.public_key(b);
        let msg = string_to_bits(plaintext)?;
        let key = session_key_bits(&group.shared_secret(&bob_public, a), msg.len())?;
        Ok(Self {
            multiplications: multiplication_count(a)?,
            ciphertext: encode(&msg, &key)?,
            group,
            alice_public,
            bob_public,
            search_bound,
            floor: CANDIDATE_FLOOR.into(),
        })
    }

    pub fn weight_class(&self) -> WeightClass {
        WeightClass::new(self.multiplications, self.search_bound.clone()).above(self.floor.clone())
    }

    /// Alice's possible private keys, verified against her public key.
    pub fn private_exponents<'a>(&'a self, class: &'a WeightClass) -> PrivateExponents<'a> {
        find_private_exponents(self.group.g(), self.group.p(), &self.alice_public, class)
    }

    /// Decrypts the intercepted message assuming `a` is Alice's key.
    pub fn decrypt_with(&self, a: &BigUint) -> Result<Recovery> {
        let shared_secret = self.group.shared_secret(&self.bob_public, a);
        let key = session_key_bits(&shared_secret, self.ciphertext.len())?;
        let plaintext = bits_to_string(&decode(&self.ciphertext, &key)?)?;
        let expected = self.ciphertext.len() / ASCII_BITS;
        if !is_plausible(&plaintext, expected) {
            warn!(exponent = %a, ?plaintext, "decryption does not look like text");
        }
        Ok(Recovery {
            private_exponent: a.clone(),
            shared_secret,
            key,
            plaintext,
        })
    }

    /// Searches for Alice's key and decrypts with the first match.
    #[instrument(skip(self), fields(multiplications = self.multiplications, bound = %self.search_bound))]
    pub fn recover(&self) -> Result<Option<Recovery>> {
        let class = self.weight_class();
        let found = self.private_exponents(&class).next();
        found.map(|a| self.decrypt_with(&a)).transpose()
    }

    /// Whether `plaintext` encrypted under the key derived from `a`
    /// reproduces the intercepted ciphertext.
    pub fn verify_plaintext(&self, a: &BigUint, plaintext: &str) -> Result<bool> {
        let key = session_key_bits(
            &self.group.shared_secret(&self.bob_public, a),
            self.ciphertext.len(),
        )?;
        let msg = string_to_bits(plaintext)?;
        Ok(msg.len() == self.ciphertext.len() && encode(&msg, &key)? == self.ciphertext)
    }
}
