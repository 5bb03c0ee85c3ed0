//! The keyed pseudorandom function used to derive every trapdoor, token, and label in the scheme.
//!
//! Every derivation in this crate — EMM labels, value masks, join tokens — is built from the same
//! primitive: HMAC-SHA256 keyed with a 32-byte key, evaluated over one or more byte strings
//! concatenated in a fixed order. Keeping a single PRF means a single place to audit for
//! constant-time behavior and domain separation.

use crate::crypto::KEY_SIZE;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

// -------------------------------------------------------------------------------------------------
//
/// A 32-byte PRF output: an EMM label, a value mask, or an intermediate trapdoor.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Trapdoor([u8; 32]);

impl Trapdoor {
    /// Returns the trapdoor as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Truncates the trapdoor to its first `n` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `n` is greater than 32.
    #[must_use]
    pub fn truncate(&self, n: usize) -> Vec<u8> {
        self.0[..n].to_vec()
    }
}

impl std::fmt::Debug for Trapdoor {
    /// Deliberately omits the trapdoor value: it is, by construction, supposed to hide everything
    /// about the predicate or row it was derived from.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Trapdoor").field(&"<redacted>").finish()
    }
}

impl From<Trapdoor> for [u8; 32] {
    fn from(trapdoor: Trapdoor) -> Self {
        trapdoor.0
    }
}

impl AsRef<[u8]> for Trapdoor {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// -------------------------------------------------------------------------------------------------
//
/// A keyed pseudorandom function bound to one 32-byte key.
///
/// Construct one `Prf` per distinct key (a filter key, a join key, a label key, a value key — the
/// scheme uses several) and evaluate it over as many messages as the derivation requires.
pub struct Prf<'k> {
    key: &'k [u8; KEY_SIZE],
}

impl<'k> Prf<'k> {
    /// Binds a PRF to a 32-byte key.
    #[must_use]
    pub fn new(key: &'k [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Evaluates the PRF over a single message.
    #[must_use]
    pub fn eval(&self, msg: &[u8]) -> Trapdoor {
        self.eval_parts(&[msg])
    }

    /// Evaluates the PRF over several message parts, concatenated in order.
    ///
    /// Used for multi-part derivations such as `PRF(key, rid || counter)`, where keeping the parts
    /// separate avoids an ambiguous concatenation (ad-hoc separators between parts would let two
    /// different `(rid, counter)` pairs collide on the same encoded message).
    #[must_use]
    pub fn eval_parts(&self, parts: &[&[u8]]) -> Trapdoor {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.key)
            .expect("HMAC-SHA256 accepts any key length");

        for part in parts {
            mac.update(&(part.len() as u64).to_be_bytes());
            mac.update(part);
        }

        let digest = mac.finalize().into_bytes();
        Trapdoor(digest.into())
    }
}
