//! Authenticated cell encryption for row payloads: `nonce || ciphertext || tag`, dispatched to
//! whichever AEAD backend was selected at compile time.
//!
//! Nonce discipline is the one place the two build modes of §9's "deterministic cell encryption"
//! open question diverge. By default (`deterministic-cells` off) every cell gets a fresh random
//! nonce, so two builds over identical inputs produce EMM/row tables equal as multisets but not
//! bitwise-identical — the standard, IND-CPA-secure choice. With `deterministic-cells` on, the
//! nonce is instead `PRF(cell_key, context)` truncated to the backend's nonce width, where
//! `context` is caller-supplied and must be unique per cell (callers use `enc_rid || column
//! name`); this buys bitwise-reproducible builds at the cost of leaking equality of identical
//! plaintext cells within the same column to the store, as documented in `DESIGN.md`.

use crate::crypto::{KEY_SIZE, Prf};

/// Width of the nonce every supported AEAD backend uses (96-bit, per NIST SP 800-38D).
const NONCE_SIZE: usize = 12;

/// Derives a deterministic nonce from `context` under the `deterministic-cells` feature.
#[cfg(feature = "deterministic-cells")]
fn deterministic_nonce(key: &[u8; KEY_SIZE], context: &[u8]) -> [u8; NONCE_SIZE] {
    Prf::new(key).eval(context).truncate(NONCE_SIZE).try_into().expect("truncate(12) yields 12 bytes")
}

/// The AEAD algorithm compiled into this build.
///
/// Exactly one of `encrypt-aes-gcm` / `encrypt-chacha20` is always enabled (enforced by the
/// const-assert in [`crate::crypto`]), so this enum carries a single variant in practice — it
/// exists so logs and error messages can name the active backend without a `cfg!` at every call
/// site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// AES-256-GCM, via [aes-gcm](https://crates.io/crates/aes-gcm).
    #[cfg(feature = "encrypt-aes-gcm")]
    AesGcm,

    /// `ChaCha20-Poly1305`, via [chacha20poly1305](https://crates.io/crates/chacha20poly1305).
    #[cfg(feature = "encrypt-chacha20")]
    ChaCha20,
}

impl Method {
    /// The active backend.
    #[must_use]
    pub const fn active() -> Self {
        #[cfg(feature = "encrypt-aes-gcm")]
        return Self::AesGcm;

        #[cfg(feature = "encrypt-chacha20")]
        return Self::ChaCha20;
    }
}

/// Encrypts a row cell with the active AEAD backend, returning `nonce || ciphertext || tag`.
///
/// `context` is only consulted when the `deterministic-cells` feature is enabled, in which case it
/// must be unique per cell (reusing a context under the same key lets the store link the two
/// cells' plaintexts via a repeated nonce). Callers pass `enc_rid || column name`.
///
/// # Errors
///
/// Returns [`crate::Error::Encrypt`] if the backend rejects the key or plaintext.
pub fn encrypt_cell(key: &[u8; KEY_SIZE], plaintext: &[u8], context: &[u8]) -> Result<Vec<u8>, crate::Error> {
    #[cfg(feature = "deterministic-cells")]
    {
        let nonce = deterministic_nonce(key, context);

        #[cfg(feature = "encrypt-aes-gcm")]
        return crate::crypto::aes_gcm::encrypt_with_nonce(key, &nonce, plaintext);

        #[cfg(feature = "encrypt-chacha20")]
        return crate::crypto::chacha20::encrypt_with_nonce(key, &nonce, plaintext);
    }

    #[cfg(not(feature = "deterministic-cells"))]
    {
        let _ = context;

        #[cfg(feature = "encrypt-aes-gcm")]
        return crate::crypto::aes_gcm::encrypt(key, plaintext);

        #[cfg(feature = "encrypt-chacha20")]
        return crate::crypto::chacha20::encrypt(key, plaintext);
    }
}

/// Decrypts a cell produced by [`encrypt_cell`].
///
/// # Errors
///
/// Returns [`crate::Error::CiphertextTooShort`] if `wire` is shorter than one nonce, or
/// [`crate::Error::Decrypt`] if authentication fails.
pub fn decrypt_cell(key: &[u8; KEY_SIZE], wire: &[u8]) -> Result<Vec<u8>, crate::Error> {
    #[cfg(feature = "encrypt-aes-gcm")]
    return crate::crypto::aes_gcm::decrypt(key, wire);

    #[cfg(feature = "encrypt-chacha20")]
    return crate::crypto::chacha20::decrypt(key, wire);
}
