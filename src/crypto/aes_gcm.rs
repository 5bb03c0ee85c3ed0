//! Support for [RustCrypto](https://github.com/RustCrypto)'s
//! [aes-gcm](https://crates.io/crates/aes-gcm) crate.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use crate::crypto::KEY_SIZE;

/// 96-bit nonce, per [NIST SP 800-38D](https://csrc.nist.gov/publications/detail/sp/800-38d/final).
const NONCE_SIZE: usize = 12;

pub(crate) fn encrypt(key: &[u8; KEY_SIZE], plaintext: &[u8]) -> Result<Vec<u8>, crate::Error> {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    seal(key, &nonce, plaintext)
}

/// Encrypts with a caller-supplied nonce, used only in `deterministic-cells` builds.
#[cfg_attr(not(feature = "deterministic-cells"), allow(dead_code))]
pub(crate) fn encrypt_with_nonce(key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> Result<Vec<u8>, crate::Error> {
    seal(key, Nonce::from_slice(nonce), plaintext)
}

fn seal(key: &[u8; KEY_SIZE], nonce: &Nonce, plaintext: &[u8]) -> Result<Vec<u8>, crate::Error> {
    let cipher = Aes256Gcm::new(key.into());

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| crate::Error::Encrypt)?;

    let mut wire = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    wire.extend_from_slice(nonce);
    wire.extend_from_slice(&ciphertext);
    Ok(wire)
}

pub(crate) fn decrypt(key: &[u8; KEY_SIZE], wire: &[u8]) -> Result<Vec<u8>, crate::Error> {
    if wire.len() < NONCE_SIZE {
        return Err(crate::Error::CiphertextTooShort);
    }

    let (nonce, ciphertext) = wire.split_at(NONCE_SIZE);
    let cipher = Aes256Gcm::new(key.into());
    let nonce = Nonce::from_slice(nonce);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| crate::Error::Decrypt)
}
