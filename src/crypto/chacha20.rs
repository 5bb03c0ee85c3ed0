//! Support for [Artyom Pavlov](https://github.com/newpavlov)'s
//! [chacha20poly1305](https://crates.io/crates/chacha20poly1305) crate.

use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use crate::crypto::KEY_SIZE;

/// 96-bit nonce, same width as the AES-GCM backend.
const NONCE_SIZE: usize = 12;

pub(crate) fn encrypt(key: &[u8; KEY_SIZE], plaintext: &[u8]) -> Result<Vec<u8>, crate::Error> {
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
    seal(key, &nonce, plaintext)
}

/// Encrypts with a caller-supplied nonce, used only in `deterministic-cells` builds.
#[cfg_attr(not(feature = "deterministic-cells"), allow(dead_code))]
pub(crate) fn encrypt_with_nonce(key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> Result<Vec<u8>, crate::Error> {
    seal(key, Nonce::from_slice(nonce), plaintext)
}

fn seal(key: &[u8; KEY_SIZE], nonce: &Nonce, plaintext: &[u8]) -> Result<Vec<u8>, crate::Error> {
    let cipher = ChaCha20Poly1305::new(key.into());

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
    let cipher = ChaCha20Poly1305::new(key.into());
    let nonce = Nonce::from_slice(nonce);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| crate::Error::Decrypt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let key = [11u8; KEY_SIZE];
        let plaintext = b"row payload goes here";

        let wire = encrypt(&key, plaintext).expect("encrypt");
        let recovered = decrypt(&key, &wire).expect("decrypt");

        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn rejects_tampered_ciphertext() {
        let key = [11u8; KEY_SIZE];
        let mut wire = encrypt(&key, b"row payload").expect("encrypt");
        let last = wire.len() - 1;
        wire[last] ^= 0x01;

        assert!(decrypt(&key, &wire).is_err());
    }
}
