//! The deterministic RID cipher: a single-block AES-128 permutation that maps a 64-bit row
//! identifier to a fixed 16-byte ciphertext.
//!
//! This is independent of whichever AEAD backend is compiled in for cell encryption — the RID
//! must remain a stable, comparable key in the encrypted table even when a build never touches
//! row payloads, so it gets its own always-on block cipher rather than reusing the selected AEAD.

use aes::Aes128;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit, generic_array::GenericArray};
use crate::crypto::{Prf, RID_BLOCK_SIZE, KEY_SIZE};

/// The 16-byte ciphertext of an RID, suitable for use as a stable key in the encrypted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EncRid([u8; RID_BLOCK_SIZE]);

impl EncRid {
    /// Returns the ciphertext as a byte array.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; RID_BLOCK_SIZE] {
        &self.0
    }
}

impl From<[u8; RID_BLOCK_SIZE]> for EncRid {
    fn from(bytes: [u8; RID_BLOCK_SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for EncRid {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Domain-separation label for deriving the 16-byte RID cipher key from the 32-byte master key.
const RID_KEY_CONTEXT: &[u8] = b"cryptdex:rid-cipher-key";

/// Derives the 16-byte AES-128 key for the RID cipher from the master key.
///
/// Kept separate from the cell-encryption key so that rotating the AEAD backend never changes
/// which `enc_rid` ciphertexts a store contains.
#[must_use]
pub fn derive_key(master_key: &[u8; KEY_SIZE]) -> [u8; 16] {
    let trapdoor = Prf::new(master_key).eval(RID_KEY_CONTEXT);
    trapdoor.truncate(16).try_into().expect("truncate(16) always yields 16 bytes")
}

/// Encrypts a 64-bit RID into its fixed 16-byte ciphertext form.
///
/// The RID occupies the low 8 bytes of the AES block; the high 8 bytes are zero. Because AES-128
/// is a permutation on 16-byte blocks, this is a deterministic bijection on RIDs: the same
/// `(key, rid)` always yields the same ciphertext, and no two distinct RIDs collide.
#[must_use]
pub fn encrypt_rid(rid_key: &[u8; 16], rid: u64) -> EncRid {
    let mut block = [0u8; RID_BLOCK_SIZE];
    block[8..].copy_from_slice(&rid.to_be_bytes());

    let cipher = Aes128::new(GenericArray::from_slice(rid_key));
    let mut generic_block = GenericArray::from(block);
    cipher.encrypt_block(&mut generic_block);

    EncRid(generic_block.into())
}

/// Reverses [`encrypt_rid`], recovering the original 64-bit RID.
///
/// # Errors
///
/// Returns [`crate::Error::Decrypt`] if `enc_rid` was not produced by this key (the high 8 bytes
/// of the decrypted block are nonzero).
pub fn decrypt_rid(rid_key: &[u8; 16], enc_rid: &EncRid) -> Result<u64, crate::Error> {
    let cipher = Aes128::new(GenericArray::from_slice(rid_key));
    let mut generic_block = GenericArray::from(enc_rid.0);
    cipher.decrypt_block(&mut generic_block);

    let block: [u8; RID_BLOCK_SIZE] = generic_block.into();
    if block[..8] != [0u8; 8] {
        return Err(crate::Error::Decrypt);
    }

    Ok(u64::from_be_bytes(block[8..].try_into().expect("8 bytes")))
}
