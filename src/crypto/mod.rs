//! Cryptographic primitives for the encrypted index builder: the HMAC-SHA256 trapdoor PRF,
//! authenticated cell encryption, the deterministic RID block cipher, and one-time-pad style
//! payload encryption for EMM values.

mod key;
pub use crate::crypto::key::Key;

mod kdf;
pub use crate::crypto::kdf::Kdf;

mod master_secret;
pub use crate::crypto::master_secret::MasterSecret;

mod prf;
pub use crate::crypto::prf::{Prf, Trapdoor};

mod cell;
pub use crate::crypto::cell::{Method, decrypt_cell, encrypt_cell};

mod rid_cipher;
pub use crate::crypto::rid_cipher::{EncRid, decrypt_rid, derive_key as derive_rid_key, encrypt_rid};

mod xor_value;
pub use crate::crypto::xor_value::xor_value;

#[cfg(feature = "encrypt-aes-gcm")]
mod aes_gcm;

#[cfg(feature = "encrypt-chacha20")]
mod chacha20;

// -------------------------------------------------------------------------------------------------
//
// Constants

/// Every derived trapdoor, PRF output, and master/cell key in this crate is 32 bytes — the output
/// width of HMAC-SHA256 and the key width of both supported AEAD backends.
pub const KEY_SIZE: usize = 32;

/// `enc_rid` ciphertexts are one AES-128 block: 16 bytes, fixed-width regardless of which cell
/// AEAD backend is selected.
pub const RID_BLOCK_SIZE: usize = 16;

const _ENCRYPTOR_FEATURE_COUNT: usize =
    cfg!(feature = "encrypt-aes-gcm") as usize + cfg!(feature = "encrypt-chacha20") as usize;

const _: () = {
    assert!(
        _ENCRYPTOR_FEATURE_COUNT == 1,
        "Exactly one cell-encryption feature must be enabled: `encrypt-aes-gcm` or `encrypt-chacha20`",
    );
};
