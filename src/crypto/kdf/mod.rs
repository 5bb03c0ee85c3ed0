//! A cryptographic Key Derivation Function (KDF) is a process that generates secure secret keys
//! from a source of initial keying material, such as a password or a master secret string.
//!
//! This KDF is only used to turn a string-form [`crate::crypto::Key`] into a fixed-length
//! `[u8; KEY_SIZE]` array once, at load time. All subsequent trapdoor and token derivation goes
//! through [`crate::crypto::Prf`], which is independent of which KDF feature is selected here.

use crate::crypto::{Key, KEY_SIZE};
use std::borrow::Cow;

// -------------------------------------------------------------------------------------------------
//
// KDF Feature Guard

const _KDF_FEATURE_COUNT: usize = cfg!(feature = "kdf-blake3") as usize + cfg!(feature = "kdf-sha256") as usize;

const _: () = {
    assert!(
        _KDF_FEATURE_COUNT == 1,
        "Exactly one KDF feature must be enabled: `kdf-blake3` or `kdf-sha256`",
    );
};

#[cfg(feature = "kdf-blake3")]
mod blake3;

#[cfg(feature = "kdf-sha256")]
mod sha256;

// -------------------------------------------------------------------------------------------------
//
/// Marker type selecting the active KDF backend.
pub struct Kdf;

impl Kdf {
    /// Converts a [`Key`] into a fixed-length `[u8; KEY_SIZE]` array, hashing it with the active
    /// KDF backend if it was provided in string form.
    #[must_use]
    pub fn into_array(key: &Key<'_>) -> [u8; KEY_SIZE] {
        let cow: Cow<'_, [u8; KEY_SIZE]> = key.into();
        *cow.as_ref()
    }
}
