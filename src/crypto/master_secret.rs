//! The global master secret: loaded once at startup, held in memory for the lifetime of a build,
//! and zeroized on drop.

use crate::crypto::{Kdf, Key, KEY_SIZE};
use zeroize::{Zeroize, ZeroizeOnDrop};

// -------------------------------------------------------------------------------------------------
//
/// The master secret from which every trapdoor key, cell key, and RID cipher key in the scheme is
/// derived via [`crate::crypto::Prf`].
///
/// There is exactly one master secret per encrypted store. It is read once (from a file, an
/// environment variable, or directly as bytes), hashed into a fixed `[u8; KEY_SIZE]` array if it
/// was provided as a string, and held for the life of the build process.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterSecret([u8; KEY_SIZE]);

impl MasterSecret {
    /// Derives a `MasterSecret` from a [`Key`], hashing it through the active KDF if it was
    /// provided in string form.
    #[must_use]
    pub fn new(key: &Key<'_>) -> Self {
        Self(Kdf::into_array(key))
    }

    /// Returns the underlying key bytes.
    ///
    /// The caller is responsible for not persisting or logging this value.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for MasterSecret {
    /// Deliberately omits the key material.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterSecret").field("0", &"<redacted>").finish()
    }
}
