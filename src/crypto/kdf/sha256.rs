//! SHA-256 Key Derivation Function (KDF) using [Brian Smith](https://github.com/briansmith)'s
//! [ring](https://crates.io/crates/ring) crate.

use crate::crypto::{Key, KEY_SIZE};
use std::borrow::Cow;

/// The digest algorithm used when hashing a string-form key into a fixed-length array.
const RING_SHA256_DIGEST: &ring::digest::Algorithm = &ring::digest::SHA256;

// -------------------------------------------------------------------------------------------------
//
// Trait Implementations

impl<'k> From<&'k Key<'k>> for Cow<'k, [u8; KEY_SIZE]> {
    /// Converts a `Key` into a fixed-length `&[u8; KEY_SIZE]` array.
    ///
    /// If the initially provided key was a string, the string will be hashed into a digest value
    /// using [ring](https://crates.io/crates/ring) at this stage.
    fn from(key: &'k Key<'k>) -> Cow<'k, [u8; KEY_SIZE]> {
        match key {
            Key::String(string) => {
                let digest = ring::digest::digest(RING_SHA256_DIGEST, string.as_bytes());
                let array: [u8; KEY_SIZE] = digest.as_ref().try_into()
                    .expect("SHA-256 digest is always 32 bytes");
                Cow::Owned(array)
            },
            Key::Bytes(bytes) => Cow::Borrowed(bytes),
        }
    }
}
