//! BLAKE3 Key Derivation Function (KDF) using [Jack O'Connor](https://github.com/oconnor663)'s
//! [blake3](https://crates.io/crates/blake3) crate.

use crate::crypto::{Key, KEY_SIZE};
use std::borrow::Cow;

// -------------------------------------------------------------------------------------------------
//
// Constants

/// # [Context](https://docs.rs/blake3/latest/blake3/fn.derive_key.html)
///
/// **Warning**: this context string must never change. It is permanently bound to every derived
/// master key and cannot be rotated without rebuilding the encrypted store from scratch.
const CONTEXT: &str = "cryptdex:master-secret:kdf";

// -------------------------------------------------------------------------------------------------
//
// Trait Implementations

impl<'k> From<&'k Key<'k>> for Cow<'k, [u8; KEY_SIZE]> {
    /// Converts a `Key` into a fixed-length `&[u8; KEY_SIZE]` array.
    ///
    /// If the initially provided key was a string, the string will be hashed into a digest value
    /// using [blake3](https://crates.io/crates/blake3) at this stage.
    fn from(key: &'k Key<'k>) -> Cow<'k, [u8; KEY_SIZE]> {
        match key {
            Key::String(string) => {
                let key = blake3::derive_key(CONTEXT, string.as_bytes());
                Cow::Owned(key)
            },
            Key::Bytes(bytes) => Cow::Borrowed(bytes),
        }
    }
}
