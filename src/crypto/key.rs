//! The master secret is a string of characters or bytes used to derive every trapdoor and token
//! in the scheme. It is never written to the encrypted store.

use crate::crypto::KEY_SIZE;
use std::borrow::Cow;

// -------------------------------------------------------------------------------------------------
//
/// A master secret provided in either string or fixed-byte form.
///
/// # Notes
///
/// * When a key is provided in string form, it will be lazily hashed into a key via the active KDF
///   when it is first used. This does use resources, so it's preferred to provide a key as
///   `[u8; KEY_SIZE]` whenever possible.
///
/// * When a key is provided in bytes form, it is sent directly to the PRF/AEAD backends with no
///   additional processing. Ensure your key is properly hashed and the correct size.
pub enum Key<'k> {
    /// A key that was provided in string format.
    String(Cow<'k, str>),

    /// A key that was provided as a fixed-length array of bytes.
    Bytes(Cow<'k, [u8; KEY_SIZE]>),
}

// -------------------------------------------------------------------------------------------------
//
// Method Implementations

impl<'k> Key<'k> {
    /// Converts a borrowed immutable `&str` string slice into a `Key` type.
    #[inline]
    pub fn from_str(borrowed_str: &'k str) -> Self {
        borrowed_str.into()
    }

    /// Converts a borrowed immutable `&[u8; KEY_SIZE]` array of bytes into a `Key` type.
    #[inline]
    pub fn from_array(fixed_array: &'k [u8; KEY_SIZE]) -> Self {
        fixed_array.into()
    }

    /// Converts a borrowed immutable `&[u8]` slice of bytes into a `Key` type.
    ///
    /// # Errors
    ///
    /// This conversion can fail if the provided slice is not `KEY_SIZE` bytes long.
    pub fn try_from_slice(slice: &'k [u8]) -> Result<Self, crate::Error> {
        slice.try_into()
    }
}

// -------------------------------------------------------------------------------------------------
//
// Trait Implementations

impl<'k> From<&'k str> for Key<'k> {
    #[inline]
    fn from(borrowed_str: &'k str) -> Self {
        Key::String(Cow::Borrowed(borrowed_str))
    }
}

impl<'k> From<&'k String> for Key<'k> {
    #[inline]
    fn from(borrowed_string: &'k String) -> Self {
        Key::String(Cow::Borrowed(borrowed_string))
    }
}

impl From<String> for Key<'_> {
    #[inline]
    fn from(string: String) -> Self {
        Key::String(Cow::Owned(string))
    }
}

impl<'k> From<&'k [u8; KEY_SIZE]> for Key<'k> {
    #[inline]
    fn from(borrowed_fixed_array: &'k [u8; KEY_SIZE]) -> Self {
        Key::Bytes(Cow::Borrowed(borrowed_fixed_array))
    }
}

impl From<[u8; KEY_SIZE]> for Key<'_> {
    #[inline]
    fn from(owned_fixed_array: [u8; KEY_SIZE]) -> Self {
        Key::Bytes(Cow::Owned(owned_fixed_array))
    }
}

impl<'k> TryFrom<&'k [u8]> for Key<'k> {
    type Error = crate::Error;

    /// # Errors
    ///
    /// This conversion can fail if the provided slice is not `KEY_SIZE` bytes long.
    fn try_from(borrowed_slice_of_bytes: &'k [u8]) -> Result<Self, Self::Error> {
        let fixed_array: [u8; KEY_SIZE] =
            borrowed_slice_of_bytes
                .try_into()
                .map_err(|_| crate::Error::InvalidKeyLength {
                    expected: KEY_SIZE,
                    found: borrowed_slice_of_bytes.len(),
                })?;

        Ok(Key::Bytes(Cow::Owned(fixed_array)))
    }
}

impl TryFrom<Vec<u8>> for Key<'_> {
    type Error = crate::Error;

    /// # Errors
    ///
    /// This conversion can fail if the provided `Vec` is not `KEY_SIZE` bytes long.
    fn try_from(owned_vec_of_bytes: Vec<u8>) -> Result<Self, Self::Error> {
        let fixed_array: [u8; KEY_SIZE] =
            owned_vec_of_bytes
                .as_slice()
                .try_into()
                .map_err(|_| crate::Error::InvalidKeyLength {
                    expected: KEY_SIZE,
                    found: owned_vec_of_bytes.len(),
                })?;

        Ok(Key::Bytes(Cow::Owned(fixed_array)))
    }
}
