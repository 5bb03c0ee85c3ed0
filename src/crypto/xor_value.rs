//! One-time-pad style payload masking for EMM values: `payload ⊕ PRF(key, tag)`.
//!
//! Used to hide an RID (or RID pair) inside an EMM value while keeping the value fixed-width and
//! decryptable only by someone holding the corresponding trapdoor key — there is no authentication
//! tag here, only the masking XOR, since the EMM label itself is already unforgeable and the only
//! party able to construct a matching value is the one with the derivation key.

use crate::crypto::Prf;

/// Masks an 8-byte RID with `PRF(key, tag)`, truncated to the payload's width.
///
/// `tag` domain-separates distinct value slots derived from the same key — for example `"v"`,
/// `"l"`, `"r"` for a filter value versus the left/right halves of a join entry.
#[must_use]
pub fn xor_value(key: &[u8; 32], tag: &[u8], payload: &[u8; 8]) -> [u8; 8] {
    let mask = Prf::new(key).eval(tag);
    let mask = mask.as_bytes();

    let mut out = [0u8; 8];
    for index in 0..8 {
        out[index] = payload[index] ^ mask[index];
    }
    out
}
