//! Minimal length-prefixed framing for the handful of heterogeneous byte records this crate
//! persists to the embedded store: PKFK's per-table row (a variable number of named columns) and
//! the uncorrelated-join EMM's two-RID value.
//!
//! Every cell in this scheme is already a fixed-width ciphertext or PRF output — the only thing
//! missing to make them storable in a single `redb` value is a frame around a variable number of
//! them, in the same spirit as [`crate::crypto::Prf::eval_parts`]'s length-prefixed domain
//! separation.

/// Frames `parts` as `u32 length (BE) || bytes`, repeated, so [`decode_parts`] never needs a
/// schema beyond "how many parts".
#[must_use]
pub fn encode_parts(parts: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(parts.iter().map(|p| 4 + p.len()).sum());
    for part in parts {
        out.extend_from_slice(&u32::try_from(part.len()).expect("cell length fits u32").to_be_bytes());
        out.extend_from_slice(part);
    }
    out
}

/// Reverses [`encode_parts`], splitting `bytes` back into exactly `count` parts.
///
/// # Errors
///
/// Returns [`crate::Error::CiphertextTooShort`] if `bytes` does not contain exactly `count`
/// well-formed length-prefixed parts.
pub fn decode_parts(bytes: &[u8], count: usize) -> Result<Vec<Vec<u8>>, crate::Error> {
    let mut parts = Vec::with_capacity(count);
    let mut cursor = 0usize;

    for _ in 0..count {
        let header = bytes.get(cursor..cursor + 4).ok_or(crate::Error::CiphertextTooShort)?;
        let len = u32::from_be_bytes(header.try_into().expect("slice of 4")) as usize;
        cursor += 4;

        let part = bytes.get(cursor..cursor + len).ok_or(crate::Error::CiphertextTooShort)?;
        parts.push(part.to_vec());
        cursor += len;
    }

    if cursor != bytes.len() {
        return Err(crate::Error::CiphertextTooShort);
    }

    Ok(parts)
}

/// Frames a PKFK row: a table name followed by its ordered `(column name, value)` pairs.
#[must_use]
pub fn encode_named(columns: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut parts: Vec<&[u8]> = Vec::with_capacity(columns.len() * 2);
    for (name, value) in columns {
        parts.push(name.as_bytes());
        parts.push(value.as_slice());
    }
    encode_parts(&parts)
}

/// Reverses [`encode_named`].
///
/// # Errors
///
/// Returns [`crate::Error::CiphertextTooShort`] if `bytes` is malformed, or if decoded column
/// names are not valid UTF-8.
pub fn decode_named(bytes: &[u8], column_count: usize) -> Result<Vec<(String, Vec<u8>)>, crate::Error> {
    let flat = decode_parts(bytes, column_count * 2)?;
    flat.chunks_exact(2)
        .map(|pair| {
            let name = String::from_utf8(pair[0].clone()).map_err(|_| crate::Error::CiphertextTooShort)?;
            Ok((name, pair[1].clone()))
        })
        .collect()
}
