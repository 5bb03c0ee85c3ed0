//! Per-table projection from a plaintext row with RID attached to `{enc_rid, enc_col_1, …}` —
//! every column AEAD-encrypted, column names themselves renamed to opaque PRF outputs.
//!
//! This is embarrassingly parallel per row; nothing here depends on row order or on any other
//! row's ciphertext.

use crate::crypto::{Prf, encrypt_cell, EncRid, KEY_SIZE};
use crate::model::TableSchema;
use crate::rows::RowWithRid;

/// Domain-separation label for deriving the scheme-wide cell-encryption key from the master key.
const CELL_KEY_CONTEXT: &[u8] = b"cryptdex:cell-key";

/// Derives the 32-byte AEAD key shared by every `enc_col` in the scheme.
#[must_use]
pub fn derive_cell_key(master_key: &[u8; KEY_SIZE]) -> [u8; KEY_SIZE] {
    (*Prf::new(master_key).eval(CELL_KEY_CONTEXT).as_bytes())
}

/// The opaque, PRF-derived name for a plaintext column, rendered as lowercase hex so it can be
/// used as a store column/table identifier.
#[must_use]
pub fn opaque_column_name(master_key: &[u8; KEY_SIZE], column: &str) -> String {
    let trapdoor = Prf::new(master_key).eval(column.as_bytes());
    trapdoor.as_bytes().iter().map(|b| format!("{b:02x}")).collect()
}

/// One encrypted row: the RID ciphertext plus one AEAD ciphertext per plaintext column, keyed by
/// that column's opaque name.
#[derive(Debug, Clone)]
pub struct EncryptedRow {
    pub enc_rid: EncRid,
    pub cells: Vec<(String, Vec<u8>)>,
}

/// Projects one plaintext row into its encrypted form.
///
/// # Errors
///
/// Returns [`crate::Error::Encrypt`] if a cell fails to encrypt.
pub fn encrypt_row(
    master_key: &[u8; KEY_SIZE],
    cell_key: &[u8; KEY_SIZE],
    rid_key: &[u8; 16],
    table: &TableSchema,
    row: &RowWithRid,
) -> Result<EncryptedRow, crate::Error> {
    let enc_rid = crate::crypto::encrypt_rid(rid_key, row.rid.value());

    let mut cells = Vec::with_capacity(table.columns.len());
    for column in &table.columns {
        let value = row.row.get(&table.name, column)?;
        let opaque_name = opaque_column_name(master_key, column);
        let context = cell_context(enc_rid.as_bytes(), &opaque_name);
        let ciphertext = encrypt_cell(cell_key, &value.to_plaintext_bytes(), &context)?;
        cells.push((opaque_name, ciphertext));
    }

    Ok(EncryptedRow { enc_rid, cells })
}

/// Builds the per-cell nonce-derivation context consulted only under `deterministic-cells`:
/// `enc_rid || column name`, unique per cell since `enc_rid` is unique per row.
#[must_use]
pub fn cell_context(enc_rid: &[u8], opaque_column_name: &str) -> Vec<u8> {
    let mut context = Vec::with_capacity(enc_rid.len() + opaque_column_name.len());
    context.extend_from_slice(enc_rid);
    context.extend_from_slice(opaque_column_name.as_bytes());
    context
}
