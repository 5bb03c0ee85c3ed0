//! The record-identifier (RID) model: a 64-bit monotone id attached to every plaintext row, and
//! the Cantor pairing function that reduces a 2-column compound primary key to a single atomic
//! long.

mod rid;
pub use crate::identifiers::rid::{Rid, RidAssigner};

mod compound;
pub use crate::identifiers::compound::cantor_pair;

use std::collections::HashSet;

use crate::model::{PrimaryKey, Row};
use crate::rows::RowWithRid;

/// `pk_long(pk, row) -> i64` of §4.2: reduces a table's declared primary key to a single `Rid`.
///
/// An atomic key casts its one column to `i64` and reinterprets it as the RID directly; a
/// compound key Cantor-pairs its two components. This is the identifier PKFK uses in place of a
/// monotonically assigned RID (§4.7 step 1): "the 'rid' is the PK itself, hashed at the end."
///
/// # Errors
///
/// Returns [`crate::Error::TypeCast`] if a key column is not an integer, is negative, or (for a
/// compound key) the paired value overflows `u64`.
pub fn pk_long(table: &str, pk: &PrimaryKey, row: &Row) -> Result<Rid, crate::Error> {
    match pk {
        PrimaryKey::Atomic(column) => {
            let value = row.get(table, column)?.as_i64(table, column)?;
            let value = u64::try_from(value)
                .map_err(|_| crate::Error::TypeCast { table: table.to_string(), column: column.clone() })?;
            Ok(Rid::new(value))
        },
        PrimaryKey::Compound([a, b]) => {
            let va = row.get(table, a)?.as_i64(table, a)?;
            let vb = row.get(table, b)?.as_i64(table, b)?;
            Ok(Rid::new(cantor_pair(table, a, va, vb)?))
        },
    }
}

/// Validates that every row of `rows` maps to a distinct `pk_long` value.
///
/// PKFK stores each encrypted row under `encrypt_rid(pk_long(...))` (§4.7 step 1), so two rows
/// sharing a primary key value would silently overwrite one another in the backing store. SPX and
/// CORR assign RIDs independently via [`crate::identifiers::RidAssigner`] and never call this.
///
/// # Errors
///
/// Returns [`crate::Error::DuplicatePrimaryKeyValue`] on the first collision found.
pub fn validate_unique_primary_keys(table: &str, pk: &PrimaryKey, rows: &[RowWithRid]) -> Result<(), crate::Error> {
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        let value = pk_long(table, pk, &row.row)?.value();
        if !seen.insert(value) {
            return Err(crate::Error::DuplicatePrimaryKeyValue { table: table.to_string(), value });
        }
    }
    Ok(())
}
