//! EMM builder for the SPX variant: the shared filter EMM ([`super::build_filter_emm`]) plus the
//! uncorrelated-join EMM (§4.5 step 3).

use crate::crypto::{KEY_SIZE, Prf, xor_value};
use crate::model::Catalog;

use super::{JoinEntry, LabeledEntry, RowsByTable, derive_t1_t2};

/// The two flat tables an SPX build writes, beyond the per-table encrypted rows: `t_filter` and
/// `t_uncorr_join` (§6 "Persisted layout").
#[derive(Debug, Clone, Default)]
pub struct SpxTables {
    pub filter: Vec<LabeledEntry>,
    pub uncorr_join: Vec<JoinEntry>,
}

/// Builds both SPX EMM tables for the whole catalog.
///
/// # Errors
///
/// Returns [`crate::Error::MissingColumn`] or [`crate::Error::TypeCast`] if a row does not match
/// its declared schema.
pub fn build(catalog: &Catalog, rows_by_table: &RowsByTable, master_key: &[u8; KEY_SIZE]) -> Result<SpxTables, crate::Error> {
    Ok(SpxTables {
        filter: super::build_filter_emm(catalog, rows_by_table, master_key)?,
        uncorr_join: build_uncorr_join_emm(catalog, rows_by_table, master_key)?,
    })
}

/// Builds the uncorrelated-join EMM (§4.5 step 3): for each declared foreign key, equi-joins its
/// two sides and emits one entry per matching row pair, with a counter monotone over the *global*
/// join result — not restarted per left row, which is what distinguishes this from CORR's
/// correlated-join EMM.
///
/// # Errors
///
/// Returns [`crate::Error::MissingColumn`] if a row is missing its key column, or
/// [`crate::Error::TypeCast`] if a key column is not an integer.
pub fn build_uncorr_join_emm(
    catalog: &Catalog,
    rows_by_table: &RowsByTable,
    master_key: &[u8; KEY_SIZE],
) -> Result<Vec<JoinEntry>, crate::Error> {
    let mut entries = Vec::new();

    for table in catalog.tables() {
        for fk in &table.foreign_keys {
            let this_qualified = format!("{}.{}", table.name, fk.column);
            let other_qualified = format!("{}.{}", fk.references_table, fk.references_column);

            // Lexicographically smaller qualified name goes first (§4.5 step 3, §4.3), so that an
            // FK declared in either direction resolves to the same predicate and join orientation.
            let ((left_table, left_attr), (right_table, right_attr)) = if this_qualified <= other_qualified {
                ((table.name.as_str(), fk.column.as_str()), (fk.references_table.as_str(), fk.references_column.as_str()))
            } else {
                ((fk.references_table.as_str(), fk.references_column.as_str()), (table.name.as_str(), fk.column.as_str()))
            };

            let Some(left_rows) = rows_by_table.get(left_table) else { continue };
            let Some(right_rows) = rows_by_table.get(right_table) else { continue };

            let predicate = crate::predicates::uncorr_join_predicate(left_table, left_attr, right_table, right_attr);
            let (t1, t2) = derive_t1_t2(master_key, &predicate);

            let mut counter = 0u64;
            for left_row in left_rows {
                let left_value = left_row.row.get(left_table, left_attr)?.as_i64(left_table, left_attr)?;
                for right_row in right_rows {
                    let right_value = right_row.row.get(right_table, right_attr)?.as_i64(right_table, right_attr)?;
                    if left_value != right_value {
                        continue;
                    }

                    let label = *Prf::new(&t1).eval(&counter.to_be_bytes()).as_bytes();
                    let value_left = xor_value(&t2, b"l", &left_row.rid.value().to_be_bytes());
                    let value_right = xor_value(&t2, b"r", &right_row.rid.value().to_be_bytes());
                    entries.push(JoinEntry { label, value_left, value_right });
                    counter += 1;
                }
            }
        }
    }

    Ok(entries)
}
