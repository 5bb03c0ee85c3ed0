//! EMM builder for the PKFK variant (§4.7): no separate EMM tables — each per-table encrypted row
//! embeds its own join and filter tokens directly.

use std::collections::HashMap;

use crate::crypto::{KEY_SIZE, Prf, xor_value};
use crate::identifiers::{pk_long, validate_unique_primary_keys};
use crate::model::{Catalog, TableSchema};
use crate::rows::RowWithRid;

use super::{RowsByTable, derive_t, derive_t1_t2};

/// One row of a PKFK encrypted table: its `enc_rid` key plus every embedded column, in the order
/// they're written (`pfk_*`, `fpk_*`, then `val_*` / `dep_val_*` / `enc_*` per non-key column).
#[derive(Debug, Clone)]
pub struct PkfkRow {
    pub enc_rid: crate::crypto::EncRid,
    pub columns: Vec<(String, Vec<u8>)>,
}

/// One PKFK table: its opaque, PRF-derived name (`PRF_master(T)`, §4.7 step 5) plus its rows.
#[derive(Debug, Clone)]
pub struct PkfkTable {
    pub name: String,
    pub rows: Vec<PkfkRow>,
}

/// Builds the per-table PKFK tables for the whole catalog.
///
/// # Errors
///
/// Returns [`crate::Error::MissingColumn`] or [`crate::Error::TypeCast`] if a row does not match
/// its declared schema, or [`crate::Error::DuplicatePrimaryKeyValue`] if a table has two rows
/// sharing a primary key value — PKFK keys its stored rows by `pk_long`, so a collision there
/// would silently drop one of the rows.
pub fn build(catalog: &Catalog, rows_by_table: &RowsByTable, master_key: &[u8; KEY_SIZE]) -> Result<Vec<PkfkTable>, crate::Error> {
    let cell_key = crate::row_encryptor::derive_cell_key(master_key);
    let rid_key = crate::crypto::derive_rid_key(master_key);

    let mut tables = Vec::with_capacity(catalog.tables().count());
    for table in catalog.tables() {
        let Some(rows) = rows_by_table.get(&table.name) else { continue };
        validate_unique_primary_keys(&table.name, &table.primary_key, rows)?;
        tables.push(build_table(catalog, table, rows, master_key, &cell_key, &rid_key)?);
    }

    Ok(tables)
}

/// Ranks each row's value of `column` by `assign_dense_counters`, after first sorting by that
/// value ascending — `pibas_counter(c) = rank within partition of c, zero-based, ordered by c
/// ascending` (§4.7). Returns a map from the row's RID to its assigned counter.
fn counters_over_column(rows: &[RowWithRid], table: &str, column: &str) -> Result<HashMap<u64, u64>, crate::Error> {
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let value = row.row.get(table, column)?.as_i64(table, column)?;
        items.push((value, row.rid.value()));
    }
    items.sort_by_key(|(value, _)| *value);

    let counted = crate::counters::assign_dense_counters(items, |(value, _)| *value);
    Ok(counted.into_iter().map(|((_, rid), counter)| (rid, counter)).collect())
}

/// Ranks each row's value of `column` by `assign_dense_counters`, partitioned by the same value
/// lexeme the filter EMM partitions on (§4.5 step 2) rather than by ascending numeric order — this
/// is `val_col`'s counter, which only needs to be dense per distinct value, not globally ordered,
/// and must therefore work for `Text`/`Bytes` columns exactly as it does for `Int` ones. Returns a
/// map from the row's RID to its assigned counter.
fn counters_over_lexeme(rows: &[RowWithRid], table: &str, column: &str) -> Result<HashMap<u64, u64>, crate::Error> {
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let lexeme = row.row.get(table, column)?.lexeme();
        items.push((lexeme, row.rid.value()));
    }

    let counted = crate::counters::assign_dense_counters(items, |(lexeme, _)| lexeme.clone());
    Ok(counted.into_iter().map(|((_, rid), counter)| (rid, counter)).collect())
}

fn build_table(
    catalog: &Catalog,
    table: &TableSchema,
    rows: &[RowWithRid],
    master_key: &[u8; KEY_SIZE],
    cell_key: &[u8; KEY_SIZE],
    rid_key: &[u8; 16],
) -> Result<PkfkTable, crate::Error> {
    // Per-fk, per-pk-column dense counters, computed once for the whole table rather than per row.
    let mut counters_by_fk_column: HashMap<&str, HashMap<u64, u64>> = HashMap::new();
    for fk in &table.foreign_keys {
        counters_by_fk_column.insert(fk.column.as_str(), counters_over_column(rows, &table.name, &fk.column)?);
    }

    let mut counters_by_non_key_column: HashMap<&str, HashMap<u64, u64>> = HashMap::new();
    let non_key_columns = table.non_key_columns();
    for &column in &non_key_columns {
        counters_by_non_key_column.insert(column, counters_over_lexeme(rows, &table.name, column)?);
    }

    let mut pkfk_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let this_rid = pk_long(&table.name, &table.primary_key, &row.row)?;
        let enc_rid = crate::crypto::encrypt_rid(rid_key, this_rid.value());
        let mut columns = Vec::new();

        for fk in &table.foreign_keys {
            let other_table = catalog
                .table(&fk.references_table)
                .ok_or_else(|| crate::Error::DanglingForeignKey {
                    foreign_table: table.name.clone(),
                    foreign_attr: fk.column.clone(),
                    primary_table: fk.references_table.clone(),
                })?
                .name
                .as_str();

            let a_value = row.row.get(&table.name, &fk.column)?.as_i64(&table.name, &fk.column)?;
            let a = u64::try_from(a_value).map_err(|_| crate::Error::TypeCast { table: table.name.clone(), column: fk.column.clone() })?;

            // Forward: pfk_<other>_<this> — lets the primary side recover the dense sequence of
            // foreign rows matching a given primary key value.
            let forward_predicate = crate::predicates::pkfk_join_predicate(other_table, &table.name);
            let t_forward = derive_t(master_key, &forward_predicate);
            let s_forward = *Prf::new(&t_forward).eval(&a.to_be_bytes()).as_bytes();
            let counter_over_a = *counters_by_fk_column[fk.column.as_str()]
                .get(&row.rid.value())
                .expect("every row counted exactly once");
            let pfk_label = *Prf::new(&s_forward).eval(&counter_over_a.to_be_bytes()).as_bytes();
            columns.push((format!("pfk_{other_table}_{}", table.name), pfk_label.to_vec()));

            // Reverse: fpk_<this>_<other> — lets a foreign row recover which primary key it points
            // to, masked under a trapdoor keyed by this row's own identifier.
            let reverse_predicate = crate::predicates::pkfk_join_predicate(&table.name, other_table);
            let t_reverse = derive_t(master_key, &reverse_predicate);
            let s_reverse = *Prf::new(&t_reverse).eval(&this_rid.value().to_be_bytes()).as_bytes();
            let fpk_value = xor_value(&s_reverse, b"v", &a.to_be_bytes());
            columns.push((format!("fpk_{}_{other_table}", table.name), fpk_value.to_vec()));
        }

        for &column in &non_key_columns {
            let value = row.row.get(&table.name, column)?;
            let lexeme = value.lexeme();
            let filter_predicate = crate::predicates::filter_predicate(&table.name, column, &lexeme);

            let (t_f1, _) = derive_t1_t2(master_key, &filter_predicate);
            let counter_over_c = *counters_by_non_key_column[column]
                .get(&row.rid.value())
                .expect("every row counted exactly once");
            let val_col = *Prf::new(&t_f1).eval(&counter_over_c.to_be_bytes()).as_bytes();
            columns.push((format!("val_{column}"), val_col.to_vec()));

            let t_f = derive_t(master_key, &filter_predicate);
            let dep_val_col = *Prf::new(&t_f).eval(&this_rid.value().to_be_bytes()).as_bytes();
            columns.push((format!("dep_val_{column}"), dep_val_col.to_vec()));

            let context = crate::row_encryptor::cell_context(enc_rid.as_bytes(), column);
            let enc_col = crate::crypto::encrypt_cell(cell_key, &value.to_plaintext_bytes(), &context)?;
            columns.push((format!("enc_{column}"), enc_col));
        }

        pkfk_rows.push(PkfkRow { enc_rid, columns });
    }

    Ok(PkfkTable { name: crate::row_encryptor::opaque_column_name(master_key, &table.name), rows: pkfk_rows })
}
