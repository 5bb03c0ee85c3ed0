//! EMM builder for the CORR variant: the shared filter EMM plus the dependent-filter EMM and the
//! correlated-join EMM (§4.6).

use crate::crypto::{KEY_SIZE, Prf, xor_value};
use crate::model::Catalog;

use super::{LabeledEntry, RowsByTable, derive_t};

/// The three flat tables a CORR build writes, beyond the per-table encrypted rows: `t_filter`,
/// `t_dep_filter`, and `t_corr_join` (§6 "Persisted layout").
#[derive(Debug, Clone, Default)]
pub struct CorrTables {
    pub filter: Vec<LabeledEntry>,
    pub dep_filter: Vec<[u8; 32]>,
    pub corr_join: Vec<LabeledEntry>,
}

/// Builds all three CORR EMM tables for the whole catalog.
///
/// # Errors
///
/// Returns [`crate::Error::MissingColumn`] or [`crate::Error::TypeCast`] if a row does not match
/// its declared schema.
pub fn build(catalog: &Catalog, rows_by_table: &RowsByTable, master_key: &[u8; KEY_SIZE]) -> Result<CorrTables, crate::Error> {
    Ok(CorrTables {
        filter: super::build_filter_emm(catalog, rows_by_table, master_key)?,
        dep_filter: build_dep_filter_emm(catalog, rows_by_table, master_key)?,
        corr_join: build_corr_join_emm(catalog, rows_by_table, master_key)?,
    })
}

/// Builds the dependent-filter EMM (§4.6): one single-column token per (table, column, row),
/// derived from the single-key master trapdoor of that row's value rather than the two-key PiBAS
/// pair the filter EMM uses. The server probes this table by equality once the client sends
/// `PRF_{T_P}(rid)` for each RID it already holds a candidate for.
///
/// # Errors
///
/// Returns [`crate::Error::MissingColumn`] if a row is missing a declared column.
pub fn build_dep_filter_emm(
    catalog: &Catalog,
    rows_by_table: &RowsByTable,
    master_key: &[u8; KEY_SIZE],
) -> Result<Vec<[u8; 32]>, crate::Error> {
    let mut tokens = Vec::new();

    for table in catalog.tables() {
        let Some(rows) = rows_by_table.get(&table.name) else { continue };

        for column in table.non_key_columns() {
            for row in rows {
                let lexeme = row.row.get(&table.name, column)?.lexeme();
                let predicate = crate::predicates::filter_predicate(&table.name, column, &lexeme);
                let t_p = derive_t(master_key, &predicate);
                let token = *Prf::new(&t_p).eval(&row.rid.value().to_be_bytes()).as_bytes();
                tokens.push(token);
            }
        }
    }

    Ok(tokens)
}

/// Builds the correlated-join EMM (§4.6): for every declared foreign key, emits entries for
/// *both* orientations, each keyed by a counter that restarts at 0 for every left-side row — in
/// contrast to SPX's uncorrelated-join EMM, whose counter is global over the whole join result.
///
/// # Errors
///
/// Returns [`crate::Error::MissingColumn`] if a row is missing its key column, or
/// [`crate::Error::TypeCast`] if a key column is not an integer.
pub fn build_corr_join_emm(
    catalog: &Catalog,
    rows_by_table: &RowsByTable,
    master_key: &[u8; KEY_SIZE],
) -> Result<Vec<LabeledEntry>, crate::Error> {
    let mut entries = Vec::new();

    for table in catalog.tables() {
        for fk in &table.foreign_keys {
            let this = (table.name.as_str(), fk.column.as_str());
            let other = (fk.references_table.as_str(), fk.references_column.as_str());

            entries.extend(build_one_orientation(rows_by_table, master_key, this, other)?);
            entries.extend(build_one_orientation(rows_by_table, master_key, other, this)?);
        }
    }

    Ok(entries)
}

fn build_one_orientation(
    rows_by_table: &RowsByTable,
    master_key: &[u8; KEY_SIZE],
    left: (&str, &str),
    right: (&str, &str),
) -> Result<Vec<LabeledEntry>, crate::Error> {
    let (left_table, left_attr) = left;
    let (right_table, right_attr) = right;

    let Some(left_rows) = rows_by_table.get(left_table) else { return Ok(Vec::new()) };
    let Some(right_rows) = rows_by_table.get(right_table) else { return Ok(Vec::new()) };

    let predicate = crate::predicates::corr_join_predicate(left_table, left_attr, right_table, right_attr);
    let t_p = derive_t(master_key, &predicate);

    let mut entries = Vec::new();
    for left_row in left_rows {
        let left_value = left_row.row.get(left_table, left_attr)?.as_i64(left_table, left_attr)?;

        let rid_bytes = left_row.rid.value().to_be_bytes();
        let s1 = *Prf::new(&t_p).eval_parts(&[&rid_bytes, &[1u8]]).as_bytes();
        let s2 = *Prf::new(&t_p).eval_parts(&[&rid_bytes, &[2u8]]).as_bytes();

        let mut counter = 0u64;
        for right_row in right_rows {
            let right_value = right_row.row.get(right_table, right_attr)?.as_i64(right_table, right_attr)?;
            if left_value != right_value {
                continue;
            }

            let label = *Prf::new(&s1).eval(&counter.to_be_bytes()).as_bytes();
            let value = xor_value(&s2, b"v", &right_row.rid.value().to_be_bytes());
            entries.push(LabeledEntry { label, value });
            counter += 1;
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForeignKey, PrimaryKey, Row, TableSchema, Value};

    fn data2_data3() -> (Catalog, RowsByTable) {
        let data2 = TableSchema {
            name: "data2".into(),
            columns: vec!["a".into(), "b".into()],
            primary_key: PrimaryKey::Atomic("a".into()),
            foreign_keys: vec![ForeignKey { column: "b".into(), references_table: "data3".into(), references_column: "c".into() }],
        };
        let data3 = TableSchema {
            name: "data3".into(),
            columns: vec!["c".into(), "d".into()],
            primary_key: PrimaryKey::Atomic("c".into()),
            foreign_keys: vec![],
        };
        let catalog = Catalog::new(vec![data2, data3]).unwrap();

        let mut rows_by_table = RowsByTable::new();
        rows_by_table.insert(
            "data2".into(),
            crate::rows::assign_rids(vec![
                Row(vec![("a".into(), Value::Int(1)), ("b".into(), Value::Int(1))]),
                Row(vec![("a".into(), Value::Int(1)), ("b".into(), Value::Int(2))]),
                Row(vec![("a".into(), Value::Int(2)), ("b".into(), Value::Int(3))]),
                Row(vec![("a".into(), Value::Int(3)), ("b".into(), Value::Int(4))]),
            ]),
        );
        rows_by_table.insert(
            "data3".into(),
            crate::rows::assign_rids(vec![
                Row(vec![("c".into(), Value::Int(1)), ("d".into(), Value::Int(1))]),
                Row(vec![("c".into(), Value::Int(1)), ("d".into(), Value::Int(2))]),
                Row(vec![("c".into(), Value::Int(2)), ("d".into(), Value::Int(3))]),
            ]),
        );
        (catalog, rows_by_table)
    }

    #[test]
    fn counters_restart_at_zero_for_every_left_row() {
        let (catalog, rows_by_table) = data2_data3();
        let master_key = [4u8; KEY_SIZE];

        let entries = build_corr_join_emm(&catalog, &rows_by_table, &master_key).unwrap();
        assert!(!entries.is_empty());

        // b=1 (rid 0) has two matching data3 rows (c=1, c=1); rechecking with the forward
        // orientation's S_1 at counters {0,1} must both resolve.
        let predicate = crate::predicates::corr_join_predicate("data2", "b", "data3", "c");
        let t_p = derive_t(&master_key, &predicate);
        let rid_bytes = 0u64.to_be_bytes();
        let s1 = *Prf::new(&t_p).eval_parts(&[&rid_bytes, &[1u8]]).as_bytes();
        let s2 = *Prf::new(&t_p).eval_parts(&[&rid_bytes, &[2u8]]).as_bytes();

        for counter in 0..2u64 {
            let label = *Prf::new(&s1).eval(&counter.to_be_bytes()).as_bytes();
            let entry = entries.iter().find(|e| e.label == label).expect("dense per-row counter present");
            let recovered_rid = u64::from_be_bytes(xor_value(&s2, b"v", &entry.value));
            assert!(recovered_rid == 0 || recovered_rid == 1); // data3 rids 0 and 1 both have c=1
        }
    }

    #[test]
    fn dependent_filter_emits_one_token_per_non_key_cell() {
        let (catalog, rows_by_table) = data2_data3();
        let master_key = [5u8; KEY_SIZE];

        let tokens = build_dep_filter_emm(&catalog, &rows_by_table, &master_key).unwrap();
        // data2 has 1 non-key column x 4 rows, data3 has 1 non-key column x 3 rows.
        assert_eq!(tokens.len(), 7);
    }
}
