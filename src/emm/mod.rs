//! Encrypted multi-map (EMM) construction: the three variant-specific builders (§4.5–§4.7) share
//! this module's trapdoor-derivation helpers and, for the filter EMM, its construction entirely —
//! §4.6 opens with "Same enc-rid tables and t_filter as SPX."

pub mod corr;
pub mod pkfk;
pub mod spx;

use std::collections::HashMap;

use crate::crypto::{KEY_SIZE, Prf, xor_value};
use crate::model::Catalog;
use crate::rows::RowWithRid;

/// The three EMM schemes a build may target, dispatched at the top of `build` (§9 "Polymorphism
/// over variants"). They share the row-encryptor and crypto primitives but lay out their EMMs
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Spx,
    Corr,
    Pkfk,
}

impl Variant {
    /// The lowercase name used on the CLI and in log fields.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Spx => "spx",
            Self::Corr => "corr",
            Self::Pkfk => "pkfk",
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spx" => Ok(Self::Spx),
            "corr" => Ok(Self::Corr),
            "pkfk" => Ok(Self::Pkfk),
            other => Err(crate::Error::MissingConfig {
                variable: Box::leak(format!("unknown variant `{other}` (expected spx, corr, or pkfk)").into_boxed_str()),
            }),
        }
    }
}

/// One `t_filter` / `t_corr_join` style entry: a label plus a single masked RID payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabeledEntry {
    pub label: [u8; 32],
    pub value: [u8; 8],
}

/// One `t_uncorr_join` entry: a label plus both masked RID halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinEntry {
    pub label: [u8; 32],
    pub value_left: [u8; 8],
    pub value_right: [u8; 8],
}

/// `rows_by_table["people"]` is every `RowWithRid` of table `people`, in RID order.
pub type RowsByTable = HashMap<String, Vec<RowWithRid>>;

/// Derives the two-key PiBAS trapdoor pair `T_1 = PRF_master(P, 1)`, `T_2 = PRF_master(P, 2)`.
fn derive_t1_t2(master_key: &[u8; KEY_SIZE], predicate: &str) -> ([u8; KEY_SIZE], [u8; KEY_SIZE]) {
    let prf = Prf::new(master_key);
    let t1 = *prf.eval_parts(&[predicate.as_bytes(), &[1u8]]).as_bytes();
    let t2 = *prf.eval_parts(&[predicate.as_bytes(), &[2u8]]).as_bytes();
    (t1, t2)
}

/// Derives the single-key trapdoor `T = PRF_master(P)` used by CORR/PKFK's dependent-filter and
/// PKFK's join tokens.
fn derive_t(master_key: &[u8; KEY_SIZE], predicate: &str) -> [u8; KEY_SIZE] {
    *Prf::new(master_key).eval(predicate.as_bytes()).as_bytes()
}

/// Builds the filter EMM (§4.5 step 2), shared verbatim by SPX and CORR.
///
/// For every non-key column of every table, partitions rows by value, assigns a dense per-value
/// counter via [`crate::counters::assign_dense_counters`] (input/RID order — any deterministic
/// order is valid per §5), and derives one `(label, value)` entry per row from that column's
/// filter predicate.
///
/// # Errors
///
/// Returns [`crate::Error::MissingColumn`] if a row is missing a declared column.
pub fn build_filter_emm(
    catalog: &Catalog,
    rows_by_table: &RowsByTable,
    master_key: &[u8; KEY_SIZE],
) -> Result<Vec<LabeledEntry>, crate::Error> {
    let mut entries = Vec::new();

    for table in catalog.tables() {
        let Some(rows) = rows_by_table.get(&table.name) else { continue };

        for column in table.non_key_columns() {
            let mut items = Vec::with_capacity(rows.len());
            for row in rows {
                let lexeme = row.row.get(&table.name, column)?.lexeme();
                items.push((lexeme, row.rid.value()));
            }

            let counted = crate::counters::assign_dense_counters(items, |(lexeme, _)| lexeme.clone());

            for ((lexeme, rid), counter) in counted {
                let predicate = crate::predicates::filter_predicate(&table.name, column, &lexeme);
                let (t1, t2) = derive_t1_t2(master_key, &predicate);

                let label = *Prf::new(&t1).eval(&counter.to_be_bytes()).as_bytes();
                let value = xor_value(&t2, b"v", &rid.to_be_bytes());
                entries.push(LabeledEntry { label, value });
            }
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForeignKey, PrimaryKey, Row, TableSchema, Value};

    fn catalog_with_data2_and_data3() -> (Catalog, RowsByTable) {
        let data2 = TableSchema {
            name: "data2".into(),
            columns: vec!["a".into(), "b".into()],
            primary_key: PrimaryKey::Atomic("a".into()),
            foreign_keys: vec![ForeignKey {
                column: "b".into(),
                references_table: "data3".into(),
                references_column: "c".into(),
            }],
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

    /// Scenario S1: filtering `data2.a = 2` recovers exactly `{rid(2,3)}`.
    #[test]
    fn s1_filter_recovers_the_single_matching_rid() {
        let (catalog, rows_by_table) = catalog_with_data2_and_data3();
        let master_key = [1u8; KEY_SIZE];

        let entries = build_filter_emm(&catalog, &rows_by_table, &master_key).unwrap();

        let predicate = crate::predicates::filter_predicate("data2", "a", "2");
        let (t1, t2) = derive_t1_t2(&master_key, &predicate);
        let expected_label = *Prf::new(&t1).eval(&0u64.to_be_bytes()).as_bytes();

        let matching: Vec<_> = entries.iter().filter(|e| e.label == expected_label).collect();
        assert_eq!(matching.len(), 1);

        let recovered_rid = xor_value(&t2, b"v", &matching[0].value);
        assert_eq!(u64::from_be_bytes(recovered_rid), 2); // rid of (a=2, b=3)
    }

    #[test]
    fn every_bucket_has_dense_zero_based_counters() {
        let (catalog, rows_by_table) = catalog_with_data2_and_data3();
        let master_key = [2u8; KEY_SIZE];

        // data2.a = 1 matches two rows (rid 0 and rid 1); counters must be {0, 1}.
        let predicate = crate::predicates::filter_predicate("data2", "a", "1");
        let (t1, t2) = derive_t1_t2(&master_key, &predicate);
        let entries = build_filter_emm(&catalog, &rows_by_table, &master_key).unwrap();

        let mut recovered_rids: Vec<u64> = (0..2u64)
            .map(|counter| {
                let label = *Prf::new(&t1).eval(&counter.to_be_bytes()).as_bytes();
                let entry = entries.iter().find(|e| e.label == label).expect("dense counter present");
                u64::from_be_bytes(xor_value(&t2, b"v", &entry.value))
            })
            .collect();
        recovered_rids.sort_unstable();
        assert_eq!(recovered_rids, vec![0, 1]);
    }
}
