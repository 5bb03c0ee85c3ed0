//! The row-stream abstraction: an in-memory sequence of plaintext rows for one table, with RID
//! attachment.
//!
//! The distributed dataframe/columnar layer that would back a real row stream is out of scope
//! here; this module assumes rows already arrived as plain [`Row`] values and only adds the RID.

use crate::identifiers::{Rid, RidAssigner};
use crate::model::Row;

/// A plaintext row together with the RID assigned to it.
#[derive(Debug, Clone)]
pub struct RowWithRid {
    pub row: Row,
    pub rid: Rid,
}

/// Attaches a monotonically increasing RID to every row of a table's row stream, in input order.
#[must_use]
pub fn assign_rids(rows: impl IntoIterator<Item = Row>) -> Vec<RowWithRid> {
    let mut assigner = RidAssigner::new();
    rows.into_iter().map(|row| RowWithRid { rid: assigner.next(), row }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    #[test]
    fn attaches_dense_monotone_rids() {
        let rows = vec![
            Row(vec![("id".into(), Value::Int(1))]),
            Row(vec![("id".into(), Value::Int(2))]),
            Row(vec![("id".into(), Value::Int(3))]),
        ];

        let attached = assign_rids(rows);
        let rids: Vec<u64> = attached.iter().map(|r| r.rid.value()).collect();
        assert_eq!(rids, vec![0, 1, 2]);
    }
}
