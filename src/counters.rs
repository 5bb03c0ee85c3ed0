//! Dense, zero-based, per-partition counter assignment: `pibas_counter(c) = rank within
//! partition of c`, assigned by a windowed row-number operator.
//!
//! Every EMM builder partitions rows (or join matches) by some key — a filter value, a join
//! partner, a foreign key value — and needs a counter that is dense and contiguous starting at 0
//! within each partition, so that a query processor can enumerate matches by incrementing the
//! counter until a lookup miss. This module is the one place that assigns those counters.

use std::collections::HashMap;
use std::hash::Hash;

/// Groups `items` by `key_fn` and assigns a dense, zero-based counter to each item within its
/// group, in input order.
///
/// Input order, not a sort on the item itself, determines counter assignment — callers that need
/// a specific deterministic order (e.g. "ordered by c ascending") must sort `items` before calling
/// this function.
#[must_use]
pub fn assign_dense_counters<T, K: Eq + Hash>(items: Vec<T>, key_fn: impl Fn(&T) -> K) -> Vec<(T, u64)> {
    let mut next_counter: HashMap<K, u64> = HashMap::new();
    items
        .into_iter()
        .map(|item| {
            let key = key_fn(&item);
            let counter = next_counter.entry(key).or_insert(0);
            let assigned = *counter;
            *counter += 1;
            (item, assigned)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_dense_per_partition() {
        let items = vec![("a", 1), ("b", 1), ("a", 2), ("a", 3), ("b", 4)];
        let counted = assign_dense_counters(items, |(partition, _)| *partition);

        let a_counters: Vec<u64> = counted.iter().filter(|((p, _), _)| *p == "a").map(|(_, c)| *c).collect();
        let b_counters: Vec<u64> = counted.iter().filter(|((p, _), _)| *p == "b").map(|(_, c)| *c).collect();

        assert_eq!(a_counters, vec![0, 1, 2]);
        assert_eq!(b_counters, vec![0, 1]);
    }

    #[quickcheck_macros::quickcheck]
    fn counters_are_always_dense_and_zero_based_per_partition(partitions: Vec<u8>) -> bool {
        let items: Vec<(u8, ())> = partitions.into_iter().map(|p| (p, ())).collect();
        let counted = assign_dense_counters(items, |(partition, ())| *partition);

        let mut by_partition: HashMap<u8, Vec<u64>> = HashMap::new();
        for ((partition, ()), counter) in counted {
            by_partition.entry(partition).or_default().push(counter);
        }

        by_partition.into_values().all(|mut counters| {
            counters.sort_unstable();
            let len = counters.len() as u64;
            counters.into_iter().eq(0..len)
        })
    }
}
