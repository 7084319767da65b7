use crate::new_types::index_tuple::IndexTuple;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// Occurrence count per combination of barcode indices, in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    counts: BTreeMap<IndexTuple, u64>,
}

/// Parallel columns: `columns[j][i]` is the `j`-th index of the `i`-th
/// combination, which was seen `counts[i]` times.
#[derive(new, Clone, Debug, PartialEq, Eq)]
pub struct TallyExport {
    pub counts: Vec<u64>,
    pub columns: Vec<Vec<i64>>,
}

impl Tally {
    pub fn new() -> Self {
        Tally::default()
    }

    pub fn increment(&mut self, tuple: IndexTuple) {
        *self.counts.entry(tuple).or_insert(0) += 1;
    }

    /// Add all counts of `other`.
    pub fn merge(&mut self, other: Tally) {
        if self.counts.is_empty() {
            self.counts = other.counts;
            return;
        }
        for (tuple, ct) in other.counts {
            *self.counts.entry(tuple).or_insert(0) += ct;
        }
    }

    pub fn get(&self, tuple: &IndexTuple) -> u64 {
        self.counts.get(tuple).copied().unwrap_or(0)
    }

    /// Number of distinct combinations.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, i.e. the number of matched reads.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, IndexTuple, u64> {
        self.counts.iter()
    }

    /// Flatten into a count column and `nvariable` index columns, all of one
    /// length, in ascending tuple order. Indices stay 0-based. A tuple with
    /// fewer than `nvariable` indices is padded with -1, extra indices are
    /// left out.
    pub fn export(&self, nvariable: usize) -> TallyExport {
        let mut counts = Vec::with_capacity(self.counts.len());
        let mut columns = vec![Vec::with_capacity(self.counts.len()); nvariable];
        for (tuple, &ct) in &self.counts {
            for (j, column) in columns.iter_mut().enumerate() {
                column.push(tuple.get(j).map_or(-1, |&idx| i64::from(idx)));
            }
            counts.push(ct);
        }
        TallyExport::new(counts, columns)
    }
}

impl<'a> IntoIterator for &'a Tally {
    type Item = (&'a IndexTuple, &'a u64);
    type IntoIter = btree_map::Iter<'a, IndexTuple, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}
