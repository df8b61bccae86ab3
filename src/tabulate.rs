//! Cross-subcorpus tabulation
//!
//! [`Tabulator`] is the accumulator that every subcorpus count is folded
//! into. [`Tabulator::finish`] builds the entry-by-subcorpus [`Table`]:
//! every row carries one count per subcorpus, zero filled, in ascending
//! subcorpus order.

use crate::counter::SubcorpusCounts;
use crate::discover::SubcorpusId;
use crate::rank::{SortBy, sort_rows};
use lasso::{Rodeo, Spur};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// One entry across all subcorpora
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub entry: String,
    pub total: u64,
    pub counts: Vec<(SubcorpusId, u64)>,
}

impl TableRow {
    /// Build a row, computing the total from the counts
    pub fn new(entry: impl Into<String>, counts: Vec<(SubcorpusId, u64)>) -> Self {
        let total = counts.iter().map(|(_, c)| c).sum();
        Self {
            entry: entry.into(),
            total,
            counts,
        }
    }

    pub fn count(&self, id: SubcorpusId) -> Option<u64> {
        self.counts
            .binary_search_by_key(&id, |(i, _)| *i)
            .ok()
            .map(|pos| self.counts[pos].1)
    }
}

/// Entry-by-subcorpus count table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Subcorpus ids, ascending; the columns of every row
    pub subcorpora: Vec<SubcorpusId>,
    pub rows: Vec<TableRow>,
    /// Raw match totals per subcorpus
    pub totals: Vec<(SubcorpusId, u64)>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, entry: &str) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.entry == entry)
    }

    /// Sum of all raw totals
    pub fn grand_total(&self) -> u64 {
        self.totals.iter().map(|(_, c)| c).sum()
    }
}

/// Accumulates subcorpus counts; owns the interned entries
#[derive(Debug, Default)]
pub struct Tabulator {
    entries: Rodeo,
    subcorpora: BTreeMap<SubcorpusId, Column>,
}

#[derive(Debug, Default)]
struct Column {
    counts: FxHashMap<Spur, u64>,
    raw_total: u64,
}

impl Tabulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subcorpus that may have no matches at all
    pub fn add_subcorpus(&mut self, id: SubcorpusId) {
        self.subcorpora.entry(id).or_default();
    }

    /// Fold one subcorpus in; a repeated id adds to the existing column
    pub fn add(&mut self, counts: SubcorpusCounts) {
        let column = self.subcorpora.entry(counts.id).or_default();
        column.raw_total += counts.raw_total;
        for (entry, count) in counts.entries {
            let key = self.entries.get_or_intern(entry);
            *column.counts.entry(key).or_insert(0) += count;
        }
    }

    pub fn subcorpus_count(&self) -> usize {
        self.subcorpora.len()
    }

    /// Build the table, sorted by total descending then entry
    pub fn finish(self) -> Table {
        let ids: Vec<SubcorpusId> = self.subcorpora.keys().copied().collect();
        let totals = self
            .subcorpora
            .iter()
            .map(|(id, column)| (*id, column.raw_total))
            .collect();

        let mut rows = Vec::with_capacity(self.entries.len());
        for (key, entry) in self.entries.iter() {
            if entry.is_empty() {
                continue;
            }
            let counts = self
                .subcorpora
                .iter()
                .map(|(id, column)| (*id, column.counts.get(&key).copied().unwrap_or(0)))
                .collect();
            rows.push(TableRow::new(entry, counts));
        }
        sort_rows(&mut rows, SortBy::Total);

        Table {
            subcorpora: ids,
            rows,
            totals,
        }
    }
}

/// Tabulate a full set of subcorpus counts in one call
pub fn tabulate(counts: impl IntoIterator<Item = SubcorpusCounts>) -> Table {
    let mut tabulator = Tabulator::new();
    for c in counts {
        tabulator.add(c);
    }
    tabulator.finish()
}
