//! Editing tabulated results
//!
//! Edits take a [`Table`] and build a new value; the input is never
//! modified, and every row of a resulting table still spans every
//! subcorpus of that table.

use crate::discover::SubcorpusId;
use crate::error::{Result, TallyError};
use crate::rank::{SortBy, sort_rows};
use crate::tabulate::{Table, TableRow};
use crate::threshold::Threshold;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Which subcorpora to keep
#[derive(Debug, Clone)]
pub enum SubcorpusSelection {
    Skip(Vec<SubcorpusId>),
    Just(Vec<SubcorpusId>),
    /// Inclusive range
    Span(SubcorpusId, SubcorpusId),
}

impl SubcorpusSelection {
    fn keeps(&self, id: SubcorpusId) -> bool {
        match self {
            SubcorpusSelection::Skip(ids) => !ids.contains(&id),
            SubcorpusSelection::Just(ids) => ids.contains(&id),
            SubcorpusSelection::Span(lo, hi) => (*lo..=*hi).contains(&id),
        }
    }
}

/// Which entries an edit applies to
#[derive(Debug, Clone)]
pub enum EntrySelection {
    /// Zero-based row positions in the current order
    Indices(Vec<usize>),
    Names(Vec<String>),
    Pattern(Regex),
}

impl EntrySelection {
    pub fn matches(&self, index: usize, entry: &str) -> bool {
        match self {
            EntrySelection::Indices(indices) => indices.contains(&index),
            EntrySelection::Names(names) => names.iter().any(|n| n == entry),
            EntrySelection::Pattern(re) => re.is_match(entry),
        }
    }
}

/// A row of per-subcorpus percentages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelativeRow {
    pub entry: String,
    pub total: f64,
    pub values: Vec<(SubcorpusId, f64)>,
}

/// Table of percentages against a denominator series
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelativeTable {
    pub subcorpora: Vec<SubcorpusId>,
    pub rows: Vec<RelativeRow>,
}

fn percent(count: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        count as f64 * 100.0 / denominator as f64
    }
}

impl Table {
    /// Keep only the selected subcorpora, recomputing row totals
    pub fn select_subcorpora(&self, selection: &SubcorpusSelection) -> Table {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let counts = row
                    .counts
                    .iter()
                    .copied()
                    .filter(|(id, _)| selection.keeps(*id))
                    .collect();
                TableRow::new(row.entry.clone(), counts)
            })
            .collect();
        Table {
            subcorpora: self
                .subcorpora
                .iter()
                .copied()
                .filter(|id| selection.keeps(*id))
                .collect(),
            rows,
            totals: self
                .totals
                .iter()
                .copied()
                .filter(|(id, _)| selection.keeps(*id))
                .collect(),
        }
    }

    /// Keep (`keep = true`) or drop the selected entries
    pub fn select_entries(&self, selection: &EntrySelection, keep: bool) -> Table {
        Table {
            subcorpora: self.subcorpora.clone(),
            rows: self
                .rows
                .iter()
                .enumerate()
                .filter(|(i, row)| selection.matches(*i, &row.entry) == keep)
                .map(|(_, row)| row.clone())
                .collect(),
            totals: self.totals.clone(),
        }
    }

    /// Sum the selected rows into a single row called `new_name`
    ///
    /// The merged row takes the place of the first merged entry. With no
    /// matching rows the table is returned unchanged.
    pub fn merge_entries(&self, selection: &EntrySelection, new_name: &str) -> Table {
        let mut merged: Vec<(SubcorpusId, u64)> =
            self.subcorpora.iter().map(|id| (*id, 0)).collect();
        let mut position = None;
        let mut rows = Vec::with_capacity(self.rows.len());
        let mut names = BTreeSet::new();

        for (i, row) in self.rows.iter().enumerate() {
            if selection.matches(i, &row.entry) {
                position.get_or_insert(rows.len());
                names.insert(row.entry.as_str());
                for (slot, (_, count)) in merged.iter_mut().zip(&row.counts) {
                    slot.1 += count;
                }
            } else {
                rows.push(row.clone());
            }
        }

        if let Some(mut pos) = position {
            debug!(merged = ?names, into = new_name, "merging entries");
            // an unselected row with the new name is folded in as well
            if let Some(existing) = rows.iter().position(|r| r.entry == new_name) {
                let row = rows.remove(existing);
                if existing < pos {
                    pos -= 1;
                }
                for (slot, (_, count)) in merged.iter_mut().zip(&row.counts) {
                    slot.1 += count;
                }
            }
            rows.insert(pos, TableRow::new(new_name, merged));
        }

        Table {
            subcorpora: self.subcorpora.clone(),
            rows,
            totals: self.totals.clone(),
        }
    }

    /// Sum the subcorpora in `ids` into a single column `new_id`
    ///
    /// An existing `new_id` column is folded in too. Columns stay in
    /// ascending id order. With none of `ids` present the table is returned
    /// unchanged.
    pub fn merge_subcorpora(&self, ids: &[SubcorpusId], new_id: SubcorpusId) -> Table {
        if !self.subcorpora.iter().any(|id| ids.contains(id)) {
            return self.clone();
        }
        debug!(merged = ?ids, into = new_id, "merging subcorpora");

        let fold = |counts: &[(SubcorpusId, u64)]| {
            let mut columns: BTreeMap<SubcorpusId, u64> = BTreeMap::new();
            columns.insert(new_id, 0);
            for (id, count) in counts {
                let id = if ids.contains(id) { new_id } else { *id };
                *columns.entry(id).or_insert(0) += count;
            }
            columns.into_iter().collect::<Vec<_>>()
        };

        let totals = fold(&self.totals);
        Table {
            subcorpora: totals.iter().map(|(id, _)| *id).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| TableRow::new(row.entry.clone(), fold(&row.counts)))
                .collect(),
            totals,
        }
    }

    /// Multiply the counts and raw totals of some subcorpora
    ///
    /// Scaled counts are rounded to the nearest whole number. Subcorpora
    /// without a factor are left alone.
    pub fn project(&self, factors: &[(SubcorpusId, f64)]) -> Result<Table> {
        if let Some((id, factor)) = factors.iter().find(|(_, f)| !f.is_finite() || *f < 0.0) {
            return Err(TallyError::config(format!(
                "projection factor {} for subcorpus {} must be a non-negative number",
                factor, id
            )));
        }
        let scale = |counts: &[(SubcorpusId, u64)]| -> Vec<(SubcorpusId, u64)> {
            counts
                .iter()
                .map(|(id, count)| match factors.iter().find(|(f, _)| f == id) {
                    Some((_, factor)) => (*id, (*count as f64 * factor).round() as u64),
                    None => (*id, *count),
                })
                .collect()
        };

        Ok(Table {
            subcorpora: self.subcorpora.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| TableRow::new(row.entry.clone(), scale(&row.counts)))
                .collect(),
            totals: scale(&self.totals),
        })
    }

    /// The first `n` rows in the current order
    pub fn keep_top(&self, n: usize) -> Table {
        let mut table = self.clone();
        table.rows.truncate(n);
        table
    }

    /// Each entry with its total over every subcorpus, in row order
    pub fn just_totals(&self) -> Vec<(String, u64)> {
        self.rows
            .iter()
            .map(|row| (row.entry.clone(), row.total))
            .collect()
    }

    /// Drop rows whose total falls below the threshold
    ///
    /// Qualitative levels resolve against this table's grand total.
    pub fn apply_threshold(&self, threshold: Threshold) -> Table {
        let minimum = threshold.resolve(self.grand_total());
        debug!(minimum, "applying threshold");
        Table {
            subcorpora: self.subcorpora.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| row.total >= minimum)
                .cloned()
                .collect(),
            totals: self.totals.clone(),
        }
    }

    pub fn sorted(&self, by: SortBy) -> Table {
        let mut table = self.clone();
        sort_rows(&mut table.rows, by);
        table
    }

    /// Percentages of a denominator series, e.g. another table's totals
    ///
    /// Subcorpora missing from `denominator` count as zero.
    pub fn relative_to(&self, denominator: &[(SubcorpusId, u64)]) -> RelativeTable {
        let lookup = |id: SubcorpusId| {
            denominator
                .iter()
                .find(|(d, _)| *d == id)
                .map_or(0, |(_, n)| *n)
        };
        let overall: u64 = self.subcorpora.iter().map(|id| lookup(*id)).sum();

        let rows = self
            .rows
            .iter()
            .map(|row| RelativeRow {
                entry: row.entry.clone(),
                total: percent(row.total, overall),
                values: row
                    .counts
                    .iter()
                    .map(|(id, count)| (*id, percent(*count, lookup(*id))))
                    .collect(),
            })
            .collect();

        RelativeTable {
            subcorpora: self.subcorpora.clone(),
            rows,
        }
    }

    /// Percentages of the same entries in another table
    ///
    /// Each count is divided by the denominator's count for that entry and
    /// subcorpus. Entries whose total in `denominator` falls below the
    /// threshold are dropped; levels resolve against the sum of the
    /// denominator's row totals.
    pub fn relative_to_table(&self, denominator: &Table, threshold: Threshold) -> RelativeTable {
        let counted: u64 = denominator.rows.iter().map(|r| r.total).sum();
        let minimum = threshold.resolve(counted);
        debug!(minimum, "relative to table");

        let rows = self
            .rows
            .iter()
            .filter_map(|row| {
                let other = denominator.row(&row.entry);
                let other_total = other.map_or(0, |r| r.total);
                if other_total < minimum {
                    return None;
                }
                let lookup = |id: SubcorpusId| {
                    other
                        .and_then(|r| r.counts.iter().find(|(d, _)| *d == id))
                        .map_or(0, |(_, n)| *n)
                };
                Some(RelativeRow {
                    entry: row.entry.clone(),
                    total: percent(row.total, other_total),
                    values: row
                        .counts
                        .iter()
                        .map(|(id, count)| (*id, percent(*count, lookup(*id))))
                        .collect(),
                })
            })
            .collect();

        RelativeTable {
            subcorpora: self.subcorpora.clone(),
            rows,
        }
    }

    /// Percentages of this table's own raw totals
    pub fn relative_to_self(&self) -> RelativeTable {
        self.relative_to(&self.totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::ThresholdLevel;

    fn table() -> Table {
        Table {
            subcorpora: vec![1999, 2000, 2001],
            rows: vec![
                TableRow::new("risk", vec![(1999, 4), (2000, 3), (2001, 3)]),
                TableRow::new("risky", vec![(1999, 0), (2000, 2), (2001, 2)]),
                TableRow::new("riskier", vec![(1999, 1), (2000, 0), (2001, 0)]),
            ],
            totals: vec![(1999, 10), (2000, 10), (2001, 20)],
        }
    }

    fn ids_consistent(t: &Table) -> bool {
        t.rows.iter().all(|r| {
            r.counts.iter().map(|(id, _)| *id).collect::<Vec<_>>() == t.subcorpora
                && r.counts.iter().map(|(_, c)| c).sum::<u64>() == r.total
        })
    }

    #[test]
    fn test_skip_and_span_subcorpora() {
        let t = table().select_subcorpora(&SubcorpusSelection::Skip(vec![1999]));
        assert_eq!(t.subcorpora, vec![2000, 2001]);
        assert_eq!(t.row("risk").unwrap().total, 6);
        assert_eq!(t.totals, vec![(2000, 10), (2001, 20)]);
        assert!(ids_consistent(&t));

        let t = table().select_subcorpora(&SubcorpusSelection::Span(2000, 2001));
        assert_eq!(t.subcorpora, vec![2000, 2001]);
        let t = table().select_subcorpora(&SubcorpusSelection::Just(vec![1999]));
        assert_eq!(t.row("riskier").unwrap().counts, vec![(1999, 1)]);
    }

    #[test]
    fn test_select_entries() {
        let pattern = EntrySelection::Pattern(Regex::new(r"^risk.+").unwrap());
        let t = table().select_entries(&pattern, false);
        assert_eq!(t.len(), 1);
        assert_eq!(t.rows[0].entry, "risk");

        let names = EntrySelection::Names(vec!["risky".into()]);
        let t = table().select_entries(&names, true);
        assert_eq!(t.len(), 1);
        assert_eq!(t.rows[0].entry, "risky");
    }

    #[test]
    fn test_merge_entries() {
        let sel = EntrySelection::Names(vec!["risky".into(), "riskier".into()]);
        let t = table().merge_entries(&sel, "risky-adj");
        assert_eq!(t.len(), 2);
        assert_eq!(
            t.rows[1],
            TableRow::new("risky-adj", vec![(1999, 1), (2000, 2), (2001, 2)])
        );
        assert!(ids_consistent(&t));

        let none = EntrySelection::Names(vec!["nothing".into()]);
        assert_eq!(table().merge_entries(&none, "x"), table());
    }

    #[test]
    fn test_select_entries_by_index() {
        let t = table().select_entries(&EntrySelection::Indices(vec![0, 2]), false);
        assert_eq!(t.just_totals(), vec![("risky".to_string(), 4)]);

        let sorted = table().sorted(SortBy::Name);
        let t = sorted.select_entries(&EntrySelection::Indices(vec![1]), true);
        assert_eq!(t.rows[0].entry, "riskier");
    }

    #[test]
    fn test_merge_entries_by_index() {
        let t = table().merge_entries(&EntrySelection::Indices(vec![1, 2]), "risky-adj");
        assert_eq!(t.rows[1].entry, "risky-adj");
        assert_eq!(t.rows[1].total, 5);
    }

    #[test]
    fn test_merge_keeps_place_after_folding_existing_row() {
        let mut t = table();
        t.rows.insert(0, TableRow::new("risky-adj", vec![(1999, 1), (2000, 1), (2001, 1)]));
        t.rows.insert(3, TableRow::new("hazard", vec![(1999, 1), (2000, 0), (2001, 0)]));

        let sel = EntrySelection::Names(vec!["risky".into(), "riskier".into()]);
        let merged = t.merge_entries(&sel, "risky-adj");
        let entries: Vec<_> = merged.rows.iter().map(|r| r.entry.as_str()).collect();
        assert_eq!(entries, vec!["risk", "risky-adj", "hazard"]);
        assert_eq!(merged.row("risky-adj").unwrap().total, 8);
        assert!(ids_consistent(&merged));
    }

    #[test]
    fn test_merge_subcorpora() {
        let t = table().merge_subcorpora(&[2000, 2001], 2000);
        assert_eq!(t.subcorpora, vec![1999, 2000]);
        assert_eq!(t.row("risky").unwrap().counts, vec![(1999, 0), (2000, 4)]);
        assert_eq!(t.totals, vec![(1999, 10), (2000, 30)]);
        assert!(ids_consistent(&t));

        // a fresh id lands in order, and its totals are preserved
        let t = table().merge_subcorpora(&[1999, 2000], 1990);
        assert_eq!(t.subcorpora, vec![1990, 2001]);
        assert_eq!(t.row("risk").unwrap().counts, vec![(1990, 7), (2001, 3)]);
        assert_eq!(t.grand_total(), table().grand_total());

        assert_eq!(table().merge_subcorpora(&[1800], 1), table());
    }

    #[test]
    fn test_project() {
        let t = table().project(&[(1999, 5.0), (2001, 0.5)]).unwrap();
        assert_eq!(t.row("risk").unwrap().counts, vec![(1999, 20), (2000, 3), (2001, 2)]);
        assert_eq!(t.row("risk").unwrap().total, 25);
        assert_eq!(t.totals, vec![(1999, 50), (2000, 10), (2001, 10)]);
        assert!(ids_consistent(&t));

        assert!(table().project(&[(1999, -1.0)]).is_err());
        assert!(table().project(&[(1999, f64::NAN)]).is_err());
    }

    #[test]
    fn test_keep_top_and_just_totals() {
        let t = table().keep_top(2);
        assert_eq!(
            t.just_totals(),
            vec![("risk".to_string(), 10), ("risky".to_string(), 4)]
        );
        assert_eq!(table().keep_top(10), table());
    }

    #[test]
    fn test_relative_to_table() {
        let denominator = Table {
            subcorpora: vec![1999, 2000, 2001],
            rows: vec![
                TableRow::new("the", vec![(1999, 20_000), (2000, 20_000), (2001, 10_000)]),
                TableRow::new("risk", vec![(1999, 8), (2000, 6), (2001, 6)]),
                TableRow::new("risky", vec![(1999, 0), (2000, 4), (2001, 4)]),
            ],
            totals: vec![(1999, 20_008), (2000, 20_010), (2001, 10_010)],
        };

        let rel = table().relative_to_table(&denominator, Threshold::Absolute(0));
        assert_eq!(rel.rows.len(), 3);
        assert_eq!(rel.rows[0].values, vec![(1999, 50.0), (2000, 50.0), (2001, 50.0)]);
        assert_eq!(rel.rows[0].total, 50.0);
        assert_eq!(rel.rows[1].values[0], (1999, 0.0));
        assert_eq!(rel.rows[2].total, 0.0);

        // 50_028 / 5_000 == 10: only "risk" occurs often enough in the denominator
        let rel = table().relative_to_table(&denominator, Threshold::default());
        let entries: Vec<_> = rel.rows.iter().map(|r| r.entry.as_str()).collect();
        assert_eq!(entries, vec!["risk"]);
    }

    #[test]
    fn test_threshold() {
        let t = table().apply_threshold(Threshold::Absolute(2));
        assert_eq!(t.len(), 2);
        assert!(t.row("riskier").is_none());

        // 40 / 10_000 == 0, nothing is dropped
        let t = table().apply_threshold(Threshold::Level(ThresholdLevel::Low));
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_relative() {
        let rel = table().relative_to_self();
        let risk = &rel.rows[0];
        assert_eq!(risk.values, vec![(1999, 40.0), (2000, 30.0), (2001, 15.0)]);
        assert_eq!(risk.total, 25.0);

        let rel = table().relative_to(&[(1999, 0)]);
        assert_eq!(rel.rows[0].values[0], (1999, 0.0));
    }

    #[test]
    fn test_sorted_leaves_input_alone() {
        let original = table();
        let sorted = original.sorted(SortBy::Name);
        assert_eq!(sorted.rows[0].entry, "risk");
        assert_eq!(sorted.rows[1].entry, "riskier");
        assert_eq!(original.rows[1].entry, "risky");
    }
}
