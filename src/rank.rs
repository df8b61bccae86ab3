//! Row ordering

use crate::discover::SubcorpusId;
use crate::error::{Result, TallyError};
use crate::tabulate::TableRow;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// How to order table rows; ties always fall back to the entry name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    /// Most frequent first
    #[default]
    Total,
    /// Alphabetical
    Name,
    /// Least frequent first
    Infrequent,
    /// Steepest rise over the subcorpora first
    Increase,
    /// Steepest fall over the subcorpora first
    Decrease,
}

impl FromStr for SortBy {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "total" => Ok(SortBy::Total),
            "name" => Ok(SortBy::Name),
            "infreq" | "infrequent" => Ok(SortBy::Infrequent),
            "increase" => Ok(SortBy::Increase),
            "decrease" => Ok(SortBy::Decrease),
            _ => Err(TallyError::config(format!("unknown sort order {:?}", s))),
        }
    }
}

/// Least-squares slope of count against subcorpus id
pub fn slope(counts: &[(SubcorpusId, u64)]) -> f64 {
    let n = counts.len() as f64;
    if counts.len() < 2 {
        return 0.0;
    }
    let mean_x = counts.iter().map(|(x, _)| *x as f64).sum::<f64>() / n;
    let mean_y = counts.iter().map(|(_, y)| *y as f64).sum::<f64>() / n;
    let (mut cov, mut var) = (0.0, 0.0);
    for (x, y) in counts {
        let dx = *x as f64 - mean_x;
        cov += dx * (*y as f64 - mean_y);
        var += dx * dx;
    }
    if var == 0.0 { 0.0 } else { cov / var }
}

/// Sort rows in place; deterministic for any input order
pub fn sort_rows(rows: &mut [TableRow], by: SortBy) {
    match by {
        SortBy::Total => rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.entry.cmp(&b.entry))),
        SortBy::Name => rows.sort_by(|a, b| a.entry.cmp(&b.entry)),
        SortBy::Infrequent => {
            rows.sort_by(|a, b| a.total.cmp(&b.total).then_with(|| a.entry.cmp(&b.entry)))
        }
        SortBy::Increase | SortBy::Decrease => {
            let mut keyed: Vec<(f64, TableRow)> = rows
                .iter()
                .map(|row| (slope(&row.counts), row.clone()))
                .collect();
            keyed.sort_by(|(sa, a), (sb, b)| {
                let ord = sa.partial_cmp(sb).unwrap_or(Ordering::Equal);
                let ord = if by == SortBy::Increase { ord.reverse() } else { ord };
                ord.then_with(|| a.entry.cmp(&b.entry))
            });
            for (slot, (_, row)) in rows.iter_mut().zip(keyed) {
                *slot = row;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<TableRow> {
        vec![
            TableRow::new("rising", vec![(1, 0), (2, 1), (3, 5)]),
            TableRow::new("falling", vec![(1, 5), (2, 1), (3, 0)]),
            TableRow::new("flat", vec![(1, 1), (2, 1), (3, 1)]),
            TableRow::new("also-flat", vec![(1, 1), (2, 1), (3, 1)]),
        ]
    }

    fn names(rows: &[TableRow]) -> Vec<&str> {
        rows.iter().map(|r| r.entry.as_str()).collect()
    }

    #[test]
    fn test_sort_total_ties_by_name() {
        let mut r = rows();
        sort_rows(&mut r, SortBy::Total);
        assert_eq!(names(&r), vec!["falling", "rising", "also-flat", "flat"]);
    }

    #[test]
    fn test_sort_infrequent_and_name() {
        let mut r = rows();
        sort_rows(&mut r, SortBy::Infrequent);
        assert_eq!(names(&r), vec!["also-flat", "flat", "falling", "rising"]);
        sort_rows(&mut r, SortBy::Name);
        assert_eq!(names(&r), vec!["also-flat", "falling", "flat", "rising"]);
    }

    #[test]
    fn test_sort_by_trend() {
        let mut r = rows();
        sort_rows(&mut r, SortBy::Increase);
        assert_eq!(names(&r), vec!["rising", "also-flat", "flat", "falling"]);
        sort_rows(&mut r, SortBy::Decrease);
        assert_eq!(names(&r), vec!["falling", "also-flat", "flat", "rising"]);
    }

    #[test]
    fn test_slope() {
        assert_eq!(slope(&[(1, 1), (2, 2), (3, 3)]), 1.0);
        assert_eq!(slope(&[(1999, 4)]), 0.0);
        assert_eq!(slope(&[]), 0.0);
        assert!(slope(&[(1, 3), (2, 1)]) < 0.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("infreq".parse::<SortBy>().unwrap(), SortBy::Infrequent);
        assert!("least".parse::<SortBy>().is_err());
    }
}
