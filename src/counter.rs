//! Per-subcorpus counting

use crate::discover::SubcorpusId;
use crate::error::{Result, TallyError};
use crate::normalize::Normalizer;
use bstr::ByteSlice;
use rustc_hash::FxHashMap;

/// Entry counts for one subcorpus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubcorpusCounts {
    pub id: SubcorpusId,
    pub entries: FxHashMap<String, u64>,
    /// Every raw match, including those that normalized to nothing
    pub raw_total: u64,
}

impl SubcorpusCounts {
    pub fn new(id: SubcorpusId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn get(&self, entry: &str) -> u64 {
        self.entries.get(entry).copied().unwrap_or(0)
    }

    /// Add the counts of another pass over the same subcorpus
    pub fn merge(&mut self, other: SubcorpusCounts) {
        self.raw_total += other.raw_total;
        for (entry, count) in other.entries {
            *self.entries.entry(entry).or_insert(0) += count;
        }
    }
}

/// Normalize and count the raw matches of one subcorpus
///
/// Matches that are not valid UTF-8 abort the count.
pub fn count_subcorpus<I, B>(
    id: SubcorpusId,
    raw_matches: I,
    normalizer: &Normalizer,
) -> Result<SubcorpusCounts>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut counts = SubcorpusCounts::new(id);
    for raw in raw_matches {
        let raw = raw.as_ref();
        counts.raw_total += 1;
        let entry = normalizer.normalize(raw).map_err(|_| TallyError::Encoding {
            subcorpus: id,
            lossy: raw.to_str_lossy().into_owned(),
        })?;
        if let Some(entry) = entry {
            *counts.entries.entry(entry).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_merges_equal_entries() {
        let counts = count_subcorpus(1999, ["Risk", "risk", "RISKS", "--", "risk."], &Normalizer::new())
            .unwrap();

        assert_eq!(counts.id, 1999);
        assert_eq!(counts.raw_total, 5);
        assert_eq!(counts.get("risk"), 2);
        assert_eq!(counts.get("risks"), 1);
        assert_eq!(counts.get("risk."), 1);
        assert_eq!(counts.entries.len(), 3);
    }

    #[test]
    fn test_empty_entries_only_count_in_raw_total() {
        let counts = count_subcorpus(2000, ["...", "42", "'"], &Normalizer::new()).unwrap();
        assert_eq!(counts.raw_total, 3);
        assert_eq!(counts.entries.len(), 1);
        assert_eq!(counts.get("'"), 1);
    }

    #[test]
    fn test_encoding_error_is_fatal() {
        let raw: Vec<&[u8]> = vec![b"risk", &[0xc3, 0x28]];
        let err = count_subcorpus(1963, raw, &Normalizer::new()).unwrap_err();
        assert!(matches!(err, TallyError::Encoding { subcorpus: 1963, .. }));
    }

    #[test]
    fn test_merge() {
        let normalizer = Normalizer::new();
        let mut a = count_subcorpus(1, ["a", "b"], &normalizer).unwrap();
        let b = count_subcorpus(1, ["b", "c"], &normalizer).unwrap();
        a.merge(b);
        assert_eq!(a.raw_total, 4);
        assert_eq!(a.get("b"), 2);
        assert_eq!(a.get("c"), 1);
    }
}
