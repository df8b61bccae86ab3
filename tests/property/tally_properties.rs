use proptest::prelude::*;
use treetally::{Normalizer, SubcorpusCounts, SubcorpusId, count_subcorpus, tabulate};

fn corpus() -> impl Strategy<Value = Vec<(SubcorpusId, Vec<String>)>> {
    prop::collection::vec(
        (
            -3i64..40,
            prop::collection::vec("[A-Za-z'(.0-9 -]{0,10}", 0..12),
        ),
        1..8,
    )
}

fn count_all(corpus: &[(SubcorpusId, Vec<String>)], normalizer: &Normalizer) -> Vec<SubcorpusCounts> {
    corpus
        .iter()
        .map(|(id, raw)| count_subcorpus(*id, raw, normalizer).unwrap())
        .collect()
}

proptest! {
    #[test]
    fn rows_span_every_subcorpus(corpus in corpus(), titles in any::<bool>()) {
        let normalizer = Normalizer::new().with_title_filter(titles);
        let table = tabulate(count_all(&corpus, &normalizer));

        let mut ids: Vec<_> = corpus.iter().map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(&table.subcorpora, &ids);

        for row in &table.rows {
            let row_ids: Vec<_> = row.counts.iter().map(|(id, _)| *id).collect();
            prop_assert_eq!(&row_ids, &ids);
            prop_assert_eq!(row.counts.iter().map(|(_, c)| c).sum::<u64>(), row.total);
            prop_assert!(!row.entry.is_empty());
        }
    }

    #[test]
    fn raw_totals_count_every_match(corpus in corpus()) {
        let table = tabulate(count_all(&corpus, &Normalizer::new()));
        let raw: usize = corpus.iter().map(|(_, r)| r.len()).sum();
        prop_assert_eq!(table.grand_total(), raw as u64);
        let counted: u64 = table.rows.iter().map(|r| r.total).sum();
        prop_assert!(counted <= table.grand_total());
    }

    #[test]
    fn normalization_is_idempotent(word in "[A-Za-z'(.,0-9 -]{0,16}", titles in any::<bool>()) {
        let normalizer = Normalizer::new().with_title_filter(titles);
        if let Some(entry) = normalizer.normalize_str(&word) {
            prop_assert_eq!(normalizer.normalize_str(&entry), Some(entry.clone()));
        }
    }

    #[test]
    fn tabulation_ignores_input_order(corpus in corpus()) {
        let normalizer = Normalizer::new();
        let forward = tabulate(count_all(&corpus, &normalizer));
        let mut reversed = count_all(&corpus, &normalizer);
        reversed.reverse();
        prop_assert_eq!(forward, tabulate(reversed));
    }
}
