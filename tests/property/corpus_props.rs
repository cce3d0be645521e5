//! Multiset properties of `Corpus`.

use proptest::prelude::*;
use std::collections::HashMap;
use wordtally::Corpus;

// ============================================================================
// STRATEGIES
// ============================================================================

/// Short words over a tiny alphabet so duplicates actually happen.
fn word_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(vec![0u8, b'a', b'b', 0xff]), 0..4)
}

fn words_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(word_strategy(), 0..40)
}

/// Reference multiset: plain counting.
fn oracle(words: &[Vec<u8>]) -> HashMap<Vec<u8>, u64> {
    let mut counts = HashMap::new();
    for w in words {
        *counts.entry(w.clone()).or_insert(0) += 1;
    }
    counts
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Property: multiplicities match a naive counter.
    #[test]
    fn prop_counts_match_oracle(words in words_strategy()) {
        let corpus: Corpus = words.iter().cloned().collect();
        let expected = oracle(&words);

        prop_assert_eq!(corpus.len(), words.len() as u64);
        prop_assert_eq!(corpus.distinct(), expected.len());
        for (word, count) in &expected {
            prop_assert_eq!(corpus.multiplicity(word), *count);
        }
    }

    /// Property: inserting w bumps only w's multiplicity, by exactly one.
    #[test]
    fn prop_insertion_monotonic(words in words_strategy(), new in word_strategy()) {
        let before: Corpus = words.iter().cloned().collect();
        let mut after = before.clone();
        let returned = after.insert(new.clone());

        prop_assert_eq!(returned, before.multiplicity(&new) + 1);
        prop_assert_eq!(after.multiplicity(&new), before.multiplicity(&new) + 1);
        prop_assert_eq!(after.len(), before.len() + 1);
        for (word, count) in before.counts() {
            if word != new.as_slice() {
                prop_assert_eq!(after.multiplicity(word), count);
            }
        }
    }

    /// Property: iteration order is independent of insertion order.
    #[test]
    fn prop_iteration_is_canonical(words in words_strategy()) {
        let forward: Corpus = words.iter().cloned().collect();
        let backward: Corpus = words.iter().rev().cloned().collect();
        prop_assert_eq!(&forward, &backward);
        prop_assert!(forward.iter().eq(backward.iter()));

        let listed: Vec<&[u8]> = forward.iter().collect();
        let mut sorted = listed.clone();
        sorted.sort();
        prop_assert_eq!(listed, sorted);
    }

    /// Property: the distribution covers every distinct word once, rarest first.
    #[test]
    fn prop_distribution_sorted_and_complete(words in words_strategy()) {
        let corpus: Corpus = words.iter().cloned().collect();
        let rows = corpus.distribution();

        prop_assert_eq!(rows.len(), corpus.distinct());
        prop_assert!(rows.windows(2).all(|w| w[0].count <= w[1].count));
        prop_assert_eq!(rows.iter().map(|r| r.count).sum::<u64>(), corpus.len());
    }
}
