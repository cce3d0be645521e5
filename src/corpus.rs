// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The in-memory multiset of observed words.
//!
//! A word is raw bytes: no encoding, embedded NULs welcome, empty is fine.
//! The corpus counts how many times each distinct word was seen. Counts are
//! the whole point (the harness measures how often a fuzzer repeats itself),
//! so nothing here ever deduplicates.
//!
//! Storage is a `BTreeMap` keyed by the word, which gives the canonical order
//! for free: unsigned lexicographic byte order, shorter prefix first. Two
//! corpora with the same words and counts iterate identically no matter what
//! order the words arrived in, which is what makes repeated persists
//! byte-identical.

use std::collections::BTreeMap;

/// One observed fuzzer input.
pub type Word = Vec<u8>;

/// Multiset of words with multiplicities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    counts: BTreeMap<Word, u64>,
    total: u64,
}

/// One row of the distribution summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionEntry {
    pub word: Word,
    pub count: u64,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `word`, returning its new multiplicity.
    pub fn insert(&mut self, word: impl Into<Word>) -> u64 {
        let count = self.counts.entry(word.into()).or_insert(0);
        *count += 1;
        // INVARIANT: total is the sum of all multiplicities
        self.total += 1;
        *count
    }

    /// How many times `word` has been inserted.
    pub fn multiplicity(&self, word: &[u8]) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Total number of occurrences (records on disk).
    pub fn len(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct words.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Occurrences beyond the first of each word.
    pub fn duplicates(&self) -> u64 {
        self.total - self.counts.len() as u64
    }

    /// Length of the longest word, if any.
    pub fn longest(&self) -> Option<usize> {
        self.counts.keys().map(Vec::len).max()
    }

    /// Distinct words with their counts, in canonical order.
    pub fn counts(&self) -> impl Iterator<Item = (&[u8], u64)> {
        self.counts.iter().map(|(w, &c)| (w.as_slice(), c))
    }

    /// Every occurrence in canonical order, duplicates adjacent.
    ///
    /// This is the order records are written in.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.counts
            .iter()
            .flat_map(|(w, &c)| std::iter::repeat(w.as_slice()).take(c as usize))
    }

    /// Words ordered by ascending count, ties broken by canonical order.
    ///
    /// Rarest first, so the most repeated inputs end up at the bottom of a
    /// terminal report where they are easiest to spot.
    pub fn distribution(&self) -> Vec<DistributionEntry> {
        let mut rows: Vec<DistributionEntry> = self
            .counts
            .iter()
            .map(|(word, &count)| DistributionEntry {
                word: word.clone(),
                count,
            })
            .collect();
        // Stable sort keeps canonical order within equal counts
        rows.sort_by_key(|row| row.count);
        rows
    }
}

impl<W: Into<Word>> FromIterator<W> for Corpus {
    fn from_iter<I: IntoIterator<Item = W>>(iter: I) -> Self {
        let mut corpus = Corpus::new();
        corpus.extend(iter);
        corpus
    }
}

impl<W: Into<Word>> Extend<W> for Corpus {
    fn extend<I: IntoIterator<Item = W>>(&mut self, iter: I) {
        for word in iter {
            self.insert(word);
        }
    }
}
