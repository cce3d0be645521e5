// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for corpus encode/decode roundtrips.
//!
//! Builds a corpus from structured input (with a bias toward repeated and
//! empty words) and checks that both formats give back the same multiset.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wordtally::binary::{decode, encode, Format, TruncationPolicy};
use wordtally::Corpus;

/// Fuzz input: a list of words, some forced to collide.
#[derive(Debug, Clone)]
struct CorpusInput {
    words: Vec<Vec<u8>>,
}

impl<'a> arbitrary::Arbitrary<'a> for CorpusInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let count = u.int_in_range(0..=64)?;
        let mut words: Vec<Vec<u8>> = Vec::with_capacity(count);
        for _ in 0..count {
            let word = match u.int_in_range(0..=3)? {
                0 => Vec::new(),
                // Repeat an earlier word
                1 if !words.is_empty() => words[u.int_in_range(0..=words.len() - 1)?].clone(),
                _ => Vec::<u8>::arbitrary(u)?,
            };
            words.push(word);
        }
        Ok(Self { words })
    }
}

fuzz_target!(|input: CorpusInput| {
    let corpus: Corpus = input.words.iter().cloned().collect();
    assert_eq!(corpus.len(), input.words.len() as u64);

    for format in [Format::Legacy, Format::Framed] {
        let bytes = encode(&corpus, format);
        let decoded = decode(&bytes, TruncationPolicy::Fail)
            .expect("Encoded corpus should always decode");

        assert_eq!(decoded.format, format);
        assert_eq!(decoded.corpus, corpus, "Roundtrip failed for {}", format);
        assert_eq!(encode(&decoded.corpus, format), bytes, "Encoding not canonical");
    }
});
