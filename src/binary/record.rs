// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Length-prefixed word records.
//!
//! Each record is a `u64` little-endian length followed by that many raw
//! bytes. No separators, no terminator: the stream ends where the file ends.
//! The historical reader decodes the prefix as little-endian, so that is
//! fixed here rather than following the host byte order.

use crate::corpus::Corpus;
use crate::error::{CorruptReason, Result, TallyError};

/// Size of the length prefix in bytes
pub const LEN_PREFIX_SIZE: usize = 8;

/// What to do when the record stream ends mid-record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TruncationPolicy {
    /// Reject the whole file.
    #[default]
    Fail,
    /// Keep every complete record and drop the broken tail.
    Discard,
}

impl std::str::FromStr for TruncationPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "discard" => Ok(Self::Discard),
            other => Err(format!("unknown policy '{}' (expected fail or discard)", other)),
        }
    }
}

/// Append one record to `buf`.
pub fn encode_record(word: &[u8], buf: &mut Vec<u8>) {
    buf.extend_from_slice(&(word.len() as u64).to_le_bytes());
    buf.extend_from_slice(word);
}

/// Encode every occurrence in canonical order.
pub fn encode_records(corpus: &Corpus) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(corpus));
    append_records(corpus, &mut buf);
    buf
}

/// Append every occurrence in canonical order to an existing buffer.
pub fn append_records(corpus: &Corpus, buf: &mut Vec<u8>) {
    for word in corpus.iter() {
        encode_record(word, buf);
    }
}

/// Exact byte size of [`encode_records`] output.
pub fn encoded_len(corpus: &Corpus) -> usize {
    corpus
        .counts()
        .map(|(w, c)| (LEN_PREFIX_SIZE + w.len()) * c as usize)
        .sum()
}

/// Result of decoding a record stream.
#[derive(Debug, Default)]
pub struct DecodedRecords {
    pub corpus: Corpus,
    /// Bytes dropped from the tail under [`TruncationPolicy::Discard`].
    pub discarded: usize,
}

/// Iterator over the records in a byte slice.
///
/// Yields each payload, or a single error at the first malformed record and
/// then stops. `base` is added to reported offsets so errors point at the
/// right byte of the file when the stream sits behind a header.
pub struct RecordIter<'a> {
    bytes: &'a [u8],
    pos: usize,
    base: u64,
    failed: bool,
}

impl<'a> RecordIter<'a> {
    pub fn new(bytes: &'a [u8], base: u64) -> Self {
        Self {
            bytes,
            pos: 0,
            base,
            failed: false,
        }
    }

    /// Offset (within the slice) of the next unread record.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos == self.bytes.len() {
            return None;
        }

        let offset = self.base + self.pos as u64;
        let rest = &self.bytes[self.pos..];

        let Some((prefix, payload)) = rest.split_first_chunk::<LEN_PREFIX_SIZE>() else {
            self.failed = true;
            return Some(Err(TallyError::corrupt(
                offset,
                CorruptReason::PartialLength {
                    available: rest.len(),
                },
            )));
        };

        let declared = u64::from_le_bytes(*prefix);
        // INVARIANT: never slice past the end; a length that does not fit in
        // usize is necessarily larger than what remains.
        let len = match usize::try_from(declared) {
            Ok(len) if len <= payload.len() => len,
            _ => {
                self.failed = true;
                return Some(Err(TallyError::corrupt(
                    offset,
                    CorruptReason::TruncatedPayload {
                        declared,
                        available: payload.len(),
                    },
                )));
            }
        };

        self.pos += LEN_PREFIX_SIZE + len;
        Some(Ok(&payload[..len]))
    }
}

/// Decode a full record stream into a corpus.
pub fn decode_records(bytes: &[u8], base: u64, policy: TruncationPolicy) -> Result<DecodedRecords> {
    let mut corpus = Corpus::new();
    let mut records = RecordIter::new(bytes, base);
    let mut failure = None;

    for record in records.by_ref() {
        match record {
            Ok(word) => {
                corpus.insert(word.to_vec());
            }
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    let discarded = match failure {
        None => 0,
        Some(err) if policy == TruncationPolicy::Discard => {
            let discarded = bytes.len() - records.position();
            tracing::warn!(
                "discarding {} trailing bytes of corpus: {}",
                discarded,
                err
            );
            discarded
        }
        Some(err) => return Err(err),
    };

    Ok(DecodedRecords { corpus, discarded })
}
