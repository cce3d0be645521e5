//! Negative tests for corpus file validation.
//!
//! A corpus that does not decode must never be partially loaded and then
//! overwritten: that would quietly drop observations and skew the
//! distribution. These tests check the loud failure, the untouched file, and
//! the opt-in salvage path.

use std::fs;

use crate::common::{corpus_of, raw_record, Project};
use wordtally::binary::{decode, encode, Format, TruncationPolicy, LEN_PREFIX_SIZE};
use wordtally::{Corpus, CorpusStore, CorruptReason, StoreConfig, TallyError, EXIT_CORRUPT};

/// Final record declares more bytes than remain
#[test]
fn test_truncated_tail_is_corrupt() {
    let project = Project::new();
    let mut bytes = [raw_record(b"one"), raw_record(b"two")].concat();
    bytes.truncate(bytes.len() - 1);
    project.write_raw(&bytes);

    let err = project.store().record_word(b"three".to_vec()).unwrap_err();
    match &err {
        TallyError::CorruptStore { offset, reason } => {
            assert_eq!(*offset, (LEN_PREFIX_SIZE + 3) as u64);
            assert_eq!(
                *reason,
                CorruptReason::TruncatedPayload {
                    declared: 3,
                    available: 2
                }
            );
        }
        other => panic!("expected CorruptStore, got {:?}", other),
    }
    assert_eq!(err.exit_code(), EXIT_CORRUPT);
    assert_eq!(fs::read(project.corpus_path()).unwrap(), bytes);
}

/// Trailing bytes too short to hold a length prefix
#[test]
fn test_partial_prefix_is_corrupt() {
    for tail in 1..LEN_PREFIX_SIZE {
        let mut bytes = raw_record(b"ok");
        bytes.extend(std::iter::repeat(0u8).take(tail));
        let err = decode(&bytes, TruncationPolicy::Fail).unwrap_err();
        assert!(
            matches!(
                err,
                TallyError::CorruptStore {
                    reason: CorruptReason::PartialLength { .. },
                    ..
                }
            ),
            "tail of {} bytes",
            tail
        );
    }
}

/// A lone huge length prefix must not allocate or panic
#[test]
fn test_absurd_length_rejected() {
    let bytes = (u64::MAX / 2).to_le_bytes();
    assert!(decode(&bytes, TruncationPolicy::Fail).unwrap_err().is_corrupt());
}

/// Discard drops the tail, logs, and the next persist writes a clean file
#[test]
fn test_discard_policy_salvages_prefix() {
    let project = Project::new();
    let mut bytes = [raw_record(b"keep"), raw_record(b"also")].concat();
    bytes.extend_from_slice(&100u64.to_le_bytes());
    bytes.extend_from_slice(b"short");
    project.write_raw(&bytes);

    let store = CorpusStore::new(
        StoreConfig::new(project.root()).with_truncation_policy(TruncationPolicy::Discard),
    );
    store.record_word(b"new".to_vec()).unwrap();

    assert_eq!(
        project.read_corpus(),
        corpus_of(&[b"also", b"keep", b"new"])
    );
}

/// Framed files get checksum protection
#[test]
fn test_framed_corruption_detected() {
    let project = Project::new();
    let mut bytes = encode(&corpus_of(&[b"alpha", b"beta"]), Format::Framed);
    let last_payload_byte = bytes.len() - 9;
    bytes[last_payload_byte] ^= 0xff;
    project.write_raw(&bytes);

    let err = project.store().load().unwrap_err();
    assert!(matches!(
        err,
        TallyError::CorruptStore {
            reason: CorruptReason::ChecksumMismatch { .. },
            ..
        }
    ));
}

/// Unknown framed versions are refused rather than guessed at
#[test]
fn test_framed_future_version_rejected() {
    let mut bytes = encode(&corpus_of(&[b"x"]), Format::Framed);
    bytes[4] = 2;
    let err = decode(&bytes, TruncationPolicy::Fail).unwrap_err();
    assert!(matches!(
        err,
        TallyError::CorruptStore {
            reason: CorruptReason::UnsupportedVersion(2),
            ..
        }
    ));
}

/// Snapshots report corruption without touching the file
#[test]
fn test_snapshot_reports_corruption() {
    let project = Project::new();
    let bytes = [raw_record(b"a"), vec![9, 0]].concat();
    project.write_raw(&bytes);

    assert!(project.store().snapshot().unwrap_err().is_corrupt());
    assert_eq!(fs::read(project.corpus_path()).unwrap(), bytes);
}

/// A legacy file whose first record length spells the framed magic still
/// reads back as legacy
#[test]
#[ignore = "allocates several GB"]
fn test_legacy_file_starting_with_magic_roundtrips() {
    let project = Project::new();
    let huge = vec![0u8; u32::from_le_bytes(*b"WTLY") as usize];
    let corpus: Corpus = [huge.clone()].into_iter().collect();
    let bytes = encode(&corpus, Format::Legacy);
    assert!(bytes.starts_with(b"WTLY"));

    let decoded = decode(&bytes, TruncationPolicy::Fail).unwrap();
    assert_eq!(decoded.format, Format::Legacy);
    assert_eq!(decoded.corpus.multiplicity(&huge), 1);
    drop(decoded);

    // The store keeps accepting words instead of wedging on exit 65
    project.write_raw(&bytes);
    drop(bytes);
    project.store().record_word(b"next".to_vec()).unwrap();
    let reloaded = project.read_corpus();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.multiplicity(&huge), 1);
}
