// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for legacy record stream decoding.
//!
//! Every byte of a corpus file can be a length prefix. A prefix claiming
//! 2^63 bytes must be reported as corruption, not allocated.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wordtally::binary::{decode_records, encode_records, TruncationPolicy, LEN_PREFIX_SIZE};

fuzz_target!(|data: &[u8]| {
    // Property 1: neither policy ever panics
    let strict = decode_records(data, 0, TruncationPolicy::Fail);
    let lenient = decode_records(data, 0, TruncationPolicy::Discard)
        .expect("Discard policy never fails on a legacy stream");

    // Property 2: strict and lenient agree exactly when nothing was discarded
    assert!(lenient.discarded <= data.len());
    match &strict {
        Ok(decoded) => {
            assert_eq!(lenient.discarded, 0);
            assert_eq!(decoded.corpus, lenient.corpus);
        }
        Err(e) => {
            assert!(e.is_corrupt(), "Only corruption errors expected: {}", e);
            assert!(lenient.discarded > 0);
        }
    }

    // Property 3: the salvaged corpus accounts for every kept byte
    let payload: usize = lenient.corpus.iter().map(<[u8]>::len).sum();
    let kept = lenient.corpus.len() as usize * LEN_PREFIX_SIZE + payload;
    assert_eq!(kept + lenient.discarded, data.len());

    // Property 4: re-encoding the salvage decodes cleanly to the same multiset
    let reencoded = encode_records(&lenient.corpus);
    assert_eq!(reencoded.len(), kept);
    let redecoded = decode_records(&reencoded, 0, TruncationPolicy::Fail)
        .expect("Re-encoding of a decoded corpus should always decode");
    assert_eq!(redecoded.corpus, lenient.corpus);
});
