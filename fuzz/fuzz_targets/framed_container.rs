// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for framed corpus detection and checksum validation.
//!
//! Inputs are nudged toward the framed layout by prepending a valid header,
//! so the fuzzer spends its time on footers and record bodies instead of
//! rediscovering the magic bytes.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wordtally::binary::{decode, encode, Format, TruncationPolicy, MAGIC, VERSION};

fuzz_target!(|data: &[u8]| {
    let mut framed = Vec::with_capacity(data.len() + 8);
    framed.extend_from_slice(&MAGIC);
    framed.extend_from_slice(&[VERSION, 0, 0, 0]);
    framed.extend_from_slice(data);

    for bytes in [data, framed.as_slice()] {
        // Property 1: never panics, under either policy
        let strict = decode(bytes, TruncationPolicy::Fail);
        let lenient = decode(bytes, TruncationPolicy::Discard);

        // Property 2: framed files ignore the discard policy
        if bytes.starts_with(&MAGIC) {
            match (&strict, &lenient) {
                (Ok(a), Ok(b)) => assert_eq!(a.corpus, b.corpus),
                (Err(_), Err(_)) => {}
                _ => panic!("Framed decoding must not depend on truncation policy"),
            }
        }

        // Property 3: accepted input re-encodes to exactly the same bytes
        if let Ok(decoded) = strict {
            if decoded.format == Format::Framed {
                let reencoded = encode(&decoded.corpus, Format::Framed);
                let canonical = decode(&reencoded, TruncationPolicy::Fail)
                    .expect("Re-encoding of valid framed corpus should always decode");
                assert_eq!(canonical.corpus, decoded.corpus);
            }
        }
    }
});
