// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Reading the new word.
//!
//! The whole input stream is one word, however long, whatever bytes. Zero
//! bytes is a valid word too.

use std::io::{self, Read};

use crate::corpus::Word;

/// Read `reader` to end-of-stream as a single word.
pub fn read_word<R: Read>(mut reader: R) -> io::Result<Word> {
    let mut word = Vec::new();
    reader.read_to_end(&mut word)?;
    Ok(word)
}
