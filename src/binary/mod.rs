// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary format for corpus files.
//!
//! The legacy format is as small as a format can be: one length-prefixed
//! record per occurrence, end of file terminates. Every existing corpus file
//! and the Python reader that came with the harness speak it, so it stays
//! the default for new files.
//!
//! The framed format wraps the same record stream in a header and a CRC32
//! footer. It exists for corpora that get copied around between machines,
//! where a silently flipped bit would skew the distribution without anyone
//! noticing.
//!
//! # Security Considerations
//!
//! Corpus files are written by this tool, but they are plain files in a
//! repository that fuzzers run against, so decoding assumes nothing:
//! - Declared lengths are checked against the bytes actually remaining
//! - No allocation is sized from a declared length before that check
//! - CRC32 footer detects corruption/truncation of framed files
//!
//! # Format Overview
//!
//! ```text
//! Legacy:
//! ┌────────────────────────────────────────────────────────────┐
//! │ RECORD* (until EOF)                                        │
//! │   len: u64 (little-endian)                                 │
//! │   payload: [u8; len]                                       │
//! └────────────────────────────────────────────────────────────┘
//!
//! Framed:
//! ┌────────────────────────────────────────────────────────────┐
//! │ HEADER (8 bytes)                                           │
//! │   magic: [u8; 4] = "WTLY"                                  │
//! │   version: u8 = 1                                          │
//! │   reserved: [u8; 3]                                        │
//! ├────────────────────────────────────────────────────────────┤
//! │ RECORD* (same encoding as legacy)                          │
//! ├────────────────────────────────────────────────────────────┤
//! │ FOOTER (8 bytes): crc32 + magic "YLTW"                     │
//! └────────────────────────────────────────────────────────────┘
//! ```

mod header;
mod record;

pub use header::{FramedFooter, FramedHeader, FOOTER_MAGIC, MAGIC, VERSION};
pub use record::{
    append_records, decode_records, encode_record, encode_records, encoded_len, DecodedRecords,
    RecordIter, TruncationPolicy, LEN_PREFIX_SIZE,
};

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::corpus::Corpus;
use crate::error::Result;

/// On-disk container for the record stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Bare records, no header.
    #[default]
    Legacy,
    /// Header + records + CRC32 footer.
    Framed,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Framed => "framed",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "framed" => Ok(Self::Framed),
            other => Err(format!("unknown format '{}' (expected legacy or framed)", other)),
        }
    }
}

/// Sniff the container format from the leading bytes.
pub fn detect_format(bytes: &[u8]) -> Format {
    if bytes.starts_with(&MAGIC) {
        Format::Framed
    } else {
        Format::Legacy
    }
}

/// A decoded corpus file.
#[derive(Debug, Default)]
pub struct Decoded {
    pub corpus: Corpus,
    pub format: Format,
    /// Tail bytes dropped under [`TruncationPolicy::Discard`].
    pub discarded: usize,
}

/// Encode a corpus as a complete file in the given format.
pub fn encode(corpus: &Corpus, format: Format) -> Vec<u8> {
    match format {
        Format::Legacy => encode_records(corpus),
        Format::Framed => {
            let mut buf = Vec::with_capacity(
                FramedHeader::SIZE + encoded_len(corpus) + FramedFooter::SIZE,
            );
            buf.extend_from_slice(&FramedHeader::default().to_bytes());
            append_records(corpus, &mut buf);
            let crc32 = FramedFooter::compute_crc32(&buf);
            buf.extend_from_slice(&FramedFooter { crc32 }.to_bytes());
            buf
        }
    }
}

/// Decode a complete file, detecting its format.
///
/// The truncation policy only governs legacy record streams. A framed file
/// whose footer or checksum is wrong is always rejected: there is no way to
/// tell a clean tail from a damaged one without the checksum.
///
/// A legacy file whose first record is long enough can start with the framed
/// magic. When the framing does not check out, the bytes get a second, strict
/// reading as legacy records, and only if that fails too is the framed error
/// returned.
pub fn decode(bytes: &[u8], policy: TruncationPolicy) -> Result<Decoded> {
    match detect_format(bytes) {
        Format::Legacy => decode_legacy(bytes, policy),
        Format::Framed => decode_framed(bytes).or_else(|framed_err| {
            match decode_legacy(bytes, TruncationPolicy::Fail) {
                Ok(decoded) => {
                    tracing::debug!(
                        "framed magic without valid framing ({}), read as legacy",
                        framed_err
                    );
                    Ok(decoded)
                }
                Err(_) => Err(framed_err),
            }
        }),
    }
}

fn decode_legacy(bytes: &[u8], policy: TruncationPolicy) -> Result<Decoded> {
    let records = decode_records(bytes, 0, policy)?;
    Ok(Decoded {
        corpus: records.corpus,
        format: Format::Legacy,
        discarded: records.discarded,
    })
}

fn decode_framed(bytes: &[u8]) -> Result<Decoded> {
    FramedHeader::read(bytes)?;
    let footer = FramedFooter::read(bytes)?;
    let content = &bytes[..bytes.len() - FramedFooter::SIZE];
    footer.verify(content)?;

    // INVARIANT: records are only parsed once the checksum has passed
    let body = &content[FramedHeader::SIZE..];
    let records = decode_records(body, FramedHeader::SIZE as u64, TruncationPolicy::Fail)?;
    Ok(Decoded {
        corpus: records.corpus,
        format: Format::Framed,
        discarded: 0,
    })
}
