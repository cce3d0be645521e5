// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Framed container header and footer.
//!
//! The header is 8 bytes: magic, version, and three reserved zeros so the
//! record stream starts on an 8-byte boundary. The footer is 8 bytes too: a
//! CRC32 over everything before it, plus a magic number ("YLTW", the header
//! magic reversed). If the footer is wrong, something got corrupted or
//! truncated. Don't trust the data.
//!
//! Legacy files have neither. They start directly with a length prefix, so
//! a legacy file begins with "WTLY" only if its first record holds at least
//! 0x594C5457 bytes (about 1.4 GB). Sniffing the magic is therefore a strong
//! hint, not proof: `decode` falls back to the legacy reading when the
//! framing does not check out.

use crc32fast::Hasher as Crc32Hasher;

use crate::error::{CorruptReason, Result, TallyError};

/// Magic bytes: "WTLY" in ASCII (header)
pub const MAGIC: [u8; 4] = *b"WTLY";

/// Footer magic: "YLTW" (reversed, marks valid file end)
pub const FOOTER_MAGIC: [u8; 4] = *b"YLTW";

/// Current framed format version
pub const VERSION: u8 = 1;

/// Framed file header (8 bytes fixed size)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedHeader {
    pub version: u8,
}

impl Default for FramedHeader {
    fn default() -> Self {
        Self { version: VERSION }
    }
}

impl FramedHeader {
    // 4 (magic) + 1 (version) + 3 (reserved) = 8
    pub const SIZE: usize = 8;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE]; // last 3 reserved
        bytes[..4].copy_from_slice(&MAGIC);
        bytes[4] = self.version;
        bytes
    }

    /// Parse the header from the start of `bytes`.
    ///
    /// Callers sniff [`MAGIC`] first; this only validates what follows it.
    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE || bytes[..4] != MAGIC {
            return Err(TallyError::corrupt(0, CorruptReason::BadHeader));
        }
        let version = bytes[4];
        if version != VERSION {
            return Err(TallyError::corrupt(
                4,
                CorruptReason::UnsupportedVersion(version),
            ));
        }
        Ok(Self { version })
    }
}

/// Footer with CRC32 checksum and magic number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedFooter {
    /// CRC32 of header + records (everything before footer)
    pub crc32: u32,
}

impl FramedFooter {
    pub const SIZE: usize = 8; // 4 bytes CRC32 + 4 bytes magic

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[..4].copy_from_slice(&self.crc32.to_le_bytes());
        bytes[4..].copy_from_slice(&FOOTER_MAGIC);
        bytes
    }

    /// Read the footer from the last 8 bytes of a whole framed file.
    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FramedHeader::SIZE + Self::SIZE {
            return Err(TallyError::corrupt(
                bytes.len() as u64,
                CorruptReason::BadFooter,
            ));
        }

        // INVARIANT: header and footer never overlap
        let footer_start = bytes.len() - Self::SIZE;

        if bytes[footer_start + 4..] != FOOTER_MAGIC {
            return Err(TallyError::corrupt(
                footer_start as u64,
                CorruptReason::BadFooter,
            ));
        }

        let crc32 = u32::from_le_bytes([
            bytes[footer_start],
            bytes[footer_start + 1],
            bytes[footer_start + 2],
            bytes[footer_start + 3],
        ]);

        Ok(Self { crc32 })
    }

    /// Compute CRC32 over the given bytes
    pub fn compute_crc32(data: &[u8]) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }

    /// Check the stored checksum against the content it covers.
    pub fn verify(&self, content: &[u8]) -> Result<()> {
        let computed = Self::compute_crc32(content);
        if computed != self.crc32 {
            return Err(TallyError::corrupt(
                content.len() as u64,
                CorruptReason::ChecksumMismatch {
                    stored: self.crc32,
                    computed,
                },
            ));
        }
        Ok(())
    }
}
