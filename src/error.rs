// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error kinds for the corpus store.
//!
//! Three things can go wrong. The tool runs from the wrong directory (not
//! really an error, the harness just gets a "skipped" outcome). The corpus
//! file is malformed. Or the filesystem refuses an open, read, or write.
//! Only the last two are hard failures, and they get different exit
//! statuses so a driver script can tell "your data is broken" apart from
//! "your disk is full".

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Exit status for a corrupt corpus file (sysexits `EX_DATAERR`).
pub const EXIT_CORRUPT: i32 = 65;

/// Exit status for filesystem failures (sysexits `EX_IOERR`).
pub const EXIT_IO: i32 = 74;

#[derive(Error, Debug)]
pub enum TallyError {
    /// Marker file missing from the configured root.
    #[error("marker file {marker:?} not found in {root}")]
    EnvironmentMismatch { root: PathBuf, marker: String },

    /// The corpus file does not decode.
    #[error("corrupt corpus at byte {offset}: {reason}")]
    CorruptStore { offset: u64, reason: CorruptReason },

    /// Filesystem failure, tagged with the operation and path.
    #[error("{op} {}: {source}", path.display())]
    Io {
        op: IoOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a corpus file was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorruptReason {
    /// Fewer than 8 bytes left where a length prefix should start.
    PartialLength { available: usize },
    /// The declared payload runs past the end of the file.
    TruncatedPayload { declared: u64, available: usize },
    /// Framed file whose header is cut short.
    BadHeader,
    /// Framed file with a version this build does not understand.
    UnsupportedVersion(u8),
    /// Framed file whose footer magic is wrong or missing.
    BadFooter,
    /// Framed file whose checksum does not match its contents.
    ChecksumMismatch { stored: u32, computed: u32 },
}

impl std::fmt::Display for CorruptReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PartialLength { available } => {
                write!(f, "{} trailing bytes, too short for a length prefix", available)
            }
            Self::TruncatedPayload { declared, available } => write!(
                f,
                "record declares {} bytes but only {} remain",
                declared, available
            ),
            Self::BadHeader => write!(f, "missing or invalid header"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported framed version {}", v),
            Self::BadFooter => write!(f, "missing or invalid footer"),
            Self::ChecksumMismatch { stored, computed } => write!(
                f,
                "checksum mismatch (stored {:#010x}, computed {:#010x})",
                stored, computed
            ),
        }
    }
}

/// Filesystem operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Create,
    Read,
    Write,
    Rename,
    Sync,
    Stdin,
}

impl std::fmt::Display for IoOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self {
            Self::Create => "failed to create",
            Self::Read => "failed to read",
            Self::Write => "failed to write",
            Self::Rename => "failed to rename into",
            Self::Sync => "failed to sync",
            Self::Stdin => "failed to read stdin for",
        };
        f.write_str(verb)
    }
}

impl TallyError {
    pub(crate) fn io(op: IoOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(offset: u64, reason: CorruptReason) -> Self {
        Self::CorruptStore { offset, reason }
    }

    /// True for the corruption kind.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptStore { .. })
    }

    /// Process exit status for this error.
    ///
    /// `EnvironmentMismatch` maps to 0: it is a skip, not a failure. Callers
    /// that want a distinct status for skips handle it before getting here.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::EnvironmentMismatch { .. } => 0,
            Self::CorruptStore { .. } => EXIT_CORRUPT,
            Self::Io { .. } => EXIT_IO,
        }
    }
}

pub type Result<T> = std::result::Result<T, TallyError>;
