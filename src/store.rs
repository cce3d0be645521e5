// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The corpus file and its read-merge-write cycle.
//!
//! One invocation of the harness is one call to [`CorpusStore::record_from`]:
//! check that we are in the project root, load the corpus (creating an empty
//! file if there is none), read the new word, insert it, write everything
//! back. The file is the only state that survives between runs.
//!
//! Persist always rewrites the whole file. Records are emitted in canonical
//! order, so two runs that end with the same multiset leave byte-identical
//! files. The rewrite goes through a sibling temp file and a rename, so an
//! interrupted run leaves either the old corpus or the new one, never half
//! of each.
//! Temp files orphaned by a killed run are swept by a later persist.
//!
//! Nothing here locks the file. Two concurrent invocations against the same
//! corpus can lose an update; the harness is expected to run them one at a
//! time.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::binary::{self, Decoded, Format};
use crate::config::StoreConfig;
use crate::corpus::{Corpus, Word};
use crate::error::{IoOp, Result, TallyError};
use crate::input::read_word;

/// Age after which a leftover temp file is assumed abandoned.
const STALE_TEMP_AGE: Duration = Duration::from_secs(60);

/// What a record cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The word was inserted and the corpus rewritten.
    Recorded {
        /// Multiplicity of the new word after insertion.
        multiplicity: u64,
        /// Total occurrences in the corpus after insertion.
        total: u64,
        distinct: usize,
    },
    /// Marker file absent: nothing was read or written.
    Skipped { marker: PathBuf },
}

/// A corpus as found on disk, without side effects.
#[derive(Debug)]
pub struct Snapshot {
    pub decoded: Decoded,
    /// File size in bytes.
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct CorpusStore {
    config: StoreConfig,
}

impl CorpusStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn corpus_path(&self) -> PathBuf {
        self.config.corpus_path()
    }

    /// Fail with `EnvironmentMismatch` unless the marker file exists.
    pub fn check_root(&self) -> Result<()> {
        if self.config.marker_path().exists() {
            Ok(())
        } else {
            Err(TallyError::EnvironmentMismatch {
                root: self.config.root.clone(),
                marker: self.config.marker.clone(),
            })
        }
    }

    /// Load the corpus, creating an empty file if none exists yet.
    pub fn load(&self) -> Result<Decoded> {
        let path = self.corpus_path();
        if !path.exists() {
            create_empty(&path)?;
            tracing::debug!("created empty corpus at {}", path.display());
            return Ok(Decoded::default());
        }
        let bytes = fs::read(&path).map_err(|e| TallyError::io(IoOp::Read, &path, e))?;
        let decoded = binary::decode(&bytes, self.config.on_truncation)?;
        tracing::debug!(
            "loaded {} words ({} distinct, {} format) from {}",
            decoded.corpus.len(),
            decoded.corpus.distinct(),
            decoded.format,
            path.display()
        );
        Ok(decoded)
    }

    /// Read the corpus if it exists. Never creates or modifies anything.
    pub fn snapshot(&self) -> Result<Option<Snapshot>> {
        let path = self.corpus_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TallyError::io(IoOp::Read, &path, e)),
        };
        let decoded = binary::decode(&bytes, self.config.on_truncation)?;
        Ok(Some(Snapshot {
            decoded,
            size: bytes.len() as u64,
        }))
    }

    /// Replace the corpus file with `corpus` encoded as `format`.
    pub fn persist(&self, corpus: &Corpus, format: Format) -> Result<()> {
        let path = self.corpus_path();
        let dir = parent_dir(&path);
        let prefix = temp_prefix(&path);
        sweep_stale_temps(dir, &prefix);

        let mut tmp = tempfile::Builder::new()
            .prefix(&prefix)
            .tempfile_in(dir)
            .map_err(|e| TallyError::io(IoOp::Create, dir, e))?;
        // Keep the mode the corpus already has instead of the temp file's 0600
        if let Ok(meta) = fs::metadata(&path) {
            if let Err(e) = tmp.as_file().set_permissions(meta.permissions()) {
                tracing::debug!("could not copy permissions of {}: {}", path.display(), e);
            }
        }
        tmp.write_all(&binary::encode(corpus, format))
            .map_err(|e| TallyError::io(IoOp::Write, tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| TallyError::io(IoOp::Sync, tmp.path(), e))?;

        // INVARIANT: the target is only ever replaced by a complete, synced file
        tmp.persist(&path)
            .map_err(|e| TallyError::io(IoOp::Rename, &path, e.error))?;
        sync_parent(&path);

        tracing::debug!(
            "persisted {} words ({} format) to {}",
            corpus.len(),
            format,
            path.display()
        );
        Ok(())
    }

    /// Insert one word and rewrite the corpus.
    pub fn record_word(&self, word: Word) -> Result<Outcome> {
        self.record_from(&word[..])
    }

    /// One full harness cycle: root check, load, read `input`, insert, persist.
    ///
    /// `input` is only read once the root check and load have succeeded.
    pub fn record_from<R: Read>(&self, input: R) -> Result<Outcome> {
        match self.check_root() {
            Ok(()) => {}
            Err(TallyError::EnvironmentMismatch { .. }) => {
                return Ok(Outcome::Skipped {
                    marker: self.config.marker_path(),
                });
            }
            Err(err) => return Err(err),
        }

        let Decoded {
            mut corpus,
            format: found,
            ..
        } = self.load()?;
        let path = self.corpus_path();
        // INVARIANT: input is not consumed until the root check and load succeed
        let word = read_word(input).map_err(|e| TallyError::io(IoOp::Stdin, &path, e))?;
        let word_len = word.len();

        let multiplicity = corpus.insert(word);
        let format = self.config.format.unwrap_or(found);
        self.persist(&corpus, format)?;

        tracing::info!(
            "recorded {}-byte word (multiplicity {}, {} total)",
            word_len,
            multiplicity,
            corpus.len()
        );
        Ok(Outcome::Recorded {
            multiplicity,
            total: corpus.len(),
            distinct: corpus.distinct(),
        })
    }
}

fn create_empty(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TallyError::io(IoOp::Create, parent, e))?;
    }
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map(drop)
        .map_err(|e| TallyError::io(IoOp::Create, path, e))
}

/// Directory holding `path`, so temp files and rename stay on one filesystem.
fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// `.words.txt.tmp-` for a corpus named `words.txt`.
fn temp_prefix(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "corpus".to_string());
    format!(".{}.tmp-", name)
}

/// Remove temp files left behind by runs that were killed mid-persist.
///
/// Only files older than [`STALE_TEMP_AGE`] go, so a concurrent run's live
/// temp file is left alone. Best effort: failures are logged and ignored.
fn sweep_stale_temps(dir: &Path, prefix: &str) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        if !entry.file_name().to_string_lossy().starts_with(prefix) {
            continue;
        }
        let stale = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .is_some_and(|age| age >= STALE_TEMP_AGE);
        if !stale {
            continue;
        }
        let path = entry.path();
        match fs::remove_file(&path) {
            Ok(()) => tracing::debug!("removed stale temp file {}", path.display()),
            Err(e) => tracing::debug!("could not remove {}: {}", path.display(), e),
        }
    }
}

/// Make the rename durable. Best effort: not every platform can open a
/// directory for syncing.
fn sync_parent(path: &Path) {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return;
    };
    if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
        tracing::debug!("could not sync {}: {}", parent.display(), e);
    }
}
