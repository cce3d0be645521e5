// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Store configuration.
//!
//! The harness always ran the tool from the project root and found the
//! corpus at a fixed relative path, with `Cargo.toml` as the proof that it
//! was in the right place. Those are the defaults here, but every one of
//! them is a plain value so tests (and other harnesses) can point the store
//! at a scratch directory.

use std::path::{Path, PathBuf};

use crate::binary::{Format, TruncationPolicy};

/// Marker file expected in the project root.
pub const DEFAULT_MARKER: &str = "Cargo.toml";

/// Corpus location relative to the project root.
pub const DEFAULT_CORPUS_PATH: &str = "resources/test_output_distribution/words.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory that must contain the marker file.
    pub root: PathBuf,
    /// Marker filename, checked for existence only.
    pub marker: String,
    /// Corpus file. Relative paths resolve against `root`.
    pub corpus: PathBuf,
    /// Container to write. `None` keeps whatever the file already uses.
    pub format: Option<Format>,
    pub on_truncation: TruncationPolicy,
}

impl StoreConfig {
    /// Defaults rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            marker: DEFAULT_MARKER.to_string(),
            corpus: PathBuf::from(DEFAULT_CORPUS_PATH),
            format: None,
            on_truncation: TruncationPolicy::Fail,
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_corpus(mut self, corpus: impl Into<PathBuf>) -> Self {
        self.corpus = corpus.into();
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_truncation_policy(mut self, policy: TruncationPolicy) -> Self {
        self.on_truncation = policy;
        self
    }

    /// Absolute (or root-relative) path of the marker file.
    pub fn marker_path(&self) -> PathBuf {
        self.root.join(&self.marker)
    }

    /// Resolved corpus path.
    pub fn corpus_path(&self) -> PathBuf {
        resolve(&self.root, &self.corpus)
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
