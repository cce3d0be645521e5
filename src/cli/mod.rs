// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the wordtally command-line interface.
//!
//! With no subcommand, wordtally does what the harness expects: read one word
//! from stdin, add it to the corpus, exit. `report` and `inspect` are for the
//! humans looking at the result afterwards and never modify the corpus.
//!
//! Store options are global so they can go before or after the subcommand,
//! and each has an environment variable so a harness can set them once.

pub mod display;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use wordtally::{Format, StoreConfig, TruncationPolicy, DEFAULT_CORPUS_PATH, DEFAULT_MARKER};

#[derive(Parser)]
#[command(
    name = "wordtally",
    about = "Record fuzzer outputs into a persistent multiset and report their distribution",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Exit status to use when the marker file is missing
    ///
    /// Defaults to 0 so existing harnesses keep treating a misplaced run as
    /// "nothing new". Set it to tell the two cases apart by status alone.
    #[arg(long, env = "WORDTALLY_SKIPPED_STATUS", default_value = "0", global = true)]
    pub skipped_status: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args)]
pub struct StoreArgs {
    /// Project root (must contain the marker file) [default: current directory]
    #[arg(long, env = "WORDTALLY_ROOT", global = true)]
    pub root: Option<PathBuf>,

    /// Marker filename proving the root is the project root
    #[arg(long, env = "WORDTALLY_MARKER", default_value = DEFAULT_MARKER, global = true)]
    pub marker: String,

    /// Corpus file, relative to the root unless absolute
    #[arg(long, env = "WORDTALLY_CORPUS", default_value = DEFAULT_CORPUS_PATH, global = true)]
    pub corpus: PathBuf,

    /// Container format to write (legacy, framed) [default: keep existing]
    #[arg(long, env = "WORDTALLY_FORMAT", global = true)]
    pub format: Option<Format>,

    /// What to do with a truncated trailing record (fail, discard)
    #[arg(long, env = "WORDTALLY_ON_TRUNCATION", default_value = "fail", global = true)]
    pub on_truncation: TruncationPolicy,
}

impl StoreArgs {
    pub fn to_config(&self) -> StoreConfig {
        let root = self.root.clone().unwrap_or_else(|| PathBuf::from("."));
        let mut config = StoreConfig::new(root)
            .with_marker(self.marker.clone())
            .with_corpus(self.corpus.clone())
            .with_truncation_policy(self.on_truncation);
        if let Some(format) = self.format {
            config = config.with_format(format);
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read one word from stdin and add it to the corpus (the default)
    Record,

    /// Print the distribution of recorded words, rarest first
    Report {
        /// Only show the N most repeated words
        #[arg(short, long)]
        limit: Option<usize>,

        /// Bytes of each word to show
        #[arg(long, default_value = "50")]
        width: usize,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Inspect the corpus file structure
    Inspect {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}
