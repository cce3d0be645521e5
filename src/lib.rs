//! Output-distribution tracking for fuzzer benchmarks.
//!
//! A fuzzer under evaluation runs a target over and over. Each time, the
//! target pipes the input it received into `wordtally`, which adds it to a
//! corpus file on disk. After enough runs, the corpus says how diverse the
//! fuzzer really was: how many distinct inputs, and how often it repeated
//! itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  input.rs   │────▶│  store.rs    │────▶│ binary/     │
//! │ (read_word) │     │ (CorpusStore,│     │ (encode,    │
//! │             │     │  record_from)│     │  decode)    │
//! └─────────────┘     └──────────────┘     └─────────────┘
//!                            │                    │
//!                            ▼                    ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                     corpus.rs                        │
//! │  (Corpus multiset, canonical order, distribution)    │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use wordtally::{CorpusStore, Outcome, StoreConfig};
//!
//! let store = CorpusStore::new(StoreConfig::new("."));
//! match store.record_from(std::io::stdin().lock())? {
//!     Outcome::Recorded { multiplicity, .. } => assert!(multiplicity >= 1),
//!     Outcome::Skipped { .. } => eprintln!("not in the project root"),
//! }
//! # Ok::<(), wordtally::TallyError>(())
//! ```

pub mod binary;
pub mod config;
mod corpus;
mod error;
mod input;
mod store;

pub use binary::{Decoded, Format, TruncationPolicy};
pub use config::{StoreConfig, DEFAULT_CORPUS_PATH, DEFAULT_MARKER};
pub use corpus::{Corpus, DistributionEntry, Word};
pub use error::{CorruptReason, IoOp, Result, TallyError, EXIT_CORRUPT, EXIT_IO};
pub use input::read_word;
pub use store::{CorpusStore, Outcome, Snapshot};
