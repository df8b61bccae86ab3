//! Treetally: per-subcorpus frequency tables from dependency parses
//!
//! A corpus is a directory of numerically named subcorpora (usually years)
//! holding CoNLL-U files. An interrogation matches a query against every
//! file, normalizes the matches and tabulates entry counts per subcorpus.
//! Core implementation in Rust with optional Python bindings.

// Input
pub mod conllu; // CoNLL-U file parsing
pub mod discover; // Numeric subcorpus directories
pub mod matcher; // Query matching over dependency trees
pub mod tree; // Sentence and token structures

// Counting
pub mod counter; // Per-subcorpus entry counts
pub mod lemma; // Part-of-speech hints and lookup lemmatizer
pub mod normalize; // Match normalization
pub mod pipeline; // End-to-end interrogation (discover + match + count + tabulate)
pub mod tabulate; // Cross-subcorpus table

// Editing and output
pub mod editor;
pub mod output;
pub mod rank;
pub mod threshold;

pub mod config;
pub mod error;

// Python bindings
#[cfg(feature = "pyo3")]
pub mod python;

// Re-exports for convenience
pub use config::TallyConfig;
pub use conllu::CoNLLUReader;
pub use counter::{SubcorpusCounts, count_subcorpus};
pub use discover::{Subcorpus, SubcorpusId, discover_subcorpora};
pub use error::{Result, TallyError};
pub use lemma::{Lemmatizer, LookupLemmatizer, PosTag};
pub use matcher::{DependencyMatcher, ExtractMode, Matcher, MatcherError, RawMatch};
pub use normalize::Normalizer;
pub use pipeline::{CancelToken, Interrogation, MatcherPolicy, RunOptions, interrogate};
pub use rank::SortBy;
pub use tabulate::{Table, TableRow, Tabulator, tabulate};
pub use threshold::{Threshold, ThresholdLevel};
