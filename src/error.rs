//! Error types for interrogations

use crate::discover::SubcorpusId;
use crate::matcher::MatcherError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = TallyError> = std::result::Result<T, E>;

/// Fatal errors of an interrogation
///
/// Any of these aborts the whole run: no partial table is ever returned.
#[derive(Debug, Error)]
pub enum TallyError {
    #[error("subcorpus {subcorpus}: match {lossy:?} is not valid UTF-8")]
    Encoding { subcorpus: SubcorpusId, lossy: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("matcher failed on {}: {source}", path.display())]
    Matcher {
        path: PathBuf,
        #[source]
        source: MatcherError,
    },

    #[error("interrogation cancelled before subcorpus {next}")]
    Cancelled { next: SubcorpusId },

    #[error("invalid config file: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TallyError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        TallyError::Configuration(message.into())
    }
}
