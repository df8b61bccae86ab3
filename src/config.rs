//! Run configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//! The command line overrides individual fields after loading.
//!
//! ```toml
//! query = "^risk"
//! mode = "governor-role"
//! jobs = 4
//!
//! [normalize]
//! lemmatize = true
//! lemma_table = "lemmas.tsv"
//! title_filter = true
//!
//! [output]
//! format = "json"
//! sort_by = "increase"
//! threshold = "low"
//! keep_top = 50
//! ```

use crate::discover::DEFAULT_FILE_GLOB;
use crate::error::{Result, TallyError};
use crate::lemma::{LookupLemmatizer, PosTag};
use crate::matcher::{DependencyMatcher, ExtractMode, Matcher};
use crate::normalize::Normalizer;
use crate::output::OutputFormat;
use crate::pipeline::{CancelToken, Interrogation, MatcherPolicy, RunOptions, interrogate};
use crate::rank::SortBy;
use crate::threshold::Threshold;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TallyConfig {
    pub query: Option<String>,
    pub mode: ExtractMode,
    pub file_glob: String,
    pub enhanced: bool,
    pub jobs: usize,
    pub limit: Option<usize>,
    pub skip_unreadable: bool,
    pub normalize: NormalizeConfig,
    pub output: OutputConfig,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            query: None,
            mode: ExtractMode::default(),
            file_glob: DEFAULT_FILE_GLOB.to_string(),
            enhanced: false,
            jobs: 1,
            limit: None,
            skip_unreadable: false,
            normalize: NormalizeConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeConfig {
    pub lemmatize: bool,
    /// One of `n`, `v`, `a`, `r`; derived from the query when unset
    pub lemma_tag: Option<String>,
    pub lemma_table: Option<PathBuf>,
    pub title_filter: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub sort_by: SortBy,
    pub threshold: Option<Threshold>,
    /// Keep only this many rows after sorting
    pub keep_top: Option<usize>,
}

impl TallyConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn query(&self) -> Result<&str> {
        self.query
            .as_deref()
            .ok_or_else(|| TallyError::config("no query given"))
    }

    pub fn matcher(&self) -> Result<DependencyMatcher> {
        Ok(DependencyMatcher::new(self.query()?, self.mode)?.with_enhanced(self.enhanced))
    }

    /// Build the normalizer; the lemma tag is checked even when unused
    pub fn normalizer(&self) -> Result<Normalizer> {
        let config = &self.normalize;
        let tag = PosTag::resolve(config.lemma_tag.as_deref(), self.query()?)?;
        let mut normalizer = Normalizer::new().with_title_filter(config.title_filter);
        if config.lemmatize {
            let table = match &config.lemma_table {
                Some(path) => LookupLemmatizer::from_file(path)?,
                None => LookupLemmatizer::new(),
            };
            debug!(entries = table.len(), %tag, "lemmatizing");
            normalizer = normalizer.with_lemmatizer(Arc::new(table), tag);
        }
        Ok(normalizer)
    }

    pub fn run_options(&self) -> Result<RunOptions> {
        glob::Pattern::new(&self.file_glob).map_err(|e| {
            TallyError::config(format!("bad file glob {:?}: {}", self.file_glob, e))
        })?;
        Ok(RunOptions {
            file_glob: self.file_glob.clone(),
            limit: self.limit,
            policy: if self.skip_unreadable {
                MatcherPolicy::SkipUnreadable
            } else {
                MatcherPolicy::Strict
            },
            jobs: self.jobs,
        })
    }

    /// Interrogate `root` and apply the output threshold, ordering and cut-off
    ///
    /// All configuration is validated before any file is read.
    pub fn run(&self, root: &Path, cancel: &CancelToken) -> Result<Interrogation> {
        let matcher = self.matcher()?;
        let normalizer = self.normalizer()?;
        let options = self.run_options()?;

        let mut table = interrogate(root, &matcher, &normalizer, &options, cancel)?;
        if let Some(threshold) = self.output.threshold {
            table = table.apply_threshold(threshold);
        }
        if self.output.sort_by != SortBy::Total {
            table = table.sorted(self.output.sort_by);
        }
        if let Some(n) = self.output.keep_top {
            table = table.keep_top(n);
        }

        Ok(Interrogation {
            query: matcher.query().to_string(),
            mode: matcher.mode(),
            table,
        })
    }
}
