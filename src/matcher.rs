//! Matcher adapters
//!
//! A [`Matcher`] turns one corpus file into the raw match strings the
//! counter consumes. The pipeline treats it as a black box; the only
//! adapter shipped here is [`DependencyMatcher`], which reads CoNLL-U and
//! reports something about every dependent whose form matches a regex.

use crate::conllu::{CoNLLUReader, ParseError};
use crate::error::{Result, TallyError};
use crate::tree::{Relation, Sentence, Token};
use bstr::{BString, ByteVec};
use regex::bytes::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// One unprocessed occurrence returned by a matcher
pub type RawMatch = BString;

/// Failure of a matcher on a single file
#[derive(Debug, Error)]
pub enum MatcherError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CoNLL-U, {0}")]
    Parse(#[from] ParseError),
}

/// Pattern-matching capability invoked once per corpus file
pub trait Matcher: Sync {
    /// The query this matcher was built from
    fn query(&self) -> &str;

    /// All raw matches in one file, in corpus order
    fn match_file(&self, path: &Path) -> Result<Vec<RawMatch>, MatcherError>;
}

/// What to report for each matching dependent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractMode {
    /// The dependent's form
    #[default]
    Word,
    /// The dependent's lemma
    Lemma,
    /// The relation label
    Role,
    /// `label:governor`
    GovernorRole,
    /// The dependent's 1-based token id
    Index,
}

impl ExtractMode {
    pub const ALL: [ExtractMode; 5] = [
        ExtractMode::Word,
        ExtractMode::Lemma,
        ExtractMode::Role,
        ExtractMode::GovernorRole,
        ExtractMode::Index,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ExtractMode::Word => "word",
            ExtractMode::Lemma => "lemma",
            ExtractMode::Role => "role",
            ExtractMode::GovernorRole => "governor-role",
            ExtractMode::Index => "index",
        }
    }

    fn extract(self, sentence: &Sentence, token: &Token, relation: &Relation) -> RawMatch {
        match self {
            ExtractMode::Word => token.form.clone(),
            ExtractMode::Lemma => token.lemma.clone(),
            ExtractMode::Role => relation.label.clone(),
            ExtractMode::GovernorRole => {
                let mut out = relation.label.clone();
                out.push_byte(b':');
                out.push_str(sentence.governor_form(relation));
                out
            }
            ExtractMode::Index => BString::from(token.id.to_string()),
        }
    }
}

impl fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExtractMode {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        ExtractMode::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| {
                TallyError::config(format!(
                    "unknown mode {:?}, expected one of word, lemma, role, governor-role, index",
                    s
                ))
            })
    }
}

/// Regex over dependent forms in CoNLL-U files
///
/// The query is anchored at the start of the form but not at the end,
/// so `risk` also matches `risky`.
#[derive(Debug, Clone)]
pub struct DependencyMatcher {
    query: String,
    regex: Regex,
    mode: ExtractMode,
    enhanced: bool,
}

impl DependencyMatcher {
    pub fn new(query: &str, mode: ExtractMode) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})", query))
            .map_err(|e| TallyError::config(format!("malformed query {:?}: {}", query, e)))?;
        Ok(Self {
            query: query.to_string(),
            regex,
            mode,
            enhanced: false,
        })
    }

    /// Use the enhanced DEPS column where a token has one
    pub fn with_enhanced(mut self, enhanced: bool) -> Self {
        self.enhanced = enhanced;
        self
    }

    pub fn mode(&self) -> ExtractMode {
        self.mode
    }

    /// Raw matches for one sentence
    pub fn match_sentence(&self, sentence: &Sentence, out: &mut Vec<RawMatch>) {
        for token in &sentence.tokens {
            if !self.regex.is_match(&token.form) {
                continue;
            }
            if self.enhanced && !token.deps.is_empty() {
                for relation in &token.deps {
                    out.push(self.mode.extract(sentence, token, relation));
                }
            } else {
                out.push(self.mode.extract(sentence, token, &token.basic_relation()));
            }
        }
    }
}

impl Matcher for DependencyMatcher {
    fn query(&self) -> &str {
        &self.query
    }

    fn match_file(&self, path: &Path) -> Result<Vec<RawMatch>, MatcherError> {
        let mut out = Vec::new();
        for sentence in CoNLLUReader::from_file(path)? {
            self.match_sentence(&sentence?, &mut out);
        }
        Ok(out)
    }
}
