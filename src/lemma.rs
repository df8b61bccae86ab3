//! Lemmatization
//!
//! The lemmatizer itself is an external capability behind [`Lemmatizer`].
//! This module owns the part-of-speech hint and a table-driven adapter.

use crate::error::{Result, TallyError};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Part-of-speech hint passed to the lemmatizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PosTag {
    #[default]
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl PosTag {
    pub fn code(self) -> char {
        match self {
            PosTag::Noun => 'n',
            PosTag::Verb => 'v',
            PosTag::Adjective => 'a',
            PosTag::Adverb => 'r',
        }
    }

    /// Map a Penn treebank tag (`JJ`, `VBD`, `NNS`, `RB`, ...) to a hint
    pub fn from_treebank(tag: &str) -> Option<PosTag> {
        let valid = (2..=4).contains(&tag.len()) && tag.bytes().all(|b| b.is_ascii_uppercase());
        if !valid {
            return None;
        }
        match tag.as_bytes()[0] {
            b'J' => Some(PosTag::Adjective),
            b'V' => Some(PosTag::Verb),
            b'N' => Some(PosTag::Noun),
            b'R' => Some(PosTag::Adverb),
            _ => None,
        }
    }

    /// Guess the hint from the leading word of a query such as `/VB.?/ < ...`
    pub fn from_query(query: &str) -> Option<PosTag> {
        let rest = query.trim_start_matches(|c: char| !c.is_ascii_alphabetic());
        let end = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        PosTag::from_treebank(&rest[..end])
    }

    /// Explicit tag first, then the query, then noun
    pub fn resolve(explicit: Option<&str>, query: &str) -> Result<PosTag> {
        match explicit {
            Some(code) => code.parse(),
            None => Ok(PosTag::from_query(query).unwrap_or_default()),
        }
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for PosTag {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "n" => Ok(PosTag::Noun),
            "v" => Ok(PosTag::Verb),
            "a" => Ok(PosTag::Adjective),
            "r" => Ok(PosTag::Adverb),
            _ => Err(TallyError::config(format!(
                "part-of-speech tag {:?} not recognised, must be 'a', 'v', 'r' or 'n'",
                s
            ))),
        }
    }
}

impl TryFrom<String> for PosTag {
    type Error = TallyError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<PosTag> for String {
    fn from(tag: PosTag) -> String {
        tag.to_string()
    }
}

/// Reduces an inflected form to its dictionary form
pub trait Lemmatizer: Send + Sync {
    fn lemmatize(&self, word: &str, tag: PosTag) -> String;
}

/// Lemmatizer backed by a lookup table
///
/// Table lines are `form<TAB>lemma` or `form<TAB>tag<TAB>lemma`; blank
/// lines and `#` comments are ignored. Unknown words come back unchanged.
#[derive(Debug, Clone, Default)]
pub struct LookupLemmatizer {
    tagged: FxHashMap<(String, PosTag), String>,
    untagged: FxHashMap<String, String>,
}

impl LookupLemmatizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, form: &str, tag: Option<PosTag>, lemma: &str) {
        let form = form.to_lowercase();
        match tag {
            Some(tag) => {
                self.tagged.insert((form, tag), lemma.to_string());
            }
            None => {
                self.untagged.insert(form, lemma.to_string());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tagged.len() + self.untagged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn from_tsv(text: &str) -> Result<Self> {
        let mut table = Self::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            match fields.as_slice() {
                [form, lemma] => table.insert(form, None, lemma),
                [form, tag, lemma] => table.insert(form, Some(tag.parse()?), lemma),
                _ => {
                    return Err(TallyError::config(format!(
                        "lemma table line {}: expected 2 or 3 tab-separated fields",
                        i + 1
                    )));
                }
            }
        }
        Ok(table)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_tsv(&std::fs::read_to_string(path)?)
    }
}

impl Lemmatizer for LookupLemmatizer {
    fn lemmatize(&self, word: &str, tag: PosTag) -> String {
        let key = word.to_lowercase();
        if let Some(lemma) = self.tagged.get(&(key.clone(), tag)) {
            return lemma.clone();
        }
        match self.untagged.get(&key) {
            Some(lemma) => lemma.clone(),
            None => word.to_string(),
        }
    }
}
