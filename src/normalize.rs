//! Normalization of raw matches into counted entries
//!
//! Order of operations:
//! 1. decode as UTF-8 (failure is reported, never skipped)
//! 2. optional lemmatization, after mapping contraction fragments
//! 3. strip leading characters other than letters, `(` and `'`
//! 4. lowercase
//! 5. optional removal of a leading title or honorific
//!
//! Steps 3-5 repeat until nothing changes, so normalizing an entry twice
//! gives the same result as normalizing it once.

use crate::lemma::{Lemmatizer, PosTag};
use bstr::{ByteSlice, Utf8Error};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Leading tokens removed by the title filter
pub const TITLES: &[&str] = &[
    "admiral", "archbishop", "alan", "merrill", "sarah", "queen", "king", "sen",
    "chancellor", "prime minister", "cardinal", "bishop", "father", "hon", "rev",
    "reverend", "pope", "the", "sir", "doctor", "professor", "president", "senator",
    "congressman", "congresswoman", "mr", "ms", "mrs", "miss", "dr", "bill", "hillary",
    "hillary rodham", "saddam", "osama", "ayatollah", "george", "george w", "mitt",
    "malcolm", "barack", "ronald", "john", "john f", "william", "al", "bob",
];

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let mut titles = TITLES.to_vec();
    // longest first, so "george w" wins over "george"
    titles.sort_by_key(|t| std::cmp::Reverse(t.len()));
    let alternation = titles
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"^(?:{})\b\.* *", alternation)).expect("title regex is valid")
});

/// Contraction fragments the lemmatizer does not know about
fn expand_contraction(word: &str) -> &str {
    match word {
        "'s" => "is",
        "'re" => "are",
        "'m" => "am",
        "n't" => "not",
        _ => word,
    }
}

fn strip_leading(s: &str) -> &str {
    s.trim_start_matches(|c: char| !(c.is_alphabetic() || c == '(' || c == '\''))
}

/// Normalization settings for one interrogation
#[derive(Clone, Default)]
pub struct Normalizer {
    lemmatizer: Option<(Arc<dyn Lemmatizer>, PosTag)>,
    title_filter: bool,
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("lemma_tag", &self.lemma_tag())
            .field("title_filter", &self.title_filter)
            .finish()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lemmatizer(mut self, lemmatizer: Arc<dyn Lemmatizer>, tag: PosTag) -> Self {
        self.lemmatizer = Some((lemmatizer, tag));
        self
    }

    pub fn with_title_filter(mut self, enabled: bool) -> Self {
        self.title_filter = enabled;
        self
    }

    /// Tag handed to the lemmatizer, if lemmatization is on
    pub fn lemma_tag(&self) -> Option<PosTag> {
        self.lemmatizer.as_ref().map(|(_, tag)| *tag)
    }

    /// Normalize one raw match; `Ok(None)` means it collapsed to nothing
    pub fn normalize(&self, raw: &[u8]) -> Result<Option<String>, Utf8Error> {
        let word = raw.to_str()?;
        Ok(self.normalize_str(word))
    }

    pub fn normalize_str(&self, word: &str) -> Option<String> {
        let mut entry = match &self.lemmatizer {
            Some((lemmatizer, tag)) => lemmatizer.lemmatize(expand_contraction(word), *tag),
            None => word.to_string(),
        };

        loop {
            let next = self.clean(&entry);
            if next == entry {
                break;
            }
            entry = next;
        }

        (!entry.is_empty()).then_some(entry)
    }

    fn clean(&self, entry: &str) -> String {
        let lowered = strip_leading(entry).to_lowercase();
        if self.title_filter {
            TITLE_RE.replace(&lowered, "").into_owned()
        } else {
            lowered
        }
    }
}
