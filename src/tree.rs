//! Sentence and token structures for dependency-parsed text
//!
//! Fields are kept as raw bytes: corpora are not guaranteed to be valid
//! UTF-8, and decoding happens once, during normalization.

use bstr::{BStr, BString, ByteSlice};

/// Index of a token within its sentence (0-based)
pub type TokenIdx = usize;

/// One dependency relation of a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Governor index, `None` for the root
    pub head: Option<TokenIdx>,
    pub label: BString,
}

/// A single CoNLL-U token
#[derive(Debug, Clone)]
pub struct Token {
    /// 1-based CoNLL-U id
    pub id: usize,
    pub form: BString,
    pub lemma: BString,
    pub head: Option<TokenIdx>,
    pub deprel: BString,
    /// Enhanced dependencies (DEPS column), empty if `_`
    pub deps: Vec<Relation>,
}

impl Token {
    /// Create a token with the basic attributes
    pub fn new(id: usize, form: &str, lemma: &str, deprel: &str) -> Self {
        Self {
            id,
            form: BString::from(form),
            lemma: BString::from(lemma),
            head: None,
            deprel: BString::from(deprel),
            deps: Vec::new(),
        }
    }

    /// The basic relation (HEAD/DEPREL)
    pub fn basic_relation(&self) -> Relation {
        Relation {
            head: self.head,
            label: self.deprel.clone(),
        }
    }
}

/// A dependency-parsed sentence
#[derive(Debug, Clone, Default)]
pub struct Sentence {
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Form of the governor of `relation`, or `ROOT`
    pub fn governor_form(&self, relation: &Relation) -> &BStr {
        match relation.head.and_then(|idx| self.tokens.get(idx)) {
            Some(governor) => governor.form.as_bstr(),
            None => b"ROOT".as_bstr(),
        }
    }
}
