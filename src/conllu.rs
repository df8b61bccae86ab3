//! CoNLL-U file parsing
//!
//! Reads CoNLL-U sentences as raw bytes. Files ending in `.gz` are
//! decompressed on the fly. Multiword token ranges (`1-2`) and empty
//! nodes (`2.1`) are skipped; the token lines they cover are kept.
//!
//! CoNLL-U format: https://universaldependencies.org/format.html

use crate::tree::{Relation, Sentence, Token, TokenIdx};
use atoi::FromRadix10Checked;
use bstr::{BString, ByteSlice};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;
use thiserror::Error;

/// Error during CoNLL-U parsing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line_num}: {message}")]
    Malformed { line_num: usize, message: String },

    #[error("line {line_num}: {source}")]
    Io {
        line_num: usize,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    fn malformed(line_num: usize, message: impl Into<String>) -> Self {
        ParseError::Malformed {
            line_num,
            message: message.into(),
        }
    }
}

/// CoNLL-U reader that iterates over sentences
pub struct CoNLLUReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    line_num: usize,
}

impl CoNLLUReader<Box<dyn BufRead>> {
    /// Open a file, transparently decompressing `.gz`
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let inner: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Self::new(Box::new(BufReader::new(inner))))
    }
}

impl CoNLLUReader<Cursor<Vec<u8>>> {
    /// Create a reader from in-memory text
    pub fn from_bytes(text: impl Into<Vec<u8>>) -> Self {
        Self::new(Cursor::new(text.into()))
    }
}

impl<R: BufRead> CoNLLUReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
            line_num: 0,
        }
    }
}

impl<R: BufRead> Iterator for CoNLLUReader<R> {
    type Item = Result<Sentence, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut sentence = Sentence::new();
        // (line, governor) for every HEAD and DEPS entry, checked once the length is known
        let mut heads: Vec<(usize, TokenIdx)> = Vec::new();

        loop {
            self.buf.clear();
            self.line_num += 1;
            match self.reader.read_until(b'\n', &mut self.buf) {
                Err(source) => {
                    return Some(Err(ParseError::Io {
                        line_num: self.line_num,
                        source,
                    }));
                }
                Ok(0) => {
                    if sentence.is_empty() {
                        return None;
                    }
                    break;
                }
                Ok(_) => {}
            }

            let line = self.buf.trim_end_with(|c| c == '\n' || c == '\r');
            if line.trim().is_empty() {
                if sentence.is_empty() {
                    continue;
                }
                break;
            }

            if line.starts_with(b"#") {
                continue;
            }

            match parse_line(line, self.line_num) {
                Ok(Some(token)) => {
                    let governors = token
                        .head
                        .into_iter()
                        .chain(token.deps.iter().filter_map(|r| r.head));
                    heads.extend(governors.map(|h| (self.line_num, h)));
                    sentence.tokens.push(token);
                }
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }

        let n = sentence.tokens.len();
        if let Some(&(line_num, head)) = heads.iter().find(|(_, h)| *h >= n) {
            return Some(Err(ParseError::malformed(
                line_num,
                format!("head {} points outside a sentence of {} tokens", head + 1, n),
            )));
        }

        Some(Ok(sentence))
    }
}

/// Split a line into exactly ten tab-separated fields
fn split_fields(line: &[u8], line_num: usize) -> Result<[&[u8]; 10], ParseError> {
    let mut fields: [&[u8]; 10] = [&line[..0]; 10];
    let mut start = 0;
    let mut n = 0;
    for tab in memchr::memchr_iter(b'\t', line) {
        if n == 9 {
            return Err(ParseError::malformed(line_num, "Expected 10 fields, found more"));
        }
        fields[n] = &line[start..tab];
        start = tab + 1;
        n += 1;
    }
    if n != 9 {
        return Err(ParseError::malformed(
            line_num,
            format!("Expected 10 fields, found {}", n + 1),
        ));
    }
    fields[9] = &line[start..];
    Ok(fields)
}

/// Parse a full unsigned decimal, rejecting trailing garbage
fn parse_usize(bytes: &[u8]) -> Option<usize> {
    match usize::from_radix_10_checked(bytes) {
        (Some(n), used) if used == bytes.len() && used > 0 => Some(n),
        _ => None,
    }
}

/// Parse a single CoNLL-U line into a Token
/// Returns None for multiword tokens and empty nodes
fn parse_line(line: &[u8], line_num: usize) -> Result<Option<Token>, ParseError> {
    let fields = split_fields(line, line_num)?;

    if memchr::memchr2(b'-', b'.', fields[0]).is_some() {
        return Ok(None);
    }
    let id = parse_usize(fields[0])
        .ok_or_else(|| ParseError::malformed(line_num, format!("Invalid ID: {}", fields[0].as_bstr())))?;

    let form = BString::from(fields[1]);
    let lemma = if fields[2] == b"_" {
        form.clone()
    } else {
        BString::from(fields[2])
    };
    let head = parse_head(fields[6], line_num)?;
    let deps = parse_deps(fields[8]);

    Ok(Some(Token {
        id,
        form,
        lemma,
        head,
        deprel: BString::from(fields[7]),
        deps,
    }))
}

/// Parse HEAD field (0 or 1-based index)
fn parse_head(s: &[u8], line_num: usize) -> Result<Option<TokenIdx>, ParseError> {
    if s == b"_" {
        return Ok(None);
    }
    match parse_usize(s) {
        Some(0) => Ok(None),
        Some(head) => Ok(Some(head - 1)),
        None => Err(ParseError::malformed(
            line_num,
            format!("Invalid HEAD: {}", s.as_bstr()),
        )),
    }
}

/// Parse DEPS field (head:deprel|head:deprel)
///
/// Entries with a decimal head (empty nodes) are dropped.
fn parse_deps(s: &[u8]) -> Vec<Relation> {
    if s == b"_" {
        return Vec::new();
    }

    s.split_str("|")
        .filter_map(|pair| {
            let colon = memchr::memchr(b':', pair)?;
            let head = match parse_usize(&pair[..colon])? {
                0 => None,
                h => Some(h - 1),
            };
            Some(Relation {
                head,
                label: BString::from(&pair[colon + 1..]),
            })
        })
        .collect()
}
