//! Python bindings for treetally
//!
//! Exposes a single `interrogate` function returning plain lists, so the
//! caller can load them into whatever frame library it prefers.

use pyo3::exceptions::{PyIOError, PyInterruptedError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::path::PathBuf;

use crate::config::TallyConfig;
use crate::discover::SubcorpusId;
use crate::error::TallyError;
use crate::pipeline::CancelToken;

/// Convert TallyError to Python exception
impl From<TallyError> for PyErr {
    fn from(err: TallyError) -> PyErr {
        match err {
            TallyError::Io(e) => PyIOError::new_err(e.to_string()),
            TallyError::Matcher { .. } => PyIOError::new_err(err.to_string()),
            TallyError::Cancelled { .. } => PyInterruptedError::new_err(err.to_string()),
            TallyError::Encoding { .. } => PyRuntimeError::new_err(err.to_string()),
            TallyError::Configuration(_) | TallyError::Config(_) => {
                PyValueError::new_err(err.to_string())
            }
        }
    }
}

type PyRow = (String, u64, Vec<(SubcorpusId, u64)>);

/// Count query matches in every numeric subcorpus under a directory.
///
/// Args:
///     path: Corpus root, one directory per subcorpus
///     query: Regular expression matched at the start of token forms
///     mode: word, lemma, role, governor-role or index
///     lemmatise: Lemmatize matches before counting
///     lemmatag: Part of speech for the lemmatizer (n, v, a or r)
///     titlefilter: Strip leading honorifics
///     jobs: Worker threads; 0 uses every core
///
/// Returns:
///     (rows, totals) where each row is (entry, total, [(subcorpus, count)])
#[pyfunction]
#[pyo3(signature = (path, query, mode="word", lemmatise=false, lemmatag=None, titlefilter=false, jobs=1))]
fn interrogate(
    path: PathBuf,
    query: &str,
    mode: &str,
    lemmatise: bool,
    lemmatag: Option<String>,
    titlefilter: bool,
    jobs: usize,
) -> PyResult<(Vec<PyRow>, Vec<(SubcorpusId, u64)>)> {
    let mut config = TallyConfig {
        query: Some(query.to_string()),
        mode: mode.parse()?,
        jobs,
        ..TallyConfig::default()
    };
    config.normalize.lemmatize = lemmatise;
    config.normalize.lemma_tag = lemmatag;
    config.normalize.title_filter = titlefilter;

    let interrogation = config.run(&path, &CancelToken::new())?;
    let table = interrogation.table;
    let rows = table
        .rows
        .into_iter()
        .map(|row| (row.entry, row.total, row.counts))
        .collect();
    Ok((rows, table.totals))
}

#[pymodule]
fn treetally(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(interrogate, m)?)?;
    Ok(())
}
