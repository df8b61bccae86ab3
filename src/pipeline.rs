//! End-to-end interrogation: discovery, matching, counting, tabulation
//!
//! One forward pass over the corpus. Subcorpora can be counted by a pool
//! of workers, but results are always folded into the [`Tabulator`] in
//! ascending subcorpus order by the calling thread. Any error aborts the
//! run and no table is produced.

use crate::counter::{SubcorpusCounts, count_subcorpus};
use crate::discover::{
    DEFAULT_FILE_GLOB, Subcorpus, SubcorpusId, discover_subcorpora, unreadable_entry,
};
use crate::error::{Result, TallyError};
use crate::matcher::{ExtractMode, Matcher};
use crate::normalize::Normalizer;
use crate::tabulate::{Table, Tabulator};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// What to do when the matcher fails on a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatcherPolicy {
    /// Abort the run
    #[default]
    Strict,
    /// Log the failure and carry on with the next file
    SkipUnreadable,
}

/// Cooperative cancellation, checked before each subcorpus
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Run options that do not affect what is counted
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub file_glob: String,
    /// Only the first `n` subcorpora
    pub limit: Option<usize>,
    pub policy: MatcherPolicy,
    /// 1 runs on the calling thread, 0 lets rayon decide
    pub jobs: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            file_glob: DEFAULT_FILE_GLOB.to_string(),
            limit: None,
            policy: MatcherPolicy::Strict,
            jobs: 1,
        }
    }
}

/// Result of an interrogation
#[derive(Debug, Clone, Serialize)]
pub struct Interrogation {
    pub query: String,
    pub mode: ExtractMode,
    pub table: Table,
}

/// Match, normalize and count every file of one subcorpus
///
/// Each file is counted as soon as it is matched. Unreadable directory
/// entries and matcher failures fall under the same [`MatcherPolicy`].
pub fn count_files<M: Matcher + ?Sized>(
    subcorpus: &Subcorpus,
    matcher: &M,
    normalizer: &Normalizer,
    options: &RunOptions,
) -> Result<SubcorpusCounts> {
    let entries = subcorpus.list_files(&options.file_glob)?;
    info!(subcorpus = subcorpus.id, files = entries.len(), "counting subcorpus");

    let mut counts = SubcorpusCounts::new(subcorpus.id);
    for entry in entries {
        let (file, matched) = match entry {
            Ok(file) => {
                let matched = matcher.match_file(&file);
                (file, matched)
            }
            Err(e) => {
                let (path, source) = unreadable_entry(e);
                (path, Err(source))
            }
        };
        match matched {
            Ok(matches) => {
                debug!(file = %file.display(), matches = matches.len(), "matched file");
                counts.merge(count_subcorpus(subcorpus.id, matches, normalizer)?);
            }
            Err(source) if options.policy == MatcherPolicy::SkipUnreadable => {
                warn!(file = %file.display(), error = %source, "skipping unreadable file");
            }
            Err(source) => return Err(TallyError::Matcher { path: file, source }),
        }
    }

    Ok(counts)
}

fn check_cancelled(cancel: &CancelToken, next: SubcorpusId) -> Result<()> {
    if cancel.is_cancelled() {
        warn!(next, "interrogation cancelled");
        return Err(TallyError::Cancelled { next });
    }
    Ok(())
}

/// Count an already discovered, ascending list of subcorpora
pub fn tally_subcorpora<M: Matcher + ?Sized>(
    subcorpora: &[Subcorpus],
    matcher: &M,
    normalizer: &Normalizer,
    options: &RunOptions,
    cancel: &CancelToken,
) -> Result<Table> {
    let count_one = |subcorpus: &Subcorpus| {
        check_cancelled(cancel, subcorpus.id)?;
        count_files(subcorpus, matcher, normalizer, options)
    };

    let counts: Vec<SubcorpusCounts> = if options.jobs == 1 {
        subcorpora.iter().map(count_one).collect::<Result<_>>()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs)
            .build()
            .map_err(|e| TallyError::config(format!("cannot start worker pool: {}", e)))?;
        pool.install(|| subcorpora.par_iter().map(count_one).collect::<Result<_>>())?
    };

    let mut tabulator = Tabulator::new();
    for c in counts {
        tabulator.add_subcorpus(c.id);
        tabulator.add(c);
    }
    Ok(tabulator.finish())
}

/// Interrogate every numeric subcorpus under `root`
pub fn interrogate<M: Matcher + ?Sized>(
    root: &Path,
    matcher: &M,
    normalizer: &Normalizer,
    options: &RunOptions,
    cancel: &CancelToken,
) -> Result<Table> {
    let start = Instant::now();
    let mut subcorpora = discover_subcorpora(root)?;
    if let Some(limit) = options.limit {
        subcorpora.truncate(limit);
    }
    info!(
        root = %root.display(),
        query = matcher.query(),
        subcorpora = subcorpora.len(),
        "beginning interrogation"
    );

    let table = tally_subcorpora(&subcorpora, matcher, normalizer, options, cancel)?;

    info!(
        entries = table.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "interrogation done"
    );
    Ok(table)
}
