//! Command-line interrogation of a subcorpus-structured corpus

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use treetally::output::{self, OutputFormat};
use treetally::{CancelToken, ExtractMode, SortBy, TallyConfig, Threshold};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[clap(name = "treetally", about = "Counts query matches per subcorpus")]
struct Args {
    /// Corpus root holding one numerically named directory per subcorpus
    root: PathBuf,

    /// Regular expression matched against the start of each token form
    query: Option<String>,

    /// TOML config file; flags given here override it
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// What to count: word, lemma, role, governor-role or index
    #[clap(short, long)]
    mode: Option<ExtractMode>,

    /// Lemmatize matches before counting
    #[clap(long, alias = "lemmatize")]
    lemmatise: bool,

    /// Part of speech for the lemmatizer: n, v, a or r
    #[clap(long)]
    lemma_tag: Option<String>,

    /// Tab-separated lemma table
    #[clap(long)]
    lemma_table: Option<PathBuf>,

    /// Strip leading honorifics such as "Mr." or "Dr."
    #[clap(long)]
    title_filter: bool,

    /// Use enhanced dependencies where present
    #[clap(long)]
    enhanced: bool,

    /// Worker threads; 0 uses every core
    #[clap(short, long)]
    jobs: Option<usize>,

    /// Only the first N subcorpora
    #[clap(long)]
    limit: Option<usize>,

    /// Warn about unreadable files instead of failing
    #[clap(long)]
    skip_unreadable: bool,

    /// Row order: total, name, infreq, increase or decrease
    #[clap(long)]
    sort_by: Option<SortBy>,

    /// Drop rows below a count, or low, medium or high
    #[clap(long)]
    threshold: Option<Threshold>,

    /// Keep only the first N rows after sorting
    #[clap(long)]
    keep_top: Option<usize>,

    /// Output format: csv or json
    #[clap(short, long)]
    format: Option<OutputFormat>,

    /// Write to a file instead of stdout
    #[clap(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<(PathBuf, Option<PathBuf>, TallyConfig), Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => TallyConfig::load(path)?,
            None => TallyConfig::default(),
        };

        if let Some(query) = self.query {
            config.query = Some(query);
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if self.limit.is_some() {
            config.limit = self.limit;
        }
        config.enhanced |= self.enhanced;
        config.skip_unreadable |= self.skip_unreadable;

        let normalize = &mut config.normalize;
        normalize.lemmatize |= self.lemmatise;
        normalize.title_filter |= self.title_filter;
        if self.lemma_tag.is_some() {
            normalize.lemma_tag = self.lemma_tag;
        }
        if self.lemma_table.is_some() {
            normalize.lemma_table = self.lemma_table;
        }

        let output = &mut config.output;
        if let Some(format) = self.format {
            output.format = format;
        }
        if let Some(sort_by) = self.sort_by {
            output.sort_by = sort_by;
        }
        if self.threshold.is_some() {
            output.threshold = self.threshold;
        }
        if self.keep_top.is_some() {
            output.keep_top = self.keep_top;
        }

        Ok((self.root, self.output, config))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (root, output_path, config) = Args::parse().into_config()?;
    let interrogation = config.run(&root, &CancelToken::new())?;

    match output_path {
        Some(path) => {
            let mut out = BufWriter::new(File::create(&path)?);
            output::write(&mut out, &interrogation, config.output.format)?;
            out.flush()?;
            info!(path = %path.display(), rows = interrogation.table.len(), "wrote table");
        }
        None => {
            let stdout = std::io::stdout();
            let out = BufWriter::new(stdout.lock());
            output::write(out, &interrogation, config.output.format)?;
        }
    }

    Ok(())
}
