//! Run the aggregation pipeline over a batch of input sequences: fan queries
//! out to analysis workers, drain completions into the state machine, then
//! export and summarize.


use crate::engine::{self, replay::ReplayEngine, AnalysisEngine, Outcome, Query};
use crate::export;
use crate::filter::FilterState;
use crate::sort::{SortColumn, SortOrder, SortState};
use crate::state::{Event, Phase, State};
use chrono::Local;
use clap::Parser;
use color_eyre::eyre::{Report, Result, WrapErr};
use crossbeam_channel::bounded;
use indicatif::ProgressBar;
use indoc::formatdoc;
use itertools::Itertools;
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Matches the completion channel of the upstream analysis runner.
const CHANNEL_SIZE: usize = 128;

// ----------------------------------------------------------------------------
// Args
// ----------------------------------------------------------------------------

/// Aggregate, filter, and sort analysis results for a batch of sequences.
#[derive(Clone, Debug, Deserialize, Parser, Serialize)]
pub struct Args {
    /// Input fasta file of query sequences.
    #[clap(short = 'f', long, required = true)]
    pub input_fasta: PathBuf,

    /// Input NDJSON file of recorded analysis outcomes, one per line.
    #[clap(short = 'r', long, required = true)]
    pub input_results: PathBuf,

    /// Sequence name filter, comma-separated substrings.
    #[clap(long)]
    pub filter_name: Option<String>,

    /// Nucleotide mutation filter, comma-separated patterns (ex. A123T,999).
    #[clap(long)]
    pub filter_mutations: Option<String>,

    /// Amino-acid mutation filter, comma-separated patterns (ex. S:N501Y).
    #[clap(long)]
    pub filter_aa: Option<String>,

    /// Clade filter, comma-separated clade names.
    #[clap(long)]
    pub filter_clades: Option<String>,

    /// Hide sequences with good QC status.
    #[clap(long)]
    pub hide_good: bool,

    /// Hide sequences with mediocre QC status.
    #[clap(long)]
    pub hide_mediocre: bool,

    /// Hide sequences with bad QC status.
    #[clap(long)]
    pub hide_bad: bool,

    /// Hide sequences that failed analysis.
    #[clap(long)]
    pub hide_errors: bool,

    /// Sort column for the results view.
    #[clap(long, value_enum, default_value_t = SortColumn::Index)]
    pub sort_by: SortColumn,

    /// Sort direction for the results view.
    #[clap(long, value_enum, default_value_t = SortOrder::Ascending)]
    pub sort_order: SortOrder,

    /// Output linelist table path (.tsv or .csv).
    #[clap(short = 'o', long)]
    pub output_table: Option<PathBuf>,

    /// Output NDJSON path, one record per line.
    #[clap(long)]
    pub output_ndjson: Option<PathBuf>,

    /// Output tree-annotation JSON path.
    #[clap(long)]
    pub output_tree: Option<PathBuf>,

    /// Number of analysis worker threads.
    #[clap(short = 't', long, default_value_t = 1)]
    #[serde(skip)]
    pub threads: usize,
}

impl Args {
    /// Assemble the filter configuration from the CLI flags.
    pub fn filter_state(&self) -> FilterState {
        FilterState {
            name: self.filter_name.clone().unwrap_or_default(),
            mutations: self.filter_mutations.clone().unwrap_or_default(),
            aa_mutations: self.filter_aa.clone().unwrap_or_default(),
            clades: self.filter_clades.clone().unwrap_or_default(),
            show_good: !self.hide_good,
            show_mediocre: !self.hide_mediocre,
            show_bad: !self.hide_bad,
            show_errors: !self.hide_errors,
        }
    }

    pub fn sort_state(&self) -> SortState {
        SortState { column: self.sort_by, order: self.sort_order }
    }
}

// ----------------------------------------------------------------------------
// Completion
// ----------------------------------------------------------------------------

/// One completion message from a worker, tagged with the generation of the
/// run that produced it so superseded completions can be discarded.
#[derive(Clone, Debug)]
pub struct Completion {
    pub generation: u64,
    pub outcome: Outcome,
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Run the full pipeline from CLI arguments.
pub fn run(args: &Args) -> Result<(), Report> {
    let started = Local::now();

    let queries = engine::read_queries(&args.input_fasta)?;
    info!("Loaded {} query sequences: {:?}", queries.len(), args.input_fasta);

    let replay = ReplayEngine::read(&args.input_results)?;
    info!("Loaded {} recorded outcomes: {:?}", replay.len(), args.input_results);

    let mut state = State::new();
    state
        .apply(Event::FilterChanged(args.filter_state()))
        .wrap_err("Invalid filter configuration.")?;
    state.apply(Event::SortChanged(args.sort_state()))?;

    execute(&replay, &queries, &mut state, args.threads)?;

    if state.phase() == Phase::Running {
        warn!("Run did not complete: some sequences never reached a terminal state.");
    }

    // console view of the filtered, sorted results
    let visible = state.visible_records();
    let table = export::linelist(&visible)?;
    println!("\n{}", table.to_markdown()?);

    // file exports cover the full record collection
    let records = state.records().iter().collect_vec();
    if let Some(path) = &args.output_table {
        export::write_linelist(&records, path)?;
        info!("Wrote linelist: {path:?}");
    }
    if let Some(path) = &args.output_ndjson {
        export::write_ndjson(&records, path)?;
        info!("Wrote NDJSON: {path:?}");
    }
    if let Some(path) = &args.output_tree {
        export::write_tree_annotations(&records, path)?;
        info!("Wrote tree annotations: {path:?}");
    }

    let counts = state.counts();
    let elapsed = Local::now().signed_duration_since(started);
    info!(
        "{}",
        formatdoc!(
            "Run summary:
               phase: {}
               sequences: {}
               visible: {}
               good: {}
               mediocre: {}
               bad: {}
               errors: {}
               elapsed: {}s",
            state.phase(),
            counts.total,
            visible.len(),
            counts.good,
            counts.mediocre,
            counts.bad,
            counts.errors,
            elapsed.num_seconds(),
        )
    );

    if let Some(error) = state.global_error() {
        warn!("Run failed: {error}");
    }

    Ok(())
}

/// Analyze all queries on a worker pool and drain completions into the state.
///
/// Workers send generation-tagged completions into a bounded channel; the
/// single consumer applies them in arrival order. Completions never block on
/// one another, and a send failure only means the consumer is gone and the
/// run was superseded.
pub fn execute<E>(
    engine: &E,
    queries: &[Query],
    state: &mut State,
    threads: usize,
) -> Result<(), Report>
where
    E: AnalysisEngine,
{
    let names = queries.iter().map(|query| query.seq_name.clone()).collect_vec();
    state.apply(Event::Started { names })?;
    let generation = state.generation();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .wrap_err("Failed to build the analysis worker pool.")?;

    let progress = ProgressBar::new(queries.len() as u64);
    let (sender, receiver) = bounded::<Completion>(CHANNEL_SIZE);

    std::thread::scope(|scope| -> Result<(), Report> {
        scope.spawn(move || {
            pool.install(|| {
                queries.par_iter().for_each_with(sender, |sender, query| {
                    let outcome = engine.analyze(query);
                    let _ = sender.send(Completion { generation, outcome });
                });
            });
        });

        for Completion { generation, outcome } in receiver {
            state.apply(Event::Completed { generation, outcome })?;
            progress.inc(1);
        }
        Ok(())
    })?;

    progress.finish_and_clear();
    Ok(())
}
