//! The run controller: one explicit state-transition function over the record
//! store, the filter/sort configuration, and the derived visible view.
//!
//! Everything that mutates shared state goes through [State::apply], so store
//! mutation and view recomputation are atomic from a reader's point of view.
//! There is no ambient singleton; callers own the [State] value.


use crate::engine::Outcome;
use crate::filter::{Compiled, FilterState};
use crate::pipeline;
use crate::record::Record;
use crate::sort::SortState;
use crate::store::{Counts, Store};
use color_eyre::eyre::{Report, Result};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use std::default::Default;

// ----------------------------------------------------------------------------
// Phase
// ----------------------------------------------------------------------------

/// Overall run status.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Done,
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phase = match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Done => "done",
            Phase::Failed => "failed",
        };
        write!(f, "{phase}")
    }
}

// ----------------------------------------------------------------------------
// Event
// ----------------------------------------------------------------------------

/// A state-changing event.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A new run starts over the named sequences. Resets the store, bumps the
    /// run generation, clears the dirty flag and any global error.
    Started { names: Vec<String> },
    /// One analysis outcome arrived, tagged with the generation of the run
    /// that produced it.
    Completed { generation: u64, outcome: Outcome },
    /// The user changed the filter configuration.
    FilterChanged(FilterState),
    /// The user changed the sort configuration.
    SortChanged(SortState),
    /// An input changed after a run; marks the configuration dirty.
    InputChanged,
    /// An unrecoverable top-level error, distinct from per-sequence failures.
    Fatal { message: String },
    /// Discard the run entirely: new dataset selection or input removal.
    Reset,
}

// ----------------------------------------------------------------------------
// State
// ----------------------------------------------------------------------------

/// The aggregate state: record store, run controller, filter/sort
/// configuration, and the derived visible view.
#[derive(Clone, Debug, Default)]
pub struct State {
    generation: u64,
    phase: Phase,
    dirty: bool,
    global_error: Option<String>,
    store: Store,
    filter: FilterState,
    compiled: Compiled,
    sort: SortState,
    /// Indices of visible records, in display order. Derived, never a source
    /// of truth.
    visible: Vec<usize>,
}

impl State {
    pub fn new() -> Self {
        State::default()
    }

    /// Apply one event and recompute the derived view.
    ///
    /// The single entry point for all mutations. On error the state is
    /// observably unchanged, except that a contract-violating completion
    /// transitions the run to failed while keeping partial results visible.
    pub fn apply(&mut self, event: Event) -> Result<(), Report> {
        match event {
            Event::Started { names } => {
                self.store.reset_all();
                self.store.initialize(&names)?;
                self.generation += 1;
                self.phase = match self.store.is_complete() {
                    // a zero-sequence batch has nothing left to wait for
                    true => Phase::Done,
                    false => Phase::Running,
                };
                self.dirty = false;
                self.global_error = None;
            }
            Event::Completed { generation, outcome } => {
                if generation != self.generation {
                    debug!(
                        "Discarding completion for sequence {} of superseded run {generation}.",
                        outcome.index
                    );
                    return Ok(());
                }
                if self.phase != Phase::Running {
                    debug!(
                        "Discarding completion for sequence {} while {}.",
                        outcome.index, self.phase
                    );
                    return Ok(());
                }
                match self.store.complete_one(outcome) {
                    Ok(()) => {
                        if self.store.is_complete() {
                            self.phase = Phase::Done;
                        }
                    }
                    // producer contract violation: fail the run, keep partials
                    Err(error) => {
                        self.phase = Phase::Failed;
                        self.global_error = Some(format!("{error:#}"));
                    }
                }
            }
            Event::FilterChanged(filter) => {
                self.compiled = filter.compile()?;
                self.filter = filter;
            }
            Event::SortChanged(sort) => self.sort = sort,
            Event::InputChanged => self.dirty = true,
            Event::Fatal { message } => {
                self.phase = Phase::Failed;
                self.global_error = Some(message);
            }
            Event::Reset => {
                self.store.reset_all();
                self.generation += 1;
                self.phase = Phase::Idle;
                self.dirty = false;
                self.global_error = None;
            }
        }

        self.refresh();
        Ok(())
    }

    fn refresh(&mut self) {
        self.visible = pipeline::recompute(self.store.records(), &self.sort, &self.compiled)
            .into_iter()
            .map(|record| record.index)
            .collect_vec();
    }

    /// The derived visible-results sequence, sorted then filtered.
    pub fn visible_records(&self) -> Vec<&Record> {
        self.visible.iter().filter_map(|index| self.store.get(*index)).collect_vec()
    }

    /// The canonical record collection, in insertion order.
    pub fn records(&self) -> &[Record] {
        self.store.records()
    }

    pub fn counts(&self) -> Counts {
        self.store.counts()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn global_error(&self) -> Option<&str> {
        self.global_error.as_deref()
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }
}
