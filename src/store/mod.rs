//! The result record store: the canonical, insertion-ordered collection of
//! all submitted sequences and their per-sequence state.


use crate::engine::{Outcome, Payload};
use crate::record::{QcStatus, Record, Status};
use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;

// ----------------------------------------------------------------------------
// Store
// ----------------------------------------------------------------------------

/// Indexed mapping from sequence index to its current record.
///
/// Record index equals position in the collection, so completions arriving in
/// any order land on the right record without an ordering constraint from the
/// producer.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Store {
    records: Vec<Record>,
}

impl Store {
    pub fn new() -> Self {
        Store { records: Vec::new() }
    }

    /// Create one queued record per name, index = position in the input.
    ///
    /// Fails if records from a previous run are still present; callers must
    /// [reset](Store::reset_all) first.
    pub fn initialize(&mut self, names: &[String]) -> Result<(), Report> {
        if !self.records.is_empty() {
            return Err(eyre!(
                "Store still holds {} records from a previous run.",
                self.records.len()
            )
            .suggestion("Reset the store before initializing a new run."));
        }

        self.records = names
            .iter()
            .enumerate()
            .map(|(index, name)| Record::queued(index, name))
            .collect();

        Ok(())
    }

    /// Apply one completion outcome to the record at its index.
    ///
    /// Out-of-order safe. A completion for an index outside the initialized
    /// range is logged and ignored, it can only be a race with a reset. An
    /// outcome violating the engine contract returns an error for the caller
    /// to escalate; no record is touched in that case.
    pub fn complete_one(&mut self, outcome: Outcome) -> Result<(), Report> {
        let index = outcome.index;
        if index >= self.records.len() {
            warn!(
                "Discarding completion for unknown sequence index {index}, store holds {} records.",
                self.records.len()
            );
            return Ok(());
        }

        let payload = outcome.into_payload()?;

        let record = &mut self.records[index];
        if record.status.is_terminal() {
            warn!("Overwriting completed record {index} '{}'.", record.seq_name);
        }

        match payload {
            Payload::Success { result, warnings } => {
                record.status = Status::Done;
                record.result = Some(result);
                record.warnings = warnings;
                record.errors.clear();
            }
            Payload::Failure { error, warnings } => {
                record.status = Status::Failed;
                record.result = None;
                record.warnings = warnings;
                record.errors = vec![error];
            }
        }

        Ok(())
    }

    /// Clear the collection back to empty. Used on new dataset selection or
    /// input removal.
    pub fn reset_all(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when every record has left queued/running. Vacuously true when
    /// empty.
    pub fn is_complete(&self) -> bool {
        self.records.iter().all(|record| record.status.is_terminal())
    }

    /// Summary counts over all records, for badges. Not affected by filters.
    pub fn counts(&self) -> Counts {
        let mut counts = Counts { total: self.records.len(), ..Default::default() };
        for record in &self.records {
            match record.status {
                Status::Queued | Status::Running => counts.pending += 1,
                Status::Failed => counts.errors += 1,
                Status::Done => match record.qc_status() {
                    Some(QcStatus::Good) => counts.good += 1,
                    Some(QcStatus::Mediocre) => counts.mediocre += 1,
                    Some(QcStatus::Bad) => counts.bad += 1,
                    None => (),
                },
            }
        }
        counts
    }
}

// ----------------------------------------------------------------------------
// Counts
// ----------------------------------------------------------------------------

/// Per-bucket record counts for summary badges.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub total: usize,
    pub pending: usize,
    pub good: usize,
    pub mediocre: usize,
    pub bad: usize,
    pub errors: usize,
}
