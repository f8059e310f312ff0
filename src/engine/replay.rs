//! Replay previously recorded analysis outcomes from an NDJSON file.
//!
//! The real engine runs out of process and writes one outcome per line. The
//! [ReplayEngine] serves those outcomes back through the [AnalysisEngine]
//! trait, so the aggregation pipeline sees the same boundary either way.

use crate::engine::{AnalysisEngine, Outcome, Query};
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use log::warn;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub struct ReplayEngine {
    /// Recorded outcomes keyed by sequence name. First occurrence wins.
    outcomes: HashMap<String, Outcome>,
}

impl ReplayEngine {
    /// Read recorded outcomes from an NDJSON file, one outcome per line.
    pub fn read(path: &Path) -> Result<Self, Report> {
        let file = File::open(path)
            .wrap_err_with(|| eyre!("Failed to open results file: {path:?}"))?;

        let mut outcomes = HashMap::new();
        for (line_number, line) in BufReader::new(file).lines().enumerate() {
            let line = line
                .wrap_err_with(|| eyre!("Failed to read line {line_number}: {path:?}"))?;
            if line.trim().is_empty() {
                continue;
            }
            let outcome: Outcome = serde_json::from_str(&line).wrap_err_with(|| {
                eyre!("Failed to parse analysis outcome on line {line_number}: {path:?}")
            })?;
            if outcomes.contains_key(&outcome.seq_name) {
                warn!(
                    "Duplicate recorded outcome for sequence '{}', keeping the first.",
                    outcome.seq_name
                );
                continue;
            }
            outcomes.insert(outcome.seq_name.clone(), outcome);
        }

        Ok(ReplayEngine { outcomes })
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl AnalysisEngine for ReplayEngine {
    /// Serve the recorded outcome for a query, correlated by sequence name.
    ///
    /// The outcome's index is rewritten to the query's index, since the
    /// recorded run may have submitted sequences in a different order.
    fn analyze(&self, query: &Query) -> Outcome {
        match self.outcomes.get(&query.seq_name) {
            Some(outcome) => {
                let mut outcome = outcome.clone();
                outcome.index = query.index;
                outcome.seq_name = query.seq_name.clone();
                outcome
            }
            None => Outcome::failure(query, "No recorded analysis outcome for this sequence."),
        }
    }
}
