//! The opaque analysis-engine boundary: query and outcome wire types, the
//! [AnalysisEngine] trait, and the streaming fasta query reader.

pub mod replay;
#[cfg(test)]
mod tests;

use crate::record::{AnalysisResult, Peptide, Warnings};
use color_eyre::eyre::{eyre, ContextCompat, Report, Result, WrapErr};
use noodles::{core::Position, fasta};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// ----------------------------------------------------------------------------
// Query
// ----------------------------------------------------------------------------

/// One raw input sequence submitted for analysis.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Submission index, assigned in input order and round-tripped unchanged
    /// through the engine for out-of-order correlation.
    pub index: usize,
    pub seq_name: String,
    pub raw_sequence: String,
}

// ----------------------------------------------------------------------------
// Outcome
// ----------------------------------------------------------------------------

/// The engine's answer for one query. Exactly one of `result`/`error` is
/// populated; anything else is a producer contract violation.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub index: usize,
    pub seq_name: String,
    #[serde(default)]
    pub result: Option<AnalysisResult>,
    /// Aligned query sequence, when the engine returns one.
    #[serde(default)]
    pub query: Option<String>,
    /// Translated peptides derived from the aligned query.
    #[serde(default)]
    pub query_peptides: Vec<Peptide>,
    #[serde(default)]
    pub warnings: Warnings,
    #[serde(default)]
    pub error: Option<String>,
}

/// An [Outcome] reduced to the exactly-one-of success/failure payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Success { result: AnalysisResult, warnings: Warnings },
    Failure { error: String, warnings: Warnings },
}

impl Outcome {
    /// Create a per-sequence failure outcome for a query.
    pub fn failure(query: &Query, error: &str) -> Self {
        Outcome {
            index: query.index,
            seq_name: query.seq_name.clone(),
            result: None,
            query: None,
            query_peptides: Vec::new(),
            warnings: Warnings::default(),
            error: Some(error.to_string()),
        }
    }

    /// Reduce to a success or failure payload.
    ///
    /// An outcome carrying both a result and an error, or neither, violates
    /// the engine contract and is escalated rather than silently defaulted.
    pub fn into_payload(self) -> Result<Payload, Report> {
        match (self.result, self.error) {
            (Some(result), None) => Ok(Payload::Success { result, warnings: self.warnings }),
            (None, Some(error)) => Ok(Payload::Failure { error, warnings: self.warnings }),
            (Some(_), Some(error)) => Err(eyre!(
                "Analysis outcome for sequence {} '{}' carries both a result and an error: {error}",
                self.index,
                self.seq_name,
            )),
            (None, None) => Err(eyre!(
                "Analysis outcome for sequence {} '{}' carries neither a result nor an error.",
                self.index,
                self.seq_name,
            )),
        }
    }
}

// ----------------------------------------------------------------------------
// Engine
// ----------------------------------------------------------------------------

/// The external analysis engine, consumed only through its result contract.
///
/// Implementations may run queries in parallel; `analyze` must be callable
/// from multiple worker threads at once.
pub trait AnalysisEngine: Sync {
    fn analyze(&self, query: &Query) -> Outcome;
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Stream queries from a fasta file, in increasing index order.
pub fn read_queries(path: &Path) -> Result<Vec<Query>, Report> {
    let mut reader = File::open(path)
        .map(BufReader::new)
        .map(fasta::Reader::new)
        .wrap_err_with(|| eyre!("Failed to open fasta file: {path:?}"))?;

    reader
        .records()
        .enumerate()
        .map(|(index, record)| {
            let record = record
                .wrap_err_with(|| eyre!("Failed to read fasta record {index}: {path:?}"))?;
            let seq_name = record.name().to_string();

            // noodles positions are 1-based
            let raw_sequence = record
                .sequence()
                .get(Position::MIN..)
                .context(format!("Failed to parse sequence of fasta record '{seq_name}'"))?
                .iter()
                .map(|base| *base as char)
                .collect();

            Ok(Query { index, seq_name, raw_sequence })
        })
        .collect()
}
