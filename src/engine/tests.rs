use crate::engine::{read_queries, replay::ReplayEngine, AnalysisEngine, Outcome, Payload, Query};
use crate::record::{AnalysisResult, QcStatus, QcSummary, Warnings};
use color_eyre::eyre::{Report, Result};
use std::io::Write;
use tempfile::NamedTempFile;

fn query(index: usize, seq_name: &str) -> Query {
    Query { index, seq_name: seq_name.to_string(), raw_sequence: "ACGT".to_string() }
}

fn success(index: usize, seq_name: &str, clade: &str) -> Outcome {
    Outcome {
        index,
        seq_name: seq_name.to_string(),
        result: Some(AnalysisResult {
            clade: clade.to_string(),
            qc: QcSummary { overall_score: 1.0, overall_status: QcStatus::Good },
            substitutions: Vec::new(),
            aa_substitutions: Vec::new(),
        }),
        query: None,
        query_peptides: Vec::new(),
        warnings: Warnings::default(),
        error: None,
    }
}

#[test]
fn read_queries_in_index_order() -> Result<(), Report> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, ">s1 first sequence\nACGT\n>s2\nAC\nGT\n>s3\nTTTT")?;

    let observed = read_queries(file.path())?;
    let names = observed.iter().map(|q| q.seq_name.as_str()).collect::<Vec<_>>();
    let indices = observed.iter().map(|q| q.index).collect::<Vec<_>>();

    assert_eq!(vec!["s1", "s2", "s3"], names);
    assert_eq!(vec![0, 1, 2], indices);
    assert_eq!("ACGT", observed[1].raw_sequence);
    Ok(())
}

#[test]
fn read_queries_missing_file() {
    let observed = read_queries(std::path::Path::new("no/such/file.fasta"));
    assert!(observed.is_err());
}

#[test]
fn outcome_payload_success() -> Result<(), Report> {
    let payload = success(0, "s1", "20A").into_payload()?;
    assert!(matches!(payload, Payload::Success { .. }));
    Ok(())
}

#[test]
fn outcome_payload_failure() -> Result<(), Report> {
    let payload = Outcome::failure(&query(0, "s1"), "bad sequence").into_payload()?;
    match payload {
        Payload::Failure { error, .. } => assert_eq!("bad sequence", error),
        _ => panic!("Expected a failure payload."),
    }
    Ok(())
}

#[test]
fn outcome_payload_contract_violations() {
    let mut neither = success(0, "s1", "20A");
    neither.result = None;
    assert!(neither.into_payload().is_err());

    let mut both = success(0, "s1", "20A");
    both.error = Some("also an error".to_string());
    assert!(both.into_payload().is_err());
}

#[test]
fn replay_rewrites_index() -> Result<(), Report> {
    let mut file = NamedTempFile::new()?;
    let recorded = success(7, "s1", "20A");
    writeln!(file, "{}", serde_json::to_string(&recorded)?)?;

    let engine = ReplayEngine::read(file.path())?;
    assert_eq!(1, engine.len());

    // submitted at a different index than the recorded run
    let observed = engine.analyze(&query(3, "s1"));
    assert_eq!(3, observed.index);
    assert_eq!("s1", observed.seq_name);
    assert_eq!(recorded.result, observed.result);
    Ok(())
}

#[test]
fn replay_missing_sequence_is_per_sequence_failure() -> Result<(), Report> {
    let file = NamedTempFile::new()?;
    let engine = ReplayEngine::read(file.path())?;
    assert!(engine.is_empty());

    let observed = engine.analyze(&query(0, "unknown"));
    assert!(observed.result.is_none());
    assert!(observed.error.is_some());
    Ok(())
}
