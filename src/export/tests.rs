use crate::export::{
    counts_from_linelist, linelist, write_linelist, write_ndjson, write_tree_annotations,
};
use crate::engine::Outcome;
use crate::record::{AnalysisResult, QcStatus, QcSummary, Record, Status, Warnings};
use crate::store::Store;
use crate::table::Table;
use color_eyre::eyre::{Report, Result};
use itertools::Itertools;
use tempfile::Builder;

fn records() -> Result<Vec<Record>, Report> {
    let mut done = Record::queued(0, "s1");
    done.status = Status::Done;
    done.result = Some(AnalysisResult {
        clade: "20A".to_string(),
        qc: QcSummary { overall_score: 3.5, overall_status: QcStatus::Good },
        substitutions: vec!["A123T".parse()?, "C456G".parse()?],
        aa_substitutions: vec!["S:N501Y".parse()?],
    });

    let mut bad = Record::queued(1, "s2");
    bad.status = Status::Done;
    bad.result = Some(AnalysisResult {
        clade: "20B".to_string(),
        qc: QcSummary { overall_score: 120.0, overall_status: QcStatus::Bad },
        substitutions: Vec::new(),
        aa_substitutions: Vec::new(),
    });

    let mut failed = Record::queued(2, "s3");
    failed.status = Status::Failed;
    failed.errors = vec!["alignment failed".to_string()];

    let pending = Record::queued(3, "s4");

    Ok(vec![done, bad, failed, pending])
}

#[test]
fn linelist_rows_per_record() -> Result<(), Report> {
    let records = records()?;
    let table = linelist(&records.iter().collect_vec())?;

    assert_eq!(records.len(), table.rows.len());
    assert_eq!("s1", table.get("seq_name", 0)?);
    assert_eq!("20A", table.get("clade", 0)?);
    assert_eq!("A123T,C456G", table.get("substitutions", 0)?);
    assert_eq!("S:N501Y", table.get("aa_substitutions", 0)?);
    assert_eq!("failed", table.get("status", 2)?);
    assert_eq!("alignment failed", table.get("errors", 2)?);
    // pending records have empty content columns
    assert_eq!("queued", table.get("status", 3)?);
    assert_eq!("", table.get("clade", 3)?);
    Ok(())
}

fn success(index: usize, seq_name: &str, clade: &str, qc_status: QcStatus) -> Outcome {
    Outcome {
        index,
        seq_name: seq_name.to_string(),
        result: Some(AnalysisResult {
            clade: clade.to_string(),
            qc: QcSummary { overall_score: 10.0, overall_status: qc_status },
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
fn linelist_round_trip_counts() -> Result<(), Report> {
    let mut store = Store::new();
    let names = ["s1", "s2", "s3", "s4"].map(String::from);
    store.initialize(&names)?;
    store.complete_one(success(0, "s1", "20A", QcStatus::Good))?;
    store.complete_one(success(1, "s2", "20B", QcStatus::Bad))?;

    let mut failed = success(2, "s3", "20A", QcStatus::Good);
    failed.result = None;
    failed.error = Some("alignment failed".to_string());
    store.complete_one(failed)?;
    // s4 stays pending

    let refs = store.records().iter().collect_vec();
    let file = Builder::new().suffix(".tsv").tempfile()?;
    write_linelist(&refs, file.path())?;

    let table = Table::read(file.path(), None)?;
    let observed = counts_from_linelist(&table)?;

    // must match the in-memory summary exactly
    assert_eq!(store.counts(), observed);
    Ok(())
}

#[test]
fn ndjson_round_trip() -> Result<(), Report> {
    let records = records()?;
    let refs = records.iter().collect_vec();

    let file = Builder::new().suffix(".ndjson").tempfile()?;
    write_ndjson(&refs, file.path())?;

    let content = std::fs::read_to_string(file.path())?;
    let observed = content
        .lines()
        .map(serde_json::from_str::<Record>)
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(records, observed);
    Ok(())
}

#[test]
fn tree_annotations_cover_done_records_only() -> Result<(), Report> {
    let records = records()?;
    let refs = records.iter().collect_vec();

    let file = Builder::new().suffix(".json").tempfile()?;
    write_tree_annotations(&refs, file.path())?;

    let content = std::fs::read_to_string(file.path())?;
    let observed: serde_json::Value = serde_json::from_str(&content)?;
    let nodes = observed["nodes"].as_object().expect("nodes object");

    assert_eq!(2, nodes.len());
    assert_eq!("20A", nodes["s1"]["clade"]);
    assert_eq!("bad", nodes["s2"]["qc_status"]);
    assert!(nodes.get("s3").is_none());
    Ok(())
}
