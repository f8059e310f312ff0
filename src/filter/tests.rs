use crate::filter::{AaPattern, FilterState, MutationPattern};
use crate::record::{AnalysisResult, QcStatus, QcSummary, Record, Status};
use color_eyre::eyre::{Report, Result};

fn done(index: usize, seq_name: &str, clade: &str, qc_status: QcStatus) -> Result<Record, Report> {
    let mut record = Record::queued(index, seq_name);
    record.status = Status::Done;
    record.result = Some(AnalysisResult {
        clade: clade.to_string(),
        qc: QcSummary { overall_score: 10.0, overall_status: qc_status },
        substitutions: vec!["A123T".parse()?, "C456G".parse()?],
        aa_substitutions: vec!["S:N501Y".parse()?, "N:R203K".parse()?],
    });
    Ok(record)
}

fn failed(index: usize, seq_name: &str) -> Record {
    let mut record = Record::queued(index, seq_name);
    record.status = Status::Failed;
    record.errors = vec!["alignment failed".to_string()];
    record
}

#[test]
fn mutation_pattern_forms() -> Result<(), Report> {
    let substitution = "A123T".parse()?;

    for text in ["A123T", "123T", "A123", "123"] {
        let pattern: MutationPattern = text.parse()?;
        assert!(pattern.matches(&substitution), "pattern {text} should match");
    }
    for text in ["G123T", "123C", "124"] {
        let pattern: MutationPattern = text.parse()?;
        assert!(!pattern.matches(&substitution), "pattern {text} should not match");
    }
    Ok(())
}

#[test]
fn mutation_pattern_rejects_malformed() {
    for text in ["", "T", "AB123", "123TT", "A12B3T"] {
        assert!(text.parse::<MutationPattern>().is_err(), "pattern {text:?} should fail");
    }
}

#[test]
fn aa_pattern_forms() -> Result<(), Report> {
    let substitution = "S:N501Y".parse()?;

    for text in ["S:N501Y", "S:501", "s:501Y", "501Y", "N501Y"] {
        let pattern: AaPattern = text.parse()?;
        assert!(pattern.matches(&substitution), "pattern {text} should match");
    }
    for text in ["N:501", "S:502", "S:N501F"] {
        let pattern: AaPattern = text.parse()?;
        assert!(!pattern.matches(&substitution), "pattern {text} should not match");
    }
    Ok(())
}

#[test]
fn compile_rejects_malformed_fields() {
    let filter = FilterState { mutations: "A123T,bogus".to_string(), ..Default::default() };
    assert!(filter.compile().is_err());

    let filter = FilterState { aa_mutations: "S:".to_string(), ..Default::default() };
    assert!(filter.compile().is_err());
}

#[test]
fn default_filter_matches_all() -> Result<(), Report> {
    let compiled = FilterState::default().compile()?;
    assert!(compiled.is_match(&Record::queued(0, "s1")));
    assert!(compiled.is_match(&done(1, "s2", "20A", QcStatus::Good)?));
    assert!(compiled.is_match(&failed(2, "s3")));
    Ok(())
}

#[test]
fn name_filter_substring_terms() -> Result<(), Report> {
    let filter = FilterState { name: "alpha, beta".to_string(), ..Default::default() };
    let compiled = filter.compile()?;

    assert!(compiled.is_match(&done(0, "hCoV/Alpha/21", "20A", QcStatus::Good)?));
    assert!(compiled.is_match(&done(1, "beta-3", "20A", QcStatus::Good)?));
    assert!(!compiled.is_match(&done(2, "gamma-1", "20A", QcStatus::Good)?));
    Ok(())
}

#[test]
fn content_predicates_never_exclude_queued() -> Result<(), Report> {
    let filter = FilterState {
        name: "nomatch".to_string(),
        mutations: "999".to_string(),
        aa_mutations: "S:999".to_string(),
        clades: "nomatch".to_string(),
        ..Default::default()
    };
    let compiled = filter.compile()?;

    let mut queued = Record::queued(0, "s1");
    assert!(compiled.is_match(&queued));
    queued.status = Status::Running;
    assert!(compiled.is_match(&queued));

    // done records are subject to all of them
    assert!(!compiled.is_match(&done(1, "s2", "20A", QcStatus::Good)?));
    Ok(())
}

#[test]
fn mutation_filter_matches_any_substitution() -> Result<(), Report> {
    let filter = FilterState { mutations: "456".to_string(), ..Default::default() };
    let compiled = filter.compile()?;
    assert!(compiled.is_match(&done(0, "s1", "20A", QcStatus::Good)?));

    let filter = FilterState { mutations: "999,G456".to_string(), ..Default::default() };
    let compiled = filter.compile()?;
    assert!(!compiled.is_match(&done(0, "s1", "20A", QcStatus::Good)?));
    Ok(())
}

#[test]
fn aa_filter_gene_scoping() -> Result<(), Report> {
    let filter = FilterState { aa_mutations: "N:203".to_string(), ..Default::default() };
    let compiled = filter.compile()?;
    assert!(compiled.is_match(&done(0, "s1", "20A", QcStatus::Good)?));

    let filter = FilterState { aa_mutations: "ORF1a:203".to_string(), ..Default::default() };
    let compiled = filter.compile()?;
    assert!(!compiled.is_match(&done(0, "s1", "20A", QcStatus::Good)?));
    Ok(())
}

#[test]
fn clade_filter_set_membership() -> Result<(), Report> {
    let filter = FilterState { clades: "20a, 21K".to_string(), ..Default::default() };
    let compiled = filter.compile()?;

    assert!(compiled.is_match(&done(0, "s1", "20A", QcStatus::Good)?));
    assert!(compiled.is_match(&done(1, "s2", "21K", QcStatus::Good)?));
    assert!(!compiled.is_match(&done(2, "s3", "20B", QcStatus::Good)?));
    // exact membership, not substring
    assert!(!compiled.is_match(&done(3, "s4", "20A.1", QcStatus::Good)?));
    Ok(())
}

#[test]
fn qc_toggles_gate_buckets() -> Result<(), Report> {
    let filter = FilterState { show_bad: false, show_errors: false, ..Default::default() };
    let compiled = filter.compile()?;

    assert!(compiled.is_match(&done(0, "s1", "20A", QcStatus::Good)?));
    assert!(compiled.is_match(&done(1, "s2", "20A", QcStatus::Mediocre)?));
    assert!(!compiled.is_match(&done(2, "s3", "20A", QcStatus::Bad)?));
    assert!(!compiled.is_match(&failed(3, "s4")));
    Ok(())
}

#[test]
fn errors_toggle_gates_failed_records() -> Result<(), Report> {
    // bucket toggles off, errors toggle on: failed records stay visible
    let filter = FilterState {
        show_good: false,
        show_mediocre: false,
        show_bad: false,
        ..Default::default()
    };
    let compiled = filter.compile()?;

    assert!(compiled.is_match(&failed(0, "s1")));
    assert!(!compiled.is_match(&done(1, "s2", "20A", QcStatus::Good)?));
    Ok(())
}
