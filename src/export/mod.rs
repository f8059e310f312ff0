//! Export serializers: pure formatters over the record collection.

#[cfg(test)]
mod tests;

use crate::record::{QcStatus, Record, Status};
use crate::store::Counts;
use crate::table::Table;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

// ----------------------------------------------------------------------------
// LineList
// ----------------------------------------------------------------------------

pub const LINELIST_HEADERS: &[&str] = &[
    "index",
    "seq_name",
    "status",
    "clade",
    "qc_score",
    "qc_status",
    "substitutions",
    "aa_substitutions",
    "warnings",
    "errors",
];

/// Convert records into a linelist table, one row per record.
pub fn linelist(records: &[&Record]) -> Result<Table, Report> {
    let mut table = Table::new();
    table.headers = LINELIST_HEADERS.iter().map(|h| h.to_string()).collect_vec();

    for (row, record) in records.iter().enumerate() {
        table.add_row(vec![String::new(); table.headers.len()])?;

        table.set("index", row, &record.index.to_string())?;
        table.set("seq_name", row, &record.seq_name)?;
        table.set("status", row, &record.status.to_string())?;

        if let Some(result) = &record.result {
            table.set("clade", row, &result.clade)?;
            table.set("qc_score", row, &result.qc.overall_score.to_string())?;
            table.set("qc_status", row, &result.qc.overall_status.to_string())?;
            table.set(
                "substitutions",
                row,
                &result.substitutions.iter().join(","),
            )?;
            table.set(
                "aa_substitutions",
                row,
                &result.aa_substitutions.iter().join(","),
            )?;
        }

        let warnings = record
            .warnings
            .global
            .iter()
            .cloned()
            .chain(
                record
                    .warnings
                    .in_genes
                    .iter()
                    .map(|warning| format!("{}:{}", warning.gene_name, warning.message)),
            )
            .join(";");
        table.set("warnings", row, &warnings)?;
        table.set("errors", row, &record.errors.iter().join(";"))?;
    }

    Ok(table)
}

/// Write records as a linelist, delimiter identified from the path suffix.
pub fn write_linelist(records: &[&Record], path: &Path) -> Result<(), Report> {
    let table = linelist(records)?;
    table.write(path, None)?;
    Ok(())
}

/// Re-derive summary counts from an exported linelist table.
pub fn counts_from_linelist(table: &Table) -> Result<Counts, Report> {
    let mut counts = Counts { total: table.rows.len(), ..Default::default() };

    let statuses = table.get_column("status")?;
    let qc_statuses = table.get_column("qc_status")?;

    for (status, qc_status) in statuses.into_iter().zip(qc_statuses) {
        match status {
            "queued" | "running" => counts.pending += 1,
            "failed" => counts.errors += 1,
            "done" => match qc_status.parse::<QcStatus>()? {
                QcStatus::Good => counts.good += 1,
                QcStatus::Mediocre => counts.mediocre += 1,
                QcStatus::Bad => counts.bad += 1,
            },
            _ => return Err(eyre!("Unknown record status in linelist: {status}")),
        }
    }

    Ok(counts)
}

// ----------------------------------------------------------------------------
// NDJSON
// ----------------------------------------------------------------------------

/// Write records as NDJSON, one record per line.
pub fn write_ndjson(records: &[&Record], path: &Path) -> Result<(), Report> {
    let mut file =
        File::create(path).wrap_err_with(|| eyre!("Unable to create file: {path:?}"))?;

    for record in records {
        let line = serde_json::to_string(record)
            .wrap_err_with(|| eyre!("Failed to serialize record {}.", record.index))?;
        file.write_all(format!("{line}\n").as_bytes())
            .wrap_err_with(|| eyre!("Unable to write record {}: {path:?}", record.index))?;
    }

    Ok(())
}

// ----------------------------------------------------------------------------
// Tree Annotations
// ----------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct NodeAttrs<'r> {
    clade: &'r str,
    qc_status: QcStatus,
    qc_score: f64,
}

/// Write completed records as a tree-annotation JSON: node attributes keyed
/// by sequence name, for joining onto a phylogenetic tree downstream.
pub fn write_tree_annotations(records: &[&Record], path: &Path) -> Result<(), Report> {
    let nodes: BTreeMap<&str, NodeAttrs> = records
        .iter()
        .filter(|record| record.status == Status::Done)
        .filter_map(|record| {
            let result = record.result.as_ref()?;
            let attrs = NodeAttrs {
                clade: &result.clade,
                qc_status: result.qc.overall_status,
                qc_score: result.qc.overall_score,
            };
            Some((record.seq_name.as_str(), attrs))
        })
        .collect();

    let output = serde_json::to_string_pretty(&BTreeMap::from([("nodes", nodes)]))
        .wrap_err("Failed to serialize tree annotations.")?;

    let mut file =
        File::create(path).wrap_err_with(|| eyre!("Unable to create file: {path:?}"))?;
    file.write_all(format!("{output}\n").as_bytes())
        .wrap_err_with(|| eyre!("Failed to write file: {path:?}"))?;

    Ok(())
}
