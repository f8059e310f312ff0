//! The sort comparator: a configurable total order over records, applied
//! before filtering.


use crate::record::Record;
use clap::ValueEnum;
use color_eyre::eyre::{eyre, Report, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::default::Default;
use std::str::FromStr;

// ----------------------------------------------------------------------------
// Sort Column
// ----------------------------------------------------------------------------

/// The record field to order by.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize, ValueEnum)]
pub enum SortColumn {
    /// Insertion index, the submission order.
    #[default]
    Index,
    /// Sequence name, lexicographic.
    Name,
    /// Assigned clade label. Records without a result sort first ascending.
    Clade,
    /// QC overall score. Records without a result sort first ascending.
    QcScore,
}

impl std::fmt::Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let column = match self {
            SortColumn::Index => "index",
            SortColumn::Name => "name",
            SortColumn::Clade => "clade",
            SortColumn::QcScore => "qc-score",
        };
        write!(f, "{column}")
    }
}

impl FromStr for SortColumn {
    type Err = Report;

    fn from_str(text: &str) -> Result<Self, Report> {
        let column = match text {
            "index" => SortColumn::Index,
            "name" => SortColumn::Name,
            "clade" => SortColumn::Clade,
            "qc-score" => SortColumn::QcScore,
            _ => Err(eyre!("Unknown sort column: {text}"))?,
        };
        Ok(column)
    }
}

// ----------------------------------------------------------------------------
// Sort Order
// ----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize, ValueEnum)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let order = match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        };
        write!(f, "{order}")
    }
}

// ----------------------------------------------------------------------------
// Sort State
// ----------------------------------------------------------------------------

/// Column and direction describing the total order applied before filtering.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub column: SortColumn,
    pub order: SortOrder,
}

/// Compare two records under a sort state.
///
/// Ties are always broken by insertion index ascending, independent of the
/// direction, so the order is total and reproducible.
pub fn compare(a: &Record, b: &Record, state: &SortState) -> Ordering {
    let ordering = match state.column {
        SortColumn::Index => a.index.cmp(&b.index),
        SortColumn::Name => a.seq_name.cmp(&b.seq_name),
        SortColumn::Clade => a.clade().cmp(&b.clade()),
        SortColumn::QcScore => compare_scores(a.qc_score(), b.qc_score()),
    };
    let ordering = match state.order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    };
    ordering.then(a.index.cmp(&b.index))
}

fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.total_cmp(&b),
    }
}
