//! Per-sequence records and the structured analysis payload they carry.


use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use strum::EnumIter;

// ----------------------------------------------------------------------------
// Status
// ----------------------------------------------------------------------------

/// The lifecycle status of a sequence record.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Submitted, no analysis outcome received yet.
    #[default]
    Queued,
    /// Picked up by a worker.
    Running,
    /// Analysis succeeded, a result payload is attached.
    Done,
    /// Analysis failed for this sequence only.
    Failed,
}

impl Status {
    /// True once the record has reached done or failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Done | Status::Failed)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            Status::Queued => "queued",
            Status::Running => "running",
            Status::Done => "done",
            Status::Failed => "failed",
        };
        write!(f, "{status}")
    }
}

// ----------------------------------------------------------------------------
// QC Status
// ----------------------------------------------------------------------------

/// Overall quality-control classification of a completed sequence.
#[derive(Clone, Copy, Debug, Deserialize, EnumIter, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QcStatus {
    Good,
    Mediocre,
    Bad,
}

impl std::fmt::Display for QcStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            QcStatus::Good => "good",
            QcStatus::Mediocre => "mediocre",
            QcStatus::Bad => "bad",
        };
        write!(f, "{status}")
    }
}

impl FromStr for QcStatus {
    type Err = Report;

    fn from_str(text: &str) -> Result<Self, Report> {
        let status = match text {
            "good" => QcStatus::Good,
            "mediocre" => QcStatus::Mediocre,
            "bad" => QcStatus::Bad,
            _ => Err(eyre!("Unknown QC status: {text}"))?,
        };
        Ok(status)
    }
}

/// QC summary attached to a successful analysis result.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QcSummary {
    pub overall_score: f64,
    pub overall_status: QcStatus,
}

// ----------------------------------------------------------------------------
// Substitution
// ----------------------------------------------------------------------------

/// A nucleotide substitution relative to the reference, displayed as `A123T`.
///
/// # Examples
///
/// ```
/// use seqsift::record::Substitution;
///
/// let substitution: Substitution = "A123T".parse().unwrap();
/// assert_eq!(substitution.coord, 123);
/// assert_eq!(substitution.to_string(), "A123T");
/// ```
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Substitution {
    pub coord: usize,
    pub reference: char,
    pub alt: char,
}

impl std::fmt::Display for Substitution {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}{}", self.reference, self.coord, self.alt)
    }
}

impl FromStr for Substitution {
    type Err = Report;

    fn from_str(text: &str) -> Result<Self, Report> {
        let reference = text
            .chars()
            .next()
            .ok_or_else(|| eyre!("Substitution is empty."))?;
        let alt = text
            .chars()
            .last()
            .ok_or_else(|| eyre!("Substitution is empty."))?;
        let coord = text
            .get(1..text.len() - 1)
            .ok_or_else(|| eyre!("Substitution is too short: {text}"))?
            .parse()
            .wrap_err_with(|| eyre!("Substitution coordinate is not numeric: {text}"))?;

        Ok(Substitution { coord, reference, alt })
    }
}

impl Eq for Substitution {}

impl Ord for Substitution {
    fn cmp(&self, other: &Self) -> Ordering {
        self.coord.cmp(&other.coord)
    }
}

impl PartialOrd for Substitution {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ----------------------------------------------------------------------------
// Amino Acid Substitution
// ----------------------------------------------------------------------------

/// An amino-acid substitution within a gene, displayed as `S:N501Y`.
///
/// # Examples
///
/// ```
/// use seqsift::record::AaSubstitution;
///
/// let substitution: AaSubstitution = "S:N501Y".parse().unwrap();
/// assert_eq!(substitution.gene, "S");
/// assert_eq!(substitution.to_string(), "S:N501Y");
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AaSubstitution {
    pub gene: String,
    pub coord: usize,
    pub reference: char,
    pub alt: char,
}

impl std::fmt::Display for AaSubstitution {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}{}{}", self.gene, self.reference, self.coord, self.alt)
    }
}

impl FromStr for AaSubstitution {
    type Err = Report;

    fn from_str(text: &str) -> Result<Self, Report> {
        let (gene, mutation) = text
            .split_once(':')
            .ok_or_else(|| eyre!("Amino-acid substitution is missing a gene prefix: {text}"))?;
        if gene.is_empty() {
            return Err(eyre!("Amino-acid substitution has an empty gene: {text}"));
        }
        let Substitution { coord, reference, alt } = mutation.parse()?;

        Ok(AaSubstitution { gene: gene.to_string(), coord, reference, alt })
    }
}

impl Eq for AaSubstitution {}

impl Ord for AaSubstitution {
    fn cmp(&self, other: &Self) -> Ordering {
        self.gene.cmp(&other.gene).then(self.coord.cmp(&other.coord))
    }
}

impl PartialOrd for AaSubstitution {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ----------------------------------------------------------------------------
// Peptide
// ----------------------------------------------------------------------------

/// A translated peptide derived from the aligned query, one per gene.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Peptide {
    pub name: String,
    pub seq: String,
}

// ----------------------------------------------------------------------------
// Warnings
// ----------------------------------------------------------------------------

/// A non-fatal warning raised while analyzing one gene of a sequence.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneWarning {
    pub gene_name: String,
    pub message: String,
}

/// Warnings attached to a record. Always present, possibly empty.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warnings {
    #[serde(default)]
    pub global: Vec<String>,
    #[serde(default)]
    pub in_genes: Vec<GeneWarning>,
}

impl Warnings {
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.in_genes.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Analysis Result
// ----------------------------------------------------------------------------

/// The structured output of a successful per-sequence analysis.
///
/// Produced by the external analysis engine and consumed opaquely. Only the
/// fields this viewer filters, sorts, and exports on are modelled.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Assigned clade label.
    pub clade: String,
    /// Overall quality-control summary.
    pub qc: QcSummary,
    /// Nucleotide substitutions relative to the reference.
    #[serde(default)]
    pub substitutions: Vec<Substitution>,
    /// Amino-acid substitutions, per gene.
    #[serde(default)]
    pub aa_substitutions: Vec<AaSubstitution>,
}

// ----------------------------------------------------------------------------
// Record
// ----------------------------------------------------------------------------

/// One tracked unit of work: a submitted sequence and its current state.
///
/// Created queued when the sequence is parsed from input, completed to done or
/// failed when the analysis engine returns an outcome for its index, destroyed
/// only when the whole run is reset.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Stable index assigned at submission, never reused. Default ordering.
    pub index: usize,
    /// Sequence label from the input. Not guaranteed unique.
    pub seq_name: String,
    pub status: Status,
    /// Present iff status is done.
    pub result: Option<AnalysisResult>,
    #[serde(default)]
    pub warnings: Warnings,
    /// Error descriptors, non-empty iff status is failed.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl Record {
    /// Create a queued record for a newly submitted sequence.
    pub fn queued(index: usize, seq_name: &str) -> Self {
        Record {
            index,
            seq_name: seq_name.to_string(),
            status: Status::Queued,
            result: None,
            warnings: Warnings::default(),
            errors: Vec::new(),
        }
    }

    pub fn clade(&self) -> Option<&str> {
        self.result.as_ref().map(|result| result.clade.as_str())
    }

    pub fn qc_score(&self) -> Option<f64> {
        self.result.as_ref().map(|result| result.qc.overall_score)
    }

    pub fn qc_status(&self) -> Option<QcStatus> {
        self.result.as_ref().map(|result| result.qc.overall_status)
    }
}
