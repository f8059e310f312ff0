//! The filter predicate set: independent predicates over a record, combined
//! with logical AND to decide visibility.

#[cfg(test)]
mod tests;

use crate::record::{AaSubstitution, AnalysisResult, QcStatus, Record, Status, Substitution};
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::str::FromStr;

// ----------------------------------------------------------------------------
// Filter State
// ----------------------------------------------------------------------------

/// The current predicate configuration, as entered by the user.
///
/// A plain value object. Pattern fields hold comma-separated terms and are
/// parsed by [compile](FilterState::compile) before evaluation, so malformed
/// input is rejected at the input site instead of mid-pipeline.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FilterState {
    /// Case-insensitive substring terms matched against sequence names.
    pub name: String,
    /// Nucleotide substitution patterns, ex. `A123T`, `123T`, `A123`, `123`.
    pub mutations: String,
    /// Amino-acid substitution patterns, ex. `S:N501Y`, `S:501`, `501Y`.
    pub aa_mutations: String,
    /// Clade names, exact set-membership, case-insensitive.
    pub clades: String,
    /// Visibility toggle for the good QC bucket.
    pub show_good: bool,
    /// Visibility toggle for the mediocre QC bucket.
    pub show_mediocre: bool,
    /// Visibility toggle for the bad QC bucket.
    pub show_bad: bool,
    /// Visibility toggle for failed records.
    pub show_errors: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            name: String::new(),
            mutations: String::new(),
            aa_mutations: String::new(),
            clades: String::new(),
            show_good: true,
            show_mediocre: true,
            show_bad: true,
            show_errors: true,
        }
    }
}

impl FilterState {
    /// Parse the free-text fields into a [Compiled] filter.
    pub fn compile(&self) -> Result<Compiled, Report> {
        let mutations = split_terms(&self.mutations)
            .map(|term| term.parse())
            .collect::<Result<Vec<MutationPattern>, Report>>()
            .wrap_err("Invalid mutation filter.")?;
        let aa_mutations = split_terms(&self.aa_mutations)
            .map(|term| term.parse())
            .collect::<Result<Vec<AaPattern>, Report>>()
            .wrap_err("Invalid amino-acid filter.")?;

        Ok(Compiled {
            names: split_terms(&self.name).map(|term| term.to_lowercase()).collect(),
            mutations,
            aa_mutations,
            clades: split_terms(&self.clades).map(|term| term.to_lowercase()).collect(),
            show_good: self.show_good,
            show_mediocre: self.show_mediocre,
            show_bad: self.show_bad,
            show_errors: self.show_errors,
        })
    }
}

fn split_terms(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|term| !term.is_empty())
}

// ----------------------------------------------------------------------------
// Mutation Pattern
// ----------------------------------------------------------------------------

/// A nucleotide substitution pattern: a coordinate with optional reference
/// and alternate bases.
///
/// # Examples
///
/// ```
/// use seqsift::filter::MutationPattern;
/// use seqsift::record::Substitution;
///
/// let pattern: MutationPattern = "123T".parse().unwrap();
/// let substitution: Substitution = "A123T".parse().unwrap();
/// assert!(pattern.matches(&substitution));
/// ```
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct MutationPattern {
    pub coord: usize,
    pub reference: Option<char>,
    pub alt: Option<char>,
}

impl MutationPattern {
    pub fn matches(&self, substitution: &Substitution) -> bool {
        self.coord == substitution.coord
            && self.reference.map_or(true, |base| base == substitution.reference)
            && self.alt.map_or(true, |base| base == substitution.alt)
    }
}

impl FromStr for MutationPattern {
    type Err = Report;

    fn from_str(text: &str) -> Result<Self, Report> {
        let (reference, coord, alt) = parse_pattern(text)?;
        Ok(MutationPattern { coord, reference, alt })
    }
}

/// Split a pattern into (reference, coordinate, alternate).
///
/// The coordinate is required; reference and alternate characters on either
/// side of it are optional.
fn parse_pattern(text: &str) -> Result<(Option<char>, usize, Option<char>), Report> {
    let chars = text.chars().collect_vec();

    let digits_start = chars.iter().position(|c| c.is_ascii_digit());
    let digits_end = chars.iter().rposition(|c| c.is_ascii_digit());
    let (Some(start), Some(end)) = (digits_start, digits_end) else {
        return Err(eyre!("Pattern has no coordinate: {text}"));
    };

    if start > 1 || end < chars.len().saturating_sub(2) {
        return Err(eyre!("Pattern is not of the form [ref]<coord>[alt]: {text}"));
    }

    let reference = (start == 1).then(|| chars[0]);
    let alt = (end + 2 == chars.len()).then(|| chars[chars.len() - 1]);
    let coord = chars[start..=end]
        .iter()
        .collect::<String>()
        .parse()
        .wrap_err_with(|| eyre!("Pattern coordinate is not numeric: {text}"))?;

    Ok((reference, coord, alt))
}

// ----------------------------------------------------------------------------
// Amino Acid Pattern
// ----------------------------------------------------------------------------

/// An amino-acid substitution pattern: optional gene, coordinate, optional
/// reference and alternate residues.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AaPattern {
    pub gene: Option<String>,
    pub coord: usize,
    pub reference: Option<char>,
    pub alt: Option<char>,
}

impl AaPattern {
    pub fn matches(&self, substitution: &AaSubstitution) -> bool {
        self.gene
            .as_ref()
            .map_or(true, |gene| gene.eq_ignore_ascii_case(&substitution.gene))
            && self.coord == substitution.coord
            && self.reference.map_or(true, |residue| residue == substitution.reference)
            && self.alt.map_or(true, |residue| residue == substitution.alt)
    }
}

impl FromStr for AaPattern {
    type Err = Report;

    fn from_str(text: &str) -> Result<Self, Report> {
        let (gene, mutation) = match text.split_once(':') {
            Some((gene, mutation)) if !gene.is_empty() => (Some(gene.to_string()), mutation),
            Some((_, mutation)) => (None, mutation),
            None => (None, text),
        };
        let (reference, coord, alt) = parse_pattern(mutation)?;
        Ok(AaPattern { gene, coord, reference, alt })
    }
}

// ----------------------------------------------------------------------------
// Compiled Filter
// ----------------------------------------------------------------------------

/// A [FilterState] with all free-text fields parsed, ready for evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct Compiled {
    names: Vec<String>,
    mutations: Vec<MutationPattern>,
    aa_mutations: Vec<AaPattern>,
    clades: Vec<String>,
    show_good: bool,
    show_mediocre: bool,
    show_bad: bool,
    show_errors: bool,
}

impl Default for Compiled {
    fn default() -> Self {
        Compiled {
            names: Vec::new(),
            mutations: Vec::new(),
            aa_mutations: Vec::new(),
            clades: Vec::new(),
            show_good: true,
            show_mediocre: true,
            show_bad: true,
            show_errors: true,
        }
    }
}

impl Compiled {
    /// Decide visibility of one record. Predicates are AND-combined.
    ///
    /// Queued and running records have nothing to match content predicates
    /// against and stay visible for the duration of the run. Failed records
    /// carry no result either; they answer to the errors toggle and the name
    /// filter only.
    pub fn is_match(&self, record: &Record) -> bool {
        match record.status {
            Status::Queued | Status::Running => true,
            Status::Failed => self.show_errors && self.matches_name(record),
            Status::Done => match &record.result {
                Some(result) => {
                    self.bucket_enabled(result.qc.overall_status)
                        && self.matches_name(record)
                        && self.matches_mutations(result)
                        && self.matches_aa_mutations(result)
                        && self.matches_clade(result)
                }
                None => false,
            },
        }
    }

    fn bucket_enabled(&self, status: QcStatus) -> bool {
        match status {
            QcStatus::Good => self.show_good,
            QcStatus::Mediocre => self.show_mediocre,
            QcStatus::Bad => self.show_bad,
        }
    }

    fn matches_name(&self, record: &Record) -> bool {
        if self.names.is_empty() {
            return true;
        }
        let seq_name = record.seq_name.to_lowercase();
        self.names.iter().any(|term| seq_name.contains(term))
    }

    fn matches_mutations(&self, result: &AnalysisResult) -> bool {
        if self.mutations.is_empty() {
            return true;
        }
        self.mutations
            .iter()
            .any(|pattern| result.substitutions.iter().any(|sub| pattern.matches(sub)))
    }

    fn matches_aa_mutations(&self, result: &AnalysisResult) -> bool {
        if self.aa_mutations.is_empty() {
            return true;
        }
        self.aa_mutations
            .iter()
            .any(|pattern| result.aa_substitutions.iter().any(|sub| pattern.matches(sub)))
    }

    fn matches_clade(&self, result: &AnalysisResult) -> bool {
        if self.clades.is_empty() {
            return true;
        }
        let clade = result.clade.to_lowercase();
        self.clades.iter().any(|name| *name == clade)
    }
}
