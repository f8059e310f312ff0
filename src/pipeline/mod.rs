//! The aggregation pipeline: sort the full record collection, then filter,
//! producing the derived visible-results sequence.


use crate::filter::Compiled;
use crate::record::Record;
use crate::sort::{self, SortState};
use itertools::Itertools;

/// Derive the visible-results sequence from the canonical collection.
///
/// Pure: no side effects, and deterministic for identical inputs. The sort is
/// reapplied in full on every call since completions change sortable fields
/// without changing membership.
pub fn recompute<'r>(
    records: &'r [Record],
    sort_state: &SortState,
    filter: &Compiled,
) -> Vec<&'r Record> {
    let mut ordered = records.iter().collect_vec();
    ordered.sort_by(|a, b| sort::compare(a, b, sort_state));
    ordered.into_iter().filter(|record| filter.is_match(record)).collect_vec()
}
