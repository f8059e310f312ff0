//! `seqsift` aggregates, filters, and sorts per-sequence analysis results.
//!
//! ## Why seqsift?
//!
//! 1. `seqsift` _merges_ out-of-order analysis completions into a stable
//!    collection.
//!
//!    An external analysis engine runs sequences in parallel and reports
//!    results in whatever order they finish. `seqsift` correlates each
//!    outcome back to its submission index, so the final collection is
//!    identical no matter the arrival order.
//!
//! 1. `seqsift` _derives_ the results view you actually look at.
//!
//!    Filters (name, mutation, amino-acid change, clade, QC buckets) and a
//!    configurable sort are reapplied over the full collection on every
//!    change. The visible view is never a second source of truth.
//!
//! 1. `seqsift` _exports_ the final collection.
//!
//!    Linelist tables (TSV/CSV), NDJSON, and tree-annotation JSON are pure
//!    formatters over the completed records.

pub mod cli;
pub mod engine;
pub mod export;
pub mod filter;
pub mod pipeline;
pub mod record;
pub mod run;
pub mod sort;
pub mod state;
pub mod store;
pub mod table;
mod utils;

#[doc(inline)]
pub use crate::cli::Cli;
#[doc(inline)]
pub use crate::filter::FilterState;
#[doc(inline)]
pub use crate::record::Record;
#[doc(inline)]
pub use crate::sort::SortState;
#[doc(inline)]
pub use crate::state::{Event, State};
#[doc(inline)]
pub use crate::store::Store;
#[doc(inline)]
pub use crate::table::Table;
#[doc(inline)]
pub use crate::utils::verbosity::Verbosity;
