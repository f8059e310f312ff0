pub mod verbosity;

use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use std::ffi::OsStr;
use std::path::Path;

/// Identify a table delimiter from the path extension.
pub fn path_to_delim(path: &Path) -> Result<char, Report> {
    match path.extension().and_then(OsStr::to_str) {
        Some("tsv") => Ok('\t'),
        Some("csv") => Ok(','),
        _ => Err(eyre!("Unknown table extension for path: {path:?}")
            .suggestion("Use a .tsv or .csv extension, or supply the delimiter explicitly.")),
    }
}
