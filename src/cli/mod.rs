//! [Command-line interface](Cli) (CLI) of the main binary.

use crate::{run, Verbosity};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::default::Default;

// ----------------------------------------------------------------------------
// CLI Entry Point
// ----------------------------------------------------------------------------

/// The command-line interface (CLI).
///
/// Parses user input from the command-line in the main function, via the
/// `parse` function of the clap `Parser` trait.
///
/// ```no_run
/// use clap::Parser;
/// let args = seqsift::Cli::parse();
/// ```
#[derive(Debug, Deserialize, Parser, Serialize)]
#[clap(name = "seqsift", author, version)]
#[clap(about = "seqsift aggregates, filters, and sorts per-sequence analysis results.")]
pub struct Cli {
    /// Pass CLI arguments to a particular [Command].
    #[clap(subcommand)]
    pub command: Command,

    /// Set the output [Verbosity] level.
    #[clap(short = 'v', long)]
    #[clap(value_enum, default_value_t = Verbosity::default())]
    #[clap(global = true)]
    pub verbosity: Verbosity,
}

/// CLI [commands](#variants). Decides which runtime command the CLI arguments
/// are passed to.
#[derive(Debug, Deserialize, Serialize, Subcommand)]
pub enum Command {
    /// Aggregate analysis results for a batch of sequences, then filter,
    /// sort, and export them.
    Run(run::Args),
}
