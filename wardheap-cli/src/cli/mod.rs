//! Command-line interface orchestration for wardheap.
//!
//! The `run` command loads samples from a Parquet column or a delimited text
//! file, builds a Ward dendrogram, and optionally cuts it into a fixed number
//! of clusters.

mod commands;

pub use commands::{
    Cli, CliError, Command, CriterionArg, ExecutionSummary, ParquetArgs, RunCommand, RunSource,
    TextArgs, render_summary, run_cli,
};

#[cfg(test)]
mod test_fixtures;
#[cfg(test)]
mod tests;
