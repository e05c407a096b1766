//! CLI entry point for building Ward dendrograms.
//!
//! Parses command-line arguments with clap, builds the dendrogram, renders
//! the summary to stdout, and maps errors to exit codes. Logging is
//! initialised first so later stages can emit structured diagnostics.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use tracing::{error, field};
use wardheap_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let summary = run_cli(cli).context("failed to execute command")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&summary, &mut writer).context("failed to render summary")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        let (code, sample_code) = err
            .downcast_ref::<CliError>()
            .and_then(|cli_error| match cli_error {
                CliError::Core(core) => Some((Some(core.code()), core.sample_code())),
                _ => None,
            })
            .unwrap_or((None, None));

        let code_field = code.map(|code| field::display(code.as_str()));
        let sample_code_field = sample_code.map(|code| field::display(code.as_str()));

        error!(
            error = format!("{err:#}"),
            code = code_field,
            sample_code = sample_code_field,
            "command execution failed"
        );
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialised"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialise logging: {err}");
}
