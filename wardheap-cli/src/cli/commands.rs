//! Command implementations and argument parsing for the wardheap CLI.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::{Span, field, info, instrument};
use wardheap_core::{Dendrogram, Partition, SampleMatrix, WardBuilder, WardCriterion, WardError};
use wardheap_providers_dense::{DenseProviderError, DenseSampleProvider};
use wardheap_providers_text::{TextProviderError, TextSampleProvider};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "wardheap", about = "Build Ward dendrograms from numeric samples.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Build a dendrogram and report its merges.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Stop merging at this many clusters and print their assignments.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub clusters: Option<usize>,

    /// Merge-cost criterion.
    #[arg(long, value_enum, default_value_t = CriterionArg::Variance)]
    pub criterion: CriterionArg,

    /// Data source configuration.
    #[command(subcommand)]
    pub source: RunSource,
}

/// Merge-cost criteria selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CriterionArg {
    /// Increase in mean squared distance to the centroid.
    Variance,
    /// Increase in the total within-cluster sum of squares.
    SumOfSquares,
}

impl From<CriterionArg> for WardCriterion {
    fn from(value: CriterionArg) -> Self {
        match value {
            CriterionArg::Variance => Self::Variance,
            CriterionArg::SumOfSquares => Self::SumOfSquares,
        }
    }
}

/// Input data sources supported by `run`.
#[derive(Debug, Subcommand, Clone)]
pub enum RunSource {
    /// Read a Parquet file containing a `FixedSizeList<Float32 | Float64, D>` column.
    Parquet(ParquetArgs),
    /// Read delimited numeric text, one sample per line.
    Text(TextArgs),
}

/// Parquet ingestion arguments.
#[derive(Debug, Args, Clone)]
pub struct ParquetArgs {
    /// Path to the Parquet file containing feature vectors.
    pub path: PathBuf,

    /// Column containing the feature vectors.
    #[arg(long)]
    pub column: String,

    /// Override name for the data source (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Text ingestion arguments.
#[derive(Debug, Args, Clone)]
pub struct TextArgs {
    /// Path to a UTF-8 text file with one sample per line.
    pub path: PathBuf,

    /// Field separator; runs of whitespace when omitted.
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Override name for the data source (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while loading an input source.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Dense ingestion failed.
    #[error(transparent)]
    Dense(#[from] DenseProviderError),
    /// Text ingestion failed.
    #[error(transparent)]
    Text(#[from] TextProviderError),
    /// Building or cutting the dendrogram failed.
    #[error(transparent)]
    Core(#[from] WardError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name of the data source.
    pub data_source: String,
    /// The dendrogram that was built.
    pub dendrogram: Dendrogram,
    /// Flat assignments, present when `--clusters` was given.
    pub partition: Option<Partition>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading or clustering fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use wardheap_cli::cli::{Cli, Command, CriterionArg, RunCommand, RunSource, TextArgs, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "0 0\n1 1\n5 25\n")?;
/// let cli = Cli {
///     command: Command::Run(RunCommand {
///         clusters: Some(2),
///         criterion: CriterionArg::Variance,
///         source: RunSource::Text(TextArgs {
///             path: file.path().to_path_buf(),
///             delimiter: None,
///             name: None,
///         }),
///     }),
/// };
/// let summary = run_cli(cli)?;
/// let partition = summary.partition.expect("clusters were requested");
/// assert_eq!(partition.assignments(), &[0, 0, 1]);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(criterion = field::Empty, clusters = field::Empty, source = field::Empty),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let RunCommand {
        clusters,
        criterion,
        source,
    } = command;
    let criterion = WardCriterion::from(criterion);
    let span = Span::current();
    span.record("criterion", field::display(criterion));
    if let Some(count) = clusters {
        span.record("clusters", count);
    }

    let (data_source, samples) = match source {
        RunSource::Parquet(args) => {
            span.record("source", field::display("parquet"));
            load_parquet(args)?
        }
        RunSource::Text(args) => {
            span.record("source", field::display("text"));
            load_text(args)?
        }
    };

    let dendrogram = WardBuilder::new()
        .with_criterion(criterion)
        .with_target_clusters(clusters.unwrap_or(1))
        .build(samples)?
        .run()?;
    let partition = clusters.map(|count| dendrogram.cut(count)).transpose()?;

    info!(
        data_source = data_source.as_str(),
        samples = dendrogram.sample_count(),
        merges = dendrogram.merge_count(),
        "command completed"
    );
    Ok(ExecutionSummary {
        data_source,
        dendrogram,
        partition,
    })
}

#[instrument(
    name = "cli.load_parquet",
    err,
    skip(args),
    fields(path = field::Empty, column = field::Empty, override_name = field::Empty),
)]
pub(super) fn load_parquet(args: ParquetArgs) -> Result<(String, SampleMatrix), CliError> {
    let ParquetArgs { path, column, name } = args;
    let span = Span::current();
    span.record("path", field::display(path.display()));
    span.record("column", field::display(&column));
    span.record(
        "override_name",
        field::display(name.as_deref().unwrap_or("<derived>")),
    );
    let chosen_name = derive_data_source_name(&path, name.as_deref());
    let provider = DenseSampleProvider::try_from_parquet_path(chosen_name, &path, &column)?;
    info!(
        data_source = provider.name(),
        rows = provider.len(),
        dimension = provider.dimension(),
        "parquet samples loaded"
    );
    Ok((provider.name().to_owned(), provider.into_samples()))
}

#[instrument(
    name = "cli.load_text",
    err,
    skip(args),
    fields(path = field::Empty, delimiter = field::Empty, override_name = field::Empty),
)]
pub(super) fn load_text(args: TextArgs) -> Result<(String, SampleMatrix), CliError> {
    let TextArgs {
        path,
        delimiter,
        name,
    } = args;
    let span = Span::current();
    span.record("path", field::display(path.display()));
    span.record(
        "delimiter",
        field::display(delimiter.map_or_else(|| "whitespace".to_owned(), |c| c.to_string())),
    );
    span.record(
        "override_name",
        field::display(name.as_deref().unwrap_or("<derived>")),
    );
    let chosen_name = derive_data_source_name(&path, name.as_deref());
    let reader = open_text_reader(&path)?;
    let provider = TextSampleProvider::try_from_reader(chosen_name, reader, delimiter)?;
    info!(
        data_source = provider.name(),
        rows = provider.samples().rows(),
        dimension = provider.samples().dimension(),
        "text samples loaded"
    );
    Ok((provider.name().to_owned(), provider.into_samples()))
}

#[instrument(name = "cli.open_text_reader", err, fields(path = field::Empty))]
pub(super) fn open_text_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    Span::current().record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

pub(super) fn derive_data_source_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "data_source".to_owned(), ToOwned::to_owned)
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// Each merge is written as `merged = left + right @ cost`. When a partition
/// is present, one `index<TAB>label` line follows per sample.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let dendrogram = &summary.dendrogram;
    writeln!(writer, "data source: {}", summary.data_source)?;
    writeln!(writer, "samples: {}", dendrogram.sample_count())?;
    writeln!(writer, "criterion: {}", dendrogram.criterion())?;
    writeln!(writer, "merges: {}", dendrogram.merge_count())?;
    for step in dendrogram.merges() {
        writeln!(
            writer,
            "{} = {} + {} @ {}",
            step.merged, step.left, step.right, step.cost
        )?;
    }
    if let Some(partition) = &summary.partition {
        writeln!(writer, "clusters: {}", partition.cluster_count())?;
        for (index, label) in partition.assignments().iter().enumerate() {
            writeln!(writer, "{index}\t{label}")?;
        }
    }
    Ok(())
}
