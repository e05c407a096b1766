//! Unit tests for the CLI commands and data ingestion helpers.

use super::commands::{derive_data_source_name, run_command};
use super::test_fixtures::{create_parquet_file, create_text_file, temp_dir};
use super::{
    Cli, CliError, Command, CriterionArg, ParquetArgs, RunCommand, RunSource, TextArgs,
    render_summary, run_cli,
};

use std::path::{Path, PathBuf};

use clap::Parser;
use rstest::rstest;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use wardheap_core::{SampleError, WardCriterion, WardError};
use wardheap_providers_dense::DenseProviderError;
use wardheap_providers_text::TextProviderError;
use wardheap_test_support::tracing::RecordingLayer;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const OUTLIER: &str = "0 0\n1 1\n5 25\n";

fn text_command(path: PathBuf, clusters: Option<usize>) -> RunCommand {
    RunCommand {
        clusters,
        criterion: CriterionArg::Variance,
        source: RunSource::Text(TextArgs {
            path,
            delimiter: None,
            name: None,
        }),
    }
}

fn expect_error(command: RunCommand, message: &str) -> CliError {
    match run_command(command) {
        Ok(_) => panic!("{message}"),
        Err(err) => err,
    }
}

#[rstest]
#[case::override_name("/tmp/source.parquet", Some("override"), "override")]
#[case::stem_with_extension("/tmp/source.parquet", None, "source")]
#[case::stem_without_extension("/tmp/source", None, "source")]
#[case::missing_stem("", None, "data_source")]
fn derive_data_source_name_selects_expected_name(
    #[case] raw_path: &str,
    #[case] override_name: Option<&'static str>,
    #[case] expected: &str,
) {
    let name = derive_data_source_name(Path::new(raw_path), override_name);
    assert_eq!(name, expected);
}

#[rstest]
fn run_text_builds_full_dendrogram() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "points.txt", OUTLIER)?;
    let cli = Cli {
        command: Command::Run(text_command(path, None)),
    };
    let summary = run_cli(cli)?;
    assert_eq!(summary.data_source, "points");
    assert_eq!(summary.dendrogram.len(), 5);
    assert!(summary.partition.is_none());

    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    let text = String::from_utf8(buffer)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines.get(..5),
        Some(
            &[
                "data source: points",
                "samples: 3",
                "criterion: variance",
                "merges: 2",
                "3 = 0 + 1 @ 0.5",
            ][..]
        )
    );
    assert!(lines.get(5).is_some_and(|line| line.starts_with("4 = 3 + 2 @ ")));
    assert_eq!(lines.len(), 6);
    Ok(())
}

#[rstest]
fn run_text_with_clusters_prints_assignments() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "points.txt", OUTLIER)?;
    let summary = run_command(text_command(path, Some(2)))?;
    assert_eq!(summary.dendrogram.merge_count(), 1);

    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    let text = String::from_utf8(buffer)?;
    assert!(text.contains("merges: 1\n3 = 0 + 1 @ 0.5\n"));
    assert!(text.ends_with("clusters: 2\n0\t0\n1\t0\n2\t1\n"));
    Ok(())
}

#[rstest]
#[case(CriterionArg::Variance)]
#[case(CriterionArg::SumOfSquares)]
fn run_parquet_separates_pairs(#[case] criterion: CriterionArg) -> TestResult {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet")?;
    let command = RunCommand {
        clusters: Some(2),
        criterion,
        source: RunSource::Parquet(ParquetArgs {
            path,
            column: "features".into(),
            name: Some("parquet".into()),
        }),
    };
    let summary = run_command(command)?;
    assert_eq!(summary.data_source, "parquet");
    assert_eq!(summary.dendrogram.criterion(), WardCriterion::from(criterion));
    let partition = summary.partition.expect("clusters were requested");
    assert_eq!(partition.assignments(), &[0, 0, 1, 1]);
    Ok(())
}

#[rstest]
fn run_parquet_rejects_missing_column() -> TestResult {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "vectors.parquet")?;
    let command = RunCommand {
        clusters: None,
        criterion: CriterionArg::Variance,
        source: RunSource::Parquet(ParquetArgs {
            path,
            column: "unknown".into(),
            name: None,
        }),
    };
    let err = expect_error(command, "unknown column must fail");
    assert!(matches!(
        err,
        CliError::Dense(DenseProviderError::ColumnNotFound { .. })
    ));
    Ok(())
}

#[rstest]
fn run_text_rejects_empty_files() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "empty.txt", "# nothing here\n")?;
    let err = expect_error(text_command(path, None), "empty input must fail");
    assert!(matches!(
        err,
        CliError::Text(TextProviderError::Samples(SampleError::EmptySamples))
    ));
    Ok(())
}

#[rstest]
#[case(0, WardError::InvalidTargetClusters { got: 0 })]
#[case(4, WardError::TargetExceedsSamples { target: 4, samples: 3 })]
fn run_command_rejects_unreachable_cluster_counts(
    #[case] clusters: usize,
    #[case] expected: WardError,
) -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "points.txt", OUTLIER)?;
    let err = expect_error(text_command(path, Some(clusters)), "cluster count is invalid");
    match err {
        CliError::Core(core) => assert_eq!(core, expected),
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[rstest]
fn clap_parses_run_options() -> TestResult {
    let cli = Cli::try_parse_from([
        "wardheap",
        "run",
        "--clusters",
        "3",
        "--criterion",
        "sum-of-squares",
        "text",
        "data.csv",
        "--delimiter",
        ",",
    ])?;
    let Command::Run(run) = cli.command;
    assert_eq!(run.clusters, Some(3));
    assert_eq!(run.criterion, CriterionArg::SumOfSquares);
    match run.source {
        RunSource::Text(args) => {
            assert_eq!(args.path, PathBuf::from("data.csv"));
            assert_eq!(args.delimiter, Some(','));
        }
        RunSource::Parquet(_) => panic!("expected a text source"),
    }
    Ok(())
}

#[rstest]
#[case::unknown_criterion(&["wardheap", "run", "--criterion", "single", "text", "a.txt"])]
#[case::missing_column(&["wardheap", "run", "parquet", "a.parquet"])]
#[case::multi_char_delimiter(&["wardheap", "run", "text", "a.txt", "--delimiter", ";;"])]
fn clap_rejects_invalid_arguments(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[rstest]
fn run_command_emits_tracing_fields() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "points.txt", OUTLIER)?;
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let summary = tracing::subscriber::with_default(subscriber, || {
        run_command(text_command(path, Some(2)))
    })?;
    assert_eq!(summary.data_source, "points");

    let execute = layer.span_named("cli.execute").expect("cli.execute span must exist");
    assert_eq!(execute.fields.get("criterion"), Some(&"variance".to_owned()));
    assert_eq!(execute.fields.get("clusters"), Some(&"2".to_owned()));
    assert_eq!(execute.fields.get("source"), Some(&"text".to_owned()));

    let load = layer.span_named("cli.load_text").expect("cli.load_text span must exist");
    assert!(
        load.fields
            .get("path")
            .is_some_and(|value| value.ends_with("points.txt"))
    );
    assert_eq!(load.fields.get("delimiter"), Some(&"whitespace".to_owned()));
    assert_eq!(load.fields.get("override_name"), Some(&"<derived>".to_owned()));

    assert!(layer.span_named("core.tree.run").is_some());
    assert!(layer.events().iter().any(|event| {
        event.level == Level::INFO
            && event
                .fields
                .get("message")
                .is_some_and(|value| value == "command completed")
            && event
                .fields
                .get("data_source")
                .is_some_and(|value| value == "points")
    }));
    Ok(())
}

#[rstest]
fn open_text_reader_records_path_on_error() {
    let dir = temp_dir();
    let missing = dir.path().join("missing.txt");
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let err = tracing::subscriber::with_default(subscriber, || {
        run_command(text_command(missing, None))
    })
    .expect_err("missing file must fail");
    assert!(matches!(err, CliError::Io { .. }));

    let reader = layer
        .span_named("cli.open_text_reader")
        .expect("reader span must exist");
    assert!(
        reader
            .fields
            .get("path")
            .is_some_and(|value| value.ends_with("missing.txt"))
    );
}
