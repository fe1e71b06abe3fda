use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use glob::MatchOptions;
use rayon::prelude::*;
use rootcause::Report;
use rootcause::prelude::*;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing::{debug, warn};

use tomtool::TomFile;
use tomtool::report::{HeaderReport, InspectOptions, PrimaryDataLabel, parse_offset};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Print the header of ReBoot PS1 `.TOM` model files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Manually estimated end of the primary data block. Decimal or 0x-prefixed hex.
    #[clap(short, long, default_value = "0x1000", value_parser = parse_offset)]
    end_offset: u32,

    /// Name for the header word at offset 16: primary, geometry or clut
    #[clap(short, long, default_value = "primary")]
    label: PrimaryDataLabel,

    /// Output format
    #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// .TOM files, or directories to search recursively for them
    #[clap(required = true)]
    paths: Vec<PathBuf>,
}

/// Log to stderr. Warnings are shown by default.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .init();
}

/// Input paths after directory expansion.
#[derive(Debug, Default)]
struct CollectedPaths {
    files: Vec<PathBuf>,
    /// Directories that held no `.tom` files.
    empty_dirs: Vec<PathBuf>,
}

/// Expand directories into the `.tom` files beneath them. Files are kept as given.
fn collect_paths(inputs: &[PathBuf]) -> Result<CollectedPaths, Report> {
    let options = MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };

    let mut collected = CollectedPaths::default();
    for input in inputs {
        if !input.is_dir() {
            collected.files.push(input.clone());
            continue;
        }

        let pattern = format!(
            "{}/**/*.tom",
            glob::Pattern::escape(&input.to_string_lossy())
        );
        let mut found = Vec::new();
        for entry in glob::glob_with(&pattern, options).context("Invalid search pattern")? {
            let path = entry.context("Failed to read directory entry")?;
            if path.is_file() {
                found.push(path);
            }
        }

        if found.is_empty() {
            warn!("no .tom files found under {}", input.display());
            collected.empty_dirs.push(input.clone());
        } else {
            debug!("found {} .tom files under {}", found.len(), input.display());
        }

        found.sort();
        collected.files.append(&mut found);
    }

    Ok(collected)
}

fn inspect_path(path: &Path, options: &InspectOptions) -> Result<HeaderReport, Report> {
    let file = TomFile::open(path).context("Failed to read .TOM file")?;
    let inspection = file
        .inspect(options.end_offset)
        .context("File too small for a .TOM header")?;

    Ok(HeaderReport::new(&inspection, options.label))
}

/// Inspect every file in parallel. Results come back in the order of `paths`.
fn inspect_all<'a>(
    paths: &'a [PathBuf],
    options: &InspectOptions,
) -> Vec<(&'a PathBuf, Result<HeaderReport, Report>)> {
    paths
        .par_iter()
        .map(|path| (path, inspect_path(path, options)))
        .collect()
}

/// One element of the JSON output array.
#[derive(Serialize)]
struct JsonEntry<'a> {
    path: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a HeaderReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> JsonEntry<'a> {
    fn new(path: &'a Path, result: &'a Result<HeaderReport, Report>) -> Self {
        match result {
            Ok(report) => JsonEntry {
                path,
                report: Some(report),
                error: None,
            },
            Err(report) => JsonEntry {
                path,
                report: None,
                error: Some(report.to_string()),
            },
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RunSummary {
    inspected: usize,
    failures: usize,
}

impl RunSummary {
    /// Files that failed to load or decode, and directories with nothing to
    /// inspect, both count as failures.
    fn new(results: &[(&PathBuf, Result<HeaderReport, Report>)], empty_dirs: usize) -> Self {
        let failed_files = results.iter().filter(|(_, result)| result.is_err()).count();
        RunSummary {
            inspected: results.len() - failed_files,
            failures: failed_files + empty_dirs,
        }
    }

    fn is_success(&self) -> bool {
        self.failures == 0
    }

    fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

fn main() -> Result<ExitCode, Report> {
    let args = Args::parse();
    init_logging(args.verbose);

    let options = InspectOptions::builder()
        .end_offset(args.end_offset)
        .label(args.label)
        .build();

    let collected = collect_paths(&args.paths)?;
    let results = inspect_all(&collected.files, &options);

    match args.format {
        OutputFormat::Text => {
            let multiple = results.len() > 1;
            for (path, result) in &results {
                match result {
                    Ok(report) => {
                        if multiple {
                            println!("### {}", path.display());
                        }
                        println!("{report}");
                    }
                    Err(report) => eprintln!("{}: {report}", path.display()),
                }
            }
        }
        OutputFormat::Json => {
            let entries: Vec<JsonEntry<'_>> = results
                .iter()
                .map(|(path, result)| JsonEntry::new(path, result))
                .collect();
            let out = serde_json::to_string_pretty(&entries)
                .context("Failed to serialize report")?;
            println!("{out}");
        }
    }

    let summary = RunSummary::new(&results, collected.empty_dirs.len());
    debug!(
        "inspected {} files, {} failures",
        summary.inspected, summary.failures
    );

    Ok(summary.exit_code())
}
