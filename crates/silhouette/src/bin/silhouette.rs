//! silhouette CLI: shape descriptors and their robustness to rotation/scale.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde::Serialize;
use silhouette::io::{discover_images, dump_artifacts, load_image};
use silhouette::{
    analyze_batch, analyze_with_color, class_label_for, AnalysisParams, AnalysisSummary,
    DiscriminationReport, RobustnessSummary,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "silhouette")]
#[command(about = "Compute shape descriptors of binary silhouettes and test their robustness")]
#[command(version)]
struct Cli {
    /// Log verbosity.
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe one image and report descriptor drift per transform.
    Analyze(AnalyzeArgs),

    /// Describe every image under a directory and aggregate the drift.
    Batch(BatchArgs),
}

#[derive(Debug, Clone, Args)]
struct AnalyzeArgs {
    /// Path to the input image.
    image: PathBuf,

    /// JSON file with analysis parameters; missing fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the JSON summary here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write masks and transformed rasters as PNG files into this directory.
    #[arg(long)]
    dump_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct BatchArgs {
    /// Dataset root, searched recursively.
    dir: PathBuf,

    /// JSON file with analysis parameters; missing fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Leave images whose main contour is a fallback out of the averages.
    #[arg(long)]
    exclude_fallback: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Serialize)]
struct ImageRecord {
    path: PathBuf,
    label: String,
    summary: AnalysisSummary,
}

#[derive(Serialize)]
struct ImageFailure {
    path: PathBuf,
    error: String,
}

#[derive(Serialize)]
struct BatchReport {
    robustness: RobustnessSummary,
    discrimination: DiscriminationReport,
    images: Vec<ImageRecord>,
    failures: Vec<ImageFailure>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    init_logging(cli.log_level)?;
    match cli.command {
        Commands::Analyze(args) => run_analyze(&args),
        Commands::Batch(args) => run_batch(&args),
    }
}

#[cfg(feature = "tracing")]
fn init_logging(level: LogLevel) -> CliResult<()> {
    silhouette::init_tracing(level.into(), false);
    Ok(())
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: LogLevel) -> CliResult<()> {
    silhouette::core::init_with_level(level.into())?;
    Ok(())
}

fn load_params(path: Option<&Path>) -> CliResult<AnalysisParams> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(AnalysisParams::default()),
    }
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            log::info!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn run_analyze(args: &AnalyzeArgs) -> CliResult<()> {
    let params = load_params(args.config.as_deref())?;
    let loaded = load_image(&args.image)?;
    let analysis = analyze_with_color(loaded.gray, Some(loaded.color), &params)?;
    if let Some(dir) = &args.dump_dir {
        dump_artifacts(&analysis, dir)?;
    }
    write_json(&analysis.summary(), args.output.as_deref())
}

fn run_batch(args: &BatchArgs) -> CliResult<()> {
    let params = load_params(args.config.as_deref())?;
    let paths = discover_images(&args.dir)?;
    log::info!("found {} images under {}", paths.len(), args.dir.display());

    let mut failures = Vec::new();
    let mut loaded_paths = Vec::new();
    let mut grays = Vec::new();
    for path in paths {
        match load_image(&path) {
            Ok(img) => {
                loaded_paths.push(path);
                grays.push(img.gray);
            }
            Err(err) => {
                log::warn!("{err}");
                failures.push(ImageFailure {
                    path,
                    error: err.to_string(),
                });
            }
        }
    }

    let mut images = Vec::new();
    for (path, result) in loaded_paths.into_iter().zip(analyze_batch(&grays, &params)) {
        match result {
            Ok(summary) => images.push(ImageRecord {
                label: class_label_for(&path),
                path,
                summary,
            }),
            Err(err) => {
                log::warn!("{}: {err}", path.display());
                failures.push(ImageFailure {
                    path,
                    error: err.to_string(),
                });
            }
        }
    }

    let robustness =
        RobustnessSummary::from_summaries(images.iter().map(|r| &r.summary), args.exclude_fallback);
    let discrimination = DiscriminationReport::build(
        images
            .iter()
            .map(|r| (r.label.as_str(), &r.summary.descriptors)),
        DiscriminationReport::DEFAULT_AXES,
    );
    for t in &robustness.transforms {
        match t.mean_distance {
            Some(d) => log::info!("{}: mean distance {d:.4} over {} images", t.kind, t.samples),
            None => log::info!("{}: no samples", t.kind),
        }
    }

    write_json(
        &BatchReport {
            robustness,
            discrimination,
            images,
            failures,
        },
        args.output.as_deref(),
    )
}
