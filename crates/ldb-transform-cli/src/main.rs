use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use ldb_transform_core::encode::{EncodeOptions, DEFAULT_JPEG_QUALITY};
use ldb_transform_core::{
    run_transform, InterpolationFilter, RunOptions, TaskDescriptor, TransformError, TransformKind,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ldb-transform")]
#[command(version, about = "Rotate or flip one dataset image and copy its annotation")]
#[command(long_about = "Rotate or flip one dataset image and copy its annotation\n\n\
    The task record is a JSON object with data_object, annotation (optional),\n\
    output_dir and transform_name, read from stdin unless --task is given.\n\n\
    Kinds:\n  \
    rotate [ANGLE...]                  (default 90, counter-clockwise)\n  \
    random_rotate [[start] stop [step]] (default 0..360)\n  \
    flip_horizontal\n  \
    flip_vertical")]
struct Cli {
    /// Transform to apply
    kind: TransformKind,

    /// Positional arguments for the transform
    #[arg(allow_negative_numbers = true)]
    args: Vec<String>,

    /// Read the task record from this file instead of stdin
    #[arg(long)]
    task: Option<PathBuf>,

    /// Seed for random_rotate (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Resampling filter for rotations
    #[arg(long, value_enum, default_value_t = FilterArg::Nearest)]
    filter: FilterArg,

    /// JPEG output quality
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Print the written artifacts as JSON
    #[arg(long)]
    json: bool,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FilterArg {
    Nearest,
    Bilinear,
}

impl From<FilterArg> for InterpolationFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Nearest => InterpolationFilter::Nearest,
            FilterArg::Bilinear => InterpolationFilter::Bilinear,
        }
    }
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn read_task(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read task file: {}", path.display())),
        None => {
            let mut json = String::new();
            std::io::stdin()
                .read_to_string(&mut json)
                .context("Failed to read task record from stdin")?;
            Ok(json)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Argument shape is checked before the task record is even read.
    cli.kind.plan(&cli.args).map_err(TransformError::from)?;

    let json = read_task(cli.task.as_deref())?;
    let task = TaskDescriptor::from_json(&json)
        .map_err(TransformError::from)?
        .with_args(cli.args.iter().cloned());
    tracing::debug!(kind = %cli.kind, args = ?task.args, output_dir = %task.output_dir.display(), "task loaded");

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let options = RunOptions {
        filter: cli.filter.into(),
        encode: EncodeOptions {
            jpeg_quality: cli.jpeg_quality,
        },
    };

    let artifacts = run_transform(&task, cli.kind, &mut rng, &options)
        .with_context(|| format!("{} failed for {}", cli.kind, task.data_object_path.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&artifacts)?);
    }
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<TransformError>() {
        Some(err) if err.is_usage() => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            exit_code(&err)
        }
    }
}
