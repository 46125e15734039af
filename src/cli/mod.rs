//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod fmt;
mod import;
mod info;
mod render;

use clap::{Parser, Subcommand};
use glob::glob;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, SumConfig};
use crate::models::Warning;
use crate::output::{generate_output_path, StillFormat};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// File extensions recognised as SUM scripts.
pub const SCRIPT_EXTENSIONS: &[&str] = &["sum", "txt"];

/// File extensions recognised as importable images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "gif", "jpg", "jpeg", "bmp", "webp", "tif", "tiff"];

/// Check if a path has one of the given extensions (case-insensitive).
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
}

/// Find all files with the given extensions in a directory (recursively).
pub fn find_files(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let dir_str = dir.display().to_string();

    for ext in extensions {
        if let Ok(paths) = glob(&format!("{}/**/*.{}", dir_str, ext)) {
            files.extend(paths.filter_map(Result::ok));
        }
    }

    files.sort();
    files.dedup();
    files
}

/// Expand directories among `inputs` into the files they contain.
pub(crate) fn expand_inputs(inputs: &[PathBuf], extensions: &[&str]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(find_files(input, extensions));
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Pair every input with its output path.
///
/// Fails when two inputs would write the same file, e.g. `a.png` and `a.gif`
/// importing to `a.sum`.
pub(crate) fn plan_outputs(
    files: Vec<PathBuf>,
    extension: &str,
    output: Option<&Path>,
) -> Result<Vec<(PathBuf, PathBuf)>, String> {
    let mut claimed: HashMap<PathBuf, usize> = HashMap::new();
    let mut jobs: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(files.len());

    for input in files {
        let target = generate_output_path(&input, extension, output);
        if let Some(&index) = claimed.get(&target) {
            return Err(format!(
                "'{}' and '{}' would both write '{}'",
                jobs[index].0.display(),
                input.display(),
                target.display()
            ));
        }
        claimed.insert(target.clone(), jobs.len());
        jobs.push((input, target));
    }

    Ok(jobs)
}

/// Print warnings for one file. Returns `false` when strict mode makes them fatal.
pub(crate) fn report_warnings(path: &Path, warnings: &[Warning], strict: bool) -> bool {
    let label = if strict { "Error" } else { "Warning" };
    for warning in warnings {
        eprintln!("{}: {}: {}", label, path.display(), warning);
    }
    !(strict && !warnings.is_empty())
}

/// Outcome of one file in a batch.
pub(crate) enum JobError {
    /// The input could not be read or decoded
    Input(String),
    /// Conversion or output failed
    Failed(String),
}

impl JobError {
    fn exit_code(&self) -> u8 {
        match self {
            JobError::Input(_) => EXIT_INVALID_ARGS,
            JobError::Failed(_) => EXIT_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            JobError::Input(m) | JobError::Failed(m) => m,
        }
    }
}

/// Print batch results in input order and pick the exit code.
pub(crate) fn finish_batch(results: Vec<Result<String, JobError>>) -> ExitCode {
    let mut code = EXIT_SUCCESS;
    for result in results {
        match result {
            Ok(summary) => println!("{}", summary),
            Err(e) => {
                eprintln!("Error: {}", e.message());
                code = code.max(e.exit_code());
            }
        }
    }
    ExitCode::from(code)
}

/// SUM - convert between images and run-length SUM scripts
#[derive(Parser)]
#[command(name = "sum")]
#[command(about = "SUM - convert monochrome images to run-length text scripts and back")]
#[command(version)]
pub struct Cli {
    /// Path to a sum.toml settings file (default: search upwards from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert images to SUM scripts
    Import {
        /// Image files or directories to convert
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (single input) or directory (ends with /).
        /// If omitted: {input_dir}/{stem}.sum
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Luminance below this value counts as black (1-255, default: 128)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..))]
        threshold: Option<u8>,

        /// Only pure opaque black counts as foreground
        #[arg(long, conflicts_with = "threshold")]
        exact: bool,

        /// Write repeated rows as dK back-references
        #[arg(long)]
        dedupe: bool,
    },

    /// Render SUM scripts to PNG or GIF
    Render {
        /// SUM scripts or directories to render
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (single input) or directory (ends with /).
        /// If omitted: {input_dir}/{stem}.png or .gif
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output container format
        #[arg(short, long, value_enum, default_value = "png")]
        format: StillFormat,

        /// Export every frame as a looping animated GIF (requires -f gif)
        #[arg(short, long)]
        animated: bool,

        /// Frame to export as a still image (1-based, default: 1)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        frame: Option<u32>,

        /// Scale output by integer factor (1-64)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=64))]
        scale: Option<u32>,

        /// Frame duration in ms when the script has no fps header
        #[arg(long)]
        frame_ms: Option<u32>,

        /// Strict mode: treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Show a summary of a SUM script
    Info {
        /// SUM script to inspect
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite SUM scripts in canonical form
    Fmt {
        /// Input file(s) to format
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Check formatting without writing (exit 1 if changes needed)
        #[arg(long)]
        check: bool,

        /// Write to stdout instead of in-place
        #[arg(long)]
        stdout: bool,

        /// Write repeated rows as dK back-references
        #[arg(long)]
        dedupe: bool,
    },
}

/// Load sum.toml and apply command-line overrides.
fn resolve_config(path: Option<&Path>, overrides: &CliOverrides) -> Result<SumConfig, String> {
    let mut config = load_config(path).map_err(|e| e.to_string())?;
    merge_cli_overrides(&mut config, overrides).map_err(|e| e.to_string())?;
    Ok(config)
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let overrides = match &cli.command {
        Commands::Import { threshold, exact, dedupe, .. } => CliOverrides {
            threshold: *threshold,
            exact: exact.then_some(true),
            dedupe_rows: dedupe.then_some(true),
            ..Default::default()
        },
        Commands::Render { scale, frame_ms, strict, .. } => CliOverrides {
            scale: *scale,
            default_frame_ms: *frame_ms,
            strict: strict.then_some(true),
            ..Default::default()
        },
        Commands::Fmt { dedupe, .. } => {
            CliOverrides { dedupe_rows: dedupe.then_some(true), ..Default::default() }
        }
        Commands::Info { .. } => CliOverrides::default(),
    };

    let config = match resolve_config(cli.config.as_deref(), &overrides) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    match cli.command {
        Commands::Import { inputs, output, .. } => {
            import::run_import(&inputs, output.as_deref(), &config)
        }
        Commands::Render { inputs, output, format, animated, frame, .. } => {
            let request = render::RenderRequest { format, animated, frame };
            render::run_render(&inputs, output.as_deref(), &request, &config)
        }
        Commands::Info { input, json } => info::run_info(&input, json, &config),
        Commands::Fmt { files, check, stdout, .. } => fmt::run_fmt(&files, check, stdout, &config),
    }
}
