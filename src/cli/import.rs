//! Import command implementation

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{
    expand_inputs, finish_batch, plan_outputs, JobError, EXIT_INVALID_ARGS, IMAGE_EXTENSIONS,
};
use crate::config::SumConfig;
use crate::encoder::{encode_file, EncodeError};
use crate::fmt::to_sum_string_with;
use crate::models::BackgroundMode;
use crate::output::save_script;

/// Execute the import command
pub fn run_import(inputs: &[PathBuf], output: Option<&Path>, config: &SumConfig) -> ExitCode {
    let files = expand_inputs(inputs, IMAGE_EXTENSIONS);
    if files.is_empty() {
        eprintln!("Error: No images found in the given inputs");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    if let Some(out) = output {
        let is_dir = out.as_os_str().to_string_lossy().ends_with('/') || out.is_dir();
        if files.len() > 1 && !is_dir {
            eprintln!("Error: -o must be a directory (ending with /) when importing several images");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    }

    let jobs = match plan_outputs(files, "sum", output) {
        Ok(jobs) => jobs,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let results: Vec<_> =
        jobs.par_iter().map(|(input, target)| import_one(input, target, config)).collect();
    finish_batch(results)
}

/// Convert one image and write its script to `output_path`.
fn import_one(input: &Path, output_path: &Path, config: &SumConfig) -> Result<String, JobError> {
    if !input.is_file() {
        return Err(JobError::Input(format!("File '{}' not found", input.display())));
    }

    let document = encode_file(input, &config.encode_options()).map_err(|e| match e {
        EncodeError::UnreadableSource { .. } => JobError::Input(e.to_string()),
        other => JobError::Failed(format!("{}: {}", input.display(), other)),
    })?;

    let text = to_sum_string_with(&document, &config.format_options());
    save_script(&text, output_path).map_err(|e| {
        JobError::Failed(format!("Failed to write '{}': {}", output_path.display(), e))
    })?;

    let canvas = document.canvas();
    let background = match document.background() {
        BackgroundMode::Opaque => "white",
        BackgroundMode::Transparent => "transparent",
    };
    Ok(format!(
        "Imported: {} ({}, {} rows, {} background)",
        output_path.display(),
        canvas,
        document.frames()[0].rows.len(),
        background
    ))
}
