//! Render command implementation

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{
    expand_inputs, finish_batch, plan_outputs, report_warnings, JobError, EXIT_INVALID_ARGS,
    SCRIPT_EXTENSIONS,
};
use crate::config::SumConfig;
use crate::gif::{export_animation, frame_duration_ms};
use crate::output::{save_still, scale_image, StillFormat};
use crate::parser::parse_str;
use crate::renderer::render_document_frame;

/// What to produce from each script.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest {
    pub format: StillFormat,
    pub animated: bool,
    /// 1-based frame for still output
    pub frame: Option<u32>,
}

/// Execute the render command
pub fn run_render(
    inputs: &[PathBuf],
    output: Option<&Path>,
    request: &RenderRequest,
    config: &SumConfig,
) -> ExitCode {
    if request.animated && request.format != StillFormat::Gif {
        eprintln!("Error: --animated requires -f gif");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }
    if request.animated && request.frame.is_some() {
        eprintln!("Error: --frame cannot be combined with --animated");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let files = expand_inputs(inputs, SCRIPT_EXTENSIONS);
    if files.is_empty() {
        eprintln!("Error: No SUM scripts found in the given inputs");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    if let Some(out) = output {
        let is_dir = out.as_os_str().to_string_lossy().ends_with('/') || out.is_dir();
        if files.len() > 1 && !is_dir {
            eprintln!("Error: -o must be a directory (ending with /) when rendering several scripts");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    }

    let jobs = match plan_outputs(files, request.format.extension(), output) {
        Ok(jobs) => jobs,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let results: Vec<_> = jobs
        .par_iter()
        .map(|(input, target)| render_one(input, target, request, config))
        .collect();
    finish_batch(results)
}

/// Render one script. Nothing is written when the script fails to parse,
/// when strict mode rejects its warnings, or when the export is impossible.
fn render_one(
    input: &Path,
    output_path: &Path,
    request: &RenderRequest,
    config: &SumConfig,
) -> Result<String, JobError> {
    let content = std::fs::read_to_string(input).map_err(|e| {
        JobError::Input(format!("Cannot open input file '{}': {}", input.display(), e))
    })?;

    let parsed = parse_str(&content)
        .map_err(|e| JobError::Failed(format!("{}: {}", input.display(), e)))?;

    if !report_warnings(input, &parsed.warnings, config.validate.strict) {
        return Err(JobError::Failed(format!(
            "{}: {} warning(s) in strict mode",
            input.display(),
            parsed.warnings.len()
        )));
    }

    let document = parsed.document;
    let scale = config.render.scale;

    if request.animated {
        export_animation(
            &document,
            config.render.default_frame_ms,
            config.render.loop_animation,
            scale,
            output_path,
        )
        .map_err(|e| JobError::Failed(format!("{}: {}", input.display(), e)))?;

        let duration = frame_duration_ms(document.frame_rate(), config.render.default_frame_ms);
        return Ok(format!(
            "Rendered: {} ({} frames, {} ms/frame)",
            output_path.display(),
            document.frames().len(),
            duration
        ));
    }

    let frame_number = request.frame.unwrap_or(1);
    let image = render_document_frame(&document, frame_number as usize - 1).ok_or_else(|| {
        JobError::Failed(format!(
            "{}: frame {} does not exist, the script has {} frame(s)",
            input.display(),
            frame_number,
            document.frames().len()
        ))
    })?;

    let image = scale_image(image, scale)
        .map_err(|e| JobError::Failed(format!("{}: {}", input.display(), e)))?;
    save_still(&image, output_path, request.format).map_err(|e| {
        JobError::Failed(format!("Failed to save '{}': {}", output_path.display(), e))
    })?;

    Ok(format!("Rendered: {} ({})", output_path.display(), document.canvas()))
}
