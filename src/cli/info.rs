//! Info command implementation

use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use super::{report_warnings, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::SumConfig;
use crate::gif::frame_duration_ms;
use crate::models::{BackgroundMode, SumDocument};
use crate::parser::parse_str;

/// Summary of one frame
#[derive(Debug, Serialize)]
pub struct FrameSummary {
    pub rows: usize,
    pub pixels: usize,
}

/// Summary of a SUM script
#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub version: String,
    pub width: u32,
    pub height: u32,
    pub background: BackgroundMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    pub frame_ms: Option<u32>,
    pub frames: Vec<FrameSummary>,
    pub warnings: usize,
}

impl DocumentSummary {
    pub fn new(document: &SumDocument, default_frame_ms: u32, warnings: usize) -> Self {
        let canvas = document.canvas();
        Self {
            version: document.version().to_string(),
            width: canvas.width,
            height: canvas.height,
            background: document.background(),
            fps: document.frame_rate(),
            frame_ms: document
                .is_animated()
                .then(|| frame_duration_ms(document.frame_rate(), default_frame_ms)),
            frames: document
                .frames()
                .iter()
                .map(|frame| FrameSummary { rows: frame.rows.len(), pixels: frame.pixel_count() })
                .collect(),
            warnings,
        }
    }
}

/// Execute the info command
pub fn run_info(input: &Path, json: bool, config: &SumConfig) -> ExitCode {
    let content = match std::fs::read_to_string(input) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: Cannot open input file '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let parsed = match parse_str(&content) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}: {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    report_warnings(input, &parsed.warnings, false);
    let summary =
        DocumentSummary::new(&parsed.document, config.render.default_frame_ms, parsed.warnings.len());

    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    println!("{}", input.display());
    println!("  Version:    {}", summary.version);
    println!("  Size:       {}x{}", summary.width, summary.height);
    println!(
        "  Background: {}",
        match summary.background {
            BackgroundMode::Opaque => "white (bpx=w)",
            BackgroundMode::Transparent => "transparent (bpx=t)",
        }
    );
    if let Some(fps) = summary.fps {
        println!("  FPS:        {}", fps);
    }
    if let Some(ms) = summary.frame_ms {
        println!("  Frame time: {} ms", ms);
    }
    println!("  Frames:     {}", summary.frames.len());
    for (i, frame) in summary.frames.iter().enumerate() {
        println!("    {}: {} rows, {} pixels", i + 1, frame.rows, frame.pixels);
    }
    if summary.warnings > 0 {
        println!("  Warnings:   {}", summary.warnings);
    }

    ExitCode::from(EXIT_SUCCESS)
}
