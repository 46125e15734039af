//! Data model for SUM documents (canvas, background, frames, rows)

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Canvas dimensions in pixels. Both sides are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// Create a canvas size, rejecting zero-sized sides.
    pub fn new(width: u32, height: u32) -> Result<Self, DocumentError> {
        if width == 0 || height == 0 {
            return Err(DocumentError::EmptyCanvas { width, height });
        }
        Ok(Self { width, height })
    }

    /// Whether a 1-based row index lies on the canvas.
    pub fn contains_row(&self, row: u32) -> bool {
        row >= 1 && row <= self.height
    }

    /// Whether a 1-based column index lies on the canvas.
    pub fn contains_column(&self, column: u32) -> bool {
        column >= 1 && column <= self.width
    }
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Fill used for every pixel not listed as foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    /// Fully opaque white (`bpx=w`)
    #[default]
    Opaque,
    /// Fully transparent (`bpx=t`)
    Transparent,
}

impl BackgroundMode {
    /// Parse the value of a `bpx=` header.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "w" => Some(Self::Opaque),
            "t" => Some(Self::Transparent),
            _ => None,
        }
    }

    /// The `bpx=` code for this mode.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Opaque => "w",
            Self::Transparent => "t",
        }
    }
}

/// Foreground columns of one canvas row. Indices are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowEntry {
    pub row: u32,
    pub columns: BTreeSet<u32>,
}

impl RowEntry {
    pub fn new(row: u32, columns: BTreeSet<u32>) -> Self {
        Self { row, columns }
    }
}

/// One still image's worth of foreground rows.
///
/// Rows keep their definition order, which is the index space `dK`
/// back-references address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub rows: Vec<RowEntry>,
}

impl Frame {
    pub fn new(rows: Vec<RowEntry>) -> Self {
        Self { rows }
    }

    /// Look up the entry for a 1-based row index.
    pub fn row(&self, row: u32) -> Option<&RowEntry> {
        self.rows.iter().find(|entry| entry.row == row)
    }

    /// Total number of foreground pixels in the frame.
    pub fn pixel_count(&self) -> usize {
        self.rows.iter().map(|entry| entry.columns.len()).sum()
    }
}

/// Error raised when a document would violate its invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentError {
    #[error("canvas must be at least 1x1, got {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },
    #[error("document has no frames")]
    NoFrames,
    #[error("frame rate {0} is not a positive number")]
    InvalidFrameRate(f64),
    #[error("frame rate given for a still image (1 frame)")]
    FrameRateOnStill,
    #[error("frame {frame}: row {row} is outside the canvas (height {height})")]
    RowOutOfBounds { frame: usize, row: u32, height: u32 },
    #[error("frame {frame}: row {row} column {column} is outside the canvas (width {width})")]
    ColumnOutOfBounds { frame: usize, row: u32, column: u32, width: u32 },
    #[error("frame {frame}: row {row} is defined more than once")]
    DuplicateRow { frame: usize, row: u32 },
}

/// Version token written when none is specified.
pub const DEFAULT_VERSION: &str = "1.0";

/// A complete SUM document: header plus frames in playback order.
///
/// Built in one go by the encoder or the parser and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SumDocument {
    version: String,
    canvas: CanvasSize,
    background: BackgroundMode,
    frame_rate: Option<f64>,
    frames: Vec<Frame>,
}

impl SumDocument {
    /// Build a document, checking every invariant of the format.
    pub fn new(
        version: impl Into<String>,
        canvas: CanvasSize,
        background: BackgroundMode,
        frame_rate: Option<f64>,
        frames: Vec<Frame>,
    ) -> Result<Self, DocumentError> {
        if frames.is_empty() {
            return Err(DocumentError::NoFrames);
        }
        if let Some(rate) = frame_rate {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(DocumentError::InvalidFrameRate(rate));
            }
            if frames.len() < 2 {
                return Err(DocumentError::FrameRateOnStill);
            }
        }

        for (index, frame) in frames.iter().enumerate() {
            let number = index + 1;
            let mut seen = BTreeSet::new();
            for entry in &frame.rows {
                if !canvas.contains_row(entry.row) {
                    return Err(DocumentError::RowOutOfBounds {
                        frame: number,
                        row: entry.row,
                        height: canvas.height,
                    });
                }
                if !seen.insert(entry.row) {
                    return Err(DocumentError::DuplicateRow { frame: number, row: entry.row });
                }
                if let Some(&column) = entry.columns.iter().find(|&&c| !canvas.contains_column(c))
                {
                    return Err(DocumentError::ColumnOutOfBounds {
                        frame: number,
                        row: entry.row,
                        column,
                        width: canvas.width,
                    });
                }
            }
        }

        Ok(Self { version: version.into(), canvas, background, frame_rate, frames })
    }

    /// A single-frame document with the default version token.
    pub fn still(
        canvas: CanvasSize,
        background: BackgroundMode,
        frame: Frame,
    ) -> Result<Self, DocumentError> {
        Self::new(DEFAULT_VERSION, canvas, background, None, vec![frame])
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn background(&self) -> BackgroundMode {
        self.background
    }

    pub fn frame_rate(&self) -> Option<f64> {
        self.frame_rate
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Whether the document describes an animation rather than a still.
    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    /// Same document with a different header version token.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// A recoverable problem found while reading a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Warning {
    pub message: String,
    pub line: usize,
}

impl Warning {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self { message: message.into(), line }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}
