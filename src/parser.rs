//! SUM script parsing
//!
//! Reads the line-oriented SUM text format:
//!
//! ```text
//! !sum1.0
//! s=3x2;
//! bpx=w;
//! b{
//! 1:1;
//! 2:2-3;
//! }
//! ```
//!
//! Header problems are fatal. Problems inside a section (malformed rows,
//! dangling back-references, out-of-canvas pixels) become warnings and
//! parsing continues.

use crate::models::{
    BackgroundMode, CanvasSize, DocumentError, Frame, RowEntry, SumDocument, Warning,
};
use crate::ranges::parse_columns;
use std::collections::BTreeSet;
use std::io::Read;
use thiserror::Error;

/// Fatal error: no document can be produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("line {line}: expected a '!sum' version line")]
    MissingVersion { line: usize },
    #[error("line {line}: malformed header: {message}")]
    MalformedHeader { line: usize, message: String },
    #[error("malformed header: missing '{key}=' line")]
    MissingHeader { key: &'static str },
    #[error("line {line}: unsupported background mode '{value}' (expected 'w' or 't')")]
    UnsupportedBackgroundMode { line: usize, value: String },
    #[error("no 'b{{' or 'f{{' section found")]
    NoFrames,
    #[error("failed to read input: {0}")]
    Read(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// A parsed document plus every recoverable problem met on the way.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub document: SumDocument,
    pub warnings: Vec<Warning>,
}

/// Section kinds in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    /// `b{` - the still image
    Still,
    /// `f{` - one animation frame
    Animation,
}

fn section_kind(line: &str) -> Option<SectionKind> {
    match line {
        "b{" => Some(SectionKind::Still),
        "f{" => Some(SectionKind::Animation),
        _ => None,
    }
}

/// Header values gathered before the first section.
#[derive(Debug, Default)]
struct Header {
    version: String,
    canvas: Option<CanvasSize>,
    frame_rate: Option<(usize, f64)>,
    background: Option<BackgroundMode>,
}

/// Rows of the section being parsed.
///
/// `defined` is append-only and holds every resolved row in definition order;
/// it is the index space of `dK` tokens and is discarded at the end of the section.
struct FrameBuilder {
    canvas: CanvasSize,
    rows: Vec<RowEntry>,
    defined: Vec<BTreeSet<u32>>,
}

impl FrameBuilder {
    fn new(canvas: CanvasSize) -> Self {
        Self { canvas, rows: Vec::new(), defined: Vec::new() }
    }

    fn add_line(&mut self, line_number: usize, line: &str, warnings: &mut Vec<Warning>) {
        let Some((row, tokens)) = split_row_line(line) else {
            warnings.push(Warning::new(
                line_number,
                format!("malformed row '{}', expected ROW:tokens;", line),
            ));
            return;
        };

        let (columns, errors) = parse_columns(tokens, &self.defined, self.canvas.width);
        for error in errors {
            warnings.push(Warning::new(line_number, format!("row {}: {}", row, error)));
        }

        if !self.canvas.contains_row(row) {
            warnings.push(Warning::new(
                line_number,
                format!("row {} is outside the canvas height {}, skipped", row, self.canvas.height),
            ));
            return;
        }

        self.defined.push(columns.clone());

        if let Some(existing) = self.rows.iter_mut().find(|entry| entry.row == row) {
            warnings.push(Warning::new(
                line_number,
                format!("row {} defined more than once in this frame, merging", row),
            ));
            existing.columns.extend(columns);
        } else if !columns.is_empty() {
            self.rows.push(RowEntry::new(row, columns));
        }
    }

    fn finish(self) -> Frame {
        Frame::new(self.rows)
    }
}

/// Split `ROW:tokens;` into its row index and token list.
fn split_row_line(line: &str) -> Option<(u32, &str)> {
    let line = line.strip_suffix(';').unwrap_or(line);
    let (row, tokens) = line.split_once(':')?;
    let row = row.trim();
    if row.is_empty() || !row.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((row.parse().ok()?, tokens))
}

/// Parse SUM text from any reader.
pub fn parse_stream<R: Read>(mut reader: R) -> Result<ParseResult, ParseError> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(|e| ParseError::Read(e.to_string()))?;
    parse_str(&text)
}

/// Parse SUM text into a document.
///
/// # Examples
///
/// ```
/// use sumimg::parser::parse_str;
///
/// let result = parse_str("!sum1.0\ns=4x1;\nbpx=w;\nb{\n1:1,3-4;\n}\n").unwrap();
/// let frame = &result.document.frames()[0];
/// assert_eq!(frame.rows[0].columns.iter().copied().collect::<Vec<_>>(), vec![1, 3, 4]);
/// assert!(result.warnings.is_empty());
/// ```
pub fn parse_str(text: &str) -> Result<ParseResult, ParseError> {
    let lines: Vec<(usize, &str)> =
        text.lines().enumerate().map(|(i, line)| (i + 1, line.trim())).collect();
    let mut warnings = Vec::new();
    let mut pos = 0;

    let header = parse_header(&lines, &mut pos, &mut warnings)?;
    let canvas = header.canvas.ok_or(ParseError::MissingHeader { key: "s" })?;
    let background = header.background.ok_or(ParseError::MissingHeader { key: "bpx" })?;

    let mut stills: Vec<Frame> = Vec::new();
    let mut animation: Vec<Frame> = Vec::new();
    let mut first_still_line = None;

    while pos < lines.len() {
        let (line_number, line) = lines[pos];
        pos += 1;

        if line.is_empty() {
            continue;
        }

        match section_kind(line) {
            Some(kind) => {
                let frame = parse_section(&lines, &mut pos, line_number, canvas, &mut warnings);
                match kind {
                    SectionKind::Still => {
                        if first_still_line.is_none() {
                            first_still_line = Some(line_number);
                        }
                        stills.push(frame);
                    }
                    SectionKind::Animation => animation.push(frame),
                }
            }
            None => warnings.push(Warning::new(
                line_number,
                format!("'{}' is outside of any section, ignored", line),
            )),
        }
    }

    let frames = if !animation.is_empty() {
        if let Some(line) = first_still_line {
            warnings.push(Warning::new(
                line,
                "'b{' section ignored in a document with 'f{' frames",
            ));
        }
        animation
    } else if !stills.is_empty() {
        if stills.len() > 1 {
            warnings.push(Warning::new(
                first_still_line.unwrap_or(0),
                format!("{} 'b{{' sections merged into one image", stills.len()),
            ));
        }
        vec![merge_frames(stills)]
    } else {
        return Err(ParseError::NoFrames);
    };

    let frame_rate = match header.frame_rate {
        Some((line, _)) if frames.len() < 2 => {
            warnings.push(Warning::new(line, "frame rate ignored for a single-frame document"));
            None
        }
        other => other.map(|(_, rate)| rate),
    };

    let document = SumDocument::new(header.version, canvas, background, frame_rate, frames)?;
    Ok(ParseResult { document, warnings })
}

fn parse_header(
    lines: &[(usize, &str)],
    pos: &mut usize,
    warnings: &mut Vec<Warning>,
) -> Result<Header, ParseError> {
    while *pos < lines.len() && lines[*pos].1.is_empty() {
        *pos += 1;
    }

    let (line_number, first) = lines.get(*pos).copied().unwrap_or((1, ""));
    let version = first.strip_prefix("!sum").ok_or(ParseError::MissingVersion { line: line_number })?;
    let version = version.trim();
    if version.is_empty() {
        return Err(ParseError::MalformedHeader {
            line: line_number,
            message: "missing version after '!sum'".to_string(),
        });
    }
    *pos += 1;

    let mut header = Header { version: version.to_string(), ..Header::default() };

    while *pos < lines.len() {
        let (line_number, line) = lines[*pos];
        if section_kind(line).is_some() {
            break;
        }
        *pos += 1;

        if line.is_empty() {
            continue;
        }

        let entry = line.strip_suffix(';').unwrap_or(line);
        let Some((key, value)) = entry.split_once('=') else {
            return Err(ParseError::MalformedHeader {
                line: line_number,
                message: format!("expected key=value, got '{}'", line),
            });
        };
        let value = value.trim();

        match key.trim() {
            "s" => {
                if header.canvas.is_some() {
                    warnings.push(Warning::new(line_number, "size given twice, using the last"));
                }
                header.canvas = Some(parse_size(value, line_number)?);
            }
            "fps" => {
                let rate = value
                    .parse::<f64>()
                    .ok()
                    .filter(|r| r.is_finite() && *r > 0.0)
                    .ok_or_else(|| ParseError::MalformedHeader {
                        line: line_number,
                        message: format!("fps must be a positive number, got '{}'", value),
                    })?;
                header.frame_rate = Some((line_number, rate));
            }
            "bpx" => {
                let mode = BackgroundMode::from_code(value).ok_or_else(|| {
                    ParseError::UnsupportedBackgroundMode {
                        line: line_number,
                        value: value.to_string(),
                    }
                })?;
                header.background = Some(mode);
            }
            other => warnings.push(Warning::new(
                line_number,
                format!("unknown header '{}', ignored", other),
            )),
        }
    }

    Ok(header)
}

/// Parse `WIDTHxHEIGHT`.
fn parse_size(value: &str, line: usize) -> Result<CanvasSize, ParseError> {
    let malformed = |message: String| ParseError::MalformedHeader { line, message };

    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| malformed(format!("size must be WIDTHxHEIGHT, got '{}'", value)))?;
    let width = w
        .trim()
        .parse::<i64>()
        .map_err(|_| malformed(format!("invalid width '{}'", w.trim())))?;
    let height = h
        .trim()
        .parse::<i64>()
        .map_err(|_| malformed(format!("invalid height '{}'", h.trim())))?;

    if width <= 0 || height <= 0 {
        return Err(malformed(format!("size must be positive, got {}x{}", width, height)));
    }
    let width = u32::try_from(width).map_err(|_| malformed(format!("width {} is too large", width)))?;
    let height =
        u32::try_from(height).map_err(|_| malformed(format!("height {} is too large", height)))?;

    Ok(CanvasSize::new(width, height)?)
}

/// Parse one section body. `pos` points just past the opening line and is left
/// just past the closing `}` (or at the next opener / end of input).
fn parse_section(
    lines: &[(usize, &str)],
    pos: &mut usize,
    opened_at: usize,
    canvas: CanvasSize,
    warnings: &mut Vec<Warning>,
) -> Frame {
    let mut builder = FrameBuilder::new(canvas);

    while *pos < lines.len() {
        let (line_number, line) = lines[*pos];

        if line.starts_with('}') {
            *pos += 1;
            return builder.finish();
        }
        if section_kind(line).is_some() {
            break;
        }
        *pos += 1;

        if !line.is_empty() {
            builder.add_line(line_number, line, warnings);
        }
    }

    warnings.push(Warning::new(
        opened_at,
        "section is never closed with '}', using the rows read so far",
    ));
    builder.finish()
}

/// Union several still sections into one frame, keeping first-seen row order.
fn merge_frames(frames: Vec<Frame>) -> Frame {
    let mut merged: Vec<RowEntry> = Vec::new();
    for entry in frames.into_iter().flat_map(|frame| frame.rows) {
        match merged.iter_mut().find(|existing| existing.row == entry.row) {
            Some(existing) => existing.columns.extend(entry.columns),
            None => merged.push(entry),
        }
    }
    Frame::new(merged)
}
