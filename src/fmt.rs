//! Text serialization of SUM documents
//!
//! Writes the canonical layout: version line, `s=`, optional `fps=`, `bpx=`,
//! then one `b{` section for a still image or one `f{` section per animation
//! frame. Rows without foreground pixels are never written.

use crate::models::{SumDocument, Warning};
use crate::parser::{parse_str, ParseError};
use crate::ranges::encode_columns;
use std::collections::BTreeSet;
use std::fmt;

/// Serialization switches.
#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
    /// Write a row identical to an earlier row of the same frame as `dK`.
    pub dedupe_rows: bool,
}

/// Serialize a document with default options.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use sumimg::fmt::to_sum_string;
/// use sumimg::models::{BackgroundMode, CanvasSize, Frame, RowEntry, SumDocument};
///
/// let frame = Frame::new(vec![
///     RowEntry::new(1, BTreeSet::from([1])),
///     RowEntry::new(2, BTreeSet::from([2, 3])),
/// ]);
/// let canvas = CanvasSize::new(3, 2).unwrap();
/// let doc = SumDocument::still(canvas, BackgroundMode::Opaque, frame).unwrap();
/// assert_eq!(to_sum_string(&doc), "!sum1.0\ns=3x2;\nbpx=w;\nb{\n1:1;\n2:2-3;\n}\n");
/// ```
pub fn to_sum_string(document: &SumDocument) -> String {
    to_sum_string_with(document, &FormatOptions::default())
}

/// Serialize a document.
pub fn to_sum_string_with(document: &SumDocument, options: &FormatOptions) -> String {
    SumText { document, options }.to_string()
}

/// Canonical text of a document, written through [`fmt::Display`].
struct SumText<'a> {
    document: &'a SumDocument,
    options: &'a FormatOptions,
}

impl fmt::Display for SumText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let document = self.document;
        let canvas = document.canvas();

        writeln!(f, "!sum{}", document.version())?;
        writeln!(f, "s={}x{};", canvas.width, canvas.height)?;
        if let Some(rate) = document.frame_rate() {
            writeln!(f, "fps={}", rate)?;
        }
        writeln!(f, "bpx={};", document.background().code())?;

        let opener = if document.is_animated() { "f{" } else { "b{" };

        for frame in document.frames() {
            writeln!(f, "{}", opener)?;

            let mut written: Vec<&BTreeSet<u32>> = Vec::new();
            for entry in frame.rows.iter().filter(|entry| !entry.columns.is_empty()) {
                let earlier = if self.options.dedupe_rows {
                    written.iter().position(|columns| *columns == &entry.columns)
                } else {
                    None
                };

                match earlier {
                    Some(index) => writeln!(f, "{}:d{};", entry.row, index + 1)?,
                    None => writeln!(f, "{}:{};", entry.row, encode_columns(&entry.columns))?,
                }
                written.push(&entry.columns);
            }

            writeln!(f, "}}")?;
        }

        Ok(())
    }
}

/// Re-read a SUM script and write it back in canonical form.
///
/// Returns the formatted text and the warnings raised while reading it.
pub fn format_script(
    content: &str,
    options: &FormatOptions,
) -> Result<(String, Vec<Warning>), ParseError> {
    let result = parse_str(content)?;
    Ok((to_sum_string_with(&result.document, options), result.warnings))
}
