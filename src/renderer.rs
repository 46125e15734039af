//! Frame rendering to image buffers

use crate::models::{BackgroundMode, CanvasSize, Frame, SumDocument};
use image::{Rgba, RgbaImage};

/// Foreground pixels are always opaque black.
pub const FOREGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Background for `bpx=w`.
pub const OPAQUE_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Background for `bpx=t`.
pub const TRANSPARENT_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// The fill colour implied by a background mode.
pub fn background_color(mode: BackgroundMode) -> Rgba<u8> {
    match mode {
        BackgroundMode::Opaque => OPAQUE_BACKGROUND,
        BackgroundMode::Transparent => TRANSPARENT_BACKGROUND,
    }
}

/// Render one frame onto a fresh canvas.
///
/// Every pixel starts as the background colour; each listed (row, column)
/// pair is then painted black. Coordinates outside the canvas are ignored.
///
/// # Examples
///
/// ```
/// use sumimg::parser::parse_str;
/// use sumimg::renderer::{render_frame, FOREGROUND, OPAQUE_BACKGROUND};
///
/// let doc = parse_str("!sum1.0\ns=4x1;\nbpx=w;\nb{\n1:1,3-4;\n}\n").unwrap().document;
/// let image = render_frame(&doc.frames()[0], doc.canvas(), doc.background());
/// assert_eq!(*image.get_pixel(0, 0), FOREGROUND);
/// assert_eq!(*image.get_pixel(1, 0), OPAQUE_BACKGROUND);
/// ```
pub fn render_frame(frame: &Frame, canvas: CanvasSize, background: BackgroundMode) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(canvas.width, canvas.height, background_color(background));

    for entry in &frame.rows {
        if !canvas.contains_row(entry.row) {
            continue;
        }
        let y = entry.row - 1;
        for &column in &entry.columns {
            if canvas.contains_column(column) {
                image.put_pixel(column - 1, y, FOREGROUND);
            }
        }
    }

    image
}

/// Render a frame of a document by 0-based index.
pub fn render_document_frame(document: &SumDocument, index: usize) -> Option<RgbaImage> {
    document
        .frames()
        .get(index)
        .map(|frame| render_frame(frame, document.canvas(), document.background()))
}

/// Render every frame of a document, each onto its own canvas.
pub fn render_frames(document: &SumDocument) -> Vec<RgbaImage> {
    document
        .frames()
        .iter()
        .map(|frame| render_frame(frame, document.canvas(), document.background()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowEntry;
    use crate::parser::parse_str;
    use std::collections::BTreeSet;

    #[test]
    fn test_render_concrete_scenario() {
        let doc = parse_str("!sum1.0\ns=4x1;\nbpx=w;\nb{\n1:1,3-4;\n}\n").unwrap().document;
        let image = render_document_frame(&doc, 0).unwrap();
        assert_eq!(image.dimensions(), (4, 1));
        assert_eq!(*image.get_pixel(0, 0), FOREGROUND);
        assert_eq!(*image.get_pixel(1, 0), OPAQUE_BACKGROUND);
        assert_eq!(*image.get_pixel(2, 0), FOREGROUND);
        assert_eq!(*image.get_pixel(3, 0), FOREGROUND);
    }

    #[test]
    fn test_transparent_background() {
        let doc = parse_str("!sum1.0\ns=2x2;\nbpx=t;\nb{\n2:2;\n}\n").unwrap().document;
        let image = render_document_frame(&doc, 0).unwrap();
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert_eq!(image.get_pixel(1, 0).0[3], 0);
        assert_eq!(image.get_pixel(0, 1).0[3], 0);
        assert_eq!(*image.get_pixel(1, 1), FOREGROUND);
    }

    #[test]
    fn test_absent_rows_are_background() {
        let canvas = CanvasSize::new(2, 3).unwrap();
        let frame = Frame::new(vec![RowEntry::new(2, BTreeSet::from([1, 2]))]);
        let image = render_frame(&frame, canvas, BackgroundMode::Opaque);
        for x in 0..2 {
            assert_eq!(*image.get_pixel(x, 0), OPAQUE_BACKGROUND);
            assert_eq!(*image.get_pixel(x, 1), FOREGROUND);
            assert_eq!(*image.get_pixel(x, 2), OPAQUE_BACKGROUND);
        }
    }

    #[test]
    fn test_frames_render_independently() {
        let text = "!sum1.0\ns=2x1;\nfps=4\nbpx=w;\nf{\n1:1;\n}\nf{\n1:2;\n}\nf{\n}\n";
        let doc = parse_str(text).unwrap().document;
        let images = render_frames(&doc);
        assert_eq!(images.len(), 3);
        assert_eq!(*images[0].get_pixel(0, 0), FOREGROUND);
        assert_eq!(*images[0].get_pixel(1, 0), OPAQUE_BACKGROUND);
        assert_eq!(*images[1].get_pixel(0, 0), OPAQUE_BACKGROUND);
        assert_eq!(*images[1].get_pixel(1, 0), FOREGROUND);
        assert!(images[2].pixels().all(|p| *p == OPAQUE_BACKGROUND));
    }

    #[test]
    fn test_out_of_canvas_pixels_ignored() {
        let canvas = CanvasSize::new(2, 2).unwrap();
        let frame = Frame::new(vec![
            RowEntry::new(5, BTreeSet::from([1])),
            RowEntry::new(1, BTreeSet::from([2, 9])),
        ]);
        let image = render_frame(&frame, canvas, BackgroundMode::Opaque);
        assert_eq!(*image.get_pixel(1, 0), FOREGROUND);
        assert_eq!(image.pixels().filter(|p| **p == FOREGROUND).count(), 1);
    }

    #[test]
    fn test_missing_frame_index() {
        let doc = parse_str("!sum1.0\ns=1x1;\nbpx=w;\nb{\n}\n").unwrap().document;
        assert!(render_document_frame(&doc, 1).is_none());
    }
}
