//! GIF animation rendering

use crate::models::SumDocument;
use crate::output::{ensure_parent_dir, scale_image, OutputError};
use crate::renderer::render_frames;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Frame duration used when a document has no frame rate.
pub const DEFAULT_FRAME_MS: u32 = 100;

/// Per-frame display time: `round(1000 / fps)` ms, or `default_ms` without a rate.
pub fn frame_duration_ms(frame_rate: Option<f64>, default_ms: u32) -> u32 {
    match frame_rate {
        Some(rate) if rate.is_finite() && rate > 0.0 => {
            ((1000.0 / rate).round() as u32).max(1)
        }
        _ => default_ms,
    }
}

/// Write a sequence of frames as an animated GIF.
///
/// Fails with [`OutputError::EmptyAnimation`] before touching the file system
/// when fewer than two frames are given.
pub fn render_gif(
    frames: &[RgbaImage],
    duration_ms: u32,
    loop_anim: bool,
    path: &Path,
) -> Result<(), OutputError> {
    if frames.len() < 2 {
        return Err(OutputError::EmptyAnimation { frames: frames.len() });
    }

    ensure_parent_dir(path)?;

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let mut encoder = GifEncoder::new(writer);

    // Without a loop extension the animation plays once.
    if loop_anim {
        encoder.set_repeat(Repeat::Infinite)?;
    }

    let delay = Delay::from_numer_denom_ms(duration_ms, 1);
    for rgba_image in frames {
        encoder.encode_frame(Frame::from_parts(rgba_image.clone(), 0, 0, delay))?;
    }

    Ok(())
}

/// Render every frame of a document into an animated GIF.
pub fn export_animation(
    document: &SumDocument,
    default_frame_ms: u32,
    loop_anim: bool,
    scale: u32,
    path: &Path,
) -> Result<(), OutputError> {
    if document.frames().len() < 2 {
        return Err(OutputError::EmptyAnimation { frames: document.frames().len() });
    }

    let duration = frame_duration_ms(document.frame_rate(), default_frame_ms);
    let frames = render_frames(document)
        .into_iter()
        .map(|image| scale_image(image, scale))
        .collect::<Result<Vec<_>, _>>()?;

    render_gif(&frames, duration, loop_anim, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use image::codecs::gif::GifDecoder;
    use image::{AnimationDecoder, Rgba};
    use tempfile::tempdir;

    fn create_test_frame(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(width, height, color)
    }

    fn decode_frames(path: &Path) -> Vec<image::Frame> {
        let file = File::open(path).unwrap();
        let decoder = GifDecoder::new(std::io::BufReader::new(file)).unwrap();
        decoder.into_frames().collect_frames().unwrap()
    }

    #[test]
    fn test_frame_duration() {
        assert_eq!(frame_duration_ms(Some(10.0), 100), 100);
        assert_eq!(frame_duration_ms(Some(12.0), 100), 83);
        assert_eq!(frame_duration_ms(Some(3.0), 100), 333);
        assert_eq!(frame_duration_ms(None, 100), 100);
        assert_eq!(frame_duration_ms(None, 250), 250);
    }

    #[test]
    fn test_render_gif_creates_valid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.gif");

        let frames = vec![
            create_test_frame(2, 2, Rgba([0, 0, 0, 255])),
            create_test_frame(2, 2, Rgba([255, 255, 255, 255])),
        ];

        render_gif(&frames, 100, true, &path).unwrap();
        assert_eq!(decode_frames(&path).len(), 2);
    }

    #[test]
    fn test_render_gif_rejects_single_frame() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("single.gif");

        let frames = vec![create_test_frame(2, 2, Rgba([0, 0, 0, 255]))];
        let err = render_gif(&frames, 100, true, &path).unwrap_err();
        assert!(matches!(err, OutputError::EmptyAnimation { frames: 1 }));
        assert!(!path.exists());
    }

    #[test]
    fn test_render_gif_rejects_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.gif");
        let err = render_gif(&[], 100, true, &path).unwrap_err();
        assert!(matches!(err, OutputError::EmptyAnimation { frames: 0 }));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_animation_uses_frame_rate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("anim/blink.gif");
        let text = "!sum1.0\ns=2x2;\nfps=5\nbpx=w;\nf{\n1:1-2;\n}\nf{\n2:1-2;\n}\n";
        let doc = parse_str(text).unwrap().document;

        export_animation(&doc, DEFAULT_FRAME_MS, true, 1, &path).unwrap();

        let frames = decode_frames(&path);
        assert_eq!(frames.len(), 2);
        let (numer, denom) = frames[0].delay().numer_denom_ms();
        assert_eq!(numer / denom, 200);
        // Palette quantization may nudge values; only the light/dark split matters.
        assert!(frames[0].buffer().get_pixel(0, 0).0[0] < 64);
        assert!(frames[1].buffer().get_pixel(0, 0).0[0] > 192);
    }

    #[test]
    fn test_export_animation_still_document_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("still.gif");
        let doc = parse_str("!sum1.0\ns=1x1;\nbpx=w;\nb{\n1:1;\n}\n").unwrap().document;

        let err = export_animation(&doc, DEFAULT_FRAME_MS, true, 1, &path).unwrap_err();
        assert!(matches!(err, OutputError::EmptyAnimation { frames: 1 }));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_animation_rejects_oversized_scale() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("huge.gif");
        let text = "!sum1.0\ns=2x2;\nbpx=w;\nf{\n1:1;\n}\nf{\n2:2;\n}\n";
        let doc = parse_str(text).unwrap().document;

        let err = export_animation(&doc, DEFAULT_FRAME_MS, true, u32::MAX, &path).unwrap_err();
        assert!(matches!(err, OutputError::TooLarge { width: 2, height: 2, .. }));
        assert!(!path.exists());
    }
}
