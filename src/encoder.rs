//! Raster to SUM conversion
//!
//! Classifies each pixel of a decoded image as foreground (black) or
//! background, then run-length encodes the foreground rows into a
//! single-frame document.

use crate::models::{BackgroundMode, CanvasSize, DocumentError, Frame, RowEntry, SumDocument};
use image::{DynamicImage, Rgba, RgbaImage};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors while turning an image into a document.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The file is missing or the raster library cannot decode it.
    #[error("cannot read image '{}': {source}", path.display())]
    UnreadableSource {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// How a pixel is decided to be foreground.
///
/// In every policy a pixel whose alpha is below the cutoff is background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Foreground when luminance (Rec. 601) is below `luma`.
    Threshold { luma: u8, alpha: u8 },
    /// Only fully opaque pure black is foreground.
    Exact,
}

impl Default for Classification {
    fn default() -> Self {
        Classification::Threshold { luma: 128, alpha: 128 }
    }
}

impl Classification {
    /// Whether a pixel counts as foreground under this policy.
    pub fn is_foreground(&self, pixel: Rgba<u8>) -> bool {
        let [r, g, b, a] = pixel.0;
        match *self {
            Classification::Threshold { luma, alpha } => {
                a >= alpha && luminance(r, g, b) < u32::from(luma)
            }
            Classification::Exact => a == 255 && r == 0 && g == 0 && b == 0,
        }
    }
}

/// Integer Rec. 601 luma in 0..=255.
fn luminance(r: u8, g: u8, b: u8) -> u32 {
    (299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)) / 1000
}

/// Options for image conversion.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    pub classification: Classification,
    /// Version token for the header line
    pub version: String,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            classification: Classification::default(),
            version: crate::models::DEFAULT_VERSION.to_string(),
        }
    }
}

/// A monochrome raster. `true` marks a foreground pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl Bitmap {
    /// An all-background bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, pixels: vec![false; width as usize * height as usize] }
    }

    /// Build a bitmap from a predicate over 0-based coordinates.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bitmap = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                bitmap.set(x, y, f(x, y));
            }
        }
        bitmap
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at 0-based coordinates; out-of-bounds reads are background.
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.pixels[self.index(x, y)]
    }

    /// Set a pixel at 0-based coordinates; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        if x < self.width && y < self.height {
            let index = self.index(x, y);
            self.pixels[index] = foreground;
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Classify every pixel of an RGBA image.
pub fn classify(image: &RgbaImage, classification: Classification) -> Bitmap {
    Bitmap::from_fn(image.width(), image.height(), |x, y| {
        classification.is_foreground(*image.get_pixel(x, y))
    })
}

/// Whether any pixel is less than fully opaque.
pub fn has_transparency(image: &RgbaImage) -> bool {
    image.pixels().any(|pixel| pixel.0[3] < 255)
}

/// Encode a monochrome bitmap as a single-frame document.
///
/// Rows and columns are written 1-based; rows with no foreground pixels are
/// left out. The background is transparent when `alpha_present` is set.
pub fn encode_bitmap(bitmap: &Bitmap, alpha_present: bool) -> Result<SumDocument, DocumentError> {
    let canvas = CanvasSize::new(bitmap.width(), bitmap.height())?;
    let background =
        if alpha_present { BackgroundMode::Transparent } else { BackgroundMode::Opaque };

    let mut rows = Vec::new();
    for y in 0..bitmap.height() {
        let columns: BTreeSet<u32> =
            (0..bitmap.width()).filter(|&x| bitmap.get(x, y)).map(|x| x + 1).collect();
        if !columns.is_empty() {
            rows.push(RowEntry::new(y + 1, columns));
        }
    }

    SumDocument::still(canvas, background, Frame::new(rows))
}

/// Encode a decoded image.
///
/// Transparency is detected only for images with an alpha channel, and only
/// when at least one pixel is not fully opaque.
pub fn encode_image(
    image: &DynamicImage,
    options: &EncodeOptions,
) -> Result<SumDocument, EncodeError> {
    let rgba = image.to_rgba8();
    let alpha_present = image.color().has_alpha() && has_transparency(&rgba);
    let bitmap = classify(&rgba, options.classification);
    let document = encode_bitmap(&bitmap, alpha_present)?;
    Ok(document.with_version(options.version.clone()))
}

/// Open an image file and encode it. Animated sources use their first frame.
pub fn encode_file(path: &Path, options: &EncodeOptions) -> Result<SumDocument, EncodeError> {
    let image = image::open(path)
        .map_err(|source| EncodeError::UnreadableSource { path: path.to_path_buf(), source })?;
    encode_image(&image, options)
}
