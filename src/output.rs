//! Still-image output and file path generation

use image::imageops::FilterType;
use image::{ImageFormat, RgbaImage};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// Animated export needs at least two frames
    #[error("cannot export an animation with {frames} frame(s), at least 2 are required")]
    EmptyAnimation { frames: usize },
    /// Scaled dimensions do not fit in `u32`
    #[error("{width}x{height} scaled by {factor} is too large")]
    TooLarge { width: u32, height: u32, factor: u32 },
}

/// Container formats the renderer can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StillFormat {
    #[default]
    Png,
    Gif,
}

impl StillFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            StillFormat::Png => "png",
            StillFormat::Gif => "gif",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            StillFormat::Png => ImageFormat::Png,
            StillFormat::Gif => ImageFormat::Gif,
        }
    }
}

/// Create parent directories of `path` if they don't exist.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Save an RGBA image as a still PNG or GIF.
pub fn save_still(image: &RgbaImage, path: &Path, format: StillFormat) -> Result<(), OutputError> {
    ensure_parent_dir(path)?;
    image.save_with_format(path, format.image_format())?;
    Ok(())
}

/// Write SUM text to a file, creating parent directories.
pub fn save_script(text: &str, path: &Path) -> Result<(), OutputError> {
    ensure_parent_dir(path)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Scale image by integer factor using nearest-neighbor interpolation.
///
/// Keeps glyph edges crisp. A factor of 0 or 1 returns the image unchanged.
pub fn scale_image(image: RgbaImage, factor: u32) -> Result<RgbaImage, OutputError> {
    if factor <= 1 {
        return Ok(image);
    }
    let (width, height) = image.dimensions();
    let too_large = || OutputError::TooLarge { width, height, factor };
    let scaled_width = width.checked_mul(factor).ok_or_else(too_large)?;
    let scaled_height = height.checked_mul(factor).ok_or_else(too_large)?;
    Ok(image::imageops::resize(&image, scaled_width, scaled_height, FilterType::Nearest))
}

/// Generate the output path for a converted file.
///
/// | Scenario | Output |
/// |----------|--------|
/// | No `-o` | `{input_dir}/{stem}.{ext}` |
/// | `-o out.png` | `out.png` |
/// | `-o dir/` (or an existing directory) | `dir/{stem}.{ext}` |
pub fn generate_output_path(input: &Path, extension: &str, output_arg: Option<&Path>) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    let file_name = format!("{}.{}", stem, extension);

    match output_arg {
        Some(output) => {
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir {
                output.join(file_name)
            } else {
                output.to_path_buf()
            }
        }
        None => {
            let parent = input.parent().unwrap_or(Path::new(""));
            if parent.as_os_str().is_empty() {
                PathBuf::from(file_name)
            } else {
                parent.join(file_name)
            }
        }
    }
}
