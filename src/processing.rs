use crate::constants::{
    DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY, MAX_JPEG_DIMENSION, MAX_QUALITY,
    MIN_QUALITY,
};
use crate::error::{OptimizeError, Result};
use crate::report::FileOutcome;
use crate::utils::calculate_reduction;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageReader, RgbImage, RgbaImage};
use jpeg_encoder::{ColorType, Encoder};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, trace};

/// How the re-encoded bytes replace the original file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Overwrite the original directly.
    #[default]
    InPlace,
    /// Stage into a sibling temp file, then atomically rename it over the original.
    TempThenRename,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeOptions {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u8,
    pub write_mode: WriteMode,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            quality: DEFAULT_QUALITY,
            write_mode: WriteMode::InPlace,
        }
    }
}

impl OptimizeOptions {
    pub fn new(
        quality: Option<u8>,
        max_width: Option<u32>,
        max_height: Option<u32>,
        write_mode: WriteMode,
    ) -> Result<Self> {
        let options = Self {
            max_width: max_width.unwrap_or(DEFAULT_MAX_WIDTH),
            max_height: max_height.unwrap_or(DEFAULT_MAX_HEIGHT),
            quality: quality.unwrap_or(DEFAULT_QUALITY),
            write_mode,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.quality) {
            return Err(OptimizeError::InvalidQuality(self.quality));
        }

        let in_range = |side: u32| (1..=MAX_JPEG_DIMENSION).contains(&side);
        if !in_range(self.max_width) || !in_range(self.max_height) {
            return Err(OptimizeError::InvalidBounds(
                self.max_width,
                self.max_height,
                MAX_JPEG_DIMENSION,
            ));
        }

        Ok(())
    }
}

/// Channel layout of a decoded raster, as far as the encoder cares.
///
/// Palette images never show up here: the decoder expands them into RGB, or
/// RGBA when the palette carries transparency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Opaque,
    Alpha,
}

impl ColorMode {
    pub fn of(img: &DynamicImage) -> Self {
        if img.color().has_alpha() {
            ColorMode::Alpha
        } else {
            ColorMode::Opaque
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Opaque => write!(f, "opaque"),
            ColorMode::Alpha => write!(f, "alpha"),
        }
    }
}

/// What a successful optimization did to one file.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationStats {
    pub path: PathBuf,
    pub original_size: u64,
    pub optimized_size: u64,
    pub original_dimensions: (u32, u32),
    pub final_dimensions: (u32, u32),
    pub color_mode: ColorMode,
}

impl OptimizationStats {
    pub fn resized(&self) -> bool {
        self.original_dimensions != self.final_dimensions
    }

    pub fn reduction_percent(&self) -> Option<f64> {
        calculate_reduction(self.original_size, self.optimized_size)
    }
}

/// Per-file boundary of the batch: every failure becomes a
/// [`FileOutcome::Failed`] carrying the reason instead of an error.
pub fn optimize_file(path: &Path, options: &OptimizeOptions) -> FileOutcome {
    match optimize_image(path, options) {
        Ok(stats) => FileOutcome::Optimized(stats),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "optimization failed");
            FileOutcome::Failed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    }
}

/// Decodes `path`, flattens transparency onto white, bounds the dimensions
/// and overwrites the file with a progressive JPEG.
///
/// The whole image is encoded in memory first, so any decode, conversion or
/// encode failure leaves the file on disk untouched.
pub fn optimize_image(path: &Path, options: &OptimizeOptions) -> Result<OptimizationStats> {
    let original_size = fs::metadata(path)?.len();

    let decoded = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let original_dimensions = decoded.dimensions();
    let color_mode = ColorMode::of(&decoded);
    debug!(
        path = %path.display(),
        width = original_dimensions.0,
        height = original_dimensions.1,
        color = ?decoded.color(),
        mode = %color_mode,
        "decoded image"
    );

    let rgb = normalize_color_mode(decoded)?;
    let rgb = downsample(rgb, options.max_width, options.max_height);
    let final_dimensions = rgb.dimensions();

    let encoded = encode_jpeg(&rgb, options.quality)?;
    drop(rgb);

    write_output(path, &encoded, options.write_mode)?;
    let optimized_size = fs::metadata(path)?.len();

    Ok(OptimizationStats {
        path: path.to_path_buf(),
        original_size,
        optimized_size,
        original_dimensions,
        final_dimensions,
        color_mode,
    })
}

/// Returns an opaque three-channel buffer. Alpha-bearing input is
/// composited onto a white background using its own alpha as the mask.
pub fn normalize_color_mode(img: DynamicImage) -> Result<RgbImage> {
    match ColorMode::of(&img) {
        ColorMode::Opaque => Ok(img.into_rgb8()),
        ColorMode::Alpha => composite_on_white(&img.into_rgba8()),
    }
}

fn composite_on_white(rgba: &RgbaImage) -> Result<RgbImage> {
    let (width, height) = rgba.dimensions();
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);

    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        pixels.extend([r, g, b].map(|c| blend_over_white(c, a)));
    }

    RgbImage::from_raw(width, height, pixels).ok_or_else(|| {
        OptimizeError::Conversion(format!(
            "composited buffer does not fit {}x{}",
            width, height
        ))
    })
}

fn blend_over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (channel as u32, alpha as u32);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// Largest size that fits in `max_width` x `max_height` with the same
/// aspect ratio. Images already inside the box are returned unchanged.
///
/// Each scaled side is rounded to whichever neighbouring integer keeps the
/// ratio closest to the original, and never drops below one pixel.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    if width == 0 || height == 0 {
        return (width.min(max_width), height.min(max_height));
    }

    let aspect = width as f64 / height as f64;
    let (box_w, box_h) = (max_width as f64, max_height as f64);

    if box_w / box_h >= aspect {
        let new_width = round_aspect(box_h * aspect, |n| (aspect - n / box_h).abs());
        (new_width.min(max_width), max_height)
    } else {
        let new_height = round_aspect(box_w / aspect, |n| {
            if n == 0.0 {
                0.0
            } else {
                (aspect - box_w / n).abs()
            }
        });
        (max_width, new_height.min(max_height))
    }
}

fn round_aspect(value: f64, distance: impl Fn(f64) -> f64) -> u32 {
    let (floor, ceil) = (value.floor(), value.ceil());
    let best = if distance(ceil) < distance(floor) { ceil } else { floor };
    (best as u32).max(1)
}

/// Shrinks `image` into the bounding box with Lanczos3. Never upscales.
pub fn downsample(image: RgbImage, max_width: u32, max_height: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let (new_width, new_height) = fit_within(width, height, max_width, max_height);

    if (new_width, new_height) == (width, height) {
        trace!(width, height, "within bounds, keeping resolution");
        return image;
    }

    debug!(width, height, new_width, new_height, "downsampling");
    imageops::resize(&image, new_width, new_height, FilterType::Lanczos3)
}

/// Progressive JPEG with optimized Huffman tables at `quality`.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    if width > MAX_JPEG_DIMENSION || height > MAX_JPEG_DIMENSION {
        return Err(OptimizeError::DimensionsTooLarge(
            width,
            height,
            MAX_JPEG_DIMENSION,
        ));
    }

    let mut encoded = Vec::new();
    let mut encoder = Encoder::new(&mut encoded, quality);
    encoder.set_progressive(true);
    encoder.set_optimized_huffman_tables(true);
    encoder.encode(image.as_raw(), width as u16, height as u16, ColorType::Rgb)?;

    debug!(width, height, quality, bytes = encoded.len(), "encoded JPEG");
    Ok(encoded)
}

pub fn write_output(path: &Path, bytes: &[u8], mode: WriteMode) -> Result<()> {
    match mode {
        WriteMode::InPlace => fs::write(path, bytes)?,
        WriteMode::TempThenRename => {
            let dir = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));

            let mut staged = NamedTempFile::new_in(dir)?;
            staged.write_all(bytes)?;
            staged.as_file().sync_all()?;
            if let Ok(metadata) = fs::metadata(path) {
                fs::set_permissions(staged.path(), metadata.permissions())?;
            }

            trace!(staged = %staged.path().display(), dest = %path.display(), "renaming");
            staged.persist(path).map_err(|e| e.error)?;
        }
    }

    Ok(())
}
