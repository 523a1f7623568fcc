#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

fn noise(x: u32, y: u32) -> u8 {
    let mut h = x.wrapping_mul(374_761_393) ^ y.wrapping_mul(668_265_263);
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    (h >> 24) as u8
}

/// Photo-like texture: smooth gradients with a little grain.
pub fn photo(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let grain = noise(x, y) / 8;
        Rgb([
            ((x * 255 / width.max(1)) as u8).saturating_add(grain),
            ((y * 255 / height.max(1)) as u8).saturating_add(grain),
            (((x + y) / 4 % 256) as u8).saturating_add(grain),
        ])
    })
}

pub fn photo_with_alpha(width: u32, height: u32) -> RgbaImage {
    let base = photo(width, height);
    RgbaImage::from_fn(width, height, |x, y| {
        let [r, g, b] = base.get_pixel(x, y).0;
        let alpha = if x < width / 2 { 255 } else { (y % 256) as u8 };
        Rgba([r, g, b, alpha])
    })
}

pub fn write_jpeg(path: &Path, image: &RgbImage, quality: u8) {
    let mut writer = BufWriter::new(File::create(path).unwrap());
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(image)
        .unwrap();
}

/// Writes PNG bytes under whatever name `path` has, e.g. `logo.jpg`.
pub fn write_png(path: &Path, image: DynamicImage) {
    image.save_with_format(path, ImageFormat::Png).unwrap();
}

/// Writes an 8-bit indexed PNG with a tRNS chunk. `indices` is row-major.
pub fn write_indexed_png(
    path: &Path,
    width: u32,
    height: u32,
    palette: &[[u8; 3]],
    alpha: &[u8],
    indices: &[u8],
) {
    let writer = BufWriter::new(File::create(path).unwrap());
    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(palette.concat());
    encoder.set_trns(alpha.to_vec());

    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(indices).unwrap();
    writer.finish().unwrap();
}

pub fn write_corrupt(path: &Path) {
    fs::write(path, b"\xFF\xD8\xFF\xE0 truncated garbage").unwrap();
}

pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).unwrap().len()
}

pub fn dimensions(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).unwrap()
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn create_batch(dir: &Path, names: &[&str], width: u32, height: u32) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            write_jpeg(&path, &photo(width, height), 95);
            path
        })
        .collect()
}
