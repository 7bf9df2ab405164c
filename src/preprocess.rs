//! OCR image preprocessing.
//!
//! A fixed chain applied once to a rendered page before the first OCR pass:
//! grayscale, upscale narrow pages, autocontrast, sharpen, binarize. Every
//! stage is total and deterministic, and the input image is never modified.

use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::model::{PreprocessedImage, RawImage};

/// 3x3 sharpen kernel (centre-weighted, normalized by its sum of 16).
const SHARPEN_KERNEL: [f32; 9] = [-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0];

/// Preprocessing parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessOptions {
    /// Images narrower than this are upscaled to it (Lanczos)
    pub min_width: u32,

    /// Percentage of pixels ignored at each end of the histogram by autocontrast
    pub autocontrast_cutoff: f32,

    /// Pixels strictly above this become white, the rest black
    pub threshold: u8,
}

impl PreprocessOptions {
    /// Create new preprocessing options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum width.
    pub fn with_min_width(mut self, min_width: u32) -> Self {
        self.min_width = min_width;
        self
    }

    /// Set the autocontrast cutoff percentage.
    pub fn with_autocontrast_cutoff(mut self, cutoff: f32) -> Self {
        self.autocontrast_cutoff = cutoff;
        self
    }

    /// Set the binarization threshold.
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            min_width: 2000,
            autocontrast_cutoff: 1.0,
            threshold: 180,
        }
    }
}

/// Run the full preprocessing chain.
pub fn preprocess(raw: &RawImage, options: &PreprocessOptions) -> PreprocessedImage {
    let gray = raw.as_dynamic().to_luma8();
    let gray = upscale(gray, options.min_width);
    let gray = autocontrast(&gray, options.autocontrast_cutoff);
    let gray = sharpen(&gray);
    let gray = binarize(gray, options.threshold);
    PreprocessedImage::new(gray)
}

/// Upscale so the width reaches `min_width`, keeping the aspect ratio.
pub fn upscale(gray: GrayImage, min_width: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 || width >= min_width {
        return gray;
    }
    let scale = f64::from(min_width) / f64::from(width);
    let new_width = ((f64::from(width) * scale) as u32).max(1);
    let new_height = ((f64::from(height) * scale) as u32).max(1);
    imageops::resize(&gray, new_width, new_height, FilterType::Lanczos3)
}

/// Stretch the histogram to the full 0–255 range, ignoring `cutoff` percent
/// of pixels at each end.
pub fn autocontrast(gray: &GrayImage, cutoff: f32) -> GrayImage {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    let cut = (total as f64 * f64::from(cutoff.max(0.0)) / 100.0) as u64;
    trim_low(&mut histogram, cut);
    trim_high(&mut histogram, cut);

    let lo = histogram.iter().position(|&n| n > 0);
    let hi = histogram.iter().rposition(|&n| n > 0);
    let lut = match (lo, hi) {
        (Some(lo), Some(hi)) if hi > lo => {
            let scale = 255.0 / (hi - lo) as f64;
            let offset = -(lo as f64) * scale;
            let mut lut = [0u8; 256];
            for (i, entry) in lut.iter_mut().enumerate() {
                *entry = (i as f64 * scale + offset).clamp(0.0, 255.0) as u8;
            }
            lut
        }
        _ => identity_lut(),
    };

    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = lut[pixel.0[0] as usize];
    }
    out
}

fn trim_low(histogram: &mut [u64; 256], mut cut: u64) {
    for bin in histogram.iter_mut() {
        if cut == 0 {
            break;
        }
        let take = cut.min(*bin);
        *bin -= take;
        cut -= take;
    }
}

fn trim_high(histogram: &mut [u64; 256], mut cut: u64) {
    for bin in histogram.iter_mut().rev() {
        if cut == 0 {
            break;
        }
        let take = cut.min(*bin);
        *bin -= take;
        cut -= take;
    }
}

fn identity_lut() -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = i as u8;
    }
    lut
}

/// Apply the 3x3 sharpen kernel.
pub fn sharpen(gray: &GrayImage) -> GrayImage {
    imageops::filter3x3(gray, &SHARPEN_KERNEL)
}

/// Map pixels above `threshold` to 255 and the rest to 0.
pub fn binarize(mut gray: GrayImage, threshold: u8) -> GrayImage {
    for pixel in gray.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > threshold { 255 } else { 0 };
    }
    gray
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Luma, Rgb, RgbImage};

    fn scan(width: u32, height: u32) -> RawImage {
        RawImage::new(DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            let v = (60 + (x * 7 + y * 13) % 140) as u8;
            Rgb([v, v.saturating_add(10), v])
        })))
    }

    #[test]
    fn test_preprocess_is_deterministic() {
        let raw = scan(120, 80);
        let options = PreprocessOptions::new().with_min_width(300);
        let a = preprocess(&raw, &options);
        let b = preprocess(&raw, &options);
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_eq!(a.to_png().unwrap(), b.to_png().unwrap());
    }

    #[test]
    fn test_output_is_binary_grayscale() {
        let out = preprocess(&scan(64, 64), &PreprocessOptions::new().with_min_width(64));
        assert_eq!(out.mode(), crate::model::ColorMode::Gray);
        assert!(out.as_bytes().iter().all(|&p| p == 0 || p == 255));
    }

    #[test]
    fn test_narrow_images_are_upscaled() {
        let out = preprocess(&scan(100, 50), &PreprocessOptions::default());
        assert_eq!(out.width(), 2000);
        assert_eq!(out.height(), 1000);

        let wide = preprocess(&scan(400, 10), &PreprocessOptions::new().with_min_width(200));
        assert_eq!((wide.width(), wide.height()), (400, 10));
    }

    #[test]
    fn test_input_is_not_modified() {
        let raw = scan(32, 32);
        let before = raw.clone();
        let _ = preprocess(&raw, &PreprocessOptions::new().with_min_width(32));
        assert_eq!(raw, before);
    }

    #[test]
    fn test_autocontrast_stretches_range() {
        let gray = GrayImage::from_fn(100, 1, |x, _| Luma([100 + (x as u8) / 2]));
        let out = autocontrast(&gray, 0.0);
        let min = out.pixels().map(|p| p.0[0]).min().unwrap();
        let max = out.pixels().map(|p| p.0[0]).max().unwrap();
        assert_eq!((min, max), (0, 255));
    }

    #[test]
    fn test_autocontrast_flat_image_is_unchanged() {
        let gray = GrayImage::from_pixel(10, 10, Luma([128]));
        assert_eq!(autocontrast(&gray, 1.0), gray);
    }

    #[test]
    fn test_binarize_threshold_is_exclusive() {
        let gray = GrayImage::from_fn(3, 1, |x, _| Luma([[180, 181, 10][x as usize]]));
        let out = binarize(gray, 180);
        assert_eq!(out.as_raw(), &vec![0, 255, 0]);
    }

    #[test]
    fn test_sharpen_keeps_flat_regions() {
        let gray = GrayImage::from_pixel(5, 5, Luma([90]));
        let out = sharpen(&gray);
        assert_eq!(out.get_pixel(2, 2).0[0], 90);
    }
}
