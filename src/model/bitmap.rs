//! Raster image wrappers passed between the renderer, preprocessor and OCR.

use std::io::Cursor;

use image::{ColorType, DynamicImage, GrayImage, ImageFormat};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Pixel layout of a raster image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// 8-bit grayscale
    Gray,
    /// 8-bit grayscale with alpha
    GrayAlpha,
    /// 8-bit RGB
    Rgb,
    /// 8-bit RGBA
    Rgba,
    /// Any other layout (16-bit, float)
    Other,
}

impl From<ColorType> for ColorMode {
    fn from(color: ColorType) -> Self {
        match color {
            ColorType::L8 => ColorMode::Gray,
            ColorType::La8 => ColorMode::GrayAlpha,
            ColorType::Rgb8 => ColorMode::Rgb,
            ColorType::Rgba8 => ColorMode::Rgba,
            _ => ColorMode::Other,
        }
    }
}

/// A page image exactly as the rasterizer produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    image: DynamicImage,
}

impl RawImage {
    /// Wrap a decoded image.
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Decode an image file held in memory (PNG, PPM, ...).
    pub fn from_encoded(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(image::load_from_memory(bytes)?))
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel layout.
    pub fn mode(&self) -> ColorMode {
        self.image.color().into()
    }

    /// Borrow the underlying image.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Raw pixel bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_bytes()
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.image)
    }
}

/// A page image after the OCR preprocessing chain. Always 8-bit grayscale.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedImage {
    image: DynamicImage,
}

impl PreprocessedImage {
    /// Wrap a grayscale buffer.
    pub fn new(gray: GrayImage) -> Self {
        Self {
            image: DynamicImage::ImageLuma8(gray),
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel layout (always [`ColorMode::Gray`]).
    pub fn mode(&self) -> ColorMode {
        ColorMode::Gray
    }

    /// Borrow the underlying image.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Raw pixel bytes (one byte per pixel, row-major).
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_bytes()
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.image)
    }
}

pub(crate) fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
