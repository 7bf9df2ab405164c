//! OCR engine adapter.

use std::io;
use std::process::Command;

use image::DynamicImage;
use tempfile::Builder;

use crate::error::{Error, Result};
use crate::model::encode_png;

/// Recognition profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OcrMode {
    /// Forms and tables: one uniform block of text, neural recognizer
    #[default]
    StructuredForms,
}

impl OcrMode {
    /// Tesseract page segmentation mode.
    pub fn page_segmentation(&self) -> u8 {
        match self {
            OcrMode::StructuredForms => 6,
        }
    }

    /// Tesseract engine mode.
    pub fn engine_mode(&self) -> u8 {
        match self {
            OcrMode::StructuredForms => 1,
        }
    }
}

/// A text-recognition engine.
///
/// Implementations return raw recognized text; quality is judged by the
/// caller.
pub trait OcrEngine: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Check that the engine can run. Fails with
    /// [`Error::EngineUnavailable`] when it cannot.
    fn probe(&self) -> Result<()>;

    /// Recognize text in `image`.
    fn recognize(&self, image: &DynamicImage, mode: OcrMode) -> Result<String>;
}

/// Options for the Tesseract engine.
#[derive(Debug, Clone)]
pub struct OcrOptions {
    /// Path or name of the `tesseract` binary
    pub tesseract_cmd: String,

    /// Recognition language
    pub language: String,

    /// Resolution hint passed to the engine
    pub dpi: u32,
}

impl OcrOptions {
    /// Create new OCR options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `tesseract` binary.
    pub fn with_tesseract(mut self, cmd: impl Into<String>) -> Self {
        self.tesseract_cmd = cmd.into();
        self
    }

    /// Set the recognition language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the resolution hint.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            tesseract_cmd: "tesseract".to_string(),
            language: "eng".to_string(),
            dpi: crate::raster::DEFAULT_DPI,
        }
    }
}

/// Tesseract command-line engine.
#[derive(Debug, Clone, Default)]
pub struct TesseractEngine {
    options: OcrOptions,
}

impl TesseractEngine {
    /// Create an engine with the given options.
    pub fn new(options: OcrOptions) -> Self {
        Self { options }
    }

    /// Engine options.
    pub fn options(&self) -> &OcrOptions {
        &self.options
    }

    fn spawn_error(&self, err: io::Error) -> Error {
        if err.kind() == io::ErrorKind::NotFound {
            Error::EngineUnavailable(format!(
                "{} not found (is it installed?)",
                self.options.tesseract_cmd
            ))
        } else {
            Error::Ocr(format!("failed to run {}: {}", self.options.tesseract_cmd, err))
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn probe(&self) -> Result<()> {
        let output = Command::new(&self.options.tesseract_cmd)
            .arg("--version")
            .output()
            .map_err(|e| self.spawn_error(e))?;
        if !output.status.success() {
            return Err(Error::EngineUnavailable(format!(
                "{} --version exited with {}",
                self.options.tesseract_cmd, output.status
            )));
        }
        Ok(())
    }

    fn recognize(&self, image: &DynamicImage, mode: OcrMode) -> Result<String> {
        let png = encode_png(image)?;
        let mut input = Builder::new().prefix("coadoc-ocr-").suffix(".png").tempfile()?;
        io::Write::write_all(&mut input, &png)?;

        let output = Command::new(&self.options.tesseract_cmd)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.options.language)
            .arg("--oem")
            .arg(mode.engine_mode().to_string())
            .arg("--psm")
            .arg(mode.page_segmentation().to_string())
            .arg("--dpi")
            .arg(self.options.dpi.to_string())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ocr(format!("tesseract failed: {}", stderr.trim())));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
