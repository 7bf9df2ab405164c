//! Extraction options.

use crate::normalize::NormalizeOptions;
use crate::ocr::{OcrMode, OcrOptions};
use crate::preprocess::PreprocessOptions;
use crate::raster::RasterOptions;

use super::quality::MIN_ALNUM_CHARS;

/// Options for the extraction orchestrator.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Rasterizer settings
    pub raster: RasterOptions,

    /// OCR engine settings
    pub ocr: OcrOptions,

    /// OCR recognition profile
    pub ocr_mode: OcrMode,

    /// Preprocessing chain parameters
    pub preprocess: PreprocessOptions,

    /// Cleanup applied to candidate page text
    pub normalize: NormalizeOptions,

    /// Quality gate threshold for OCR text
    pub min_alnum_chars: usize,

    /// Prefix each page with a `--- Page N ---` marker
    pub page_markers: bool,

    /// Run OCR on several pages at once
    pub parallel: bool,
}

impl ExtractOptions {
    /// Create new extraction options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rendering resolution (also passed to the OCR engine).
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.raster.dpi = dpi;
        self.ocr.dpi = dpi;
        self
    }

    /// Set rasterizer options.
    pub fn with_raster(mut self, raster: RasterOptions) -> Self {
        self.raster = raster;
        self
    }

    /// Set OCR engine options.
    pub fn with_ocr(mut self, ocr: OcrOptions) -> Self {
        self.ocr = ocr;
        self
    }

    /// Set preprocessing options.
    pub fn with_preprocess(mut self, preprocess: PreprocessOptions) -> Self {
        self.preprocess = preprocess;
        self
    }

    /// Set text normalization options.
    pub fn with_normalize(mut self, normalize: NormalizeOptions) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set the quality gate threshold.
    pub fn with_min_alnum_chars(mut self, min: usize) -> Self {
        self.min_alnum_chars = min;
        self
    }

    /// Enable or disable page markers.
    pub fn with_page_markers(mut self, enabled: bool) -> Self {
        self.page_markers = enabled;
        self
    }

    /// Enable or disable parallel OCR.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            raster: RasterOptions::default(),
            ocr: OcrOptions::default(),
            ocr_mode: OcrMode::StructuredForms,
            preprocess: PreprocessOptions::default(),
            normalize: NormalizeOptions::default(),
            min_alnum_chars: MIN_ALNUM_CHARS,
            page_markers: true,
            parallel: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExtractOptions::default();
        assert_eq!(options.min_alnum_chars, 10);
        assert_eq!(options.raster.dpi, 300);
        assert!(options.page_markers);
        assert!(!options.parallel);
    }

    #[test]
    fn test_with_dpi_updates_both_tools() {
        let options = ExtractOptions::new().with_dpi(200).with_parallel(true);
        assert_eq!(options.raster.dpi, 200);
        assert_eq!(options.ocr.dpi, 200);
        assert!(options.parallel);
    }
}
