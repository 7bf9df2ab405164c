//! Extraction strategies.
//!
//! Each strategy is a plain function from a page context to a
//! [`PageAttempt`]. The orchestrator walks [`STRATEGIES`] in order and stops
//! at the first accepted attempt.

use std::sync::OnceLock;

use crate::model::{ExtractionMethod, Page, RawImage};
use crate::normalize::normalize_text;
use crate::ocr::OcrEngine;
use crate::preprocess::preprocess;
use crate::raster::{RenderOutcome, RenderSession};

use super::options::ExtractOptions;
use super::quality::QualityVerdict;

/// Result of running one strategy on one page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageAttempt {
    /// Text passed the quality gate (already normalized)
    Accepted(String),
    /// Text was produced but failed the quality gate
    Rejected(QualityVerdict),
    /// The page could not be rasterized
    NoImage(String),
    /// The OCR engine failed on this page
    EngineFailed(String),
}

impl PageAttempt {
    /// Check if the attempt produced accepted text.
    pub fn is_accepted(&self) -> bool {
        matches!(self, PageAttempt::Accepted(_))
    }
}

/// A strategy step.
pub type Strategy = fn(&PageContext<'_>) -> PageAttempt;

/// Strategies in fallback order.
pub const STRATEGIES: [(ExtractionMethod, Strategy); 3] = [
    (ExtractionMethod::Digital, try_digital),
    (ExtractionMethod::OcrPreprocessed, try_ocr_preprocessed),
    (ExtractionMethod::OcrRaw, try_ocr_raw),
];

/// Everything a strategy may use for one page.
pub struct PageContext<'a> {
    /// The page being extracted
    pub page: &'a Page,

    /// Render session for the source PDF (absent in digital-only runs)
    pub session: Option<&'a RenderSession<'a>>,

    /// Available OCR engine (absent when unavailable)
    pub engine: Option<&'a dyn OcrEngine>,

    /// Extraction options
    pub options: &'a ExtractOptions,

    render_failure: OnceLock<String>,
}

impl<'a> PageContext<'a> {
    /// Create a context for the digital pass only.
    pub fn digital(page: &'a Page, options: &'a ExtractOptions) -> Self {
        Self {
            page,
            session: None,
            engine: None,
            options,
            render_failure: OnceLock::new(),
        }
    }

    /// Create a context with rendering and OCR available.
    pub fn with_ocr(
        page: &'a Page,
        session: &'a RenderSession<'a>,
        engine: &'a dyn OcrEngine,
        options: &'a ExtractOptions,
    ) -> Self {
        Self {
            page,
            session: Some(session),
            engine: Some(engine),
            options,
            render_failure: OnceLock::new(),
        }
    }

    /// The page image, rendered on first use and shared by later steps.
    fn image(&self) -> Result<&'a RawImage, String> {
        let session = self.session;
        let failure = &self.render_failure;
        let image = self.page.rendered_image(|page| match session {
            Some(session) => match session.render(page) {
                RenderOutcome::Image(image) => Some(image),
                RenderOutcome::NoImage(reason) => {
                    let _ = failure.set(reason);
                    None
                }
            },
            None => {
                let _ = failure.set("rendering not available".to_string());
                None
            }
        });
        image.ok_or_else(|| {
            self.render_failure
                .get()
                .cloned()
                .unwrap_or_else(|| "page could not be rendered".to_string())
        })
    }

    fn gate(&self, text: &str) -> PageAttempt {
        let text = normalize_text(text, &self.options.normalize);
        let verdict = QualityVerdict::assess_with(&text, self.options.min_alnum_chars);
        if verdict.accepted {
            PageAttempt::Accepted(text)
        } else {
            PageAttempt::Rejected(verdict)
        }
    }

    fn ocr(&self, image: &image::DynamicImage) -> PageAttempt {
        let Some(engine) = self.engine else {
            return PageAttempt::EngineFailed("no OCR engine".to_string());
        };
        match engine.recognize(image, self.options.ocr_mode) {
            Ok(text) => self.gate(&text),
            Err(e) => PageAttempt::EngineFailed(e.to_string()),
        }
    }
}

/// Read the embedded text layer.
///
/// Any non-blank text layer is accepted as is. The alphanumeric gate only
/// applies to OCR output.
pub fn try_digital(ctx: &PageContext<'_>) -> PageAttempt {
    let text = normalize_text(
        ctx.page.embedded_text().unwrap_or_default(),
        &ctx.options.normalize,
    );
    if text.trim().is_empty() {
        PageAttempt::Rejected(QualityVerdict::assess_with(&text, ctx.options.min_alnum_chars))
    } else {
        PageAttempt::Accepted(text)
    }
}

/// Render, preprocess, then OCR.
pub fn try_ocr_preprocessed(ctx: &PageContext<'_>) -> PageAttempt {
    match ctx.image() {
        Ok(raw) => {
            let prepared = preprocess(raw, &ctx.options.preprocess);
            ctx.ocr(prepared.as_dynamic())
        }
        Err(reason) => PageAttempt::NoImage(reason),
    }
}

/// OCR the rendered image as is.
pub fn try_ocr_raw(ctx: &PageContext<'_>) -> PageAttempt {
    match ctx.image() {
        Ok(raw) => ctx.ocr(raw.as_dynamic()),
        Err(reason) => PageAttempt::NoImage(reason),
    }
}
