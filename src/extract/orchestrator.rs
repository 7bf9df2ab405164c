//! Extraction orchestrator.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::{
    ExtractionMethod, ExtractionResult, Page, PageStatus, SourceDocument, Warning, WarningKind,
};
use crate::ocr::{OcrEngine, TesseractEngine};
use crate::raster::{PageRenderer, RenderSession};

use super::options::ExtractOptions;
use super::strategy::{PageAttempt, PageContext, STRATEGIES};

/// Final state of one page.
#[derive(Debug, Clone)]
struct PageOutcome {
    text: String,
    status: PageStatus,
    warnings: Vec<Warning>,
    /// Attempts so far, in strategy order
    attempts: Vec<(ExtractionMethod, PageAttempt)>,
}

impl PageOutcome {
    fn pending() -> Self {
        Self {
            text: String::new(),
            status: PageStatus::failed(),
            warnings: Vec::new(),
            attempts: Vec::new(),
        }
    }

    fn is_accepted(&self) -> bool {
        self.status.success
    }

    /// Record an attempt; returns true when the page is done.
    fn record(&mut self, page: &Page, method: ExtractionMethod, attempt: PageAttempt) -> bool {
        let done = match &attempt {
            PageAttempt::Accepted(text) => {
                log::debug!("Page {}: accepted by {}", page.number(), method);
                self.status = PageStatus::accepted(method, text);
                self.text = text.clone();
                true
            }
            PageAttempt::Rejected(verdict) => {
                log::debug!(
                    "Page {}: {} rejected ({} alphanumeric characters)",
                    page.number(),
                    method,
                    verdict.alnum_count
                );
                false
            }
            PageAttempt::NoImage(reason) => {
                log::warn!("Page {}: rendering failed: {}", page.number(), reason);
                self.warnings.push(Warning::for_page(
                    WarningKind::RenderingFailure,
                    page.index(),
                    reason.clone(),
                ));
                // Every later step needs the same image.
                true
            }
            PageAttempt::EngineFailed(reason) => {
                log::warn!("Page {}: {} failed: {}", page.number(), method, reason);
                self.warnings.push(Warning::for_page(
                    WarningKind::OcrFailure,
                    page.index(),
                    format!("{}: {}", method, reason),
                ));
                false
            }
        };
        self.attempts.push((method, attempt));
        done
    }

    /// Close a page that no strategy accepted.
    fn reject(&mut self, page: &Page, ocr_note: Option<&str>) {
        if self.is_accepted() {
            return;
        }
        let mut tried: Vec<String> = self
            .attempts
            .iter()
            .map(|(method, attempt)| match attempt {
                PageAttempt::Rejected(v) => format!("{}: {} alphanumeric", method, v.alnum_count),
                PageAttempt::NoImage(_) => format!("{}: no image", method),
                PageAttempt::EngineFailed(_) => format!("{}: engine error", method),
                PageAttempt::Accepted(_) => format!("{}: accepted", method),
            })
            .collect();
        if let Some(note) = ocr_note {
            tried.push(note.to_string());
        }
        log::info!("Page {}: no usable text ({})", page.number(), tried.join(", "));
        self.warnings.push(Warning::for_page(
            WarningKind::QualityRejected,
            page.index(),
            format!("no usable text ({})", tried.join(", ")),
        ));
    }
}

/// Coordinates digital extraction, rendering, preprocessing and OCR.
pub struct Extractor {
    renderer: PageRenderer,
    engine: Box<dyn OcrEngine>,
    options: ExtractOptions,
}

impl Extractor {
    /// Create an extractor using `pdftoppm`/`mutool` and `tesseract`.
    pub fn new(options: ExtractOptions) -> Self {
        let renderer = PageRenderer::new(&options.raster);
        let engine = Box::new(TesseractEngine::new(options.ocr.clone()));
        Self::with_components(renderer, engine, options)
    }

    /// Create an extractor with custom rendering and OCR components.
    pub fn with_components(
        renderer: PageRenderer,
        engine: Box<dyn OcrEngine>,
        options: ExtractOptions,
    ) -> Self {
        Self {
            renderer,
            engine,
            options,
        }
    }

    /// Extraction options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract the text of every page.
    ///
    /// Fails with [`Error::NoTextExtracted`] when no page yields usable text.
    pub fn extract(&self, doc: &SourceDocument) -> Result<ExtractionResult> {
        let pages = doc.pages();
        let mut outcomes: Vec<PageOutcome> = pages.iter().map(|_| PageOutcome::pending()).collect();
        let mut job_warnings = Vec::new();

        // Digital pass over every page.
        let (digital_method, digital_step) = STRATEGIES[0];
        for (page, outcome) in pages.iter().zip(outcomes.iter_mut()) {
            let attempt = digital_step(&PageContext::digital(page, &self.options));
            outcome.record(page, digital_method, attempt);
        }

        let pending: Vec<usize> = outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| !o.is_accepted())
            .map(|(i, _)| i)
            .collect();

        if pending.is_empty() {
            log::debug!("All {} page(s) accepted from the text layer", pages.len());
        } else {
            log::debug!("{} page(s) need OCR", pending.len());
            match self.engine.probe() {
                Ok(()) => {
                    let session = self.renderer.session(doc.bytes());
                    self.run_ocr(pages, &pending, &session, &mut outcomes);
                }
                Err(e) => {
                    log::warn!("OCR skipped: {}", e);
                    job_warnings.push(Warning::new(WarningKind::EngineUnavailable, e.to_string()));
                    for &i in &pending {
                        outcomes[i].reject(&pages[i], Some("OCR unavailable"));
                    }
                }
            }
        }

        self.assemble(pages, outcomes, job_warnings)
    }

    fn run_ocr(
        &self,
        pages: &[Page],
        pending: &[usize],
        session: &RenderSession<'_>,
        outcomes: &mut [PageOutcome],
    ) {
        let engine: &dyn OcrEngine = self.engine.as_ref();
        let run_page = |i: usize, mut outcome: PageOutcome| -> PageOutcome {
            let page = &pages[i];
            let ctx = PageContext::with_ocr(page, session, engine, &self.options);
            for (method, step) in &STRATEGIES[1..] {
                if outcome.record(page, *method, step(&ctx)) {
                    break;
                }
            }
            outcome.reject(page, None);
            outcome
        };

        let taken: Vec<(usize, PageOutcome)> = pending
            .iter()
            .map(|&i| (i, std::mem::replace(&mut outcomes[i], PageOutcome::pending())))
            .collect();

        let finished: Vec<(usize, PageOutcome)> = if self.options.parallel {
            taken
                .into_par_iter()
                .map(|(i, outcome)| (i, run_page(i, outcome)))
                .collect()
        } else {
            taken
                .into_iter()
                .map(|(i, outcome)| (i, run_page(i, outcome)))
                .collect()
        };

        for (i, outcome) in finished {
            outcomes[i] = outcome;
        }
    }

    fn assemble(
        &self,
        pages: &[Page],
        outcomes: Vec<PageOutcome>,
        mut warnings: Vec<Warning>,
    ) -> Result<ExtractionResult> {
        let mut statuses = BTreeMap::new();
        let mut page_texts = Vec::with_capacity(outcomes.len());
        let mut segments = Vec::with_capacity(outcomes.len());

        for (page, outcome) in pages.iter().zip(outcomes) {
            segments.push(self.segment(page, &outcome));
            warnings.extend(outcome.warnings);
            statuses.insert(page.index(), outcome.status);
            page_texts.push(outcome.text);
        }

        let method = ExtractionMethod::plurality(statuses.values().filter_map(|s| s.method));
        let Some(method) = method else {
            return Err(Error::NoTextExtracted {
                page_count: pages.len(),
                warnings,
            });
        };

        let result = ExtractionResult {
            text: join_segments(&segments),
            method,
            pages: statuses,
            page_texts,
            warnings,
        };
        log::info!(
            "Extracted {} characters from {}/{} page(s) (method: {})",
            result.char_count(),
            result.succeeded_pages(),
            result.page_count(),
            result.method
        );
        Ok(result)
    }

    /// Text contributed by one page to the document text.
    fn segment(&self, page: &Page, outcome: &PageOutcome) -> String {
        match outcome.status.method {
            Some(method) if self.options.page_markers => {
                let ocr = if method.is_ocr() { " (OCR)" } else { "" };
                format!("--- Page {}{} ---\n{}", page.number(), ocr, outcome.text)
            }
            _ => outcome.text.clone(),
        }
    }
}

/// Join page segments with one blank line; empty segments add no separator.
fn join_segments(segments: &[String]) -> String {
    segments
        .iter()
        .filter(|segment| !segment.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}
