//! Text extraction from source PDFs.
//!
//! Pages go through the strategies in [`STRATEGIES`] order: the embedded
//! text layer first, then OCR on the preprocessed page image, then OCR on
//! the unprocessed image. A page stops at the first accepted attempt: any
//! non-blank text layer, or OCR text passing the [`QualityVerdict`] gate.
//! OCR is skipped entirely when every page passes the digital step.

mod options;
mod orchestrator;
mod quality;
mod strategy;

pub use options::ExtractOptions;
pub use orchestrator::Extractor;
pub use quality::{alnum_count, QualityVerdict, MIN_ALNUM_CHARS};
pub use strategy::{
    try_digital, try_ocr_preprocessed, try_ocr_raw, PageAttempt, PageContext, Strategy, STRATEGIES,
};
