//! # coadoc
//!
//! Certificate-of-Analysis (COA) PDF extraction and structured translation
//! for Rust.
//!
//! This library turns a digital or scanned COA PDF into clean English text,
//! sends it through a translation service, and maps the answer onto a fixed
//! ten-section Russian document schema ready for rendering.
//!
//! ## Quick Start
//!
//! ```no_run
//! use coadoc::{extract_file, ExtractOptions};
//!
//! fn main() -> coadoc::Result<()> {
//!     // Extract text, falling back to OCR for scanned pages
//!     let result = extract_file("coa.pdf", ExtractOptions::default())?;
//!     println!("{} ({})", result.text, result.method);
//!
//!     for warning in &result.warnings {
//!         eprintln!("{}", warning);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Multi-strategy extraction**: embedded text, then OCR on a preprocessed
//!   raster, then OCR on the raw raster, per page
//! - **Quality gate**: OCR text needs at least ten alphanumeric characters
//! - **Pluggable boundaries**: rasterizers, OCR engines, translators and
//!   renderers are traits, so every external tool can be mocked
//! - **Schema mapping**: any translation answer becomes exactly ten sections
//!   in a fixed order
//! - **Parallel OCR**: optional, via Rayon

pub mod detect;
pub mod error;
pub mod extract;
pub mod mapper;
pub mod model;
pub mod normalize;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod preprocess;
pub mod raster;
pub mod render;
pub mod schema;
pub mod translate;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use extract::{ExtractOptions, Extractor, QualityVerdict};
pub use mapper::{ContentMapper, FallbackSection, MappedContent, MapperOptions};
pub use model::{
    ExtractionMethod, ExtractionResult, Page, PageStatus, ResultTable, SectionContent,
    SourceDocument, StructuredContent, TranslationJobMetadata, Warning, WarningKind,
};
pub use parser::{ParseOptions, PdfParser};
pub use pipeline::{JobOutput, JobSummary, Pipeline, PipelineConfig};
pub use render::{DocumentRenderer, JsonFormat, OutputFormat};
pub use schema::{Section, SectionKind, SectionSchema};
pub use translate::{Glossary, TranslationMode, TranslationResponse, Translator};

use std::io::Read;
use std::path::Path;

/// Load a PDF file with its embedded text layer.
///
/// # Example
///
/// ```no_run
/// use coadoc::load_file;
///
/// let doc = load_file("coa.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<SourceDocument> {
    PdfParser::open(path)?.parse()
}

/// Load a PDF file with custom options.
pub fn load_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ParseOptions,
) -> Result<SourceDocument> {
    PdfParser::open_with_options(path, options)?.parse()
}

/// Load a PDF from bytes.
pub fn load_bytes(data: &[u8]) -> Result<SourceDocument> {
    PdfParser::from_bytes(data)?.parse()
}

/// Load a PDF from a reader.
///
/// # Example
///
/// ```no_run
/// use coadoc::load_reader;
/// use std::fs::File;
///
/// let file = File::open("coa.pdf").unwrap();
/// let doc = load_reader(file).unwrap();
/// ```
pub fn load_reader<R: Read>(reader: R) -> Result<SourceDocument> {
    PdfParser::from_reader(reader)?.parse()
}

/// Extract text from a PDF file, with OCR fallback for failing pages.
pub fn extract_file<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<ExtractionResult> {
    let doc = load_file(path)?;
    Extractor::new(options).extract(&doc)
}

/// Extract text from PDF bytes, with OCR fallback for failing pages.
pub fn extract_bytes(data: &[u8], options: ExtractOptions) -> Result<ExtractionResult> {
    let doc = load_bytes(data)?;
    Extractor::new(options).extract(&doc)
}

/// Map a translation answer onto the COA schema with default options.
///
/// # Example
///
/// ```
/// use coadoc::{map_response, TranslationResponse};
///
/// let mapped = map_response(&TranslationResponse::PlainText("ABC".into()));
/// assert_eq!(mapped.content.text("notes"), Some("ABC"));
/// assert_eq!(mapped.content.len(), 10);
/// ```
pub fn map_response(response: &TranslationResponse) -> MappedContent {
    ContentMapper::default().map(response)
}
