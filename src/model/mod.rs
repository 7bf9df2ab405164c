//! Document model types for the COA pipeline.
//!
//! The model covers both ends of a translation job: the source side
//! ([`SourceDocument`], [`Page`], raster images, [`ExtractionResult`]) and the
//! structured side ([`StructuredContent`], [`ResultTable`],
//! [`TranslationJobMetadata`]). Source-side values live for one job only.

mod bitmap;
mod content;
mod document;
mod extraction;
mod job;
mod page;
mod table;
mod warning;

pub use bitmap::{ColorMode, PreprocessedImage, RawImage};
pub(crate) use bitmap::encode_png;
pub use content::{SectionContent, SectionEntry, StructuredContent};
pub use document::SourceDocument;
pub use extraction::{ExtractionMethod, ExtractionResult, PageStatus};
pub use job::TranslationJobMetadata;
pub use page::Page;
pub use table::{ResultTable, Row};
pub use warning::{Warning, WarningKind};
