//! Rendering module for turning translated content into output documents.
//!
//! Renderers sit behind [`DocumentRenderer`] so that the pipeline never
//! depends on a concrete document format. The built-in renderers emit the
//! schema-shaped payload as JSON (for an external document builder) or as a
//! plain text document.

mod json;
mod payload;
mod text;

use std::path::Path;

use crate::error::Result;
use crate::model::{StructuredContent, TranslationJobMetadata};

pub use json::{to_json, JsonFormat, JsonRenderer};
pub use payload::{
    DocumentPayload, MetadataField, PayloadSection, DISCLAIMER, LABEL_EXTRACTION_METHOD,
    LABEL_MODEL, LABEL_ORIGINAL_FILE, LABEL_TRANSLATION_DATE, SUBTITLE, TITLE,
};
pub use text::{fill_template, to_text, TextRenderer};

/// Turns structured content plus job metadata into document bytes.
pub trait DocumentRenderer: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Render one document. `template` is renderer-specific and optional.
    fn render(
        &self,
        content: &StructuredContent,
        metadata: &TranslationJobMetadata,
        template: Option<&Path>,
    ) -> Result<Vec<u8>>;
}

impl<T: DocumentRenderer + ?Sized> DocumentRenderer for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn render(
        &self,
        content: &StructuredContent,
        metadata: &TranslationJobMetadata,
        template: Option<&Path>,
    ) -> Result<Vec<u8>> {
        (**self).render(content, metadata, template)
    }
}

/// Built-in output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty JSON payload
    #[default]
    Json,
    /// Plain text document
    Text,
}

impl OutputFormat {
    /// The renderer for this format.
    pub fn renderer(&self) -> Box<dyn DocumentRenderer> {
        match self {
            OutputFormat::Json => Box::new(JsonRenderer::new(JsonFormat::Pretty)),
            OutputFormat::Text => Box::new(TextRenderer::new()),
        }
    }

    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(crate::error::Error::Config(format!(
                "unknown output format: {}",
                other
            ))),
        }
    }
}
