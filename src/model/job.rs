//! Job metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ExtractionMethod;

/// Date format used in rendered documents.
pub const DOCUMENT_DATE_FORMAT: &str = "%d.%m.%Y";

/// Facts about a translation job, shown in the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationJobMetadata {
    /// File name of the source PDF
    pub original_filename: String,

    /// Method used by the plurality of pages
    pub extraction_method: ExtractionMethod,

    /// Translation model identifier
    pub model: String,

    /// When the translation finished
    pub translated_at: DateTime<Utc>,
}

impl TranslationJobMetadata {
    /// Create metadata stamped with the current time.
    pub fn new(
        original_filename: impl Into<String>,
        extraction_method: ExtractionMethod,
        model: impl Into<String>,
    ) -> Self {
        Self {
            original_filename: original_filename.into(),
            extraction_method,
            model: model.into(),
            translated_at: Utc::now(),
        }
    }

    /// Override the timestamp.
    pub fn at(mut self, translated_at: DateTime<Utc>) -> Self {
        self.translated_at = translated_at;
        self
    }

    /// Translation date as `dd.mm.YYYY`.
    pub fn translation_date(&self) -> String {
        self.translated_at.format(DOCUMENT_DATE_FORMAT).to_string()
    }
}
