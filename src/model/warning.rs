//! Non-fatal conditions reported alongside a (possibly partial) result.

use serde::{Deserialize, Serialize};

/// Category of a non-fatal condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A page could not be rasterized; OCR was skipped for it.
    RenderingFailure,
    /// The OCR engine is missing; the job continued with digital text only.
    EngineUnavailable,
    /// The OCR engine failed on one page.
    OcrFailure,
    /// A page yielded too few alphanumeric characters after every pass.
    QualityRejected,
    /// The translation response did not match the section schema.
    SchemaMismatch,
}

impl WarningKind {
    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::RenderingFailure => "rendering_failure",
            WarningKind::EngineUnavailable => "engine_unavailable",
            WarningKind::OcrFailure => "ocr_failure",
            WarningKind::QualityRejected => "quality_rejected",
            WarningKind::SchemaMismatch => "schema_mismatch",
        }
    }
}

/// A warning raised during a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Warning category
    pub kind: WarningKind,

    /// Page index (0-based) the warning refers to, if page-specific
    pub page: Option<usize>,

    /// Human-readable detail
    pub message: String,
}

impl Warning {
    /// Create a document-level warning.
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            page: None,
            message: message.into(),
        }
    }

    /// Create a warning tied to one page.
    pub fn for_page(kind: WarningKind, page: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            page: Some(page),
            message: message.into(),
        }
    }

    /// Check if this warning refers to the given page.
    pub fn is_for_page(&self, page: usize) -> bool {
        self.page == Some(page)
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.page {
            Some(page) => write!(f, "[{}] page {}: {}", self.kind.as_str(), page + 1, self.message),
            None => write!(f, "[{}] {}", self.kind.as_str(), self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let w = Warning::for_page(WarningKind::QualityRejected, 1, "3 alphanumeric characters");
        assert_eq!(w.to_string(), "[quality_rejected] page 2: 3 alphanumeric characters");
        assert!(w.is_for_page(1));

        let w = Warning::new(WarningKind::EngineUnavailable, "tesseract not found");
        assert_eq!(w.to_string(), "[engine_unavailable] tesseract not found");
        assert!(!w.is_for_page(0));
    }

    #[test]
    fn test_warning_serializes_snake_case() {
        let w = Warning::new(WarningKind::SchemaMismatch, "not json");
        let json = serde_json::to_string(&w).unwrap();
        assert!(json.contains("\"schema_mismatch\""));
    }
}
