//! Extraction result types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Warning;

/// The method that produced a page's accepted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Embedded text layer
    Digital,
    /// OCR on the preprocessed raster
    OcrPreprocessed,
    /// OCR on the unprocessed raster
    OcrRaw,
}

impl ExtractionMethod {
    /// All methods in fallback (and tie-break preference) order.
    pub const ALL: [ExtractionMethod; 3] = [
        ExtractionMethod::Digital,
        ExtractionMethod::OcrPreprocessed,
        ExtractionMethod::OcrRaw,
    ];

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Digital => "digital",
            ExtractionMethod::OcrPreprocessed => "ocr_preprocessed",
            ExtractionMethod::OcrRaw => "ocr_raw",
        }
    }

    /// Whether the method goes through OCR.
    pub fn is_ocr(&self) -> bool {
        !matches!(self, ExtractionMethod::Digital)
    }

    /// Pick the method used by the most pages.
    ///
    /// Ties resolve in [`ExtractionMethod::ALL`] order: digital, then
    /// ocr_preprocessed, then ocr_raw. Returns `None` for an empty input.
    pub fn plurality<I>(methods: I) -> Option<ExtractionMethod>
    where
        I: IntoIterator<Item = ExtractionMethod>,
    {
        let mut counts = [0usize; 3];
        for method in methods {
            counts[method as usize] += 1;
        }
        let best = *counts.iter().max()?;
        if best == 0 {
            return None;
        }
        Self::ALL.into_iter().find(|m| counts[*m as usize] == best)
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of extraction for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStatus {
    /// Whether some method produced accepted text
    pub success: bool,

    /// Characters in the accepted text (0 when failed)
    pub char_count: usize,

    /// Method that produced the accepted text
    pub method: Option<ExtractionMethod>,
}

impl PageStatus {
    /// A page accepted by `method` with `text`.
    pub fn accepted(method: ExtractionMethod, text: &str) -> Self {
        Self {
            success: true,
            char_count: text.chars().count(),
            method: Some(method),
        }
    }

    /// A page that failed every method.
    pub fn failed() -> Self {
        Self {
            success: false,
            char_count: 0,
            method: None,
        }
    }
}

/// Final text of a document plus how it was obtained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Concatenated text of all pages, in page order
    pub text: String,

    /// Method used by the plurality of accepted pages
    pub method: ExtractionMethod,

    /// Per-page outcome, keyed by page index (0-based)
    pub pages: BTreeMap<usize, PageStatus>,

    /// Accepted text of each page, in page order ("" for failed pages)
    pub page_texts: Vec<String>,

    /// Non-fatal conditions met along the way
    pub warnings: Vec<Warning>,
}

impl ExtractionResult {
    /// Number of pages in the source document.
    pub fn page_count(&self) -> usize {
        self.page_texts.len()
    }

    /// Accepted text of one page ("" when the page failed).
    pub fn page_text(&self, index: usize) -> Option<&str> {
        self.page_texts.get(index).map(String::as_str)
    }

    /// Status of one page.
    pub fn page_status(&self, index: usize) -> Option<&PageStatus> {
        self.pages.get(&index)
    }

    /// Number of pages that produced accepted text.
    pub fn succeeded_pages(&self) -> usize {
        self.pages.values().filter(|s| s.success).count()
    }

    /// Indices of pages that failed every method.
    pub fn failed_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|(_, s)| !s.success)
            .map(|(i, _)| *i)
            .collect()
    }

    /// Whether any OCR pass contributed text.
    pub fn used_ocr(&self) -> bool {
        self.pages
            .values()
            .any(|s| s.method.is_some_and(|m| m.is_ocr()))
    }

    /// Total characters of the final text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}
