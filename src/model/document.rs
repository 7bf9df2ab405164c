//! Document-level types.

use super::Page;

/// A loaded source PDF: the original bytes plus its pages in order.
///
/// Immutable once loaded. Owned by the extraction orchestrator for the
/// duration of one job.
#[derive(Debug, Clone, Default)]
pub struct SourceDocument {
    /// Original PDF bytes (empty for documents assembled in memory)
    bytes: Vec<u8>,

    /// PDF version (e.g., "1.7"), when known
    pdf_version: Option<String>,

    /// Pages in increasing index order
    pages: Vec<Page>,
}

impl SourceDocument {
    /// Create a document from loaded bytes and its pages.
    pub fn new(bytes: Vec<u8>, pdf_version: Option<String>, pages: Vec<Page>) -> Self {
        let mut pages = pages;
        pages.sort_by_key(Page::index);
        Self {
            bytes,
            pdf_version,
            pages,
        }
    }

    /// Create a document from pages only, with no backing PDF bytes.
    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self::new(Vec::new(), None, pages)
    }

    /// Original PDF bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// PDF version string, if known.
    pub fn pdf_version(&self) -> Option<&str> {
        self.pdf_version.as_deref()
    }

    /// Pages in order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Get a page by index (0-based).
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Number of pages with a usable embedded text layer.
    pub fn text_layer_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.has_text_layer()).count()
    }
}
