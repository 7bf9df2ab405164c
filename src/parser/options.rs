//! Loading options.

/// Options for loading a source PDF.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode for per-page text extraction
    pub error_mode: ErrorMode,

    /// Whether to read embedded text layers at all
    pub read_text_layer: bool,

    /// Upper bound on pages loaded (0 = unlimited)
    pub max_pages: usize,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail the load when any page's text layer cannot be decoded.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Ignore embedded text so every page goes through OCR.
    pub fn ignore_text_layer(mut self) -> Self {
        self.read_text_layer = false;
        self
    }

    /// Limit the number of pages loaded.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            read_text_layer: true,
            max_pages: 0,
        }
    }
}

/// Error handling mode during loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    Strict,
    /// Treat an undecodable text layer as absent; the page falls through to OCR
    #[default]
    Lenient,
}
