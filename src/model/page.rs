//! Page-level types.

use std::sync::OnceLock;

use super::RawImage;

/// A single page of a source PDF.
///
/// The rendered image is produced lazily, at most once, the first time an OCR
/// stage asks for it. Both OCR passes share that image.
#[derive(Debug)]
pub struct Page {
    /// Page index (0-based)
    index: usize,

    /// Text from the embedded text layer, if the page has one
    embedded_text: Option<String>,

    /// Rendered raster; `Some(None)` records a failed render
    image: OnceLock<Option<RawImage>>,
}

impl Page {
    /// Create a page with an optional embedded text layer.
    pub fn new(index: usize, embedded_text: Option<String>) -> Self {
        Self {
            index,
            embedded_text: embedded_text.filter(|t| !t.is_empty()),
            image: OnceLock::new(),
        }
    }

    /// Create a page that only exists as an image (scanned page).
    pub fn scanned(index: usize) -> Self {
        Self::new(index, None)
    }

    /// Create a page with embedded text.
    pub fn with_text(index: usize, text: impl Into<String>) -> Self {
        Self::new(index, Some(text.into()))
    }

    /// Page index (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Page number (1-based), as shown to users.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Embedded text, if any.
    pub fn embedded_text(&self) -> Option<&str> {
        self.embedded_text.as_deref()
    }

    /// Whether the page carries a non-blank text layer.
    pub fn has_text_layer(&self) -> bool {
        self.embedded_text
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// Return the rendered image, producing it with `render` on first use.
    ///
    /// A failed render is remembered, so `render` runs at most once per page.
    pub fn rendered_image<F>(&self, render: F) -> Option<&RawImage>
    where
        F: FnOnce(&Page) -> Option<RawImage>,
    {
        self.image.get_or_init(|| render(self)).as_ref()
    }

    /// Whether a render has already been attempted.
    pub fn render_attempted(&self) -> bool {
        self.image.get().is_some()
    }
}

impl Clone for Page {
    fn clone(&self) -> Self {
        let image = OnceLock::new();
        if let Some(rendered) = self.image.get() {
            let _ = image.set(rendered.clone());
        }
        Self {
            index: self.index,
            embedded_text: self.embedded_text.clone(),
            image,
        }
    }
}
