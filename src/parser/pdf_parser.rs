//! Source PDF loader using lopdf.

use std::io::Read;
use std::path::Path;

use lopdf::Document as LopdfDocument;

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::{Page, SourceDocument};

use super::options::{ErrorMode, ParseOptions};

/// Loads a PDF into a [`SourceDocument`], reading each page's text layer.
pub struct PdfParser {
    doc: LopdfDocument,
    bytes: Vec<u8>,
    version: String,
    options: ParseOptions,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_vec_with_options(data, options)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        Self::from_vec_with_options(data.to_vec(), options)
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_vec_with_options(data, options)
    }

    fn from_vec_with_options(data: Vec<u8>, options: ParseOptions) -> Result<Self> {
        let format = detect_format_from_bytes(&data)?;

        let doc = LopdfDocument::load_mem(&data[format.header_offset..]).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;

        if doc.is_encrypted() {
            log::warn!("PDF is encrypted; text layers may be unreadable, pages will fall back to OCR");
        }

        Ok(Self {
            doc,
            bytes: data,
            version: format.version,
            options,
        })
    }

    /// Load every page and return the source document.
    ///
    /// The text layer of a page that cannot be decoded is treated as absent
    /// in lenient mode, so the page is picked up by OCR.
    pub fn parse(self) -> Result<SourceDocument> {
        let page_numbers: Vec<u32> = self.doc.get_pages().keys().copied().collect();
        let limit = match self.options.max_pages {
            0 => page_numbers.len(),
            n => n.min(page_numbers.len()),
        };

        let mut pages = Vec::with_capacity(limit);
        for (index, page_num) in page_numbers.into_iter().take(limit).enumerate() {
            pages.push(self.parse_page(index, page_num)?);
        }

        log::debug!(
            "Loaded PDF {} with {} page(s), {} with a text layer",
            self.version,
            pages.len(),
            pages.iter().filter(|p| p.has_text_layer()).count()
        );

        Ok(SourceDocument::new(self.bytes, Some(self.version), pages))
    }

    /// Parse a single page.
    fn parse_page(&self, index: usize, page_num: u32) -> Result<Page> {
        if !self.options.read_text_layer {
            return Ok(Page::scanned(index));
        }

        match self.extract_page_text(page_num) {
            Ok(text) => Ok(Page::new(index, Some(text))),
            Err(e) => {
                if self.options.error_mode == ErrorMode::Strict {
                    return Err(e);
                }
                log::warn!("Failed to extract text from page {}: {}", page_num, e);
                Ok(Page::scanned(index))
            }
        }
    }

    /// Extract text from a page (1-based page number).
    fn extract_page_text(&self, page_num: u32) -> Result<String> {
        self.doc
            .extract_text(&[page_num])
            .map_err(|e| Error::PdfParse(format!("Page {}: {}", page_num, e)))
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Get PDF version.
    pub fn version(&self) -> &str {
        &self.version
    }
}
