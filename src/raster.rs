//! Page rasterization through external PDF renderers.
//!
//! The primary strategy is poppler's `pdftoppm`; MuPDF's `mutool draw` is
//! tried only when the primary is missing or fails. Failures never cross
//! [`RenderSession::render`]: they come back as [`RenderOutcome::NoImage`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::model::{Page, RawImage};

/// Default rasterization resolution.
pub const DEFAULT_DPI: u32 = 300;

/// Options for the page renderer.
#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Target resolution in dots per inch
    pub dpi: u32,

    /// Path or name of the poppler `pdftoppm` binary
    pub pdftoppm_cmd: String,

    /// Path or name of the MuPDF `mutool` binary
    pub mutool_cmd: String,
}

impl RasterOptions {
    /// Create new raster options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the `pdftoppm` binary.
    pub fn with_pdftoppm(mut self, cmd: impl Into<String>) -> Self {
        self.pdftoppm_cmd = cmd.into();
        self
    }

    /// Set the `mutool` binary.
    pub fn with_mutool(mut self, cmd: impl Into<String>) -> Self {
        self.mutool_cmd = cmd.into();
        self
    }
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            pdftoppm_cmd: "pdftoppm".to_string(),
            mutool_cmd: "mutool".to_string(),
        }
    }
}

/// One way of turning a PDF page into pixels.
pub trait Rasterizer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Rasterize page `page_index` (0-based) of the PDF at `pdf_path`.
    ///
    /// `scratch` is a private directory the rasterizer may write into.
    fn rasterize(&self, pdf_path: &Path, scratch: &Path, page_index: usize, dpi: u32)
        -> Result<RawImage>;
}

/// Poppler `pdftoppm` rasterizer.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    cmd: String,
}

impl PdftoppmRasterizer {
    /// Create a rasterizer invoking `cmd`.
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn name(&self) -> &str {
        "pdftoppm"
    }

    fn rasterize(
        &self,
        pdf_path: &Path,
        scratch: &Path,
        page_index: usize,
        dpi: u32,
    ) -> Result<RawImage> {
        let page_num = (page_index + 1).to_string();
        let prefix = scratch.join(format!("pdftoppm-{}", page_num));
        let output = Command::new(&self.cmd)
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(&page_num)
            .arg("-l")
            .arg(&page_num)
            .arg("-png")
            .arg("-singlefile")
            .arg(pdf_path)
            .arg(&prefix)
            .output()
            .map_err(|e| spawn_error(&self.cmd, page_index, e))?;
        check_status(&self.cmd, page_index, &output)?;

        read_and_remove(&prefix.with_extension("png"), page_index)
    }
}

/// MuPDF `mutool draw` rasterizer.
#[derive(Debug, Clone)]
pub struct MutoolRasterizer {
    cmd: String,
}

impl MutoolRasterizer {
    /// Create a rasterizer invoking `cmd`.
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }
}

impl Rasterizer for MutoolRasterizer {
    fn name(&self) -> &str {
        "mutool"
    }

    fn rasterize(
        &self,
        pdf_path: &Path,
        scratch: &Path,
        page_index: usize,
        dpi: u32,
    ) -> Result<RawImage> {
        let page_num = (page_index + 1).to_string();
        let out = scratch.join(format!("mutool-{}.png", page_num));
        let output = Command::new(&self.cmd)
            .arg("draw")
            .arg("-q")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-o")
            .arg(&out)
            .arg(pdf_path)
            .arg(&page_num)
            .output()
            .map_err(|e| spawn_error(&self.cmd, page_index, e))?;
        check_status(&self.cmd, page_index, &output)?;

        read_and_remove(&out, page_index)
    }
}

fn spawn_error(cmd: &str, page_index: usize, err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        Error::EngineUnavailable(format!("{} not found (is it installed?)", cmd))
    } else {
        Error::Rendering {
            page: page_index,
            reason: format!("failed to run {}: {}", cmd, err),
        }
    }
}

fn check_status(cmd: &str, page_index: usize, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(Error::Rendering {
        page: page_index,
        reason: format!("{} failed ({}): {}", cmd, output.status, stderr.trim()),
    })
}

fn read_and_remove(path: &Path, page_index: usize) -> Result<RawImage> {
    let bytes = fs::read(path).map_err(|e| Error::Rendering {
        page: page_index,
        reason: format!("no output image at {}: {}", path.display(), e),
    })?;
    let _ = fs::remove_file(path);
    RawImage::from_encoded(&bytes)
}

/// Result of rendering one page.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    /// The page was rasterized.
    Image(RawImage),
    /// Every strategy failed; the reasons, joined.
    NoImage(String),
}

impl RenderOutcome {
    /// Take the image, if any.
    pub fn into_image(self) -> Option<RawImage> {
        match self {
            RenderOutcome::Image(image) => Some(image),
            RenderOutcome::NoImage(_) => None,
        }
    }

    /// Check if the page was rasterized.
    pub fn is_image(&self) -> bool {
        matches!(self, RenderOutcome::Image(_))
    }
}

/// Renders PDF pages with an ordered list of rasterization strategies.
pub struct PageRenderer {
    strategies: Vec<Box<dyn Rasterizer>>,
    dpi: u32,
}

impl PageRenderer {
    /// Create a renderer with the default `pdftoppm` → `mutool` chain.
    pub fn new(options: &RasterOptions) -> Self {
        Self::with_strategies(
            vec![
                Box::new(PdftoppmRasterizer::new(options.pdftoppm_cmd.clone())),
                Box::new(MutoolRasterizer::new(options.mutool_cmd.clone())),
            ],
            options.dpi,
        )
    }

    /// Create a renderer with custom strategies, tried in order.
    pub fn with_strategies(strategies: Vec<Box<dyn Rasterizer>>, dpi: u32) -> Self {
        Self { strategies, dpi }
    }

    /// Target resolution.
    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Names of the strategies in order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Start a render session for one document.
    ///
    /// The PDF is written to a private temporary directory once; the
    /// directory is removed when the session drops.
    pub fn session(&self, pdf_bytes: &[u8]) -> RenderSession<'_> {
        let scratch = TempDir::new()
            .and_then(|dir| {
                let pdf_path = dir.path().join("source.pdf");
                fs::write(&pdf_path, pdf_bytes)?;
                Ok((dir, pdf_path))
            })
            .map_err(|e| {
                log::warn!("Cannot prepare scratch directory for rendering: {}", e);
                e.to_string()
            });

        RenderSession {
            renderer: self,
            scratch,
        }
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new(&RasterOptions::default())
    }
}

/// A document prepared for rendering.
pub struct RenderSession<'a> {
    renderer: &'a PageRenderer,
    scratch: std::result::Result<(TempDir, PathBuf), String>,
}

impl RenderSession<'_> {
    /// Render one page, trying each strategy in order.
    pub fn render(&self, page: &Page) -> RenderOutcome {
        let (dir, pdf_path) = match &self.scratch {
            Ok(scratch) => scratch,
            Err(reason) => return RenderOutcome::NoImage(format!("scratch directory: {}", reason)),
        };

        let mut failures = Vec::new();
        for strategy in &self.renderer.strategies {
            log::debug!("Rendering page {} with {}", page.number(), strategy.name());
            match strategy.rasterize(pdf_path, dir.path(), page.index(), self.renderer.dpi) {
                Ok(image) => {
                    if !failures.is_empty() {
                        log::info!(
                            "Page {} rendered by fallback {}",
                            page.number(),
                            strategy.name()
                        );
                    }
                    return RenderOutcome::Image(image);
                }
                Err(e) => {
                    log::debug!("{} failed on page {}: {}", strategy.name(), page.number(), e);
                    failures.push(format!("{}: {}", strategy.name(), e));
                }
            }
        }

        if failures.is_empty() {
            failures.push("no rasterizer configured".to_string());
        }
        RenderOutcome::NoImage(failures.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeRasterizer {
        name: &'static str,
        ok: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Rasterizer for FakeRasterizer {
        fn name(&self) -> &str {
            self.name
        }

        fn rasterize(&self, pdf: &Path, _: &Path, page: usize, dpi: u32) -> Result<RawImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(pdf.exists());
            assert_eq!(dpi, 300);
            if self.ok {
                Ok(RawImage::new(DynamicImage::ImageLuma8(GrayImage::new(2, 2))))
            } else {
                Err(Error::Rendering {
                    page,
                    reason: "boom".into(),
                })
            }
        }
    }

    fn fake(name: &'static str, ok: bool) -> (Box<dyn Rasterizer>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let r = FakeRasterizer {
            name,
            ok,
            calls: calls.clone(),
        };
        (Box::new(r), calls)
    }

    #[test]
    fn test_primary_success_skips_fallback() {
        let (primary, primary_calls) = fake("primary", true);
        let (fallback, fallback_calls) = fake("fallback", true);
        let renderer = PageRenderer::with_strategies(vec![primary, fallback], DEFAULT_DPI);

        let outcome = renderer.session(b"%PDF-1.4").render(&Page::scanned(0));
        assert!(outcome.is_image());
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fallback_used_when_primary_fails() {
        let (primary, _) = fake("primary", false);
        let (fallback, fallback_calls) = fake("fallback", true);
        let renderer = PageRenderer::with_strategies(vec![primary, fallback], DEFAULT_DPI);

        let outcome = renderer.session(b"%PDF-1.4").render(&Page::scanned(3));
        assert!(outcome.is_image());
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_total_failure_is_no_image() {
        let (primary, _) = fake("primary", false);
        let (fallback, _) = fake("fallback", false);
        let renderer = PageRenderer::with_strategies(vec![primary, fallback], DEFAULT_DPI);

        match renderer.session(b"%PDF-1.4").render(&Page::scanned(0)) {
            RenderOutcome::NoImage(reason) => {
                assert!(reason.contains("primary"));
                assert!(reason.contains("fallback"));
            }
            RenderOutcome::Image(_) => panic!("expected no image"),
        }
    }

    #[test]
    fn test_missing_binary_is_reported_not_raised() {
        let options = RasterOptions::new()
            .with_pdftoppm("coadoc-no-such-pdftoppm")
            .with_mutool("coadoc-no-such-mutool");
        let renderer = PageRenderer::new(&options);
        assert_eq!(renderer.strategy_names(), vec!["pdftoppm", "mutool"]);

        let outcome = renderer.session(b"%PDF-1.4").render(&Page::scanned(0));
        match outcome {
            RenderOutcome::NoImage(reason) => assert!(reason.contains("not found")),
            RenderOutcome::Image(_) => panic!("expected no image"),
        }
    }
}
