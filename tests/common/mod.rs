//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use coadoc::error::{Error, Result};
use coadoc::extract::{ExtractOptions, Extractor};
use coadoc::model::{RawImage, StructuredContent, TranslationJobMetadata};
use coadoc::ocr::{OcrEngine, OcrMode};
use coadoc::preprocess::PreprocessOptions;
use coadoc::raster::{PageRenderer, Rasterizer};
use coadoc::render::DocumentRenderer;
use coadoc::translate::{TranslationMode, TranslationRequest, TranslationResponse, Translator};
use image::{DynamicImage, GrayImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Build a PDF with one page per entry; `None` pages have no text layer.
pub fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        if let Some(text) = text {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let stream = Stream::new(dictionary! {}, content.encode().unwrap());
            page.set("Contents", doc.add_object(stream));
        }
        kids.push(doc.add_object(page).into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Call counters shared between a test and its mocks.
#[derive(Debug, Clone, Default)]
pub struct Counters {
    pub renders: Arc<AtomicUsize>,
    pub probes: Arc<AtomicUsize>,
    pub recognitions: Arc<AtomicUsize>,
}

impl Counters {
    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn recognitions(&self) -> usize {
        self.recognitions.load(Ordering::SeqCst)
    }
}

/// Renders a blank page whose width encodes the page index (8 + index).
pub struct BlankRasterizer(pub Arc<AtomicUsize>);

impl Rasterizer for BlankRasterizer {
    fn name(&self) -> &str {
        "blank"
    }

    fn rasterize(&self, _: &Path, _: &Path, page_index: usize, _: u32) -> Result<RawImage> {
        self.0.fetch_add(1, Ordering::SeqCst);
        let width = 8 + page_index as u32;
        Ok(RawImage::new(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            width,
            8,
            image::Luma([255]),
        ))))
    }
}

/// Always fails to render.
pub struct BrokenRasterizer;

impl Rasterizer for BrokenRasterizer {
    fn name(&self) -> &str {
        "broken"
    }

    fn rasterize(&self, _: &Path, _: &Path, page_index: usize, _: u32) -> Result<RawImage> {
        Err(Error::Rendering {
            page: page_index,
            reason: "corrupt page".to_string(),
        })
    }
}

/// How a mock engine answers.
#[derive(Clone)]
pub enum Script {
    /// Return these texts in call order, repeating the last
    Sequence(Vec<&'static str>),
    /// Return `"Recognized page text {n}"` for the page encoded in the width
    ByPage,
    /// Probe fails
    Unavailable,
}

pub struct MockEngine {
    script: Script,
    counters: Counters,
}

impl MockEngine {
    pub fn new(script: Script, counters: Counters) -> Self {
        Self { script, counters }
    }
}

impl OcrEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn probe(&self) -> Result<()> {
        self.counters.probes.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Unavailable => Err(Error::EngineUnavailable(
                "tesseract not found on PATH".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn recognize(&self, image: &DynamicImage, _: OcrMode) -> Result<String> {
        let n = self.counters.recognitions.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Sequence(texts) => Ok(texts
                .get(n)
                .or(texts.last())
                .copied()
                .unwrap_or("")
                .to_string()),
            Script::ByPage => Ok(format!(
                "Recognized page text {}",
                image.width().saturating_sub(8) + 1
            )),
            Script::Unavailable => Err(Error::Ocr("engine missing".to_string())),
        }
    }
}

/// Options that keep mock rasters at their rendered size.
pub fn test_options() -> ExtractOptions {
    ExtractOptions::default().with_preprocess(PreprocessOptions::new().with_min_width(8))
}

/// An extractor over mock components.
pub fn mock_extractor(script: Script, options: ExtractOptions) -> (Extractor, Counters) {
    let counters = Counters::default();
    let renderer = PageRenderer::with_strategies(
        vec![Box::new(BlankRasterizer(counters.renders.clone()))],
        300,
    );
    let engine = MockEngine {
        script,
        counters: counters.clone(),
    };
    (
        Extractor::with_components(renderer, Box::new(engine), options),
        counters,
    )
}

/// A request as seen by the mock translator.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub text: String,
    pub mode: TranslationMode,
    pub model: String,
    pub glossary_len: usize,
    pub schema_len: usize,
}

#[derive(Default)]
struct TranslatorState {
    responses: VecDeque<Result<TranslationResponse>>,
    seen: Vec<SeenRequest>,
}

/// Answers with queued responses and records every request.
#[derive(Clone, Default)]
pub struct MockTranslator {
    state: Arc<Mutex<TranslatorState>>,
}

impl MockTranslator {
    pub fn new(responses: Vec<Result<TranslationResponse>>) -> Self {
        let translator = Self::default();
        translator.state.lock().unwrap().responses = responses.into();
        translator
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.state.lock().unwrap().seen.clone()
    }
}

impl Translator for MockTranslator {
    fn translate(&self, request: &TranslationRequest<'_>) -> Result<TranslationResponse> {
        let mut state = self.state.lock().unwrap();
        state.seen.push(SeenRequest {
            text: request.text.to_string(),
            mode: request.mode,
            model: request.model.to_string(),
            glossary_len: request.glossary.len(),
            schema_len: request.schema.len(),
        });
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(Error::TranslationService("no response queued".to_string())))
    }
}

/// Records what it was asked to render.
#[derive(Clone, Default)]
pub struct MockRenderer {
    rendered: Arc<Mutex<Vec<(StructuredContent, TranslationJobMetadata, Option<String>)>>>,
}

impl MockRenderer {
    pub fn calls(&self) -> Vec<(StructuredContent, TranslationJobMetadata, Option<String>)> {
        self.rendered.lock().unwrap().clone()
    }
}

impl DocumentRenderer for MockRenderer {
    fn name(&self) -> &str {
        "mock"
    }

    fn render(
        &self,
        content: &StructuredContent,
        metadata: &TranslationJobMetadata,
        template: Option<&Path>,
    ) -> Result<Vec<u8>> {
        self.rendered.lock().unwrap().push((
            content.clone(),
            metadata.clone(),
            template.map(|p| p.display().to_string()),
        ));
        Ok(b"rendered".to_vec())
    }
}
