//! Translation job runner.
//!
//! A [`Pipeline`] wires the stages of one job together:
//! load → extract → translate → map → render. All configuration lives in an
//! immutable [`PipelineConfig`] built once and shared by every job; the
//! translation service and the document renderer are injected as trait
//! objects.
//!
//! # Example
//!
//! ```no_run
//! use coadoc::pipeline::{Pipeline, PipelineConfig};
//! use coadoc::render::OutputFormat;
//! use coadoc::translate::OpenAiTranslator;
//!
//! fn main() -> coadoc::Result<()> {
//!     let pipeline = Pipeline::new(
//!         PipelineConfig::default(),
//!         Box::new(OpenAiTranslator::from_env()?),
//!         OutputFormat::Json.renderer(),
//!     );
//!     let output = pipeline.run_file("coa.pdf")?;
//!     std::fs::write("coa_ru.json", &output.document)?;
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::extract::{ExtractOptions, Extractor};
use crate::mapper::{ContentMapper, MappedContent, MapperOptions};
use crate::model::{
    ExtractionMethod, ExtractionResult, SourceDocument, StructuredContent, TranslationJobMetadata,
    Warning, WarningKind,
};
use crate::parser::{ParseOptions, PdfParser};
use crate::render::DocumentRenderer;
use crate::schema::SectionSchema;
use crate::translate::{
    Glossary, TranslationMode, TranslationRequest, TranslationResponse, Translator, DEFAULT_MODEL,
};

/// Configuration shared by every job of a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Target section schema
    pub schema: SectionSchema,

    /// Mandatory terminology
    pub glossary: Glossary,

    /// PDF loading options
    pub parse: ParseOptions,

    /// Extraction options
    pub extract: ExtractOptions,

    /// Mapper options
    pub mapper: MapperOptions,

    /// Model identifier, passed through to the translator
    pub model: String,

    /// Requested translation shape
    pub mode: TranslationMode,

    /// Ask again in plain mode when a structured answer is not usable JSON
    pub retry_plain_on_mismatch: bool,

    /// Template handed to the renderer
    pub template: Option<PathBuf>,
}

impl PipelineConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the glossary.
    pub fn with_glossary(mut self, glossary: Glossary) -> Self {
        self.glossary = glossary;
        self
    }

    /// Set the parse options.
    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    /// Set the extraction options.
    pub fn with_extract_options(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }

    /// Set the mapper options.
    pub fn with_mapper_options(mut self, mapper: MapperOptions) -> Self {
        self.mapper = mapper;
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the translation mode.
    pub fn with_mode(mut self, mode: TranslationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable the plain-mode retry.
    pub fn with_plain_retry(mut self, enabled: bool) -> Self {
        self.retry_plain_on_mismatch = enabled;
        self
    }

    /// Set the renderer template.
    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            schema: SectionSchema::coa(),
            glossary: Glossary::builtin(),
            parse: ParseOptions::default(),
            extract: ExtractOptions::default(),
            mapper: MapperOptions::default(),
            model: DEFAULT_MODEL.to_string(),
            mode: TranslationMode::Structured,
            retry_plain_on_mismatch: true,
            template: None,
        }
    }
}

/// Result of one translation job.
#[derive(Debug, Clone)]
pub struct JobOutput {
    /// Rendered document bytes
    pub document: Vec<u8>,

    /// Content handed to the renderer
    pub content: StructuredContent,

    /// Extraction outcome
    pub extraction: ExtractionResult,

    /// Job metadata handed to the renderer
    pub metadata: TranslationJobMetadata,

    /// Every non-fatal condition of the job, extraction first
    pub warnings: Vec<Warning>,

    /// Response keys outside the schema
    pub dropped_keys: Vec<String>,
}

impl JobOutput {
    /// Condensed view for reporting.
    pub fn summary(&self) -> JobSummary {
        JobSummary {
            original_filename: self.metadata.original_filename.clone(),
            page_count: self.extraction.page_count(),
            failed_pages: self.extraction.failed_pages(),
            char_count: self.extraction.char_count(),
            method: self.extraction.method,
            model: self.metadata.model.clone(),
            filled_sections: self.content.filled_sections(),
            warning_count: self.warnings.len(),
            document_bytes: self.document.len(),
        }
    }
}

/// Counts describing a finished job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub original_filename: String,
    pub page_count: usize,
    /// 0-based indices
    pub failed_pages: Vec<usize>,
    pub char_count: usize,
    pub method: ExtractionMethod,
    pub model: String,
    pub filled_sections: usize,
    pub warning_count: usize,
    pub document_bytes: usize,
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} page(s), {} chars via {}, {} section(s) filled, {} warning(s)",
            self.original_filename,
            self.page_count,
            self.char_count,
            self.method,
            self.filled_sections,
            self.warning_count
        )
    }
}

/// Runs translation jobs.
pub struct Pipeline {
    config: PipelineConfig,
    extractor: Extractor,
    mapper: ContentMapper,
    translator: Box<dyn Translator>,
    renderer: Box<dyn DocumentRenderer>,
}

impl Pipeline {
    /// Create a pipeline using the system rasterizers and OCR engine.
    pub fn new(
        config: PipelineConfig,
        translator: Box<dyn Translator>,
        renderer: Box<dyn DocumentRenderer>,
    ) -> Self {
        let extractor = Extractor::new(config.extract.clone());
        Self::with_extractor(config, extractor, translator, renderer)
    }

    /// Create a pipeline around a prepared extractor.
    pub fn with_extractor(
        config: PipelineConfig,
        extractor: Extractor,
        translator: Box<dyn Translator>,
        renderer: Box<dyn DocumentRenderer>,
    ) -> Self {
        let mapper = ContentMapper::new(config.schema, config.mapper.clone());
        Self {
            config,
            extractor,
            mapper,
            translator,
            renderer,
        }
    }

    /// The configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load a PDF.
    pub fn load(&self, bytes: &[u8]) -> Result<SourceDocument> {
        PdfParser::from_bytes_with_options(bytes, self.config.parse.clone())?.parse()
    }

    /// Extract text from a loaded document.
    pub fn extract(&self, doc: &SourceDocument) -> Result<ExtractionResult> {
        self.extractor.extract(doc)
    }

    /// Translate extracted text and map the answer onto the schema.
    ///
    /// A structured answer that is not a JSON object is retried once in plain
    /// mode when [`PipelineConfig::retry_plain_on_mismatch`] is set; the
    /// mismatch warning is kept either way.
    pub fn translate(&self, text: &str) -> Result<MappedContent> {
        let request = TranslationRequest::new(
            text,
            &self.config.glossary,
            &self.config.schema,
            &self.config.model,
        )
        .with_mode(self.config.mode);

        let response = self.translator.translate(&request)?;
        let mut mapped = self.mapper.map(&response);

        let structured = !matches!(response, TranslationResponse::PlainText(_));
        if structured && mapped.is_schema_mismatch() && self.config.retry_plain_on_mismatch {
            log::info!("Structured answer unusable; retrying in plain mode");
            let retry = request.with_mode(TranslationMode::Plain);
            let plain = match self.translator.translate(&retry)? {
                TranslationResponse::PlainText(text) | TranslationResponse::Structured(text) => {
                    text
                }
                TranslationResponse::Json(value) => value.to_string(),
            };
            let mut retried = self.mapper.map_text(&plain);
            retried.warnings.append(&mut mapped.warnings);
            mapped = retried;
        }

        Ok(mapped)
    }

    /// Render mapped content with the configured renderer and template.
    pub fn render(
        &self,
        content: &StructuredContent,
        metadata: &TranslationJobMetadata,
    ) -> Result<Vec<u8>> {
        let document = self
            .renderer
            .render(content, metadata, self.config.template.as_deref())?;
        log::debug!(
            "Rendered {} bytes with {} renderer",
            document.len(),
            self.renderer.name()
        );
        Ok(document)
    }

    /// Run a full job over PDF bytes.
    pub fn run(&self, original_filename: &str, bytes: &[u8]) -> Result<JobOutput> {
        log::info!("Starting job for {}", original_filename);

        let doc = self.load(bytes)?;
        log::debug!(
            "Loaded {} page(s), {} with a text layer",
            doc.page_count(),
            doc.text_layer_pages()
        );

        let extraction = self.extract(&doc)?;
        drop(doc);
        log::info!(
            "Extracted {} chars via {} ({} of {} pages)",
            extraction.char_count(),
            extraction.method,
            extraction.succeeded_pages(),
            extraction.page_count()
        );

        let mapped = self.translate(&extraction.text)?;
        for warning in &mapped.warnings {
            log::warn!("{}", warning);
        }

        let metadata = TranslationJobMetadata::new(
            original_filename,
            extraction.method,
            self.config.model.as_str(),
        );
        let document = self.render(&mapped.content, &metadata)?;

        let mut warnings = extraction.warnings.clone();
        warnings.extend(mapped.warnings);

        Ok(JobOutput {
            document,
            content: mapped.content,
            extraction,
            metadata,
            warnings,
            dropped_keys: mapped.dropped_keys,
        })
    }

    /// Run a full job over a PDF file.
    pub fn run_file<P: AsRef<Path>>(&self, path: P) -> Result<JobOutput> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Config(format!("not a file path: {}", path.display())))?;
        self.run(&name, &bytes)
    }
}

/// Count warnings of one kind.
pub fn count_warnings(warnings: &[Warning], kind: WarningKind) -> usize {
    warnings.iter().filter(|w| w.kind == kind).count()
}
