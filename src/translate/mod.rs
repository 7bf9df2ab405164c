//! Translation boundary.
//!
//! The pipeline talks to the translation service only through
//! [`Translator`]. The service receives extracted English text together with
//! the glossary and section schema, and answers with prose or a JSON payload
//! keyed by the schema.

mod glossary;
#[cfg(feature = "openai")]
mod openai;
mod prompt;

pub use glossary::{Glossary, GlossaryEntry};
#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiTranslator, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use prompt::{
    chunk_text, system_prompt, user_message, MAX_CHUNK_CHARS, MAX_TOKENS_STRUCTURED, TEMPERATURE,
};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::SectionSchema;

/// Default translation model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Shape of the answer requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationMode {
    /// A JSON object keyed by the section schema
    #[default]
    Structured,
    /// Translated prose, layout preserved
    Plain,
}

/// Everything the service needs for one translation.
#[derive(Debug, Clone, Copy)]
pub struct TranslationRequest<'a> {
    /// Extracted English text
    pub text: &'a str,

    /// Mandatory terminology
    pub glossary: &'a Glossary,

    /// Target section schema
    pub schema: &'a SectionSchema,

    /// Model identifier, passed through untouched
    pub model: &'a str,

    /// Requested answer shape
    pub mode: TranslationMode,
}

impl<'a> TranslationRequest<'a> {
    /// Create a structured-mode request.
    pub fn new(
        text: &'a str,
        glossary: &'a Glossary,
        schema: &'a SectionSchema,
        model: &'a str,
    ) -> Self {
        Self {
            text,
            glossary,
            schema,
            model,
            mode: TranslationMode::Structured,
        }
    }

    /// Set the requested mode.
    pub fn with_mode(mut self, mode: TranslationMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Answer from the translation service.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationResponse {
    /// Translated prose
    PlainText(String),
    /// Raw model output that was asked to be JSON; not yet validated
    Structured(String),
    /// An already-decoded JSON payload
    Json(serde_json::Value),
}

/// A translation service.
///
/// Failures (network, authentication, timeouts) are returned as
/// [`crate::Error::TranslationService`] or
/// [`crate::Error::TranslationTimeout`] and end the job.
pub trait Translator: Send + Sync {
    /// Translate `request.text`.
    fn translate(&self, request: &TranslationRequest<'_>) -> Result<TranslationResponse>;
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn translate(&self, request: &TranslationRequest<'_>) -> Result<TranslationResponse> {
        (**self).translate(request)
    }
}
