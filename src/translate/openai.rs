//! OpenAI-compatible chat-completions client.

use std::env;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::prompt::{chunk_text, system_prompt, user_message};
use super::prompt::{MAX_CHUNK_CHARS, MAX_TOKENS_STRUCTURED, TEMPERATURE};
use super::{TranslationMode, TranslationRequest, TranslationResponse, Translator};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default bound on one request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for the OpenAI client.
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token
    pub api_key: String,

    /// API root, without the trailing `/chat/completions`
    pub base_url: String,

    /// Bound on each request
    pub timeout: Duration,

    /// Maximum characters per plain-mode request
    pub max_chunk_chars: usize,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_chunk_chars", &self.max_chunk_chars)
            .finish()
    }
}

impl OpenAiConfig {
    /// Create a config with the given API key and defaults elsewhere.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_chunk_chars: MAX_CHUNK_CHARS,
        }
    }

    /// Read `OPENAI_API_KEY`, `OPENAI_BASE_URL` and
    /// `COADOC_TRANSLATION_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".to_string()))?;
        let mut config = Self::new(api_key);

        if let Ok(url) = env::var("OPENAI_BASE_URL") {
            if !url.trim().is_empty() {
                config = config.with_base_url(url);
            }
        }
        if let Ok(secs) = env::var("COADOC_TRANSLATION_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "COADOC_TRANSLATION_TIMEOUT_SECS must be a number of seconds, got {:?}",
                    secs
                ))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Set the API root.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the plain-mode chunk size.
    pub fn with_max_chunk_chars(mut self, max: usize) -> Self {
        self.max_chunk_chars = max;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Translator backed by an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiTranslator {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiTranslator {
    /// Create a translator.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("coadoc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Create a translator configured from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiConfig::from_env()?)
    }

    /// Connection settings.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn complete(
        &self,
        model: &str,
        system: &str,
        user: String,
        max_tokens: Option<u32>,
    ) -> Result<String> {
        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::TranslationService(format!(
                "API error {}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: ChatResponse = response.json().map_err(|e| self.request_error(e))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| Error::TranslationService("response has no choices".to_string()))
    }

    fn request_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::TranslationTimeout(self.config.timeout)
        } else {
            Error::TranslationService(err.to_string())
        }
    }
}

impl Translator for OpenAiTranslator {
    fn translate(&self, request: &TranslationRequest<'_>) -> Result<TranslationResponse> {
        if request.text.trim().is_empty() {
            return Err(Error::TranslationService(
                "no text provided for translation".to_string(),
            ));
        }

        let system = system_prompt(request.mode, request.glossary, request.schema);
        match request.mode {
            TranslationMode::Structured => {
                log::info!("Requesting structured translation from {}", request.model);
                let raw = self.complete(
                    request.model,
                    &system,
                    user_message(TranslationMode::Structured, request.text),
                    Some(MAX_TOKENS_STRUCTURED),
                )?;
                Ok(TranslationResponse::Structured(raw))
            }
            TranslationMode::Plain => {
                let chunks = chunk_text(request.text, self.config.max_chunk_chars);
                let mut parts = Vec::with_capacity(chunks.len());
                for (i, chunk) in chunks.iter().enumerate() {
                    log::info!(
                        "Translating chunk {}/{} with {}",
                        i + 1,
                        chunks.len(),
                        request.model
                    );
                    let translated = self.complete(
                        request.model,
                        &system,
                        user_message(TranslationMode::Plain, chunk),
                        None,
                    )?;
                    let translated = translated.trim();
                    if !translated.is_empty() {
                        parts.push(translated.to_string());
                    }
                }
                Ok(TranslationResponse::PlainText(parts.join("\n\n")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SectionSchema;
    use crate::translate::Glossary;

    #[test]
    fn test_config_builder() {
        let config = OpenAiConfig::new("sk-test")
            .with_base_url("http://localhost:8080/v1/")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_chunk_chars, 6000);
        assert!(!format!("{:?}", config).contains("sk-test"));
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(OpenAiConfig::new("k").timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_empty_text_is_rejected_before_any_request() {
        let translator = OpenAiTranslator::new(OpenAiConfig::new("k")).unwrap();
        let glossary = Glossary::new();
        let schema = SectionSchema::coa();
        let request = TranslationRequest::new("   ", &glossary, &schema, "gpt-4o");
        assert!(matches!(
            translator.translate(&request),
            Err(Error::TranslationService(_))
        ));
    }

    #[test]
    fn test_unreachable_endpoint_is_a_service_error() {
        let translator = OpenAiTranslator::new(
            OpenAiConfig::new("k")
                .with_base_url("http://127.0.0.1:9")
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap();
        let glossary = Glossary::new();
        let schema = SectionSchema::coa();
        let request = TranslationRequest::new("Batch 123", &glossary, &schema, "gpt-4o");
        let err = translator.translate(&request).unwrap_err();
        assert!(err.is_job_fatal());
    }
}
