//! JSON rendering of translated documents.

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{StructuredContent, TranslationJobMetadata};

use super::{DocumentPayload, DocumentRenderer};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert translated content to a JSON document payload.
pub fn to_json(
    content: &StructuredContent,
    metadata: &TranslationJobMetadata,
    format: JsonFormat,
) -> Result<String> {
    serialize(&DocumentPayload::new(content, metadata, None), format)
}

fn serialize(payload: &DocumentPayload<'_>, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(payload),
        JsonFormat::Compact => serde_json::to_string(payload),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Emits the document payload as JSON, for an external document builder.
///
/// A template path, when given, is passed through in the `template` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer {
    format: JsonFormat,
}

impl JsonRenderer {
    /// Create a JSON renderer.
    pub fn new(format: JsonFormat) -> Self {
        Self { format }
    }
}

impl DocumentRenderer for JsonRenderer {
    fn name(&self) -> &str {
        "json"
    }

    fn render(
        &self,
        content: &StructuredContent,
        metadata: &TranslationJobMetadata,
        template: Option<&Path>,
    ) -> Result<Vec<u8>> {
        let payload = DocumentPayload::new(content, metadata, template);
        serialize(&payload, self.format).map(String::into_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExtractionMethod, ResultTable, SectionContent};
    use crate::schema::SectionSchema;

    fn sample() -> (StructuredContent, TranslationJobMetadata) {
        let mut content = StructuredContent::empty(&SectionSchema::coa());
        content.set("product_name", SectionContent::Text("Парацетамол".into()));
        content.set(
            "test_results",
            SectionContent::Table(ResultTable::from_records([[
                ("parameter", "pH"),
                ("result", "6,5"),
            ]])),
        );
        let metadata = TranslationJobMetadata::new("coa.pdf", ExtractionMethod::OcrRaw, "gpt-4o");
        (content, metadata)
    }

    #[test]
    fn test_to_json_pretty() {
        let (content, metadata) = sample();
        let json = to_json(&content, &metadata, JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\": \"СЕРТИФИКАТ АНАЛИЗА\""));
        assert!(json.contains("Парацетамол"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let (content, metadata) = sample();
        let json = to_json(&content, &metadata, JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_renderer_payload_shape() {
        let (content, metadata) = sample();
        let bytes = JsonRenderer::default()
            .render(&content, &metadata, Some(Path::new("coa_template.docx")))
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["extraction_method"], "ocr_raw");
        assert_eq!(value["template"], "coa_template.docx");

        let sections = value["sections"].as_array().unwrap();
        assert_eq!(sections.len(), 10);
        assert_eq!(sections[0]["key"], "document_title");
        assert_eq!(sections[6]["kind"], "table");
        assert_eq!(sections[6]["content"][0]["parameter"], "pH");
        assert_eq!(sections[9]["content"], "");
    }
}
