//! Plain text rendering of translated documents.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{Error, Result};
use crate::model::{ResultTable, SectionContent, StructuredContent, TranslationJobMetadata};
use crate::normalize::{normalize_text, NormalizeOptions};

use super::{DocumentPayload, DocumentRenderer};

/// Convert translated content to a plain text document.
pub fn to_text(content: &StructuredContent, metadata: &TranslationJobMetadata) -> String {
    let payload = DocumentPayload::new(content, metadata, None);
    let mut output = String::new();

    output.push_str(payload.title);
    output.push('\n');
    output.push_str(payload.subtitle);
    output.push_str("\n\n");

    for field in &payload.metadata {
        output.push_str(&format!("{} {}\n", field.label, field.value));
    }

    output.push('\n');
    output.push_str(&render_body(&payload));
    output.push_str("\n\n");
    output.push_str(payload.disclaimer);

    normalize_text(&output, &NormalizeOptions::default())
}

/// Section headings and content, without title block or disclaimer.
fn render_body(payload: &DocumentPayload<'_>) -> String {
    let mut body = String::new();
    for section in payload.filled_sections() {
        if !body.is_empty() {
            body.push_str("\n\n");
        }
        body.push_str(&section.label.to_uppercase());
        body.push('\n');
        match section.content {
            SectionContent::Text(text) => body.push_str(text.trim()),
            SectionContent::Table(table) => render_table(&mut body, table),
        }
    }
    body
}

fn render_table(output: &mut String, table: &ResultTable) {
    if table.column_count() == 0 {
        return;
    }

    push_row(output, table.columns().iter().map(String::as_str));
    output.push_str("\n|");
    for _ in table.columns() {
        output.push_str(" --- |");
    }
    for row in table.rows() {
        output.push('\n');
        push_row(output, row.cells().iter().map(String::as_str));
    }
}

fn push_row<'a>(output: &mut String, cells: impl Iterator<Item = &'a str>) {
    output.push('|');
    for cell in cells {
        let content = cell.replace('\n', " ").replace('|', "/");
        output.push_str(&format!(" {} |", content.trim()));
    }
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([a-z_]+)\s*\}\}").expect("valid placeholder pattern"))
}

/// Fill `{{name}}` placeholders in a text template.
///
/// Known names are the payload fields plus `content` (all sections) and
/// `metadata` (the labelled lines). Unknown placeholders are left as is.
pub fn fill_template(template: &str, payload: &DocumentPayload<'_>) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            match name {
                "title" => payload.title.to_string(),
                "subtitle" => payload.subtitle.to_string(),
                "original_filename" => payload.original_filename.to_string(),
                "translation_date" => payload.translation_date.clone(),
                "model_used" => payload.model_used.to_string(),
                "extraction_method" => payload.extraction_method.to_string(),
                "disclaimer" => payload.disclaimer.to_string(),
                "content" => render_body(payload),
                "metadata" => payload
                    .metadata
                    .iter()
                    .map(|f| format!("{} {}", f.label, f.value))
                    .collect::<Vec<_>>()
                    .join("\n"),
                _ => {
                    log::debug!("Unknown template placeholder: {}", name);
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// Renders a UTF-8 text document, optionally through a `{{placeholder}}`
/// template file.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    /// Create a text renderer.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentRenderer for TextRenderer {
    fn name(&self) -> &str {
        "text"
    }

    fn render(
        &self,
        content: &StructuredContent,
        metadata: &TranslationJobMetadata,
        template: Option<&Path>,
    ) -> Result<Vec<u8>> {
        let output = match template {
            Some(path) => {
                let template = fs::read_to_string(path).map_err(|e| {
                    Error::Render(format!("cannot read template {}: {}", path.display(), e))
                })?;
                fill_template(&template, &DocumentPayload::new(content, metadata, Some(path)))
            }
            None => to_text(content, metadata),
        };
        Ok(output.into_bytes())
    }
}
