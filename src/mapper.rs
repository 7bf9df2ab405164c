//! Structured content mapping.
//!
//! Normalizes whatever the translation service returned into a
//! [`StructuredContent`] with exactly one entry per schema section, in
//! schema order. Unknown keys are dropped, missing keys become empty, and
//! anything that is not a JSON object lands in the fallback section as text.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::model::{ResultTable, SectionContent, StructuredContent, Warning, WarningKind};
use crate::schema::{Section, SectionKind, SectionSchema, TEST_RESULT_COLUMNS};
use crate::translate::TranslationResponse;

/// Column used when unstructured text is placed in a table section.
pub const TEXT_COLUMN: &str = "text";

/// Section receiving unstructured translation output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackSection {
    /// `notes`
    #[default]
    Notes,
    /// `test_results`
    TestResults,
}

impl FallbackSection {
    /// Schema key of the section.
    pub fn key(&self) -> &'static str {
        match self {
            FallbackSection::Notes => "notes",
            FallbackSection::TestResults => "test_results",
        }
    }
}

/// Options for the mapper.
#[derive(Debug, Clone, Default)]
pub struct MapperOptions {
    /// Where plain text goes
    pub fallback: FallbackSection,
}

impl MapperOptions {
    /// Create new mapper options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback section.
    pub fn with_fallback(mut self, fallback: FallbackSection) -> Self {
        self.fallback = fallback;
        self
    }
}

/// Mapper output.
#[derive(Debug, Clone)]
pub struct MappedContent {
    /// Schema-shaped content
    pub content: StructuredContent,

    /// Schema mismatches found while mapping
    pub warnings: Vec<Warning>,

    /// Response keys outside the schema, in response order
    pub dropped_keys: Vec<String>,
}

impl MappedContent {
    /// Whether a structured response had to fall back to plain text.
    pub fn is_schema_mismatch(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| w.kind == WarningKind::SchemaMismatch)
    }
}

/// Maps translation responses onto a section schema.
#[derive(Debug, Clone)]
pub struct ContentMapper {
    schema: SectionSchema,
    options: MapperOptions,
}

impl ContentMapper {
    /// Create a mapper.
    pub fn new(schema: SectionSchema, options: MapperOptions) -> Self {
        Self { schema, options }
    }

    /// The schema mapped onto.
    pub fn schema(&self) -> &SectionSchema {
        &self.schema
    }

    /// Map any translation response.
    pub fn map(&self, response: &TranslationResponse) -> MappedContent {
        match response {
            TranslationResponse::PlainText(text) => self.map_text(text),
            TranslationResponse::Structured(raw) => self.map_raw(raw),
            TranslationResponse::Json(value) => self.map_value(value),
        }
    }

    /// Map raw model output expected to hold a JSON object, possibly wrapped
    /// in a markdown code fence.
    pub fn map_raw(&self, raw: &str) -> MappedContent {
        let body = strip_code_fence(raw);
        match serde_json::from_str::<Value>(body) {
            Ok(value) => self.map_value(&value),
            Err(e) => {
                log::warn!("Translation response is not valid JSON: {}", e);
                self.mismatch(raw, format!("response is not valid JSON ({})", e))
            }
        }
    }

    /// Map a decoded JSON payload.
    pub fn map_value(&self, value: &Value) -> MappedContent {
        match value {
            Value::Object(object) => self.map_object(object),
            other => {
                let kind = json_kind(other);
                log::warn!("Translation response is a JSON {}, not an object", kind);
                let text = match other {
                    Value::String(s) => s.clone(),
                    _ => other.to_string(),
                };
                self.mismatch(&text, format!("response is a JSON {}, not an object", kind))
            }
        }
    }

    /// Place plain text in the fallback section; every other section is empty.
    pub fn map_text(&self, text: &str) -> MappedContent {
        let mut content = StructuredContent::empty(&self.schema);
        let key = self.options.fallback.key();
        if let Some(section) = self.schema.get(key) {
            content.set(key, text_to_section(section, text.trim()));
        }
        MappedContent {
            content,
            warnings: Vec::new(),
            dropped_keys: Vec::new(),
        }
    }

    fn mismatch(&self, text: &str, reason: String) -> MappedContent {
        let mut mapped = self.map_text(text);
        mapped.warnings.push(Warning::new(
            WarningKind::SchemaMismatch,
            format!(
                "{}; placed in \"{}\" as text",
                reason,
                self.options.fallback.key()
            ),
        ));
        mapped
    }

    fn map_object(&self, object: &Map<String, Value>) -> MappedContent {
        let mut content = StructuredContent::empty(&self.schema);
        for section in self.schema.sections() {
            if let Some(value) = object.get(section.key) {
                content.set(section.key, value_to_section(section, value));
            }
        }

        let dropped_keys: Vec<String> = object
            .keys()
            .filter(|k| !self.schema.contains(k))
            .cloned()
            .collect();
        if !dropped_keys.is_empty() {
            log::debug!("Dropped keys outside the schema: {:?}", dropped_keys);
        }

        MappedContent {
            content,
            warnings: Vec::new(),
            dropped_keys,
        }
    }
}

impl Default for ContentMapper {
    fn default() -> Self {
        Self::new(SectionSchema::coa(), MapperOptions::default())
    }
}

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?\s*```\s*$")
            .expect("valid code fence pattern")
    })
}

/// Remove a surrounding markdown code fence, if present.
pub fn strip_code_fence(raw: &str) -> &str {
    match fence_regex().captures(raw).and_then(|c| c.get(1)) {
        Some(body) => body.as_str(),
        None => raw.trim(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Render a scalar as a cell or text value.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(" | "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}: {}", k, scalar_to_string(v)))
            .collect::<Vec<_>>()
            .join("; "),
    }
}

fn value_to_section(section: &Section, value: &Value) -> SectionContent {
    match section.kind {
        SectionKind::Text => SectionContent::Text(value_to_text(value)),
        SectionKind::Table => SectionContent::Table(value_to_table(value)),
    }
}

fn text_to_section(section: &Section, text: &str) -> SectionContent {
    match section.kind {
        SectionKind::Text => SectionContent::Text(text.to_string()),
        SectionKind::Table => SectionContent::Table(text_to_table(text)),
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}: {}", k, scalar_to_string(v)))
            .collect::<Vec<_>>()
            .join("\n"),
        other => scalar_to_string(other),
    }
}

fn value_to_table(value: &Value) -> ResultTable {
    match value {
        Value::Null => ResultTable::default(),
        Value::String(s) => text_to_table(s),
        Value::Object(map) => ResultTable::from_records([object_record(map)]),
        Value::Array(items) => array_to_table(items),
        other => text_to_table(&scalar_to_string(other)),
    }
}

fn array_to_table(items: &[Value]) -> ResultTable {
    // Array of arrays: the first row is the header.
    if matches!(items.first(), Some(Value::Array(_))) {
        let grid = items.iter().map(|row| match row {
            Value::Array(cells) => cells.iter().map(scalar_to_string).collect::<Vec<_>>(),
            other => vec![scalar_to_string(other)],
        });
        return ResultTable::from_grid(grid);
    }

    // Array of strings that form a pipe table.
    if !items.is_empty() && items.iter().all(Value::is_string) {
        let joined = items
            .iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join("\n");
        if let Some(table) = ResultTable::from_pipe_text(&joined) {
            return table;
        }
    }

    let records: Vec<Vec<(String, String)>> = items
        .iter()
        .map(|item| match item {
            Value::Object(map) => object_record(map),
            other => vec![(TEXT_COLUMN.to_string(), scalar_to_string(other))],
        })
        .collect();

    // Requested columns lead in display order; others follow as first seen.
    let known = TEST_RESULT_COLUMNS
        .iter()
        .filter(|column| records.iter().flatten().any(|(key, _)| key == *column));
    let mut table = ResultTable::new(known.copied());
    for record in records {
        table.push_record(record);
    }
    table
}

fn object_record(map: &Map<String, Value>) -> Vec<(String, String)> {
    map.iter()
        .map(|(k, v)| (k.clone(), scalar_to_string(v)))
        .collect()
}

fn text_to_table(text: &str) -> ResultTable {
    if let Some(table) = ResultTable::from_pipe_text(text) {
        return table;
    }
    let mut table = ResultTable::new([TEXT_COLUMN]);
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        table.push_record([(TEXT_COLUMN, line)]);
    }
    table
}
