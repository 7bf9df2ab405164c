//! Structured, schema-shaped document content.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::ResultTable;
use crate::schema::{Section, SectionSchema};

/// Content of one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionContent {
    /// Free text
    Text(String),
    /// Tabular rows
    Table(ResultTable),
}

impl SectionContent {
    /// Get the text, if this is a text section.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SectionContent::Text(text) => Some(text),
            SectionContent::Table(_) => None,
        }
    }

    /// Get the table, if this is a table section.
    pub fn as_table(&self) -> Option<&ResultTable> {
        match self {
            SectionContent::Table(table) => Some(table),
            SectionContent::Text(_) => None,
        }
    }

    /// Check if there is nothing to show.
    pub fn is_empty(&self) -> bool {
        match self {
            SectionContent::Text(text) => text.trim().is_empty(),
            SectionContent::Table(table) => table.is_empty(),
        }
    }

    /// Plain text rendition.
    pub fn plain_text(&self) -> String {
        match self {
            SectionContent::Text(text) => text.clone(),
            SectionContent::Table(table) => table.plain_text(),
        }
    }
}

impl Serialize for SectionContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SectionContent::Text(text) => serializer.serialize_str(text),
            SectionContent::Table(table) => table.serialize(serializer),
        }
    }
}

/// A section definition paired with its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionEntry {
    /// Schema section
    pub section: &'static Section,

    /// Mapped content
    pub content: SectionContent,
}

/// Translated content laid out by a [`SectionSchema`].
///
/// Holds exactly one entry per schema key, in schema order. Sections that
/// the translation left out are present with empty content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredContent {
    entries: Vec<SectionEntry>,
}

impl StructuredContent {
    /// Create content with every section empty.
    pub fn empty(schema: &SectionSchema) -> Self {
        let entries = schema
            .sections()
            .iter()
            .map(|section| SectionEntry {
                section,
                content: if section.is_table() {
                    SectionContent::Table(ResultTable::default())
                } else {
                    SectionContent::Text(String::new())
                },
            })
            .collect();
        Self { entries }
    }

    /// Replace the content of `key`. Returns false for keys outside the schema.
    pub fn set(&mut self, key: &str, content: SectionContent) -> bool {
        match self.entries.iter_mut().find(|e| e.section.key == key) {
            Some(entry) => {
                entry.content = content;
                true
            }
            None => false,
        }
    }

    /// Content of one section.
    pub fn get(&self, key: &str) -> Option<&SectionContent> {
        self.entries
            .iter()
            .find(|e| e.section.key == key)
            .map(|e| &e.content)
    }

    /// Text of a text section ("" when empty, `None` for unknown keys or tables).
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(SectionContent::as_text)
    }

    /// Table of a table section.
    pub fn table(&self, key: &str) -> Option<&ResultTable> {
        self.get(key).and_then(SectionContent::as_table)
    }

    /// Entries in schema order.
    pub fn entries(&self) -> &[SectionEntry] {
        &self.entries
    }

    /// Keys in schema order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.section.key)
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no sections.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of sections with something in them.
    pub fn filled_sections(&self) -> usize {
        self.entries.iter().filter(|e| !e.content.is_empty()).count()
    }

    /// Human-readable preview: a `[Label]` heading per non-empty section,
    /// tables as pipe-separated rows.
    pub fn preview(&self) -> String {
        let mut out = String::new();
        for entry in self.entries.iter().filter(|e| !e.content.is_empty()) {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push('[');
            out.push_str(entry.section.label);
            out.push_str("]\n");
            out.push_str(entry.content.plain_text().trim_end());
        }
        out
    }
}

/// Serializes as a JSON object with keys in schema order.
impl Serialize for StructuredContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(entry.section.key, &entry.content)?;
        }
        map.end()
    }
}
