//! The fixed section schema of a translated Certificate of Analysis.
//!
//! Key order is a public contract: translation prompts list keys in this
//! order, the mapper emits sections in this order, and renderers lay out the
//! document in this order.

use serde::Serialize;

/// Shape of a section's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// A single block of text
    Text,
    /// Rows of column-name → value cells
    Table,
}

/// One section of the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Section {
    /// JSON key used in translation payloads
    pub key: &'static str,
    /// Russian heading shown in the rendered document
    pub label: &'static str,
    /// What belongs in the section (fed to the translation prompt)
    pub description: &'static str,
    /// Content shape
    pub kind: SectionKind,
}

impl Section {
    /// Check if the section holds a table.
    pub fn is_table(&self) -> bool {
        self.kind == SectionKind::Table
    }
}

/// The ten COA sections, in document order.
pub const COA_SECTIONS: [Section; 10] = [
    Section {
        key: "document_title",
        label: "Наименование документа",
        description: "The document title, e.g. 'Certificate of Analysis'",
        kind: SectionKind::Text,
    },
    Section {
        key: "company_info",
        label: "Информация о компании",
        description: "Manufacturer/supplier company name, address, logo text, contact info",
        kind: SectionKind::Text,
    },
    Section {
        key: "product_name",
        label: "Наименование продукта",
        description: "Product name, trade name, INN/generic name",
        kind: SectionKind::Text,
    },
    Section {
        key: "product_details",
        label: "Сведения о продукте",
        description: "CAS number, molecular formula, molecular weight, structural description, \
                      grade, pharmacopoeia reference, dosage form",
        kind: SectionKind::Text,
    },
    Section {
        key: "batch_info",
        label: "Информация о серии",
        description: "Batch/Lot number, manufacturing date, expiry/retest date, batch size, \
                      package configuration",
        kind: SectionKind::Text,
    },
    Section {
        key: "storage_conditions",
        label: "Условия хранения",
        description: "Storage conditions, temperature requirements, special precautions \
                      (protect from light, moisture, etc.)",
        kind: SectionKind::Text,
    },
    Section {
        key: "test_results",
        label: "Результаты испытаний",
        description: "The main analytical results table. Include ALL tests: appearance, \
                      identification, assay, purity, impurities, water content, residual \
                      solvents, heavy metals, dissolution, microbial limits, endotoxins, etc. \
                      Return a list of row objects with the keys \"parameter\", \"method\", \
                      \"specification\" and \"result\".",
        kind: SectionKind::Table,
    },
    Section {
        key: "conclusion",
        label: "Заключение",
        description: "Overall conclusion/disposition statement, e.g. 'The product complies \
                      with the specification', release decision",
        kind: SectionKind::Text,
    },
    Section {
        key: "signatures",
        label: "Подписи",
        description: "Authorized signatory names, titles, QC/QA approval, dates of \
                      approval/release",
        kind: SectionKind::Text,
    },
    Section {
        key: "notes",
        label: "Примечания",
        description: "Any additional notes, footnotes, legends, abbreviation explanations, \
                      or supplementary information",
        kind: SectionKind::Text,
    },
];

/// Column names requested for the `test_results` table, in display order.
pub const TEST_RESULT_COLUMNS: [&str; 4] = ["parameter", "method", "specification", "result"];

/// An ordered, immutable list of sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSchema {
    sections: &'static [Section],
}

impl SectionSchema {
    /// Create a schema over a static section list.
    pub const fn new(sections: &'static [Section]) -> Self {
        Self { sections }
    }

    /// The Certificate-of-Analysis schema.
    pub const fn coa() -> Self {
        Self::new(&COA_SECTIONS)
    }

    /// Sections in order.
    pub fn sections(&self) -> &'static [Section] {
        self.sections
    }

    /// Section keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        self.sections.iter().map(|s| s.key)
    }

    /// Look up a section by key.
    pub fn get(&self, key: &str) -> Option<&'static Section> {
        self.sections.iter().find(|s| s.key == key)
    }

    /// Check if the schema defines `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Check if the schema has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Describe each section for a translation prompt, one line per section.
    pub fn prompt_descriptions(&self) -> String {
        self.sections
            .iter()
            .map(|s| {
                let hint = match s.kind {
                    SectionKind::Table => "TABLE (list of row objects)",
                    SectionKind::Text => "TEXT (string)",
                };
                format!("  \"{}\" ({}) [{}]: {}", s.key, s.label, hint, s.description)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for SectionSchema {
    fn default() -> Self {
        Self::coa()
    }
}
