//! Schema-shaped document payload shared by the renderers.

use std::path::Path;

use serde::Serialize;

use crate::model::{SectionContent, StructuredContent, TranslationJobMetadata};
use crate::schema::SectionKind;

/// Document title.
pub const TITLE: &str = "СЕРТИФИКАТ АНАЛИЗА";

/// Document subtitle.
pub const SUBTITLE: &str = "Перевод на русский язык";

/// Label for the source file name.
pub const LABEL_ORIGINAL_FILE: &str = "Исходный файл:";

/// Label for the translation date.
pub const LABEL_TRANSLATION_DATE: &str = "Дата перевода:";

/// Label for the model identifier.
pub const LABEL_MODEL: &str = "Модель перевода:";

/// Label for the extraction method.
pub const LABEL_EXTRACTION_METHOD: &str = "Метод извлечения:";

/// Closing note on machine translation.
pub const DISCLAIMER: &str = "Данный документ является переводом оригинального Сертификата анализа.\n\
Перевод выполнен с использованием искусственного интеллекта с применением\n\
фармацевтического глоссария. Рекомендуется верификация специалистом.";

/// One labelled metadata line.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataField {
    /// Russian label, with trailing colon
    pub label: &'static str,

    /// Value
    pub value: String,
}

/// One section as handed to a document builder.
#[derive(Debug, Clone, Serialize)]
pub struct PayloadSection<'a> {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: SectionKind,
    pub content: &'a SectionContent,
}

/// Everything a document builder needs, in render order.
///
/// The field names double as placeholder names for text templates.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentPayload<'a> {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub original_filename: &'a str,
    pub translation_date: String,
    pub model_used: &'a str,
    pub extraction_method: &'static str,
    pub metadata: Vec<MetadataField>,
    pub sections: Vec<PayloadSection<'a>>,
    pub disclaimer: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl<'a> DocumentPayload<'a> {
    /// Build the payload for one job.
    pub fn new(
        content: &'a StructuredContent,
        metadata: &'a TranslationJobMetadata,
        template: Option<&Path>,
    ) -> Self {
        let translation_date = metadata.translation_date();
        let extraction_method = metadata.extraction_method.as_str();

        let fields = vec![
            MetadataField {
                label: LABEL_ORIGINAL_FILE,
                value: metadata.original_filename.clone(),
            },
            MetadataField {
                label: LABEL_TRANSLATION_DATE,
                value: translation_date.clone(),
            },
            MetadataField {
                label: LABEL_MODEL,
                value: metadata.model.clone(),
            },
            MetadataField {
                label: LABEL_EXTRACTION_METHOD,
                value: extraction_method.to_string(),
            },
        ];

        let sections = content
            .entries()
            .iter()
            .map(|entry| PayloadSection {
                key: entry.section.key,
                label: entry.section.label,
                kind: entry.section.kind,
                content: &entry.content,
            })
            .collect();

        Self {
            title: TITLE,
            subtitle: SUBTITLE,
            original_filename: &metadata.original_filename,
            translation_date,
            model_used: &metadata.model,
            extraction_method,
            metadata: fields,
            sections,
            disclaimer: DISCLAIMER,
            template: template.map(|p| p.display().to_string()),
        }
    }

    /// Sections with something in them.
    pub fn filled_sections(&self) -> impl Iterator<Item = &PayloadSection<'a>> {
        self.sections.iter().filter(|s| !s.content.is_empty())
    }
}
