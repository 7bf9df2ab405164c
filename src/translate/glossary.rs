//! Pharmaceutical terminology injected into translation prompts.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One English → Russian term pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    /// English term
    pub en: String,
    /// Mandatory Russian translation
    pub ru: String,
}

/// An ordered English → Russian term list.
///
/// Loaded once per process and passed by reference; never mutated while a
/// job runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glossary {
    entries: Vec<GlossaryEntry>,
}

const BUILTIN_TERMS: &[(&str, &str)] = &[
    ("Certificate of Analysis", "Сертификат анализа"),
    ("Batch", "Серия"),
    ("Lot", "Партия"),
    ("Batch size", "Размер серии"),
    ("Manufacturing date", "Дата производства"),
    ("Expiry date", "Срок годности"),
    ("Retest date", "Дата повторного контроля"),
    ("Test", "Испытание"),
    ("Method", "Метод"),
    ("Specification", "Спецификация"),
    ("Acceptance criteria", "Критерии приемлемости"),
    ("Result", "Результат"),
    ("Appearance", "Описание"),
    ("Identification", "Подлинность"),
    ("Assay", "Количественное определение"),
    ("Purity", "Чистота"),
    ("Related substances", "Родственные примеси"),
    ("Impurities", "Примеси"),
    ("Water content", "Содержание воды"),
    ("Loss on drying", "Потеря в массе при высушивании"),
    ("Residue on ignition", "Сульфатная зола"),
    ("Sulphated ash", "Сульфатная зола"),
    ("Heavy metals", "Тяжелые металлы"),
    ("Residual solvents", "Остаточные органические растворители"),
    ("Dissolution", "Растворение"),
    ("Microbial limits", "Микробиологическая чистота"),
    ("Bacterial endotoxins", "Бактериальные эндотоксины"),
    ("Particle size", "Размер частиц"),
    ("Specific optical rotation", "Удельное оптическое вращение"),
    ("Melting point", "Температура плавления"),
    ("Complies", "Соответствует"),
    ("Does not comply", "Не соответствует"),
    ("Conforms", "Соответствует"),
    ("Not detected", "Не обнаружено"),
    ("Not more than", "Не более"),
    ("Not less than", "Не менее"),
    ("White crystalline powder", "Белый кристаллический порошок"),
    ("Storage conditions", "Условия хранения"),
    ("Store below 25 °C", "Хранить при температуре не выше 25 °C"),
    ("Protect from light", "Защищать от света"),
    ("Protect from moisture", "Защищать от влаги"),
    ("Conclusion", "Заключение"),
    ("Released", "Разрешено к выпуску"),
    ("Quality Control", "Контроль качества"),
    ("Quality Assurance", "Обеспечение качества"),
    ("Approved by", "Утверждено"),
    ("Checked by", "Проверено"),
    ("Analysed by", "Анализ выполнил"),
    ("HPLC", "ВЭЖХ"),
    ("GC", "ГХ"),
    ("TLC", "ТСХ"),
    ("IR", "ИК-спектрометрия"),
    ("UV", "УФ-спектрофотометрия"),
    ("Karl Fischer", "Метод К. Фишера"),
    ("Ph. Eur.", "Европейская фармакопея"),
    ("USP", "Фармакопея США"),
    ("In-house", "Внутренний метод"),
];

impl Glossary {
    /// Create an empty glossary.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in pharmaceutical glossary.
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN_TERMS.iter().copied())
    }

    /// Build a glossary from (English, Russian) pairs.
    pub fn from_pairs<E, R>(pairs: impl IntoIterator<Item = (E, R)>) -> Self
    where
        E: Into<String>,
        R: Into<String>,
    {
        let mut glossary = Self::new();
        for (en, ru) in pairs {
            glossary.insert(en, ru);
        }
        glossary
    }

    /// Parse a glossary from JSON.
    ///
    /// Accepts either an object (`{"Assay": "Количественное определение"}`)
    /// or an array of `{"en": ..., "ru": ...}` entries.
    pub fn from_json_str(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum GlossaryFile {
            Map(BTreeMap<String, String>),
            List(Vec<GlossaryEntry>),
        }

        let parsed: GlossaryFile = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid glossary JSON: {}", e)))?;
        Ok(match parsed {
            GlossaryFile::Map(map) => Self::from_pairs(map),
            GlossaryFile::List(entries) => {
                Self::from_pairs(entries.into_iter().map(|e| (e.en, e.ru)))
            }
        })
    }

    /// Load a glossary from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Add or replace a term. Matching on the English side ignores case.
    pub fn insert(&mut self, en: impl Into<String>, ru: impl Into<String>) {
        let en = en.into();
        let ru = ru.into();
        match self
            .entries
            .iter_mut()
            .find(|e| e.en.eq_ignore_ascii_case(&en))
        {
            Some(entry) => entry.ru = ru,
            None => self.entries.push(GlossaryEntry { en, ru }),
        }
    }

    /// Add every entry of `other`, replacing existing terms.
    pub fn extend(&mut self, other: Glossary) {
        for entry in other.entries {
            self.insert(entry.en, entry.ru);
        }
    }

    /// Look up the Russian term for `en`.
    pub fn get(&self, en: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.en.eq_ignore_ascii_case(en))
            .map(|e| e.ru.as_str())
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[GlossaryEntry] {
        &self.entries
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the glossary has no terms.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the term list for a prompt, one `- English → Русский` per line.
    pub fn prompt_section(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("- {} → {}", e.en, e.ru))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
