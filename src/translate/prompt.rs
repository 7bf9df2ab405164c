//! Prompt construction and chunking.

use crate::schema::{SectionSchema, TEST_RESULT_COLUMNS};

use super::{Glossary, TranslationMode};

/// Maximum characters per plain-mode chunk.
pub const MAX_CHUNK_CHARS: usize = 6000;

/// Sampling temperature for every request.
pub const TEMPERATURE: f32 = 0.1;

/// Output token budget for structured requests.
pub const MAX_TOKENS_STRUCTURED: u32 = 4096;

const COMMON_RULES: &str = "\
Translation rules (apply to ALL output):
1. Translate ALL English text to Russian.
2. Keep numerical values, chemical formulas, CAS numbers, and catalog numbers UNCHANGED.
3. Keep Latin scientific names in their original Latin form.
4. Use the pharmaceutical glossary below for standard terminology; these translations are mandatory.
5. Maintain standard Russian pharmaceutical terminology consistent with the Russian Pharmacopoeia (Государственная Фармакопея).
6. Keep internationally recognised abbreviations (pH, HPLC, GC, etc.) but give the Russian equivalent from the glossary in parentheses where it first appears.
7. Do NOT add explanations, comments, or notes of your own. Translate only.";

/// Build the system prompt for `mode`.
pub fn system_prompt(mode: TranslationMode, glossary: &Glossary, schema: &SectionSchema) -> String {
    let mut prompt = String::from(
        "You are a professional pharmaceutical translator specialising in Certificate \
         of Analysis (COA) documents, English → Russian.\n\n",
    );
    prompt.push_str(COMMON_RULES);
    prompt.push_str("\n\n");

    if !glossary.is_empty() {
        prompt.push_str(
            "MANDATORY PHARMACEUTICAL GLOSSARY (English → Russian). Always prefer these \
             over any generic translation:\n",
        );
        prompt.push_str(&glossary.prompt_section());
        prompt.push_str("\n\n");
    }

    match mode {
        TranslationMode::Structured => {
            prompt.push_str(
                "OUTPUT FORMAT: return valid JSON only (no markdown fences, no commentary) \
                 with the following keys. Every key must be present; use an empty string \"\" \
                 or an empty list [] if the source document has no information for that \
                 section.\n\nSection definitions:\n",
            );
            prompt.push_str(&schema.prompt_descriptions());
            prompt.push_str("\n\nJSON schema:\n{\n");
            prompt.push_str(&json_key_lines(schema));
            prompt.push_str("\n}\n\n");
            prompt.push_str(&format!(
                "For table sections return a JSON array of row objects using the keys {}. \
                 Example:\n  \"test_results\": [\n    {{\"parameter\": \"Внешний вид\", \
                 \"method\": \"Визуальный\", \"specification\": \"Белый порошок\", \
                 \"result\": \"Соответствует\"}}\n  ]\n\nFor all other keys return a plain \
                 Russian-language string.",
                TEST_RESULT_COLUMNS
                    .iter()
                    .map(|c| format!("\"{}\"", c))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        TranslationMode::Plain => {
            prompt.push_str(
                "Output ONLY the translated text: no JSON, no markdown fences, no commentary.\n\
                 Preserve the original document layout as closely as possible.\n\
                 Preserve any table structure using | as the column delimiter.",
            );
        }
    }
    prompt
}

fn json_key_lines(schema: &SectionSchema) -> String {
    schema
        .sections()
        .iter()
        .map(|s| {
            if s.is_table() {
                format!("  \"{}\": [...]", s.key)
            } else {
                format!("  \"{}\": \"...\"", s.key)
            }
        })
        .collect::<Vec<_>>()
        .join(",\n")
}

/// Build the user message carrying `text`.
pub fn user_message(mode: TranslationMode, text: &str) -> String {
    match mode {
        TranslationMode::Structured => format!(
            "Below is the full extracted text of a pharmaceutical Certificate of Analysis \
             (COA). Translate it to Russian and map the content into the predefined JSON \
             structure described in your instructions. Return ONLY valid JSON.\n\n{}",
            text
        ),
        TranslationMode::Plain => format!(
            "Translate the following pharmaceutical COA text from English to Russian. \
             Output ONLY the translation, nothing else.\n\n{}",
            text
        ),
    }
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Splits on blank lines first, then on line breaks inside oversized
/// paragraphs, and finally inside oversized lines.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n") {
        if char_len(&current) + char_len(paragraph) + 2 <= max_chars {
            current.push_str(paragraph);
            current.push_str("\n\n");
            continue;
        }

        flush(&mut current, &mut chunks);
        if char_len(paragraph) + 2 <= max_chars {
            current.push_str(paragraph);
            current.push_str("\n\n");
            continue;
        }

        for line in paragraph.split('\n') {
            if char_len(&current) + char_len(line) + 1 > max_chars {
                flush(&mut current, &mut chunks);
            }
            if char_len(line) + 1 > max_chars {
                let chars: Vec<char> = line.chars().collect();
                for piece in chars.chunks(max_chars) {
                    chunks.push(piece.iter().collect());
                }
                continue;
            }
            current.push_str(line);
            current.push('\n');
        }
    }
    flush(&mut current, &mut chunks);
    chunks
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn flush(current: &mut String, chunks: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(chunk_text("Batch 123", MAX_CHUNK_CHARS), vec!["Batch 123"]);
    }

    #[test]
    fn test_chunks_respect_paragraphs_and_limit() {
        let paragraph = "a".repeat(40);
        let text = vec![paragraph.as_str(); 5].join("\n\n");
        let chunks = chunk_text(&text, 100);
        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
        assert!(chunks.iter().all(|c| c.split("\n\n").all(|p| p == paragraph)));
    }

    #[test]
    fn test_oversized_paragraph_splits_on_lines() {
        let line = "b".repeat(30);
        let text = vec![line.as_str(); 10].join("\n");
        let chunks = chunk_text(&text, 70);
        assert!(chunks.iter().all(|c| c.chars().count() <= 70));
        let total: usize = chunks.iter().map(|c| c.matches('b').count()).sum();
        assert_eq!(total, 300);
    }

    #[test]
    fn test_oversized_line_is_cut() {
        let text = "c".repeat(25);
        let chunks = chunk_text(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2], "ccccc");
    }

    #[test]
    fn test_structured_prompt_lists_keys_in_order() {
        let prompt = system_prompt(
            TranslationMode::Structured,
            &Glossary::from_pairs([("Assay", "Количественное определение")]),
            &SectionSchema::coa(),
        );
        assert!(prompt.contains("- Assay → Количественное определение"));
        let first = prompt.find("\"document_title\": \"...\"").unwrap();
        let table = prompt.find("\"test_results\": [...]").unwrap();
        let last = prompt.find("\"notes\": \"...\"").unwrap();
        assert!(first < table && table < last);
    }

    #[test]
    fn test_plain_prompt_has_no_json_schema() {
        let prompt = system_prompt(TranslationMode::Plain, &Glossary::new(), &SectionSchema::coa());
        assert!(prompt.contains("column delimiter"));
        assert!(!prompt.contains("JSON schema"));
        assert!(!prompt.contains("GLOSSARY"));
    }
}
