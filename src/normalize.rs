//! Cleanup applied to accepted page text.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Options for text normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Replace typographic ligatures (fi, fl, ...) with plain letters
    pub fix_ligatures: bool,

    /// Remove the Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,

    /// Strip trailing spaces and tabs from every line
    pub trim_trailing_whitespace: bool,

    /// Maximum consecutive newlines (0 = unlimited)
    pub max_consecutive_newlines: u8,
}

impl NormalizeOptions {
    /// Leave text untouched.
    pub fn none() -> Self {
        Self {
            normalize_unicode: false,
            fix_ligatures: false,
            remove_replacement_char: false,
            trim_trailing_whitespace: false,
            max_consecutive_newlines: 0,
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: true,
            remove_replacement_char: true,
            trim_trailing_whitespace: true,
            max_consecutive_newlines: 2,
        }
    }
}

const LIGATURES: [(&str, &str); 7] = [
    ("\u{FB00}", "ff"),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
    ("\u{FB03}", "ffi"),
    ("\u{FB04}", "ffl"),
    ("\u{FB05}", "st"),
    ("\u{FB06}", "st"),
];

fn trailing_ws_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)[ \t]+$").expect("valid trailing whitespace pattern"))
}

/// Normalize page text. The result has no leading or trailing blank lines.
pub fn normalize_text(text: &str, options: &NormalizeOptions) -> String {
    let mut result = if options.normalize_unicode {
        text.nfc().collect::<String>()
    } else {
        text.to_string()
    };

    if options.fix_ligatures {
        for (ligature, replacement) in LIGATURES {
            result = result.replace(ligature, replacement);
        }
    }

    if options.remove_replacement_char {
        result = result.replace('\u{FFFD}', "");
    }

    result = result.replace("\r\n", "\n").replace('\r', "\n");

    if options.trim_trailing_whitespace {
        result = trailing_ws_regex().replace_all(&result, "").into_owned();
    }

    if options.max_consecutive_newlines > 0 {
        result = limit_newlines(&result, options.max_consecutive_newlines as usize);
    }

    result.trim_matches('\n').to_string()
}

fn limit_newlines(text: &str, max: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0;
    for ch in text.chars() {
        if ch == '\n' {
            run += 1;
            if run > max {
                continue;
            }
        } else {
            run = 0;
        }
        out.push(ch);
    }
    out
}
