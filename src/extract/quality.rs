//! Per-page quality gate.

use serde::Serialize;

/// Minimum number of alphanumeric characters for a page to be accepted.
pub const MIN_ALNUM_CHARS: usize = 10;

/// Count alphanumeric characters (any script).
pub fn alnum_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_alphanumeric()).count()
}

/// Acceptance decision for one page's candidate text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualityVerdict {
    /// Whether the text passed the gate
    pub accepted: bool,

    /// Alphanumeric characters found
    pub alnum_count: usize,
}

impl QualityVerdict {
    /// Judge `text` against the default threshold.
    pub fn assess(text: &str) -> Self {
        Self::assess_with(text, MIN_ALNUM_CHARS)
    }

    /// Judge `text` against a custom threshold.
    pub fn assess_with(text: &str, min_alnum: usize) -> Self {
        let count = alnum_count(text);
        Self {
            accepted: count >= min_alnum,
            alnum_count: count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(QualityVerdict::assess("Batch 12345").accepted);
        let verdict = QualityVerdict::assess("Batch 123");
        assert!(!verdict.accepted);
        assert_eq!(verdict.alnum_count, 8);
    }

    #[test]
    fn test_punctuation_does_not_count() {
        let verdict = QualityVerdict::assess("|||---:::...,,,;;;   \n\n");
        assert_eq!(verdict.alnum_count, 0);
        assert!(!verdict.accepted);
    }

    #[test]
    fn test_non_latin_letters_count() {
        assert_eq!(alnum_count("Серия №5"), 6);
    }
}
