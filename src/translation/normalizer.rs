/*!
 * Text normalization for extracted page text.
 *
 * `clean` strips extraction noise down to a conservative allow-set and
 * `is_excluded_notation` recognizes tokens that are not prose (game move
 * codes, castling, scores, list markers) and must not be sent for translation.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters outside letters, digits, whitespace and `- . , ? !`
static DISALLOWED_CHARS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\w\s\-.,?!]").expect("Invalid disallowed chars regex")
});

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex")
});

static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+$").expect("Invalid numeric regex")
});

/// Notation patterns; any match excludes the text from translation
static NOTATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Move codes: e4, Nf3, exd5, Qh5#, R1a3+
        r"^[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8][+#]?$",
        // Castling
        r"^O-O(-O)?[+#]?$",
        // Scores: 1-0, 0-1, 1/2-1/2
        r"^[01](/2)?-[01](/2)?$",
        // Numbered move or list markers: "12." "3. e4"
        r"^\d{1,4}\.",
        // Draw symbol
        r"^½-½",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid notation regex"))
    .collect()
});

/// Default minimum length of cleaned text worth translating
pub const DEFAULT_MIN_LENGTH: usize = 3;

/// Cleans block text and filters out non-prose tokens
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    min_length: usize,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LENGTH)
    }
}

impl TextNormalizer {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Clean raw text.
    ///
    /// Disallowed characters become spaces, whitespace runs collapse to one
    /// space, ends are trimmed, and purely numeric results become empty.
    /// The result is a fixed point: `clean(clean(x)) == clean(x)`.
    pub fn clean(&self, text: &str) -> String {
        let replaced = DISALLOWED_CHARS_REGEX.replace_all(text, " ");
        let collapsed = WHITESPACE_REGEX.replace_all(&replaced, " ");
        let trimmed = collapsed.trim();

        if NUMERIC_REGEX.is_match(trimmed) {
            String::new()
        } else {
            trimmed.to_string()
        }
    }

    /// Whether the text is domain notation rather than prose.
    ///
    /// Both the trimmed raw text and its cleaned form are checked, since
    /// cleaning removes `/`, `+`, `#` and `½` that some notations rely on.
    pub fn is_excluded_notation(&self, text: &str) -> bool {
        let raw = text.trim();
        let cleaned = self.clean(text);
        NOTATION_PATTERNS
            .iter()
            .any(|pattern| pattern.is_match(raw) || (!cleaned.is_empty() && pattern.is_match(&cleaned)))
    }

    /// Clean the text and decide whether it should be translated.
    ///
    /// Returns the cleaned text, or `None` when it is shorter than the
    /// minimum length or is excluded notation.
    pub fn prepare(&self, text: &str) -> Option<String> {
        if self.is_excluded_notation(text) {
            return None;
        }
        let cleaned = self.clean(text);
        if cleaned.chars().count() < self.min_length {
            return None;
        }
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_should_replace_symbols_and_collapse_whitespace() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.clean("  Hello,\t\tworld! (draft) "), "Hello, world! draft");
        assert_eq!(normalizer.clean("a*b&c"), "a b c");
        assert_eq!(normalizer.clean("well-known. Right?"), "well-known. Right?");
    }

    #[test]
    fn test_clean_with_numeric_text_should_return_empty() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.clean("12345"), "");
        assert_eq!(normalizer.clean(" [42] "), "");
        assert_eq!(normalizer.clean("12 34"), "12 34");
    }

    #[test]
    fn test_clean_should_keep_non_latin_letters() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.clean("Ünïcödé  текст"), "Ünïcödé текст");
    }

    #[test]
    fn test_clean_should_be_idempotent() {
        let normalizer = TextNormalizer::default();
        let samples = [
            "", "   ", "123", "[123]", "1 2 3", "a\u{a0}\u{a0}b", "Nf3+", "½-½",
            "Hello --- world ?!", "tab\tsep\nline", "(((x)))", "__init__", "e.g., 3.14",
        ];
        for sample in samples {
            let once = normalizer.clean(sample);
            assert_eq!(normalizer.clean(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_is_excluded_notation_with_notation_samples() {
        let normalizer = TextNormalizer::default();
        for sample in ["Nf3", "e4", "exd5", "Qh5#", "Rxe8+", "O-O", "O-O-O", "1-0", "1/2-1/2", "½-½", "12.", "3. e4"] {
            assert!(normalizer.is_excluded_notation(sample), "{} should be excluded", sample);
        }
    }

    #[test]
    fn test_is_excluded_notation_should_cover_every_game_score() {
        let normalizer = TextNormalizer::default();
        for score in ["1-0", "0-1", "1/2-1/2"] {
            assert!(normalizer.is_excluded_notation(score), "{} should be excluded", score);
            assert_eq!(normalizer.prepare(score), None);
        }
        assert!(!normalizer.is_excluded_notation("1/3-2/3"));
    }

    #[test]
    fn test_is_excluded_notation_with_prose_should_not_exclude() {
        let normalizer = TextNormalizer::default();
        for sample in ["Move your king", "The opening", "Bad bishop", "White wins a pawn."] {
            assert!(!normalizer.is_excluded_notation(sample), "{} should not be excluded", sample);
        }
    }

    #[test]
    fn test_prepare_should_drop_short_and_notation_text() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.prepare("ok"), None);
        assert_eq!(normalizer.prepare("Nf3"), None);
        assert_eq!(normalizer.prepare("  7 "), None);
        assert_eq!(normalizer.prepare("Move your king!"), Some("Move your king!".to_string()));
    }
}
