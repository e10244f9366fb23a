//! Language utilities for ISO language code handling
//!
//! This module validates and normalizes ISO 639-1 (2-letter) and ISO 639-2
//! (3-letter) language codes, and maps a target language to the script
//! conventions used when displaying translated text.

use anyhow::{Result, anyhow};
use isolang::Language;

/// ISO 639-2/B codes that differ from their ISO 639-2/T form
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    PART2B_TO_PART2T
        .iter()
        .find(|(part2b, _)| *part2b == code)
        .map(|(_, part2t)| *part2t)
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = part2b_to_part2t(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let part2t = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&part2t)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", part2t))?;

    Ok(lang.to_639_1().map(str::to_string).unwrap_or(part2t))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(normalized1), Ok(normalized2)) => normalized1 == normalized2,
        _ => false,
    }
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Horizontal writing direction of a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

const ARABIC_INDIC_DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];
const EXTENDED_ARABIC_INDIC_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];
const ARABIC_PUNCTUATION: &[(char, char)] = &[('?', '؟'), (';', '؛'), (',', '،')];

/// Display conventions of a target language's script
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptProfile {
    /// Writing direction, drives shaping and alignment
    pub direction: TextDirection,
    /// Native glyphs for the digits 0-9, if the script has them
    pub digits: Option<[char; 10]>,
    /// ASCII punctuation and its native replacement
    pub punctuation: &'static [(char, char)],
}

impl ScriptProfile {
    /// Profile for scripts that need no post-processing
    pub fn plain() -> Self {
        Self {
            direction: TextDirection::LeftToRight,
            digits: None,
            punctuation: &[],
        }
    }

    /// Look up the profile for a target language code.
    ///
    /// Unknown or invalid codes get the plain left-to-right profile.
    pub fn for_language(code: &str) -> Self {
        let Ok(part2t) = normalize_to_part2t(code) else {
            return Self::plain();
        };

        match part2t.as_str() {
            "ara" => Self {
                direction: TextDirection::RightToLeft,
                digits: Some(ARABIC_INDIC_DIGITS),
                punctuation: ARABIC_PUNCTUATION,
            },
            "fas" | "urd" | "pus" => Self {
                direction: TextDirection::RightToLeft,
                digits: Some(EXTENDED_ARABIC_INDIC_DIGITS),
                punctuation: ARABIC_PUNCTUATION,
            },
            "heb" | "yid" => Self {
                direction: TextDirection::RightToLeft,
                digits: None,
                punctuation: &[],
            },
            _ => Self::plain(),
        }
    }

    pub fn is_rtl(&self) -> bool {
        self.direction == TextDirection::RightToLeft
    }

    /// Whether any cosmetic normalization applies
    pub fn has_cosmetics(&self) -> bool {
        self.digits.is_some() || !self.punctuation.is_empty()
    }
}
