/*!
 * Script post-processing for translated text.
 *
 * Translated text for right-to-left targets is stored in logical order.
 * Before it can be drawn with a plain left-to-right text operator it has to
 * be shaped (contextual letter forms) and reordered into visual order. On
 * top of the shaper output, the target script's display conventions are
 * applied: native digits, native punctuation and punctuation spacing.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::panic::{self, AssertUnwindSafe};

use ar_reshaper::{ArabicReshaper, ReshaperConfig};
use unicode_bidi::{BidiInfo, Level};

use crate::errors::ShapingError;
use crate::language_utils::ScriptProfile;

static PUNCTUATION_SPACING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*([،؛؟!:])\s*").expect("Invalid punctuation spacing regex"));

/// Converts logical text into its visual glyph sequence
pub trait Shaper: Send + Sync {
    fn shape(&self, text: &str) -> Result<String, ShapingError>;
}

/// Arabic reshaping followed by bidi visual reordering
#[derive(Debug, Clone, Copy, Default)]
pub struct BidiShaper {
    rtl_base: bool,
}

impl BidiShaper {
    /// Shaper with a right-to-left paragraph base direction
    pub fn right_to_left() -> Self {
        Self { rtl_base: true }
    }

    pub fn left_to_right() -> Self {
        Self { rtl_base: false }
    }

    fn shape_line(&self, line: &str) -> String {
        let reshaper = ArabicReshaper::new(ReshaperConfig::default());
        let reshaped = reshaper.reshape(line);

        let level = if self.rtl_base { Level::rtl() } else { Level::ltr() };
        let bidi = BidiInfo::new(&reshaped, Some(level));

        let mut visual = String::with_capacity(reshaped.len());
        for paragraph in &bidi.paragraphs {
            visual.push_str(&bidi.reorder_line(paragraph, paragraph.range.clone()));
        }
        visual
    }
}

impl Shaper for BidiShaper {
    fn shape(&self, text: &str) -> Result<String, ShapingError> {
        // Each line is reordered on its own so line breaks keep their position
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            text.split('\n').map(|line| self.shape_line(line)).collect::<Vec<_>>().join("\n")
        }));

        result.map_err(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            ShapingError::Panicked(message)
        })
    }
}

/// Prepares translated text for drawing in the target script
pub struct ScriptPostProcessor {
    profile: ScriptProfile,
    shaper: Option<Box<dyn Shaper>>,
}

impl ScriptPostProcessor {
    /// Processor for a target language, shaping only right-to-left scripts
    pub fn for_language(target_language: &str) -> Self {
        Self::new(ScriptProfile::for_language(target_language))
    }

    pub fn new(profile: ScriptProfile) -> Self {
        let shaper: Option<Box<dyn Shaper>> = if profile.is_rtl() {
            Some(Box::new(BidiShaper::right_to_left()))
        } else {
            None
        };
        Self { profile, shaper }
    }

    /// Replace the shaping backend
    pub fn with_shaper(mut self, shaper: Box<dyn Shaper>) -> Self {
        self.shaper = Some(shaper);
        self
    }

    pub fn profile(&self) -> &ScriptProfile {
        &self.profile
    }

    /// Shape the text and apply display conventions. Never fails: when
    /// shaping fails the logical text is used as-is.
    pub fn prepare_for_display(&self, text: &str) -> String {
        let shaped = match &self.shaper {
            Some(shaper) => match shaper.shape(text) {
                Ok(visual) => visual,
                Err(e) => {
                    warn!("Shaping failed, using logical order for {:?}: {}", text, e);
                    text.to_string()
                }
            },
            None => text.to_string(),
        };

        if self.profile.has_cosmetics() {
            self.apply_cosmetics(&shaped)
        } else {
            shaped.trim().to_string()
        }
    }

    /// Native digits, native punctuation, one space after punctuation and none before.
    pub fn apply_cosmetics(&self, text: &str) -> String {
        let mapped: String = text
            .chars()
            .map(|c| {
                if let (Some(digits), Some(d)) = (self.profile.digits, c.to_digit(10)) {
                    if c.is_ascii_digit() {
                        return digits[d as usize];
                    }
                }
                self.profile
                    .punctuation
                    .iter()
                    .find(|(ascii, _)| *ascii == c)
                    .map(|(_, native)| *native)
                    .unwrap_or(c)
            })
            .collect();

        let spaced = PUNCTUATION_SPACING.replace_all(&mapped, "$1 ");
        spaced.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
