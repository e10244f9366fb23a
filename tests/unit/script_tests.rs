/*!
 * Tests for script profiles and display preparation
 */

use pageglot::errors::ShapingError;
use pageglot::language_utils::ScriptProfile;
use pageglot::translation::{BidiShaper, ScriptPostProcessor, Shaper};

/// Shaper that always gives up
struct RejectingShaper;

impl Shaper for RejectingShaper {
    fn shape(&self, _text: &str) -> Result<String, ShapingError> {
        Err(ShapingError::Failed("unsupported input".to_string()))
    }
}

#[test]
fn test_script_profiles_should_only_be_rtl_for_rtl_targets() {
    assert!(ScriptProfile::for_language("ar").is_rtl());
    assert!(ScriptProfile::for_language("fa").is_rtl());
    assert!(ScriptProfile::for_language("he").is_rtl());
    assert!(!ScriptProfile::for_language("he").has_cosmetics());
    assert!(!ScriptProfile::for_language("fr").is_rtl());
    assert!(!ScriptProfile::for_language("not-a-code").is_rtl());
}

#[test]
fn test_ltr_target_should_pass_text_through() {
    let processor = ScriptPostProcessor::for_language("fr");
    assert_eq!(processor.prepare_for_display("  Déplacez le roi 3 fois?  "), "Déplacez le roi 3 fois?");
}

#[test]
fn test_arabic_target_should_produce_native_digits_and_punctuation() {
    let processor = ScriptPostProcessor::for_language("ar");
    let display = processor.prepare_for_display("حرك الملك 3 مرات?");

    assert!(display.contains('٣'));
    assert!(display.contains('؟'));
    assert!(!display.chars().any(|c| c.is_ascii_digit()));
}

#[test]
fn test_failed_shaping_should_fall_back_to_logical_text_with_cosmetics() {
    let processor = ScriptPostProcessor::for_language("ar").with_shaper(Box::new(RejectingShaper));
    assert_eq!(processor.prepare_for_display("ملك 12?"), "ملك ١٢؟");
}

#[test]
fn test_bidi_shaper_should_use_presentation_forms() {
    let shaped = BidiShaper::right_to_left().shape("كتب").unwrap();
    assert_eq!(shaped.chars().count(), 3);
    // Presentation forms replace the base letters
    assert!(shaped.chars().all(|c| ('\u{FB50}'..='\u{FEFF}').contains(&c)));
}

#[test]
fn test_bidi_shaper_should_keep_lines_separate() {
    let shaped = BidiShaper::right_to_left().shape("abc\ndef").unwrap();
    assert_eq!(shaped.lines().count(), 2);
}
