/*!
 * Tests for text cleaning and notation exclusion
 */

use pageglot::translation::TextNormalizer;
use rand::Rng;

const ALPHABET: &[char] = &[
    'a', 'Z', '7', ' ', '\t', '\n', '.', ',', '?', '!', '-', '@', '#', '(', ')', '"', '’', 'é', 'ب', '½', '_',
];

fn random_text(rng: &mut impl Rng) -> String {
    let len = rng.random_range(0..40);
    (0..len).map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())]).collect()
}

#[test]
fn test_clean_should_be_idempotent_on_random_input() {
    let normalizer = TextNormalizer::default();
    let mut rng = rand::rng();

    for _ in 0..500 {
        let text = random_text(&mut rng);
        let once = normalizer.clean(&text);
        assert_eq!(normalizer.clean(&once), once, "not a fixed point for {:?}", text);
    }
}

#[test]
fn test_clean_output_should_only_hold_allowed_characters() {
    let normalizer = TextNormalizer::default();
    let mut rng = rand::rng();

    for _ in 0..500 {
        let cleaned = normalizer.clean(&random_text(&mut rng));
        assert_eq!(cleaned, cleaned.trim());
        assert!(!cleaned.contains("  "));
        assert!(
            cleaned
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == ' ' || "-.,?!".contains(c)),
            "unexpected character in {:?}",
            cleaned
        );
    }
}

#[test]
fn test_prepare_should_never_return_notation_or_short_text() {
    let normalizer = TextNormalizer::new(5);
    assert_eq!(normalizer.prepare("Rook"), None);
    assert_eq!(normalizer.prepare("A\u{2014}B"), None);
    assert_eq!(normalizer.prepare("Nf3+"), None);
    assert_eq!(normalizer.prepare("Rooks"), Some("Rooks".to_string()));
}
