/*!
 * Tests for batched translation with retries
 */

use pageglot::document::{BoundingBox, TextBlock};
use pageglot::errors::TranslationError;
use pageglot::providers::mock::MockTranslator;
use pageglot::translation::batch::split_into_chunks;
use pageglot::translation::{RetryPolicy, TranslationBatcher};

fn block(text: &str, x0: f64, y0: f64) -> TextBlock {
    TextBlock::new(text, BoundingBox::new(x0, y0, x0 + 80.0, y0 + 12.0), 0)
}

#[tokio::test]
async fn test_retry_with_failing_backend_should_stop_at_max_attempts() {
    for max_attempts in 1..=4 {
        let translator = MockTranslator::failing();
        let batcher = TranslationBatcher::new(&translator, "en", "fr").with_policy(RetryPolicy::immediate(max_attempts));

        let mut calls = 0;
        let result = batcher.translate_with_retry("Move your king", &mut calls).await;

        assert!(matches!(result, Err(TranslationError::Exhausted { attempts, .. }) if attempts == max_attempts));
        assert_eq!(calls, max_attempts as usize);
        assert_eq!(translator.request_count(), max_attempts as usize);
    }
}

#[tokio::test]
async fn test_retry_should_recover_after_transient_failures() {
    let translator = MockTranslator::fail_first(2);
    let batcher = TranslationBatcher::new(&translator, "en", "fr").with_policy(RetryPolicy::immediate(3));

    let mut calls = 0;
    let translated = batcher.translate_with_retry("Move your king", &mut calls).await.unwrap();
    assert_eq!(translated, "[fr] Move your king");
    assert_eq!(calls, 3);
}

#[tokio::test]
async fn test_echoed_and_empty_answers_should_count_as_failures() {
    for translator in [MockTranslator::echo(), MockTranslator::empty()] {
        let batcher = TranslationBatcher::new(&translator, "en", "fr").with_policy(RetryPolicy::immediate(2));
        let outcome = batcher.translate_blocks(vec![block("Move your king", 10.0, 10.0)]).await;

        assert!(outcome.translated.is_empty());
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(translator.request_count(), 2);
    }
}

#[tokio::test]
async fn test_translate_blocks_should_follow_reading_order_and_keep_geometry() {
    let translator = MockTranslator::working();
    let batcher = TranslationBatcher::new(&translator, "en", "fr")
        .with_policy(RetryPolicy::immediate(1))
        .with_batch_size(2);

    let blocks = vec![
        block("bottom line", 10.0, 300.0),
        block("top left", 10.0, 50.0),
        block("top right", 200.0, 50.0),
    ];
    let outcome = batcher.translate_blocks(blocks).await;

    assert_eq!(translator.requests(), vec!["top right", "top left", "bottom line"]);
    assert_eq!(outcome.calls, 3);
    assert_eq!(outcome.translated[0].original_text, "top right");
    assert_eq!(outcome.translated[0].bbox, BoundingBox::new(200.0, 50.0, 280.0, 62.0));
}

#[tokio::test]
async fn test_one_failing_block_should_not_stop_the_others() {
    let translator = MockTranslator::intermittent(2);
    let batcher = TranslationBatcher::new(&translator, "en", "fr").with_policy(RetryPolicy::immediate(1));

    let blocks = vec![block("first", 0.0, 10.0), block("second", 0.0, 20.0), block("third", 0.0, 30.0)];
    let outcome = batcher.translate_blocks(blocks).await;

    assert_eq!(outcome.translated.len(), 2);
    assert_eq!(outcome.dropped.len(), 1);
    assert_eq!(outcome.dropped[0].0.text, "second");
}

#[tokio::test]
async fn test_long_text_should_be_translated_in_chunks() {
    let translator = MockTranslator::working();
    let batcher = TranslationBatcher::new(&translator, "en", "fr")
        .with_policy(RetryPolicy::immediate(1))
        .with_max_chars_per_request(20);

    let text = "The king moves. The queen follows.";
    let outcome = batcher.translate_blocks(vec![block(text, 0.0, 0.0)]).await;

    assert_eq!(translator.request_count(), split_into_chunks(text, 20).len());
    assert!(translator.request_count() > 1);
    assert!(translator.requests().iter().all(|chunk| chunk.chars().count() <= 20));
    assert_eq!(outcome.translated.len(), 1);
}

#[test]
fn test_split_into_chunks_should_respect_limit_and_keep_content() {
    let text = "aaaaaaaaaaaaaaaaaaaaaaaaa bbb. ccc dddd";
    let chunks = split_into_chunks(text, 10);

    assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    let rejoined: String = chunks.concat().chars().filter(|c| !c.is_whitespace()).collect();
    let original: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    assert_eq!(rejoined, original);
}
