/*!
 * Batch translation processing.
 *
 * This module orders a page's text blocks, groups them into fixed-size
 * batches and drives the translation backend one text at a time under a
 * bounded retry policy. Texts that still fail after the last attempt are
 * dropped, never forwarded as empty placeholders.
 */

use log::{debug, warn};
use std::time::Duration;

use crate::app_config::TranslationCommonConfig;
use crate::document::model::{TextBlock, TranslatedBlock};
use crate::errors::{ProviderError, TranslationError};

use super::core::TextTranslator;

/// Bounded retry with exponential backoff and a per-call throttle
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts per text, at least 1
    pub max_attempts: u32,
    /// Wait after the first failed attempt, doubled after each further failure
    pub backoff_base: Duration,
    /// Wait enforced before every call except the first
    pub inter_call_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&TranslationCommonConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(common: &TranslationCommonConfig) -> Self {
        Self {
            max_attempts: common.max_attempts.max(1),
            backoff_base: Duration::from_millis(common.retry_backoff_ms),
            inter_call_delay: Duration::from_millis(common.rate_limit_delay_ms),
        }
    }

    /// Policy without any waiting, for tests and offline runs
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base: Duration::ZERO,
            inter_call_delay: Duration::ZERO,
        }
    }

    /// Backoff after the given failed attempt (1-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.backoff_base.saturating_mul(1u32 << shift)
    }
}

/// Result of translating one page's blocks
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Translated blocks, in translation order
    pub translated: Vec<TranslatedBlock>,
    /// Blocks dropped after exhausting their attempts
    pub dropped: Vec<(TextBlock, TranslationError)>,
    /// Backend calls made
    pub calls: usize,
}

/// Split a text into chunks of at most `max_chars` characters.
///
/// Sentence boundaries (`.`) are preferred, then spaces; a run without
/// either is cut hard at the limit.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut pieces: Vec<String> = Vec::new();
    for sentence in text.split_inclusive('.') {
        if sentence.chars().count() <= max_chars {
            pieces.push(sentence.to_string());
            continue;
        }
        for word in sentence.split_inclusive(' ') {
            if word.chars().count() <= max_chars {
                pieces.push(word.to_string());
            } else {
                let chars: Vec<char> = word.chars().collect();
                pieces.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            }
        }
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for piece in pieces {
        let len = piece.chars().count();
        if current_len + len > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(&piece);
        current_len += len;
    }
    chunks.push(current);

    chunks
        .into_iter()
        .map(|chunk| chunk.trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

/// Translates ordered batches of text blocks
pub struct TranslationBatcher<'a, T: TextTranslator + ?Sized> {
    translator: &'a T,
    policy: RetryPolicy,
    batch_size: usize,
    max_chars_per_request: usize,
    source_language: String,
    target_language: String,
}

impl<'a, T: TextTranslator + ?Sized> TranslationBatcher<'a, T> {
    /// Create a batcher with the default batch size of 10
    pub fn new(translator: &'a T, source_language: &str, target_language: &str) -> Self {
        let common = TranslationCommonConfig::default();
        Self {
            translator,
            policy: RetryPolicy::from_config(&common),
            batch_size: common.batch_size,
            max_chars_per_request: common.max_chars_per_request,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        }
    }

    /// Create a batcher using the configured policy, batch size and chunk limit
    pub fn from_config(
        translator: &'a T,
        common: &TranslationCommonConfig,
        source_language: &str,
        target_language: &str,
    ) -> Self {
        Self::new(translator, source_language, target_language)
            .with_policy(RetryPolicy::from_config(common))
            .with_batch_size(common.batch_size)
            .with_max_chars_per_request(common.max_chars_per_request)
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_max_chars_per_request(mut self, max_chars: usize) -> Self {
        self.max_chars_per_request = max_chars.max(1);
        self
    }

    /// Order blocks top-to-bottom, then right-to-left within a row.
    ///
    /// Coordinates are top-left-origin, so "higher on the page" is a smaller `y0`.
    pub fn order_blocks(blocks: &mut [TextBlock]) {
        blocks.sort_by(|a, b| {
            a.bbox.y0.total_cmp(&b.bbox.y0)
                .then_with(|| b.bbox.x0.total_cmp(&a.bbox.x0))
        });
    }

    /// Translate a page's blocks in reading order
    pub async fn translate_blocks(&self, mut blocks: Vec<TextBlock>) -> BatchOutcome {
        Self::order_blocks(&mut blocks);

        let mut outcome = BatchOutcome::default();
        let batch_count = blocks.len().div_ceil(self.batch_size);

        for (batch_index, batch) in blocks.chunks(self.batch_size).enumerate() {
            debug!("Translating batch {}/{} ({} blocks)", batch_index + 1, batch_count, batch.len());

            for block in batch {
                match self.translate_block_text(&block.text, &mut outcome.calls).await {
                    Ok(translated_text) => outcome.translated.push(TranslatedBlock {
                        translated_text,
                        original_text: block.text.clone(),
                        bbox: block.bbox,
                        page_index: block.page_index,
                    }),
                    Err(e) => {
                        warn!("Dropping untranslatable text {:?}: {}", block.text, e);
                        outcome.dropped.push((block.clone(), e));
                    }
                }
            }
        }

        outcome
    }

    /// Translate one block's text, chunking long texts
    async fn translate_block_text(&self, text: &str, calls: &mut usize) -> Result<String, TranslationError> {
        let chunks = split_into_chunks(text, self.max_chars_per_request);
        let mut parts = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            parts.push(self.translate_with_retry(chunk, calls).await?);
        }
        Ok(parts.join(" "))
    }

    /// Translate one text with up to `max_attempts` attempts.
    ///
    /// Empty answers and answers equal to the input (ignoring case) count as
    /// failed attempts.
    pub async fn translate_with_retry(&self, text: &str, calls: &mut usize) -> Result<String, TranslationError> {
        let mut last_error = None;

        for attempt in 1..=self.policy.max_attempts {
            if *calls > 0 && !self.policy.inter_call_delay.is_zero() {
                tokio::time::sleep(self.policy.inter_call_delay).await;
            }
            *calls += 1;

            let result = self.translator
                .translate(text, &self.source_language, &self.target_language)
                .await
                .and_then(|answer| Self::check_answer(text, answer));

            match result {
                Ok(translated) => return Ok(translated),
                Err(e) => {
                    debug!("Translation attempt {}/{} failed: {}", attempt, self.policy.max_attempts, e);
                    last_error = Some(e);
                }
            }

            if attempt < self.policy.max_attempts {
                let backoff = self.policy.backoff_for(attempt);
                if !backoff.is_zero() {
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        Err(TranslationError::Exhausted {
            attempts: self.policy.max_attempts,
            last: last_error.unwrap_or(ProviderError::EmptyTranslation),
        })
    }

    fn check_answer(source: &str, answer: String) -> Result<String, ProviderError> {
        let answer = answer.trim();
        if answer.is_empty() {
            Err(ProviderError::EmptyTranslation)
        } else if answer.to_lowercase() == source.trim().to_lowercase() {
            Err(ProviderError::EchoedInput)
        } else {
            Ok(answer.to_string())
        }
    }
}
