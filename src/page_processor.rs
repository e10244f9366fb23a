/*!
 * Per-page translation-overlay pipeline.
 *
 * One page runs through validation, cleaning, translation, script
 * post-processing, layout and merging. Every stage reports soft failures as
 * values; whatever happens, the page is left either overlaid or unchanged.
 */

use log::{debug, info, warn};

use crate::app_config::Config;
use crate::document::extract::{FragmentSource, RawFragment};
use crate::document::merge::{MergeOutcome, PageMerger};
use crate::document::model::{TextBlock, TranslatedBlock};
use crate::document::pdf::PdfDocument;
use crate::language_utils::ScriptProfile;
use crate::overlay::layout::OverlayLayoutEngine;
use crate::translation::batch::TranslationBatcher;
use crate::translation::core::TextTranslator;
use crate::translation::normalizer::TextNormalizer;
use crate::translation::script::ScriptPostProcessor;
use crate::validation::fragment::FragmentValidator;

/// Why a page was left as it was
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnchangedReason {
    /// No fragment survived validation and cleaning
    NoTranslatableText,
    /// Every block was dropped by the translation stage
    NothingTranslated,
    /// No block could be placed on the page
    NothingPlaced,
}

/// Final state of one page
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Overlaid { blocks: usize },
    Unchanged { reason: UnchangedReason },
    /// The page failed and was emitted as in the source
    Failed { error: String },
}

/// Counters for one processed page
#[derive(Debug, Clone, PartialEq)]
pub struct PageReport {
    pub page_index: usize,
    pub fragments: usize,
    pub rejected: usize,
    pub excluded: usize,
    pub translated: usize,
    pub dropped: usize,
    pub placed: usize,
    pub skipped: usize,
    pub outcome: PageOutcome,
}

impl PageReport {
    fn new(page_index: usize) -> Self {
        Self {
            page_index,
            fragments: 0,
            rejected: 0,
            excluded: 0,
            translated: 0,
            dropped: 0,
            placed: 0,
            skipped: 0,
            outcome: PageOutcome::Unchanged {
                reason: UnchangedReason::NoTranslatableText,
            },
        }
    }

    fn finish(mut self, outcome: PageOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

/// Runs the pipeline for single pages of a document
pub struct PageProcessor<'a, T: TextTranslator + ?Sized, S: FragmentSource + ?Sized> {
    source: &'a S,
    validator: FragmentValidator,
    normalizer: TextNormalizer,
    batcher: TranslationBatcher<'a, T>,
    post_processor: ScriptPostProcessor,
    layout: OverlayLayoutEngine,
}

impl<'a, T: TextTranslator + ?Sized, S: FragmentSource + ?Sized> PageProcessor<'a, T, S> {
    pub fn new(config: &Config, translator: &'a T, source: &'a S) -> Self {
        let profile = ScriptProfile::for_language(&config.target_language);
        Self {
            source,
            validator: FragmentValidator::new(),
            normalizer: TextNormalizer::default(),
            batcher: TranslationBatcher::from_config(
                translator,
                &config.translation.common,
                &config.source_language,
                &config.target_language,
            ),
            post_processor: ScriptPostProcessor::new(profile),
            layout: OverlayLayoutEngine::new(config.layout.clone(), profile),
        }
    }

    /// Replace the script post-processor, e.g. to plug in another shaper
    pub fn with_post_processor(mut self, post_processor: ScriptPostProcessor) -> Self {
        self.post_processor = post_processor;
        self
    }

    /// Process one page, merging its overlay into `doc` on success
    pub async fn process_page(&self, doc: &mut PdfDocument, merger: &mut PageMerger, page_index: usize) -> PageReport {
        let mut report = PageReport::new(page_index);
        let page_number = page_index + 1;

        let raw = match self.source.page_fragments(doc, page_index) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Page {}: extraction failed, keeping original page: {}", page_number, e);
                return report.finish(PageOutcome::Failed { error: e.to_string() });
            }
        };
        report.fragments = raw.len();

        let blocks = self.collect_blocks(raw, page_index, &mut report);
        if blocks.is_empty() {
            debug!("Page {}: nothing to translate", page_number);
            return report.finish(PageOutcome::Unchanged {
                reason: UnchangedReason::NoTranslatableText,
            });
        }

        let batch = self.batcher.translate_blocks(blocks).await;
        report.dropped = batch.dropped.len();

        let mut translated: Vec<TranslatedBlock> = Vec::with_capacity(batch.translated.len());
        for mut block in batch.translated {
            block.translated_text = self.post_processor.prepare_for_display(&block.translated_text);
            if block.translated_text.is_empty() {
                debug!("Page {}: dropped {:?}, nothing left to display", page_number, block.original_text);
                report.dropped += 1;
                continue;
            }
            translated.push(block);
        }
        report.translated = translated.len();

        if translated.is_empty() {
            info!("Page {}: no block could be translated, keeping original page", page_number);
            return report.finish(PageOutcome::Unchanged {
                reason: UnchangedReason::NothingTranslated,
            });
        }

        let size = match doc.page_size(page_index) {
            Ok(size) => size,
            Err(e) => return report.finish(PageOutcome::Failed { error: e.to_string() }),
        };

        let layout = self.layout.layout_page(&translated, size);
        report.placed = layout.placements.len();
        report.skipped = layout.skipped.len();

        let outcome = match merger.merge(doc, page_index, &layout.canvas) {
            MergeOutcome::Merged => PageOutcome::Overlaid { blocks: report.placed },
            MergeOutcome::Empty => PageOutcome::Unchanged {
                reason: UnchangedReason::NothingPlaced,
            },
            MergeOutcome::RolledBack(e) => PageOutcome::Failed { error: e.to_string() },
        };
        report.finish(outcome)
    }

    /// Validate and clean raw fragments; rejected and excluded ones are counted
    fn collect_blocks(&self, raw: Vec<RawFragment>, page_index: usize, report: &mut PageReport) -> Vec<TextBlock> {
        let mut blocks = Vec::with_capacity(raw.len());

        for fragment in raw {
            let validated = match &fragment {
                RawFragment::Typed(typed) => self.validator.validate(typed, page_index),
                RawFragment::Record(record) => self.validator.validate_value(record, page_index),
            };

            let mut block = match validated {
                Ok(block) => block,
                Err(rejection) => {
                    debug!("Page {}: rejected fragment: {}", page_index + 1, rejection);
                    report.rejected += 1;
                    continue;
                }
            };

            match self.normalizer.prepare(&block.text) {
                Some(cleaned) => {
                    block.text = cleaned;
                    blocks.push(block);
                }
                None => {
                    debug!("Page {}: excluded {:?}", page_index + 1, block.text);
                    report.excluded += 1;
                }
            }
        }

        blocks
    }
}
