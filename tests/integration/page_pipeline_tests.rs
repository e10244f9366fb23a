/*!
 * Integration tests for one page through the full pipeline.
 *
 * Fragments come from JSON records or from the page's own content stream,
 * translations from the mock backend, and the overlay is merged into an
 * in-memory document.
 */

use pageglot::document::{JsonFragmentSource, LopdfExtractor, PageMerger};
use pageglot::overlay::OverlayFont;
use pageglot::page_processor::{PageOutcome, PageProcessor, UnchangedReason};
use pageglot::errors::ShapingError;
use pageglot::providers::mock::MockTranslator;
use pageglot::translation::{ScriptPostProcessor, Shaper};

use crate::common::{init_test_logging, fast_config, page_operators, pdf_document, record};

#[tokio::test]
async fn test_single_block_should_be_overlaid_above_its_source() {
    init_test_logging();
    let config = fast_config("fr");
    let translator = MockTranslator::working();
    let source = JsonFragmentSource::from_pages(vec![vec![record("Move your king", [10.0, 700.0, 150.0, 720.0])]]);
    let processor = PageProcessor::new(&config, &translator, &source);

    let mut doc = pdf_document(&[&[(10.0, 72.0, 20.0, "Move your king")]]);
    let before = page_operators(&doc, 0);
    let mut merger = PageMerger::new(OverlayFont::Helvetica);

    let report = processor.process_page(&mut doc, &mut merger, 0).await;

    assert_eq!(report.outcome, PageOutcome::Overlaid { blocks: 1 });
    assert_eq!((report.fragments, report.translated, report.placed), (1, 1, 1));
    assert_eq!(translator.requests(), vec!["Move your king"]);

    // Original content is kept, wrapped in q/Q, and the overlay follows it
    let after = page_operators(&doc, 0);
    assert_eq!(after.first().map(String::as_str), Some("q"));
    assert_eq!(&after[1..=before.len()], before.as_slice());
    assert_eq!(after[before.len() + 1], "Q");
    let count_tj = |ops: &[String]| ops.iter().filter(|op| op.as_str() == "Tj").count();
    assert!(count_tj(&after) > count_tj(&before));
}

#[tokio::test]
async fn test_notation_only_page_should_stay_unchanged_without_backend_calls() {
    init_test_logging();
    let config = fast_config("fr");
    let translator = MockTranslator::working();
    let source = JsonFragmentSource::from_pages(vec![vec![
        record("Nf3", [10.0, 100.0, 40.0, 112.0]),
        record("O-O", [60.0, 100.0, 90.0, 112.0]),
        record("12.", [100.0, 100.0, 120.0, 112.0]),
    ]]);
    let processor = PageProcessor::new(&config, &translator, &source);

    let mut doc = pdf_document(&[&[(10.0, 680.0, 12.0, "Nf3")]]);
    let before = page_operators(&doc, 0);
    let mut merger = PageMerger::new(OverlayFont::Helvetica);

    let report = processor.process_page(&mut doc, &mut merger, 0).await;

    assert_eq!(
        report.outcome,
        PageOutcome::Unchanged {
            reason: UnchangedReason::NoTranslatableText
        }
    );
    assert_eq!(report.excluded, 3);
    assert_eq!(translator.request_count(), 0);
    assert_eq!(page_operators(&doc, 0), before);
}

#[tokio::test]
async fn test_colliding_blocks_should_get_disjoint_placements() {
    init_test_logging();
    let config = fast_config("fr");
    let translator = MockTranslator::working();
    let bbox = [100.0, 400.0, 300.0, 420.0];
    let source = JsonFragmentSource::from_pages(vec![vec![
        record("First sentence here", bbox),
        record("Second sentence here", bbox),
    ]]);
    let processor = PageProcessor::new(&config, &translator, &source);

    let mut doc = pdf_document(&[&[]]);
    let mut merger = PageMerger::new(OverlayFont::Helvetica);
    let report = processor.process_page(&mut doc, &mut merger, 0).await;
    assert_eq!(report.outcome, PageOutcome::Overlaid { blocks: 2 });

    // Same computation as the page, inspected directly
    let blocks = vec![
        pageglot::TranslatedBlock {
            translated_text: "[fr] First sentence here".to_string(),
            original_text: "First sentence here".to_string(),
            bbox: pageglot::document::BoundingBox::new(100.0, 400.0, 300.0, 420.0),
            page_index: 0,
        },
        pageglot::TranslatedBlock {
            translated_text: "[fr] Second sentence here".to_string(),
            original_text: "Second sentence here".to_string(),
            bbox: pageglot::document::BoundingBox::new(100.0, 400.0, 300.0, 420.0),
            page_index: 0,
        },
    ];
    let engine = pageglot::overlay::OverlayLayoutEngine::new(config.layout.clone(), pageglot::ScriptProfile::plain());
    let outcome = engine.layout_page(&blocks, doc.page_size(0).unwrap());
    let (first, second) = (outcome.placements[0].0, outcome.placements[1].0);
    assert!(!first.overlaps(&second));
    assert_eq!(outcome.forced, 0);
}

#[tokio::test]
async fn test_failing_backend_should_leave_page_unchanged() {
    init_test_logging();
    let config = fast_config("fr");
    let translator = MockTranslator::failing();
    let source = LopdfExtractor::new();
    let processor = PageProcessor::new(&config, &translator, &source);

    let mut doc = pdf_document(&[&[(72.0, 700.0, 12.0, "Develop your pieces")]]);
    let before = page_operators(&doc, 0);
    let mut merger = PageMerger::new(OverlayFont::Helvetica);

    let report = processor.process_page(&mut doc, &mut merger, 0).await;

    assert_eq!(
        report.outcome,
        PageOutcome::Unchanged {
            reason: UnchangedReason::NothingTranslated
        }
    );
    assert_eq!(report.dropped, 1);
    assert_eq!(translator.request_count(), config.translation.common.max_attempts as usize);
    assert_eq!(page_operators(&doc, 0), before);
}

#[tokio::test]
async fn test_invalid_records_should_be_rejected_and_counted() {
    init_test_logging();
    let config = fast_config("fr");
    let translator = MockTranslator::working();
    let source = JsonFragmentSource::from_pages(vec![vec![
        serde_json::json!({ "text": "No box at all" }),
        serde_json::json!({ "text": "Inverted box", "bbox": [50.0, 50.0, 10.0, 10.0] }),
        serde_json::json!("not a record"),
        serde_json::json!({ "text": "Repaired box", "x0": 10.0, "top": 10.0, "x1": 90.0, "bottom": 22.0 }),
    ]]);
    let processor = PageProcessor::new(&config, &translator, &source);

    let mut doc = pdf_document(&[&[]]);
    let mut merger = PageMerger::new(OverlayFont::Helvetica);
    let report = processor.process_page(&mut doc, &mut merger, 0).await;

    assert_eq!(report.rejected, 3);
    assert_eq!(report.outcome, PageOutcome::Overlaid { blocks: 1 });
    assert_eq!(translator.requests(), vec!["Repaired box"]);
}

#[tokio::test]
async fn test_arabic_target_should_shape_before_layout() {
    init_test_logging();
    let config = fast_config("ar");
    let translator = MockTranslator::working().with_custom_response(|_, _, _| "حرك الملك 3 مرات".to_string());
    let source = JsonFragmentSource::from_pages(vec![vec![record("Move the king 3 times", [72.0, 300.0, 250.0, 312.0])]]);
    let processor = PageProcessor::new(&config, &translator, &source);

    let mut doc = pdf_document(&[&[]]);
    let mut merger = PageMerger::new(OverlayFont::Helvetica);
    let report = processor.process_page(&mut doc, &mut merger, 0).await;

    assert_eq!(report.outcome, PageOutcome::Overlaid { blocks: 1 });
    assert_eq!(report.translated, 1);
}

/// Shaper whose output has nothing drawable
struct BlankShaper;

impl Shaper for BlankShaper {
    fn shape(&self, _text: &str) -> Result<String, ShapingError> {
        Ok("   ".to_string())
    }
}

#[tokio::test]
async fn test_blank_display_text_should_count_as_dropped() {
    init_test_logging();
    let config = fast_config("fr");
    let translator = MockTranslator::working();
    let source = JsonFragmentSource::from_pages(vec![vec![record("Protect the queen", [72.0, 300.0, 250.0, 312.0])]]);
    let processor = PageProcessor::new(&config, &translator, &source)
        .with_post_processor(ScriptPostProcessor::for_language("fr").with_shaper(Box::new(BlankShaper)));

    let mut doc = pdf_document(&[&[]]);
    let before = page_operators(&doc, 0);
    let mut merger = PageMerger::new(OverlayFont::Helvetica);
    let report = processor.process_page(&mut doc, &mut merger, 0).await;

    assert_eq!(
        report.outcome,
        PageOutcome::Unchanged {
            reason: UnchangedReason::NothingTranslated
        }
    );
    assert_eq!((report.translated, report.dropped), (0, 1));
    assert_eq!(page_operators(&doc, 0), before);
}
