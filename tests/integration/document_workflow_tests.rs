/*!
 * Integration tests for whole documents through the controller
 */

use pageglot::app_controller::Controller;
use pageglot::document::{LopdfExtractor, PdfDocument};
use pageglot::file_utils::{FileManager, TranslationMetadata};
use pageglot::providers::mock::MockTranslator;

use crate::common::{init_test_logging, create_temp_dir, fast_config, write_pdf};

#[tokio::test]
async fn test_translated_document_should_keep_page_count_and_write_metadata() {
    init_test_logging();
    let dir = create_temp_dir().unwrap();
    let input = write_pdf(
        dir.path(),
        "opening.pdf",
        &[
            &[(72.0, 700.0, 14.0, "The Italian Game"), (72.0, 660.0, 11.0, "White develops the bishop")],
            &[(72.0, 700.0, 12.0, "Nf3")],
            &[],
        ],
    )
    .unwrap();
    let output_dir = dir.path().join("out");

    let controller = Controller::with_config(fast_config("fr")).unwrap();
    let translator = MockTranslator::working();
    let report = controller
        .run_with(&translator, &LopdfExtractor::new(), &input, &output_dir, false)
        .await
        .unwrap()
        .expect("document should be processed");

    assert_eq!(report.pages, 3);
    assert_eq!(report.pages_overlaid, 1);
    assert_eq!(report.pages_unchanged, 2);
    assert_eq!(report.pages_failed, 0);
    assert_eq!(report.blocks_translated, 2);
    assert_eq!(report.output_path, output_dir.join("translated_opening.pdf"));

    let output = PdfDocument::load(&report.output_path).unwrap();
    assert_eq!(output.page_count(), 3);

    let metadata_path = FileManager::metadata_path(&report.output_path);
    let metadata: TranslationMetadata =
        serde_json::from_str(&std::fs::read_to_string(metadata_path).unwrap()).unwrap();
    assert_eq!(metadata.pages, 3);
    assert_eq!(metadata.pages_overlaid, 1);
    assert_eq!(metadata.target_language, "fr");
}

#[tokio::test]
async fn test_failing_backend_should_still_emit_every_page() {
    init_test_logging();
    let dir = create_temp_dir().unwrap();
    let input = write_pdf(
        dir.path(),
        "notes.pdf",
        &[&[(72.0, 700.0, 12.0, "First page text")], &[(72.0, 700.0, 12.0, "Second page text")]],
    )
    .unwrap();

    let controller = Controller::with_config(fast_config("fr")).unwrap();
    let report = controller
        .run_with(&MockTranslator::failing(), &LopdfExtractor::new(), &input, dir.path(), false)
        .await
        .unwrap()
        .expect("document should be processed");

    assert_eq!(report.pages_overlaid, 0);
    assert_eq!(report.blocks_dropped, 2);

    let output = PdfDocument::load(&report.output_path).unwrap();
    let original = PdfDocument::load(&input).unwrap();
    assert_eq!(output.page_count(), original.page_count());
}

#[tokio::test]
async fn test_existing_output_should_be_skipped_unless_forced() {
    init_test_logging();
    let dir = create_temp_dir().unwrap();
    let input = write_pdf(dir.path(), "game.pdf", &[&[(72.0, 700.0, 12.0, "Checkmate in two")]]).unwrap();
    let existing = FileManager::generate_output_path(&input, dir.path());
    std::fs::write(&existing, b"placeholder").unwrap();

    let controller = Controller::with_config(fast_config("fr")).unwrap();
    let translator = MockTranslator::working();

    let skipped = controller
        .run_with(&translator, &LopdfExtractor::new(), &input, dir.path(), false)
        .await
        .unwrap();
    assert!(skipped.is_none());
    assert_eq!(translator.request_count(), 0);
    assert_eq!(std::fs::read(&existing).unwrap(), b"placeholder");

    let forced = controller
        .run_with(&translator, &LopdfExtractor::new(), &input, dir.path(), true)
        .await
        .unwrap();
    assert!(forced.is_some());
    assert_eq!(PdfDocument::load(&existing).unwrap().page_count(), 1);
}

#[tokio::test]
async fn test_invalid_input_should_fail_before_any_work() {
    init_test_logging();
    let dir = create_temp_dir().unwrap();
    let not_pdf = dir.path().join("notes.txt");
    std::fs::write(&not_pdf, "plain text").unwrap();

    let controller = Controller::with_config(fast_config("fr")).unwrap();
    let translator = MockTranslator::working();
    let result = controller
        .run_with(&translator, &LopdfExtractor::new(), &not_pdf, dir.path(), false)
        .await;

    assert!(result.is_err());
    assert_eq!(translator.request_count(), 0);
}

#[tokio::test]
async fn test_corrupt_pdf_should_surface_a_load_error() {
    init_test_logging();
    let dir = create_temp_dir().unwrap();
    let broken = dir.path().join("broken.pdf");
    std::fs::write(&broken, b"%PDF-1.5 this is not a pdf").unwrap();

    let controller = Controller::with_config(fast_config("fr")).unwrap();
    let result = controller
        .run_with(&MockTranslator::working(), &LopdfExtractor::new(), &broken, dir.path(), false)
        .await;

    assert!(result.is_err());
    assert!(!FileManager::file_exists(dir.path().join("translated_broken.pdf")));
}
