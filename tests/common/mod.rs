/*!
 * Common test utilities for the pageglot test suite
 */

use anyhow::Result;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use pageglot::app_config::Config;
use pageglot::document::PdfDocument;

/// A line of text drawn with Helvetica: `(x, baseline_y, size, text)`, PDF coordinates
pub type TextRun<'a> = (f64, f64, f64, &'a str);

/// Route library logs through the test harness; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Build a Letter-sized document with one page per entry of `pages`
pub fn build_pdf(pages: &[&[TextRun]]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for runs in pages {
        let mut operations = Vec::new();
        for (x, y, size, text) in runs.iter() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), Object::Real(*size as f32)]));
            operations.push(Operation::new("Td", vec![Object::Real(*x as f32), Object::Real(*y as f32)]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let bytes = Content { operations }.encode().unwrap_or_default();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), bytes));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog);
    doc
}

/// Build and save a document, returning its path
pub fn write_pdf(dir: &Path, filename: &str, pages: &[&[TextRun]]) -> Result<PathBuf> {
    let path = dir.join(filename);
    let mut doc = build_pdf(pages);
    doc.save(&path)?;
    Ok(path)
}

/// In-memory document for page-level tests
pub fn pdf_document(pages: &[&[TextRun]]) -> PdfDocument {
    PdfDocument::from_document(build_pdf(pages))
}

/// Config without delays or font lookups, so tests run fast and deterministically
pub fn fast_config(target_language: &str) -> Config {
    let mut config = Config::default();
    config.target_language = target_language.to_string();
    config.translation.common.rate_limit_delay_ms = 0;
    config.translation.common.retry_backoff_ms = 0;
    config.fonts.search_paths.clear();
    config.output.file_log = false;
    config
}

/// A fragment record as an external extractor would report it
pub fn record(text: &str, bbox: [f64; 4]) -> Value {
    json!({ "text": text, "bbox": bbox })
}

/// Content stream operators of a page, in order
pub fn page_operators(doc: &PdfDocument, page_index: usize) -> Vec<String> {
    let Ok(page_id) = doc.page_id(page_index) else {
        return Vec::new();
    };
    doc.inner()
        .get_page_content(page_id)
        .ok()
        .and_then(|bytes| Content::decode(&bytes).ok())
        .map(|content| content.operations.into_iter().map(|op| op.operator).collect())
        .unwrap_or_default()
}
