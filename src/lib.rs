/*!
 * # PageGlot - translation overlays for PDF pages
 *
 * A Rust library that extracts the text of PDF pages, translates it with a
 * configurable backend and draws the translations next to the original text.
 * The source content of every page is kept intact; overlays are appended.
 *
 * ## Features
 *
 * - Text extraction from page content streams, with a plain-text fallback
 * - Translation through LibreTranslate or a local Ollama server, with
 *   bounded retries and chunking of long texts
 * - Arabic shaping and bidirectional reordering for right-to-left targets
 * - Collision-free placement of translated text with connector lines
 * - Embedded TrueType fonts, falling back to Helvetica
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management
 * - `validation`: Acceptance of raw extractor fragments
 * - `translation`: Cleaning, batching/retrying and script post-processing
 * - `overlay`: Layout, drawing operations and fonts
 * - `document`: PDF loading, extraction and page merging
 * - `page_processor`: The per-page pipeline
 * - `app_controller`: Whole-document runs
 * - `providers`: Translation backend clients
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language codes and script profiles
 * - `errors`: Custom error types for the application
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod overlay;
pub mod page_processor;
pub mod providers;
pub mod translation;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, DocumentReport};
pub use document::{PdfDocument, TextBlock, TranslatedBlock};
pub use errors::{AppError, DocumentError, LayoutError, ProviderError, ShapingError, TranslationError};
pub use language_utils::{ScriptProfile, get_language_name, language_codes_match, normalize_to_part2t};
pub use page_processor::{PageOutcome, PageProcessor, PageReport, UnchangedReason};
pub use translation::{TextTranslator, TranslationService};
