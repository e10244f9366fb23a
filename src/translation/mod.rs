/*!
 * Text preparation and translation.
 *
 * - `normalizer`: cleaning of extracted text and notation exclusion
 * - `core`: the translation backend seam and the configured service
 * - `batch`: ordered batching with bounded retry
 * - `script`: shaping and display conventions of the target script
 */

pub use self::batch::{BatchOutcome, RetryPolicy, TranslationBatcher};
pub use self::core::{TextTranslator, TranslationService};
pub use self::normalizer::TextNormalizer;
pub use self::script::{BidiShaper, ScriptPostProcessor, Shaper};

pub mod batch;
pub mod core;
pub mod normalizer;
pub mod script;
