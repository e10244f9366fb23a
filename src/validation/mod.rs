/*!
 * Validation of raw extractor output.
 *
 * - `fragment`: accepts or rejects raw text fragments before they enter the pipeline
 */

pub mod fragment;

// Re-export main types
pub use fragment::{FragmentValidator, Rejection};
