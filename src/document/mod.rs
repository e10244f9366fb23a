/*!
 * Page documents: the pipeline's data model, PDF access, text extraction
 * and overlay merging.
 */

pub use self::extract::{FragmentSource, JsonFragmentSource, LopdfExtractor, RawFragment};
pub use self::merge::{MergeOutcome, PageMerger};
pub use self::model::{BoundingBox, Fragment, PageSize, Placement, TextBlock, TranslatedBlock};
pub use self::pdf::PdfDocument;

pub mod extract;
pub mod merge;
pub mod model;
pub mod pdf;
