/*!
 * Overlay rendering: placement, drawing and fonts.
 */

pub use self::canvas::{DrawOp, EncodedCanvas, OverlayCanvas, TextAlign};
pub use self::font::{EmbeddedFont, FontRegistry, GlyphUsage, OverlayFont};
pub use self::layout::{LayoutOutcome, OverlayLayoutEngine};

pub mod canvas;
pub mod font;
pub mod layout;
