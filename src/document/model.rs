/*!
 * Core page model types for the translation-overlay pipeline.
 *
 * A page flows through these types in order:
 * `Fragment` (raw extractor output) -> `TextBlock` (validated and cleaned)
 * -> `TranslatedBlock` (translated and shaped) -> `Placement` (rectangle on the page).
 *
 * All coordinates live in the extractor's page frame: origin at the top-left
 * corner, x growing right, y growing down. The overlay encoder flips y when it
 * writes PDF operators.
 */

use serde::{Deserialize, Serialize};

/// Raw text unit reported by a page extractor.
///
/// Every field is optional because extractors disagree on what they report;
/// `FragmentValidator` decides whether the record is usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Text content
    #[serde(default)]
    pub text: Option<String>,

    /// Bounding box as `[x0, y0, x1, y1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    /// Separate coordinate fields, used when `bbox` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,

    /// Font resource name, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fontname: Option<String>,

    /// Font size, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

impl Fragment {
    /// Create a fragment with text and a full bounding box
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: Some(text.into()),
            bbox: Some(vec![bbox.x0, bbox.y0, bbox.x1, bbox.y1]),
            ..Default::default()
        }
    }

    /// Attach font information
    pub fn with_font(mut self, fontname: impl Into<String>, size: f64) -> Self {
        self.fontname = Some(fontname.into());
        self.size = Some(size);
        self
    }
}

/// Axis-aligned rectangle given by two corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Build from coordinates, returning `None` unless all are finite and ordered
    pub fn checked(x0: f64, y0: f64, x1: f64, y1: f64) -> Option<Self> {
        let finite = [x0, y0, x1, y1].iter().all(|v| v.is_finite());
        if finite && x0 <= x1 && y0 <= y1 {
            Some(Self { x0, y0, x1, y1 })
        } else {
            None
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }
}

/// Validated, cleaned fragment ready for translation
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub bbox: BoundingBox,
    pub page_index: usize,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, bbox: BoundingBox, page_index: usize) -> Self {
        Self {
            text: text.into(),
            bbox,
            page_index,
        }
    }
}

/// Translated and shaped text tied back to its source position
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedBlock {
    /// Display-ready text, never empty
    pub translated_text: String,
    pub original_text: String,
    /// Bounding box of the source block
    pub bbox: BoundingBox,
    pub page_index: usize,
}

/// Rectangle assigned to one translated block for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Open-rectangle intersection: touching edges do not overlap
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
    /// Lower-left corner of the MediaBox in PDF user space
    pub origin: (f64, f64),
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            origin: (0.0, 0.0),
        }
    }

    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin = (x, y);
        self
    }

    /// Convert a PDF user-space point to the top-left page frame
    pub fn to_page_frame(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.origin.0, self.height - (y - self.origin.1))
    }

    /// US Letter, used when a page declares no usable MediaBox
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }
}
