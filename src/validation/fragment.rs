/*!
 * Fragment validation.
 *
 * Turns raw extractor records into `TextBlock`s, or explains why a record
 * was rejected. Validation is pure: nothing is logged or mutated here, the
 * caller decides what to do with a rejection.
 */

use serde_json::Value;
use thiserror::Error;

use crate::document::model::{BoundingBox, Fragment, TextBlock};

/// Reason a fragment was not accepted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    /// The record is not a key/value object
    #[error("fragment is not a record")]
    NotARecord,

    /// No text field
    #[error("fragment has no text")]
    MissingText,

    /// Text is empty after trimming
    #[error("fragment text is blank")]
    BlankText,

    /// Neither a bbox nor the four coordinate fields are present
    #[error("fragment has no bounding box")]
    MissingBbox,

    /// The bbox is not four ordered, finite numbers
    #[error("fragment bounding box is invalid: {0}")]
    InvalidBbox(String),
}

/// Validates raw fragments into text blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentValidator;

impl FragmentValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a typed fragment.
    ///
    /// When `bbox` is absent the box is synthesized once from
    /// `x0`/`top`/`x1`/`bottom` and re-checked; there is no second repair.
    pub fn validate(&self, fragment: &Fragment, page_index: usize) -> Result<TextBlock, Rejection> {
        let text = fragment.text.as_deref().ok_or(Rejection::MissingText)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(Rejection::BlankText);
        }

        let bbox = match &fragment.bbox {
            Some(values) => Self::check_bbox(values)?,
            None => {
                let repaired = Self::synthesize_bbox(fragment).ok_or(Rejection::MissingBbox)?;
                Self::check_bbox(&repaired)?
            }
        };

        Ok(TextBlock::new(text, bbox, page_index))
    }

    /// Validate an untyped record as produced by an external extractor.
    pub fn validate_value(&self, record: &Value, page_index: usize) -> Result<TextBlock, Rejection> {
        let object = record.as_object().ok_or(Rejection::NotARecord)?;

        let text = match object.get("text") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(Rejection::MissingText),
        };

        let bbox = match object.get("bbox") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => {
                let numbers: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
                Some(numbers.ok_or_else(|| Rejection::InvalidBbox("non-numeric coordinate".to_string()))?)
            }
            Some(_) => return Err(Rejection::InvalidBbox("bbox is not an array".to_string())),
        };

        let coordinate = |key: &str| object.get(key).and_then(Value::as_f64);

        let fragment = Fragment {
            text,
            bbox,
            x0: coordinate("x0"),
            top: coordinate("top"),
            x1: coordinate("x1"),
            bottom: coordinate("bottom"),
            fontname: object.get("fontname").and_then(Value::as_str).map(str::to_string),
            size: coordinate("size"),
        };

        self.validate(&fragment, page_index)
    }

    fn synthesize_bbox(fragment: &Fragment) -> Option<Vec<f64>> {
        Some(vec![fragment.x0?, fragment.top?, fragment.x1?, fragment.bottom?])
    }

    fn check_bbox(values: &[f64]) -> Result<BoundingBox, Rejection> {
        match values {
            [x0, y0, x1, y1] => BoundingBox::checked(*x0, *y0, *x1, *y1).ok_or_else(|| {
                Rejection::InvalidBbox(format!("({}, {}, {}, {}) is not ordered", x0, y0, x1, y1))
            }),
            _ => Err(Rejection::InvalidBbox(format!("expected 4 coordinates, got {}", values.len()))),
        }
    }
}
