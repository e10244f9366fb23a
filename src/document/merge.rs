/*!
 * Merging overlay canvases onto existing pages.
 *
 * A merge either fully succeeds or leaves the page exactly as it was: the
 * page object is snapshotted first, and on error the snapshot is restored
 * and every object added during the attempt is removed again.
 */

use log::{debug, warn};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::errors::DocumentError;
use crate::overlay::canvas::OverlayCanvas;
use crate::overlay::font::{FontRegistry, OverlayFont};

use super::pdf::PdfDocument;

/// Resource name of the overlay font on every merged page
pub const OVERLAY_FONT_RESOURCE: &str = "PgOverlayFont";

/// What happened to a page during a merge
#[derive(Debug)]
pub enum MergeOutcome {
    /// The overlay was appended to the page
    Merged,
    /// Nothing to draw, page untouched
    Empty,
    /// The merge failed and the page was restored
    RolledBack(DocumentError),
}

impl MergeOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self, Self::Merged)
    }
}

/// Appends overlay canvases to pages of one document
#[derive(Debug)]
pub struct PageMerger {
    font: OverlayFont,
    registry: FontRegistry,
}

impl PageMerger {
    pub fn new(font: OverlayFont) -> Self {
        Self {
            font,
            registry: FontRegistry::new(),
        }
    }

    pub fn font(&self) -> &OverlayFont {
        &self.font
    }

    /// Merge a canvas onto a page. Never fails: errors roll the page back.
    pub fn merge(&mut self, doc: &mut PdfDocument, page_index: usize, canvas: &OverlayCanvas) -> MergeOutcome {
        if canvas.is_empty() {
            return MergeOutcome::Empty;
        }

        let page_id = match doc.page_id(page_index) {
            Ok(id) => id,
            Err(e) => return MergeOutcome::RolledBack(e),
        };

        let inner = doc.inner_mut();
        let snapshot = inner.objects.get(&page_id).cloned();
        let max_id_before = inner.max_id;

        match self.try_merge(inner, page_id, canvas) {
            Ok(()) => {
                debug!("Merged overlay onto page {}", page_index + 1);
                MergeOutcome::Merged
            }
            Err(e) => {
                warn!("Merge failed on page {}, restoring original page: {}", page_index + 1, e);
                if let Some(original) = snapshot {
                    inner.objects.insert(page_id, original);
                }
                inner.objects.retain(|id, _| id.0 <= max_id_before);
                inner.max_id = max_id_before;
                self.registry.discard_after(max_id_before);
                MergeOutcome::RolledBack(e)
            }
        }
    }

    fn try_merge(&mut self, doc: &mut Document, page_id: ObjectId, canvas: &OverlayCanvas) -> Result<(), DocumentError> {
        // Read everything needed from the page before adding objects
        let page = doc.get_dictionary(page_id)?;
        let existing_contents = page
            .get(b"Contents")
            .ok()
            .map(|contents| content_parts(doc, contents));
        let mut resources = page_resources(doc, page_id);

        let encoded = canvas.encode(&self.font, OVERLAY_FONT_RESOURCE);
        let font_id = self.registry.register(doc, &self.font, &encoded.glyphs);

        let mut fonts = resource_category(doc, &resources, b"Font");
        fonts.set(OVERLAY_FONT_RESOURCE, font_id);
        resources.set("Font", fonts);

        let mut states = resource_category(doc, &resources, b"ExtGState");
        for (name, opacity) in &encoded.graphics_states {
            states.set(
                name.as_str(),
                dictionary! {
                    "Type" => "ExtGState",
                    "ca" => Object::Real(*opacity as f32),
                    "CA" => Object::Real(*opacity as f32),
                },
            );
        }
        if !states.is_empty() {
            resources.set("ExtGState", states);
        }

        // Isolate the original content's graphics state from the overlay
        let mut operations = Vec::with_capacity(encoded.operations.len() + 1);
        let wraps_existing = existing_contents.is_some();
        if wraps_existing {
            operations.push(Operation::new("Q", vec![]));
        }
        operations.extend(encoded.operations);
        // Leading newline keeps `Q` separate when streams are concatenated
        let mut overlay_bytes = b"\n".to_vec();
        overlay_bytes.extend(
            Content { operations }
                .encode()
                .map_err(|e| DocumentError::Content(format!("Failed to encode overlay: {}", e)))?,
        );
        let overlay_id = doc.add_object(Stream::new(Dictionary::new(), overlay_bytes));

        let contents = match existing_contents {
            Some(existing) => {
                let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
                let mut parts = vec![Object::Reference(save_id)];
                parts.extend(existing);
                parts.push(Object::Reference(overlay_id));
                Object::Array(parts)
            }
            None => Object::Reference(overlay_id),
        };

        let page = doc.get_dictionary_mut(page_id)?;
        page.set("Contents", contents);
        page.set("Resources", resources);
        Ok(())
    }
}

/// Content streams of a page's `Contents`, with an indirect array spliced in
fn content_parts(doc: &Document, contents: &Object) -> Vec<Object> {
    match contents {
        Object::Array(items) => items.clone(),
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![contents.clone()],
        },
        other => vec![other.clone()],
    }
}

/// The page's resources, inherited if needed, as an owned dictionary
fn page_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    let mut current = doc.get_dictionary(page_id).ok();
    for _ in 0..10 {
        let Some(dict) = current else { break };
        if let Ok(resources) = dict.get(b"Resources") {
            return resolve_dictionary(doc, resources).unwrap_or_default();
        }
        current = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .ok();
    }
    Dictionary::new()
}

/// A resource sub-dictionary such as `Font`, resolved and owned
fn resource_category(doc: &Document, resources: &Dictionary, key: &[u8]) -> Dictionary {
    resources
        .get(key)
        .ok()
        .and_then(|obj| resolve_dictionary(doc, obj))
        .unwrap_or_default()
}

fn resolve_dictionary(doc: &Document, obj: &Object) -> Option<Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict.clone()),
        Object::Reference(id) => doc.get_dictionary(*id).ok().cloned(),
        _ => None,
    }
}
