/*!
 * PDF document access.
 *
 * `PdfDocument` owns the parsed `lopdf::Document` for the whole run and is
 * dropped, releasing the file data, when the run ends on any path.
 */

use log::debug;
use lopdf::{Document, Object, ObjectId};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::errors::DocumentError;

use super::model::PageSize;

/// How far up the page tree inherited attributes are looked for
const MAX_INHERITANCE_DEPTH: usize = 10;

/// A loaded PDF with its pages in document order
pub struct PdfDocument {
    doc: Document,
    pages: Vec<ObjectId>,
    source: Option<PathBuf>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("pages", &self.pages.len())
            .field("source", &self.source)
            .finish()
    }
}

impl PdfDocument {
    /// Open and parse a PDF file
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let doc = Document::load(path)
            .map_err(|e| DocumentError::Load(format!("{}: {}", path.display(), e)))?;
        let mut document = Self::from_document(doc);
        document.source = Some(path.to_path_buf());
        debug!("Loaded {} with {} pages", path.display(), document.page_count());
        Ok(document)
    }

    /// Wrap an in-memory document
    pub fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self { doc, pages, source: None }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Object id of a zero-based page index
    pub fn page_id(&self, page_index: usize) -> Result<ObjectId, DocumentError> {
        self.pages
            .get(page_index)
            .copied()
            .ok_or(DocumentError::PageNotFound(page_index as u32 + 1))
    }

    pub fn inner(&self) -> &Document {
        &self.doc
    }

    pub fn inner_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Page size from the MediaBox, inherited through the page tree.
    ///
    /// Pages without a usable MediaBox are treated as US Letter.
    pub fn page_size(&self, page_index: usize) -> Result<PageSize, DocumentError> {
        let page_id = self.page_id(page_index)?;
        let media_box = self
            .inherited_attribute(page_id, b"MediaBox")
            .and_then(|obj| self.number_array(obj))
            .filter(|values| values.len() == 4);

        Ok(match media_box {
            Some(v) => {
                let size = PageSize::new((v[2] - v[0]).abs(), (v[3] - v[1]).abs())
                    .with_origin(v[0].min(v[2]), v[1].min(v[3]));
                if size.width > 0.0 && size.height > 0.0 { size } else { PageSize::letter() }
            }
            None => PageSize::letter(),
        })
    }

    /// Look up a page attribute, following Parent links
    pub fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = current.get(key) {
                return Some(value);
            }
            let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
            current = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn number_array(&self, obj: &Object) -> Option<Vec<f64>> {
        let array = match obj {
            Object::Array(items) => items,
            Object::Reference(id) => self.doc.get_object(*id).ok()?.as_array().ok()?,
            _ => return None,
        };
        array.iter().map(object_number).collect()
    }

    /// Write the document to `path`, replacing it atomically
    pub fn save(&mut self, path: &Path) -> Result<(), DocumentError> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut file = NamedTempFile::new_in(parent)
            .map_err(|e| DocumentError::Save(format!("Failed to create temporary file: {}", e)))?;
        self.doc
            .save_to(&mut file)
            .map_err(|e| DocumentError::Save(format!("Failed to write PDF: {}", e)))?;
        file.flush()
            .map_err(|e| DocumentError::Save(format!("Failed to flush PDF: {}", e)))?;
        file.persist(path)
            .map_err(|e| DocumentError::Save(format!("Failed to move PDF into place: {}", e)))?;

        debug!("Saved {} pages to {}", self.page_count(), path.display());
        Ok(())
    }
}

/// Numeric value of an integer or real object
pub fn object_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}
