/*!
 * Page text extraction.
 *
 * Extractors report raw fragments for one page. Positions are converted to
 * the top-left page frame used by the rest of the pipeline.
 */

use log::{debug, warn};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::errors::DocumentError;

use super::model::{BoundingBox, Fragment, PageSize};
use super::pdf::{PdfDocument, object_number};

/// Average glyph advance as a fraction of the font size, for bbox estimates
const GLYPH_WIDTH_FACTOR: f64 = 0.5;

/// Line height used by the plain-text fallback
const FALLBACK_LINE_HEIGHT: f64 = 14.0;

/// A fragment as reported by an extractor, typed or as a raw record
#[derive(Debug, Clone, PartialEq)]
pub enum RawFragment {
    Typed(Fragment),
    Record(Value),
}

/// Source of raw text fragments for a page
pub trait FragmentSource {
    fn page_fragments(&self, doc: &PdfDocument, page_index: usize) -> Result<Vec<RawFragment>, DocumentError>;
}

/// Extracts fragments by interpreting the page content stream
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl LopdfExtractor {
    pub fn new() -> Self {
        Self
    }

    fn content_fragments(&self, doc: &PdfDocument, page_index: usize) -> Result<Vec<Fragment>, DocumentError> {
        let page_id = doc.page_id(page_index)?;
        let size = doc.page_size(page_index)?;
        let inner = doc.inner();

        let bytes = inner
            .get_page_content(page_id)
            .map_err(|e| DocumentError::Content(format!("page {}: {}", page_index + 1, e)))?;
        let content = Content::decode(&bytes)
            .map_err(|e| DocumentError::Content(format!("page {}: {}", page_index + 1, e)))?;
        let fonts = inner.get_page_fonts(page_id).unwrap_or_default();

        Ok(TextInterpreter::new(inner, &fonts, size).run(&content))
    }

    /// One fragment per line of the document's plain-text extraction
    fn plain_text_fragments(&self, doc: &PdfDocument, page_index: usize) -> Result<Vec<Fragment>, DocumentError> {
        let size = doc.page_size(page_index)?;
        let text = doc.inner().extract_text(&[page_index as u32 + 1])?;

        let mut fragments = Vec::new();
        let mut y = FALLBACK_LINE_HEIGHT + 10.0;
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if y > size.height {
                break;
            }
            let bbox = BoundingBox::new(10.0, y - FALLBACK_LINE_HEIGHT, (size.width - 10.0).max(10.0), y);
            fragments.push(Fragment::new(line, bbox));
            y += FALLBACK_LINE_HEIGHT;
        }
        Ok(fragments)
    }
}

impl FragmentSource for LopdfExtractor {
    fn page_fragments(&self, doc: &PdfDocument, page_index: usize) -> Result<Vec<RawFragment>, DocumentError> {
        let fragments = match self.content_fragments(doc, page_index) {
            Ok(fragments) if !fragments.is_empty() => fragments,
            Ok(_) => {
                debug!("No positioned text on page {}, trying plain extraction", page_index + 1);
                self.plain_text_fragments(doc, page_index)?
            }
            Err(e) => {
                warn!("Content stream of page {} unreadable ({}), trying plain extraction", page_index + 1, e);
                self.plain_text_fragments(doc, page_index)?
            }
        };
        Ok(fragments.into_iter().map(RawFragment::Typed).collect())
    }
}

/// Reads fragment records from a JSON file: an array of pages, each an array of records
#[derive(Debug, Clone, Default)]
pub struct JsonFragmentSource {
    pages: Vec<Vec<Value>>,
}

impl JsonFragmentSource {
    pub fn from_pages(pages: Vec<Vec<Value>>) -> Self {
        Self { pages }
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let Value::Array(pages) = value else {
            return Err(DocumentError::Load("fragment file must hold an array of pages".to_string()));
        };
        let pages = pages
            .into_iter()
            .map(|page| match page {
                Value::Array(records) => Ok(records),
                _ => Err(DocumentError::Load("each page must be an array of records".to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { pages })
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let text = fs::read_to_string(path)
            .map_err(|e| DocumentError::Load(format!("{}: {}", path.display(), e)))?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| DocumentError::Load(format!("{}: {}", path.display(), e)))?;
        Self::from_value(value)
    }
}

impl FragmentSource for JsonFragmentSource {
    fn page_fragments(&self, _doc: &PdfDocument, page_index: usize) -> Result<Vec<RawFragment>, DocumentError> {
        Ok(self
            .pages
            .get(page_index)
            .map(|records| records.iter().cloned().map(RawFragment::Record).collect())
            .unwrap_or_default())
    }
}

/// Text state tracked while walking a content stream
struct TextInterpreter<'a> {
    doc: &'a Document,
    fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>,
    page: PageSize,
    font_name: Vec<u8>,
    font_size: f64,
    leading: f64,
    /// Text matrix as `[a, b, c, d, e, f]`
    matrix: [f64; 6],
    line_matrix: [f64; 6],
    /// Current transformation matrix and its `q`/`Q` save stack
    ctm: [f64; 6],
    saved_ctm: Vec<[f64; 6]>,
    fragments: Vec<Fragment>,
}

const IDENTITY: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

impl<'a> TextInterpreter<'a> {
    fn new(doc: &'a Document, fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>, page: PageSize) -> Self {
        Self {
            doc,
            fonts,
            page,
            font_name: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
            matrix: IDENTITY,
            line_matrix: IDENTITY,
            ctm: IDENTITY,
            saved_ctm: Vec::new(),
            fragments: Vec::new(),
        }
    }

    fn run(mut self, content: &Content) -> Vec<Fragment> {
        for op in &content.operations {
            let number = |i: usize| op.operands.get(i).and_then(object_number);
            match op.operator.as_str() {
                "q" => self.saved_ctm.push(self.ctm),
                "Q" => self.ctm = self.saved_ctm.pop().unwrap_or(IDENTITY),
                "cm" => {
                    let values: Vec<f64> = (0..6).filter_map(number).collect();
                    if let Ok(matrix) = <[f64; 6]>::try_from(values) {
                        self.ctm = multiply(&matrix, &self.ctm);
                    }
                }
                "BT" => {
                    self.matrix = IDENTITY;
                    self.line_matrix = IDENTITY;
                }
                "Tf" => {
                    if let Some(Object::Name(name)) = op.operands.first() {
                        self.font_name = name.clone();
                    }
                    self.font_size = number(1).unwrap_or(self.font_size);
                }
                "TL" => self.leading = number(0).unwrap_or(self.leading),
                "Td" => self.move_line(number(0).unwrap_or(0.0), number(1).unwrap_or(0.0)),
                "TD" => {
                    let ty = number(1).unwrap_or(0.0);
                    self.leading = -ty;
                    self.move_line(number(0).unwrap_or(0.0), ty);
                }
                "Tm" => {
                    let values: Vec<f64> = (0..6).filter_map(number).collect();
                    if let Ok(matrix) = <[f64; 6]>::try_from(values) {
                        self.matrix = matrix;
                        self.line_matrix = matrix;
                    }
                }
                "T*" => self.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        let text = self.decode(bytes);
                        self.show(text);
                    }
                }
                "'" => {
                    self.next_line();
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        let text = self.decode(bytes);
                        self.show(text);
                    }
                }
                "\"" => {
                    self.next_line();
                    if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                        let text = self.decode(bytes);
                        self.show(text);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        let text = self.decode_array(items);
                        self.show(text);
                    }
                }
                _ => {}
            }
        }
        self.fragments
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        let [a, b, c, d, e, f] = self.line_matrix;
        self.line_matrix = [a, b, c, d, e + tx * a + ty * c, f + tx * b + ty * d];
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 { self.leading } else { self.font_size * 1.2 };
        self.move_line(0.0, -leading);
    }

    /// Large negative TJ adjustments separate words
    fn decode_array(&self, items: &[Object]) -> String {
        let mut text = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let decoded = self.decode(bytes);
                    text.push_str(&decoded);
                }
                other => {
                    if let Some(adjustment) = object_number(other) {
                        if -adjustment > 200.0 && !text.is_empty() && !text.ends_with(' ') {
                            text.push(' ');
                        }
                    }
                }
            }
        }
        text
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let encoding = self
            .fonts
            .get(&self.font_name)
            .and_then(|font| font.get_font_encoding(self.doc).ok());

        match encoding {
            Some(ref encoding) => Document::decode_text(encoding, bytes).unwrap_or_else(|_| decode_text_simple(bytes)),
            None => decode_text_simple(bytes),
        }
    }

    /// Record a fragment at the current position and advance past it
    fn show(&mut self, text: String) {
        let [a, b, c, d, e, f] = multiply(&self.matrix, &self.ctm);
        let scale_x = (a * a + b * b).sqrt().max(f64::EPSILON);
        let scale_y = (c * c + d * d).sqrt().max(f64::EPSILON);
        let advance = text.chars().count() as f64 * self.font_size.abs() * GLYPH_WIDTH_FACTOR;
        let size = self.font_size.abs() * scale_y;

        if !text.trim().is_empty() {
            let (x, baseline) = self.page.to_page_frame(e, f);
            let top = baseline - size;
            let bbox = BoundingBox::new(x, top, x + advance * scale_x, top + size);
            let fontname = String::from_utf8_lossy(&self.font_name).to_string();
            self.fragments.push(Fragment::new(text, bbox).with_font(fontname, size));
        }

        // Advance in text space along the text matrix's x axis
        self.matrix[4] += advance * self.matrix[0];
        self.matrix[5] += advance * self.matrix[1];
    }
}

/// Matrix product `m × n` in PDF's row-vector convention
fn multiply(m: &[f64; 6], n: &[f64; 6]) -> [f64; 6] {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

/// Decode string bytes without a font encoding: UTF-16BE with BOM, UTF-8, then Latin-1
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
