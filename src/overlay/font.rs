/*!
 * Fonts for overlay text.
 *
 * A TrueType font found on the configured search paths is embedded as a
 * Type0 composite font with Identity-H encoding, so shaped Arabic
 * presentation forms can be drawn as two-byte glyph ids. When no usable font
 * is found the standard Helvetica font is used with WinAnsi strings; glyphs
 * outside Latin-1 then render as `?`.
 */

use log::{debug, info, warn};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use ttf_parser::{Face, GlyphId};

use crate::errors::DocumentError;

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' to '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // digits
    278, 278, 584, 584, 584, 556, 1015, // ':' to '@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722, 667,
    611, 722, 667, 944, 667, 667, 611, // 'A' to 'Z'
    278, 278, 278, 469, 556, 333, // '[' to '`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, // 'a' to 'z'
    334, 260, 334, 584, // '{' to '~'
];

const HELVETICA_DEFAULT_WIDTH: u16 = 556;

/// Glyphs drawn with an embedded font, keyed by glyph id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphUsage {
    glyphs: BTreeMap<u16, (char, u16)>,
}

impl GlyphUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, glyph: u16, ch: char, advance: u16) {
        self.glyphs.entry(glyph).or_insert((ch, advance));
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }
}

/// A parsed TrueType font kept as raw bytes
#[derive(Clone)]
pub struct EmbeddedFont {
    name: String,
    data: Vec<u8>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    cap_height: i16,
    bbox: [i16; 4],
}

impl std::fmt::Debug for EmbeddedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedFont")
            .field("name", &self.name)
            .field("bytes", &self.data.len())
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

impl EmbeddedFont {
    /// Load and parse a font file
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let data = fs::read(path)
            .map_err(|e| DocumentError::Load(format!("Failed to read font {}: {}", path.display(), e)))?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("OverlayFont")
            .to_string();
        Self::from_bytes(&name, data)
    }

    /// Parse font bytes, keeping them for embedding
    pub fn from_bytes(name: &str, data: Vec<u8>) -> Result<Self, DocumentError> {
        let face = Face::parse(&data, 0)
            .map_err(|e| DocumentError::Load(format!("Failed to parse font {}: {}", name, e)))?;

        let rect = face.global_bounding_box();
        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();
        let cap_height = face.capital_height().unwrap_or(ascender);

        Ok(Self {
            name: sanitize_font_name(name),
            units_per_em,
            ascender,
            descender,
            cap_height,
            bbox: [rect.x_min, rect.y_min, rect.x_max, rect.y_max],
            data,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }

    fn scale(&self, units: i32) -> i64 {
        (units as f64 * 1000.0 / self.units_per_em.max(1) as f64).round() as i64
    }

    /// Advance width in 1/1000 em for a glyph
    fn advance_milli(&self, advance: u16) -> u16 {
        self.scale(advance as i32).clamp(0, u16::MAX as i64) as u16
    }
}

/// Font used to draw overlay text
#[derive(Debug, Clone)]
pub enum OverlayFont {
    Embedded(EmbeddedFont),
    Helvetica,
}

impl OverlayFont {
    /// Use the first font on the search path that loads, or Helvetica
    pub fn discover(search_paths: &[PathBuf]) -> Self {
        for path in search_paths {
            if !path.is_file() {
                continue;
            }
            match EmbeddedFont::load(path) {
                Ok(font) => {
                    info!("Using overlay font {}", path.display());
                    return Self::Embedded(font);
                }
                Err(e) => warn!("Skipping font {}: {}", path.display(), e),
            }
        }
        warn!("No usable TrueType font found, falling back to Helvetica");
        Self::Helvetica
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }

    /// Width of a text run in points
    pub fn text_width(&self, text: &str, font_size: f64) -> f64 {
        let milli: u64 = match self {
            Self::Embedded(font) => match font.face() {
                Some(face) => text
                    .chars()
                    .map(|c| {
                        let glyph = face.glyph_index(c).unwrap_or(GlyphId(0));
                        font.advance_milli(face.glyph_hor_advance(glyph).unwrap_or(0)) as u64
                    })
                    .sum(),
                None => 0,
            },
            Self::Helvetica => text.chars().map(|c| helvetica_width(c) as u64).sum(),
        };
        milli as f64 / 1000.0 * font_size
    }

    /// Encode a text run as a PDF string object, recording embedded glyphs
    pub fn encode(&self, text: &str, usage: &mut GlyphUsage) -> Object {
        match self {
            Self::Embedded(font) => {
                let Some(face) = font.face() else {
                    return Object::String(Vec::new(), StringFormat::Hexadecimal);
                };
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for c in text.chars() {
                    let glyph = face.glyph_index(c).unwrap_or(GlyphId(0));
                    let advance = font.advance_milli(face.glyph_hor_advance(glyph).unwrap_or(0));
                    usage.record(glyph.0, c, advance);
                    bytes.extend_from_slice(&glyph.0.to_be_bytes());
                }
                Object::String(bytes, StringFormat::Hexadecimal)
            }
            Self::Helvetica => {
                let bytes = text.chars().map(win_ansi_byte).collect();
                Object::String(bytes, StringFormat::Literal)
            }
        }
    }
}

/// Adds overlay font objects to a document.
///
/// The font program and descriptor are written once per document; each
/// page gets its own composite font dictionary carrying that page's widths
/// and ToUnicode map.
#[derive(Debug, Default)]
pub struct FontRegistry {
    descriptor: Option<ObjectId>,
    helvetica: Option<ObjectId>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget cached objects numbered above `max_id`, after a rollback removed them
    pub fn discard_after(&mut self, max_id: u32) {
        self.descriptor = self.descriptor.filter(|id| id.0 <= max_id);
        self.helvetica = self.helvetica.filter(|id| id.0 <= max_id);
    }

    /// Write the font dictionary for one page and return its id
    pub fn register(&mut self, doc: &mut Document, font: &OverlayFont, usage: &GlyphUsage) -> ObjectId {
        match font {
            OverlayFont::Helvetica => *self.helvetica.get_or_insert_with(|| {
                doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                    "Encoding" => "WinAnsiEncoding",
                })
            }),
            OverlayFont::Embedded(embedded) => {
                let descriptor = *self
                    .descriptor
                    .get_or_insert_with(|| add_descriptor(doc, embedded));
                add_composite_font(doc, embedded, descriptor, usage)
            }
        }
    }
}

fn add_descriptor(doc: &mut Document, font: &EmbeddedFont) -> ObjectId {
    debug!("Embedding font program {} ({} bytes)", font.name, font.data.len());

    let mut program = Stream::new(
        dictionary! { "Length1" => font.data.len() as i64 },
        font.data.clone(),
    );
    // An uncompressed program is still valid
    if let Err(e) = program.compress() {
        debug!("Keeping font program {} uncompressed: {}", font.name, e);
    }
    let program_id = doc.add_object(program);

    let bbox: Vec<Object> = font.bbox.iter().map(|v| Object::Integer(font.scale(*v as i32))).collect();

    doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(font.name.as_bytes().to_vec()),
        "Flags" => 32,
        "FontBBox" => bbox,
        "ItalicAngle" => 0,
        "Ascent" => font.scale(font.ascender as i32),
        "Descent" => font.scale(font.descender as i32),
        "CapHeight" => font.scale(font.cap_height as i32),
        "StemV" => 80,
        "FontFile2" => program_id,
    })
}

fn add_composite_font(doc: &mut Document, font: &EmbeddedFont, descriptor: ObjectId, usage: &GlyphUsage) -> ObjectId {
    let mut widths = Vec::with_capacity(usage.len() * 2);
    for (glyph, (_, advance)) in &usage.glyphs {
        widths.push(Object::Integer(*glyph as i64));
        widths.push(Object::Array(vec![Object::Integer(*advance as i64)]));
    }

    let cid_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => Object::Name(font.name.as_bytes().to_vec()),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor,
        "DW" => 1000,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });

    let to_unicode = doc.add_object(Stream::new(Dictionary::new(), to_unicode_cmap(usage).into_bytes()));

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => Object::Name(font.name.as_bytes().to_vec()),
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font)],
        "ToUnicode" => to_unicode,
    })
}

/// ToUnicode CMap mapping two-byte glyph codes back to characters
fn to_unicode_cmap(usage: &GlyphUsage) -> String {
    let entries: Vec<(u16, char)> = usage.glyphs.iter().map(|(g, (c, _))| (*g, *c)).collect();

    let mut out = String::new();
    out.push_str("/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n");
    out.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
    out.push_str("/CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n");
    out.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

    for chunk in entries.chunks(100) {
        out.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (glyph, ch) in chunk {
            let mut units = [0u16; 2];
            let hex: String = ch.encode_utf16(&mut units).iter().map(|u| format!("{:04X}", u)).collect();
            out.push_str(&format!("<{:04X}> <{}>\n", glyph, hex));
        }
        out.push_str("endbfchar\n");
    }

    out.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    out
}

fn helvetica_width(c: char) -> u16 {
    match c as u32 {
        code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
        _ => HELVETICA_DEFAULT_WIDTH,
    }
}

fn win_ansi_byte(c: char) -> u8 {
    match c as u32 {
        code @ (32..=126 | 0xA0..=0xFF) => code as u8,
        _ => b'?',
    }
}

/// PDF names may not contain whitespace or delimiters
fn sanitize_font_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() { "OverlayFont".to_string() } else { cleaned }
}
