/*!
 * Page-sized overlay canvas.
 *
 * Draw operations are recorded in the top-left page frame used by layout and
 * turned into PDF content operators only when the canvas is merged. The y
 * axis is flipped at that point (`pdf_y = page_height - y`), and the whole
 * drawing is translated to the MediaBox origin.
 */

use lopdf::Object;
use lopdf::content::Operation;

use crate::document::model::PageSize;

use super::font::{GlyphUsage, OverlayFont};

/// Horizontal alignment of a text run inside its box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
}

/// One recorded drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Filled rectangle
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        gray: f64,
        opacity: f64,
    },
    /// Lines of text inside a box whose top-left corner is `(x, y)`
    Text {
        x: f64,
        y: f64,
        width: f64,
        lines: Vec<String>,
        font_size: f64,
        line_height: f64,
        align: TextAlign,
    },
    /// Stroked straight line
    Line {
        from: (f64, f64),
        to: (f64, f64),
        width: f64,
        gray: f64,
        opacity: f64,
    },
}

/// Content operators plus the resources they reference
#[derive(Debug, Default)]
pub struct EncodedCanvas {
    pub operations: Vec<Operation>,
    /// `(name, opacity)` pairs for ExtGState resources
    pub graphics_states: Vec<(String, f64)>,
    pub glyphs: GlyphUsage,
}

/// Transient render target sized to one page
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayCanvas {
    size: PageSize,
    ops: Vec<DrawOp>,
}

impl OverlayCanvas {
    pub fn new(size: PageSize) -> Self {
        Self { size, ops: Vec::new() }
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, gray: f64, opacity: f64) {
        self.ops.push(DrawOp::Rect { x, y, width, height, gray, opacity });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_text(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        lines: Vec<String>,
        font_size: f64,
        line_height: f64,
        align: TextAlign,
    ) {
        self.ops.push(DrawOp::Text { x, y, width, lines, font_size, line_height, align });
    }

    pub fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, gray: f64, opacity: f64) {
        self.ops.push(DrawOp::Line { from, to, width, gray, opacity });
    }

    /// Encode into PDF operators using `font_resource` as the font name
    pub fn encode(&self, font: &OverlayFont, font_resource: &str) -> EncodedCanvas {
        let mut encoded = EncodedCanvas::default();
        let height = self.size.height;

        encoded.operations.push(Operation::new("q", vec![]));
        let (origin_x, origin_y) = self.size.origin;
        if origin_x != 0.0 || origin_y != 0.0 {
            encoded.operations.push(Operation::new(
                "cm",
                vec![real(1.0), real(0.0), real(0.0), real(1.0), real(origin_x), real(origin_y)],
            ));
        }

        for op in &self.ops {
            match op {
                DrawOp::Rect { x, y, width, height: h, gray, opacity } => {
                    let state = graphics_state(&mut encoded.graphics_states, *opacity);
                    let ops = &mut encoded.operations;
                    ops.push(Operation::new("q", vec![]));
                    ops.push(Operation::new("gs", vec![Object::Name(state.into_bytes())]));
                    ops.push(Operation::new("g", vec![real(*gray)]));
                    ops.push(Operation::new(
                        "re",
                        vec![real(*x), real(height - y - h), real(*width), real(*h)],
                    ));
                    ops.push(Operation::new("f", vec![]));
                    ops.push(Operation::new("Q", vec![]));
                }
                DrawOp::Text { x, y, width, lines, font_size, line_height, align } => {
                    encoded.operations.push(Operation::new("q", vec![]));
                    encoded.operations.push(Operation::new("g", vec![real(0.0)]));
                    for (index, line) in lines.iter().enumerate() {
                        let baseline = y + index as f64 * line_height + font_size;
                        let measured = font.text_width(line, *font_size);
                        // Squeeze runs the estimate underrated so they stay inside the box
                        let scale = if measured > *width && measured > 0.0 { width / measured * 100.0 } else { 100.0 };
                        let drawn = measured * scale / 100.0;
                        let line_x = match align {
                            TextAlign::Left => *x,
                            TextAlign::Right => x + width - drawn,
                        };

                        let text = font.encode(line, &mut encoded.glyphs);
                        let ops = &mut encoded.operations;
                        ops.push(Operation::new("BT", vec![]));
                        ops.push(Operation::new(
                            "Tf",
                            vec![Object::Name(font_resource.as_bytes().to_vec()), real(*font_size)],
                        ));
                        ops.push(Operation::new("Tz", vec![real(scale)]));
                        ops.push(Operation::new("Td", vec![real(line_x), real(height - baseline)]));
                        ops.push(Operation::new("Tj", vec![text]));
                        ops.push(Operation::new("ET", vec![]));
                    }
                    encoded.operations.push(Operation::new("Q", vec![]));
                }
                DrawOp::Line { from, to, width, gray, opacity } => {
                    let state = graphics_state(&mut encoded.graphics_states, *opacity);
                    let ops = &mut encoded.operations;
                    ops.push(Operation::new("q", vec![]));
                    ops.push(Operation::new("gs", vec![Object::Name(state.into_bytes())]));
                    ops.push(Operation::new("G", vec![real(*gray)]));
                    ops.push(Operation::new("w", vec![real(*width)]));
                    ops.push(Operation::new("m", vec![real(from.0), real(height - from.1)]));
                    ops.push(Operation::new("l", vec![real(to.0), real(height - to.1)]));
                    ops.push(Operation::new("S", vec![]));
                    ops.push(Operation::new("Q", vec![]));
                }
            }
        }

        encoded.operations.push(Operation::new("Q", vec![]));
        encoded
    }
}

/// Name of the ExtGState for an opacity, registering it on first use
fn graphics_state(states: &mut Vec<(String, f64)>, opacity: f64) -> String {
    let opacity = opacity.clamp(0.0, 1.0);
    if let Some((name, _)) = states.iter().find(|(_, o)| (o - opacity).abs() < 1e-6) {
        return name.clone();
    }
    let name = format!("PgGS{}", states.len());
    states.push((name.clone(), opacity));
    name
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}
