/*!
 * Greedy overlay placement.
 *
 * Each translated block is placed just above its source text, then pushed
 * down the page, and across to new columns, until it no longer intersects an
 * earlier placement. Text size is estimated from character counts, so layout
 * never depends on font metrics and never fails for lack of them.
 *
 * When a block fits neither in any row of the current column nor in a new
 * column, it is forced to the top-left corner. That forced placement is the
 * only case where two placements may overlap.
 */

use log::{debug, warn};

use crate::app_config::LayoutConfig;
use crate::document::model::{PageSize, Placement, TranslatedBlock};
use crate::errors::LayoutError;
use crate::language_utils::ScriptProfile;

use super::canvas::{OverlayCanvas, TextAlign};

/// Result of laying out one page
#[derive(Debug)]
pub struct LayoutOutcome {
    /// Accepted placements with their blocks, in input order
    pub placements: Vec<(Placement, TranslatedBlock)>,
    /// Blocks that could not be laid out
    pub skipped: Vec<(TranslatedBlock, LayoutError)>,
    /// Number of placements that had to be forced to the top-left corner
    pub forced: usize,
    pub canvas: OverlayCanvas,
}

/// Estimated footprint of one block
#[derive(Debug, Clone, PartialEq)]
struct Footprint {
    lines: Vec<String>,
    font_size: f64,
    line_height: f64,
    width: f64,
    height: f64,
}

/// Computes placements and renders them into an overlay canvas
#[derive(Debug, Clone)]
pub struct OverlayLayoutEngine {
    config: LayoutConfig,
    profile: ScriptProfile,
}

impl OverlayLayoutEngine {
    pub fn new(config: LayoutConfig, profile: ScriptProfile) -> Self {
        Self { config, profile }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Place every block on the page and draw background, text and connector.
    ///
    /// A block that fails is logged and skipped; the canvas is always returned,
    /// possibly empty.
    pub fn layout_page(&self, blocks: &[TranslatedBlock], page: PageSize) -> LayoutOutcome {
        let mut outcome = LayoutOutcome {
            placements: Vec::with_capacity(blocks.len()),
            skipped: Vec::new(),
            forced: 0,
            canvas: OverlayCanvas::new(page),
        };
        let mut used: Vec<Placement> = Vec::with_capacity(blocks.len());

        for block in blocks {
            match self.place_block(block, page, &used) {
                Ok((placement, footprint, forced)) => {
                    if forced {
                        warn!("No free slot for {:?}, forcing it to the top-left corner", block.original_text);
                        outcome.forced += 1;
                    }
                    self.render(&mut outcome.canvas, block, &placement, footprint);
                    used.push(placement);
                    outcome.placements.push((placement, block.clone()));
                }
                Err(e) => {
                    warn!("Skipping block {:?}: {}", block.original_text, e);
                    outcome.skipped.push((block.clone(), e));
                }
            }
        }

        debug!(
            "Laid out {} blocks ({} skipped, {} forced)",
            outcome.placements.len(),
            outcome.skipped.len(),
            outcome.forced
        );
        outcome
    }

    fn place_block(
        &self,
        block: &TranslatedBlock,
        page: PageSize,
        used: &[Placement],
    ) -> Result<(Placement, Footprint, bool), LayoutError> {
        let bbox = &block.bbox;
        let finite = [bbox.x0, bbox.y0, bbox.x1, bbox.y1, page.width, page.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(LayoutError::NonFiniteGeometry(format!("{:?} on {:?}", bbox, page)));
        }

        let footprint = self.footprint(block, page)?;
        let (w, h) = (footprint.width, footprint.height);
        let margin = self.config.margin;

        let mut x = bbox.x0.clamp(margin, page.width - margin - w);
        let mut y = (bbox.y0 - h - self.config.gap).clamp(margin, page.height - margin - h);

        loop {
            let candidate = Placement::new(x, y, w, h);
            if !used.iter().any(|p| p.overlaps(&candidate)) {
                return Ok((candidate, footprint, false));
            }

            y += h + self.config.gap;
            if y + h > page.height - margin {
                x += w + self.config.column_gap;
                y = margin;
                if x + w > page.width - margin {
                    return Ok((Placement::new(margin, margin, w, h), footprint, true));
                }
            }
        }
    }

    /// Font size for a block, adaptive to its source box when enabled
    fn font_size_for(&self, block: &TranslatedBlock) -> f64 {
        if !self.config.adaptive_font_size {
            return self.config.font_size;
        }
        let chars = block.translated_text.chars().count().max(1) as f64;
        let by_width = block.bbox.width() / (chars * self.config.char_width_factor);
        let by_height = block.bbox.height() / self.config.line_height_factor;
        by_width
            .min(by_height)
            .clamp(self.config.min_font_size, self.config.max_font_size)
    }

    fn footprint(&self, block: &TranslatedBlock, page: PageSize) -> Result<Footprint, LayoutError> {
        if block.translated_text.trim().is_empty() {
            return Err(LayoutError::EmptyText);
        }

        let font_size = self.font_size_for(block);
        let char_width = font_size * self.config.char_width_factor;
        let line_height = font_size * self.config.line_height_factor;
        let usable_width = page.width - 2.0 * self.config.margin;
        let usable_height = page.height - 2.0 * self.config.margin;

        let max_chars = (usable_width / char_width).floor();
        let max_lines = (usable_height / line_height).floor();
        if max_chars < 1.0 || max_lines < 1.0 {
            return Err(LayoutError::PageTooSmall {
                width: page.width,
                height: page.height,
                font_size,
            });
        }

        let mut lines = wrap_lines(&block.translated_text, max_chars as usize, self.profile.is_rtl());
        lines.truncate(max_lines as usize);

        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        Ok(Footprint {
            width: longest as f64 * char_width,
            height: lines.len() as f64 * line_height,
            lines,
            font_size,
            line_height,
        })
    }

    fn render(&self, canvas: &mut OverlayCanvas, block: &TranslatedBlock, placement: &Placement, footprint: Footprint) {
        let padding = self.config.padding;
        canvas.fill_rect(
            placement.x - padding,
            placement.y - padding,
            placement.width + 2.0 * padding,
            placement.height + 2.0 * padding,
            1.0,
            self.config.background_opacity,
        );

        let align = if self.profile.is_rtl() { TextAlign::Right } else { TextAlign::Left };
        canvas.draw_text(
            placement.x,
            placement.y,
            placement.width,
            footprint.lines,
            footprint.font_size,
            footprint.line_height,
            align,
        );

        canvas.draw_line(
            placement.center(),
            block.bbox.center(),
            self.config.connector_width,
            self.config.connector_gray,
            self.config.connector_opacity,
        );
    }
}

/// Wrap text into lines of at most `max_chars` characters.
///
/// Visual-order right-to-left text is filled from its right end, so the
/// first line holds the start of the sentence.
pub fn wrap_lines(text: &str, max_chars: usize, rtl: bool) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut words: Vec<String> = Vec::new();
        for word in paragraph.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            if chars.len() <= max_chars {
                words.push(word.to_string());
            } else if rtl {
                // Keep the right end (logical start) of an over-long run whole
                let mut pieces: Vec<String> = chars.rchunks(max_chars).map(|c| c.iter().collect()).collect();
                pieces.reverse();
                words.extend(pieces);
            } else {
                words.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            }
        }

        if rtl {
            words.reverse();
        }

        let mut current: Vec<String> = Vec::new();
        let mut current_len = 0;
        for word in words {
            let len = word.chars().count();
            let needed = if current.is_empty() { len } else { current_len + 1 + len };
            if needed > max_chars && !current.is_empty() {
                lines.push(join_line(&mut current, rtl));
                current_len = 0;
            }
            current_len = if current.is_empty() { len } else { current_len + 1 + len };
            current.push(word);
        }
        if !current.is_empty() {
            lines.push(join_line(&mut current, rtl));
        }
    }

    lines
}

fn join_line(words: &mut Vec<String>, rtl: bool) -> String {
    if rtl {
        words.reverse();
    }
    let line = words.join(" ");
    words.clear();
    line
}
