/*!
 * Placement invariants of the overlay layout engine
 */

use pageglot::app_config::LayoutConfig;
use pageglot::document::{BoundingBox, PageSize, Placement, TranslatedBlock};
use pageglot::language_utils::ScriptProfile;
use pageglot::overlay::{DrawOp, OverlayLayoutEngine};
use rand::Rng;

const WORDS: &[&str] = &["king", "queen", "rook", "a", "bishop", "takes", "the", "pawn", "castles", "longer-word"];

fn random_block(rng: &mut impl Rng, page: PageSize) -> TranslatedBlock {
    let words = rng.random_range(1..25);
    let text = (0..words).map(|_| WORDS[rng.random_range(0..WORDS.len())]).collect::<Vec<_>>().join(" ");
    let x0 = rng.random_range(0.0..page.width - 20.0);
    let y0 = rng.random_range(0.0..page.height - 20.0);
    TranslatedBlock {
        translated_text: text.clone(),
        original_text: text,
        bbox: BoundingBox::new(x0, y0, x0 + rng.random_range(5.0..200.0), y0 + rng.random_range(5.0..30.0)),
        page_index: 0,
    }
}

fn assert_within_margins(p: &Placement, page: PageSize, margin: f64) {
    let eps = 1e-9;
    assert!(p.x >= margin - eps, "{:?} left of margin", p);
    assert!(p.y >= margin - eps, "{:?} above margin", p);
    assert!(p.right() <= page.width - margin + eps, "{:?} past right margin", p);
    assert!(p.bottom() <= page.height - margin + eps, "{:?} past bottom margin", p);
}

#[test]
fn test_random_layouts_should_stay_in_bounds_and_not_overlap() {
    let mut rng = rand::rng();
    let pages = [PageSize::letter(), PageSize::new(300.0, 200.0), PageSize::new(595.0, 842.0)];

    for _ in 0..60 {
        let page = pages[rng.random_range(0..pages.len())];
        let mut config = LayoutConfig::default();
        config.adaptive_font_size = rng.random_bool(0.5);
        let engine = OverlayLayoutEngine::new(config.clone(), ScriptProfile::plain());

        let count = rng.random_range(1..30);
        let blocks: Vec<TranslatedBlock> = (0..count).map(|_| random_block(&mut rng, page)).collect();
        let outcome = engine.layout_page(&blocks, page);

        assert_eq!(outcome.placements.len() + outcome.skipped.len(), blocks.len());

        let mut overlapping_later = 0;
        for (j, (later, _)) in outcome.placements.iter().enumerate() {
            assert_within_margins(later, page, config.margin);
            let collides = outcome.placements[..j].iter().any(|(earlier, _)| earlier.overlaps(later));
            if collides {
                // Only a forced placement may overlap, and it sits in the top-left corner
                assert_eq!((later.x, later.y), (config.margin, config.margin));
                overlapping_later += 1;
            }
        }
        assert!(overlapping_later <= outcome.forced);
    }
}

#[test]
fn test_every_placement_should_draw_background_text_and_connector() {
    let engine = OverlayLayoutEngine::new(LayoutConfig::default(), ScriptProfile::plain());
    let page = PageSize::letter();
    let mut rng = rand::rng();
    let blocks: Vec<TranslatedBlock> = (0..5).map(|_| random_block(&mut rng, page)).collect();

    let outcome = engine.layout_page(&blocks, page);
    let ops = outcome.canvas.ops();

    let rects = ops.iter().filter(|op| matches!(op, DrawOp::Rect { .. })).count();
    let texts = ops.iter().filter(|op| matches!(op, DrawOp::Text { .. })).count();
    let lines = ops.iter().filter(|op| matches!(op, DrawOp::Line { .. })).count();
    assert_eq!((rects, texts, lines), (outcome.placements.len(), outcome.placements.len(), outcome.placements.len()));
}

#[test]
fn test_rtl_profile_should_right_align_text() {
    let engine = OverlayLayoutEngine::new(LayoutConfig::default(), ScriptProfile::for_language("ar"));
    let block = TranslatedBlock {
        translated_text: "كتب".to_string(),
        original_text: "Books".to_string(),
        bbox: BoundingBox::new(100.0, 400.0, 200.0, 420.0),
        page_index: 0,
    };
    let outcome = engine.layout_page(&[block], PageSize::letter());

    assert!(outcome.canvas.ops().iter().any(|op| matches!(
        op,
        DrawOp::Text { align: pageglot::overlay::TextAlign::Right, .. }
    )));
}
