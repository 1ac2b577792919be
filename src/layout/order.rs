//! Reading-order sort

use super::GlyphRun;
use std::cmp::Ordering;

/// Order runs top to bottom, then left to right.
///
/// Runs on the same baseline keep their left-to-right order; anything still
/// tied is ordered by content so the result never depends on input order.
pub fn reading_order(runs: &[GlyphRun]) -> Vec<&GlyphRun> {
    let mut ordered: Vec<&GlyphRun> = runs.iter().collect();
    ordered.sort_by(|a, b| compare_reading_order(a, b));
    ordered
}

fn compare_reading_order(a: &GlyphRun, b: &GlyphRun) -> Ordering {
    b.y()
        .total_cmp(&a.y())
        .then_with(|| a.x().total_cmp(&b.x()))
        .then_with(|| a.text.cmp(&b.text))
        .then_with(|| a.font_id.cmp(&b.font_id))
        .then_with(|| a.extent_width().total_cmp(&b.extent_width()))
        .then_with(|| a.extent_height().total_cmp(&b.extent_height()))
}
