//! Gap classification between consecutive runs

use super::{GlyphRun, LayoutConfig};

/// Vertical move (in line heights) that turns a font change into a new block
const FONT_CHANGE_GAP_MULTIPLIER: f32 = 1.0;

/// What to insert between two runs in reading order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// New logical block
    Paragraph,
    /// New visual line inside the same block
    Line,
    /// Next word on the same line
    Space,
    /// Continuation of the same word or an overlapping fragment
    Direct,
}

impl Separator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Separator::Paragraph => "\n\n",
            Separator::Line => "\n",
            Separator::Space => " ",
            Separator::Direct => "",
        }
    }
}

/// Classify the gap between the previous run `prev` and the current run `curr`.
///
/// Thresholds scale with `curr`'s height. A run without usable height (a
/// control glyph, or broken geometry) is always appended directly.
pub fn classify_gap(prev: &GlyphRun, curr: &GlyphRun, config: &LayoutConfig) -> Separator {
    if curr.is_degenerate() {
        return Separator::Direct;
    }

    let height = curr.extent_height();
    let y_diff = (prev.y() - curr.y()).abs();
    let x_diff = curr.x() - prev.x();
    let moved_line = y_diff > height * config.line_gap_multiplier;

    let vertical_jump = y_diff > height * config.paragraph_gap_multiplier;
    let left_shift = x_diff < config.left_shift_threshold && moved_line;
    let font_change =
        prev.font_id != curr.font_id && y_diff > height * FONT_CHANGE_GAP_MULTIPLIER;

    if vertical_jump || left_shift || font_change {
        Separator::Paragraph
    } else if moved_line {
        Separator::Line
    } else if x_diff >= prev.extent_width().min(curr.extent_width()) {
        Separator::Space
    } else {
        Separator::Direct
    }
}
