//! Thresholds for gap classification

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration for layout reconstruction.
///
/// Every multiplier is applied to the height of the run that follows the gap,
/// so headings and body text are measured in their own units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical jump (in line heights) above which a new paragraph starts
    #[serde(alias = "paragraphGapMultiplier")]
    pub paragraph_gap_multiplier: f32,
    /// Vertical move (in line heights) above which a new line starts
    #[serde(alias = "lineGapMultiplier")]
    pub line_gap_multiplier: f32,
    /// Horizontal shift (points, negative = leftward) marking a fresh block
    #[serde(alias = "leftShiftThreshold")]
    pub left_shift_threshold: f32,
}

impl LayoutConfig {
    pub const DEFAULT_PARAGRAPH_GAP_MULTIPLIER: f32 = 1.5;
    pub const DEFAULT_LINE_GAP_MULTIPLIER: f32 = 0.5;
    pub const DEFAULT_LEFT_SHIFT_THRESHOLD: f32 = -5.0;
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            paragraph_gap_multiplier: Self::DEFAULT_PARAGRAPH_GAP_MULTIPLIER,
            line_gap_multiplier: Self::DEFAULT_LINE_GAP_MULTIPLIER,
            left_shift_threshold: Self::DEFAULT_LEFT_SHIFT_THRESHOLD,
        }
    }
}
