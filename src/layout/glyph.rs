//! Positioned glyph runs as reported by a PDF page source

use serde::{Deserialize, Serialize};

/// A contiguous run of rendered characters sharing one baseline and font.
///
/// Coordinates are in page space with the origin at the bottom-left and Y
/// growing upward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphRun {
    /// Characters rendered by this run (may be empty or whitespace only)
    pub text: String,
    /// Baseline X position (left edge)
    pub origin_x: f32,
    /// Baseline Y position
    pub origin_y: f32,
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent, the local unit for every gap threshold
    pub height: f32,
    /// Opaque font/style identifier
    pub font_id: String,
}

impl GlyphRun {
    pub fn new(
        text: impl Into<String>,
        origin_x: f32,
        origin_y: f32,
        width: f32,
        height: f32,
        font_id: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            origin_x,
            origin_y,
            width,
            height,
            font_id: font_id.into(),
        }
    }

    /// X coordinate usable for comparisons (non-finite becomes 0)
    pub fn x(&self) -> f32 {
        finite_or_zero(self.origin_x)
    }

    /// Y coordinate usable for comparisons (non-finite becomes 0)
    pub fn y(&self) -> f32 {
        finite_or_zero(self.origin_y)
    }

    /// Width usable for comparisons (non-finite or negative becomes 0)
    pub fn extent_width(&self) -> f32 {
        finite_or_zero(self.width).max(0.0)
    }

    /// Height usable for comparisons (non-finite or negative becomes 0)
    pub fn extent_height(&self) -> f32 {
        finite_or_zero(self.height).max(0.0)
    }

    /// True when the run has no usable vertical extent
    pub fn is_degenerate(&self) -> bool {
        self.extent_height() == 0.0
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
