//! Layout-aware text reconstruction
//!
//! Turns the unordered glyph runs of a page into text whose line and
//! paragraph breaks follow what a reader sees:
//! - `order`: reading-order sort (top to bottom, then left to right)
//! - `gap`: classification of the gap between two consecutive runs
//! - `linearize`: folding classified runs into one string
//! - `normalize`: blank-line collapsing shared with plain-text input

mod config;
mod gap;
mod glyph;
mod linearize;
mod normalize;
mod order;

pub use config::LayoutConfig;
pub use gap::{classify_gap, Separator};
pub use glyph::GlyphRun;
pub use linearize::{reconstruct_document, reconstruct_page};
pub use normalize::{collapse_blank_lines, normalize_text};
pub use order::reading_order;
