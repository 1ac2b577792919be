//! PDF processing layer
//!
//! This module turns PDF pages into glyph runs using PDFium and hands them to
//! the layout reconstructor.

mod reader;

pub use reader::{group_chars_into_runs, parse_page_range, PdfReader, PositionedChar};
