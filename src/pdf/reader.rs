//! PDF reader wrapper for PDFium

use crate::error::{Error, Result};
use crate::layout::{reconstruct_document, GlyphRun, LayoutConfig};
use pdfium_render::prelude::*;
use std::path::Path;

/// Maximum baseline drift (points) for two chars to share a run
const BASELINE_TOLERANCE: f32 = 0.5;

/// Maximum gap between touching glyphs, as a fraction of glyph height
const GLYPH_GAP_FACTOR: f32 = 0.25;

/// Maximum gap across a space character, as a fraction of glyph height
const WORD_GAP_FACTOR: f32 = 1.0;

/// A single character as read from a page's text layer.
///
/// `origin_x`/`origin_y` is the pen position on the baseline. The loose
/// bounds (`left`..`right`, `bottom`..`top`) include descenders and differ
/// between faces, so they are only used for extents.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedChar {
    pub ch: char,
    pub origin_x: f32,
    pub origin_y: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
    pub font: String,
}

struct RunBuilder {
    text: String,
    origin_x: f32,
    baseline: f32,
    left: f32,
    bottom: f32,
    right: f32,
    top: f32,
    font: String,
    pending_space: bool,
}

impl RunBuilder {
    fn start(c: PositionedChar) -> Self {
        let mut text = String::new();
        text.push(c.ch);
        Self {
            text,
            origin_x: c.origin_x,
            baseline: c.origin_y,
            left: c.left,
            bottom: c.bottom,
            right: c.right,
            top: c.top,
            font: c.font,
            pending_space: false,
        }
    }

    fn accepts(&self, c: &PositionedChar) -> bool {
        let height = (self.top - self.bottom).max(c.top - c.bottom).max(0.0);
        let max_gap = if self.pending_space {
            height * WORD_GAP_FACTOR
        } else {
            height * GLYPH_GAP_FACTOR
        };

        c.font == self.font
            && (c.origin_y - self.baseline).abs() <= BASELINE_TOLERANCE
            && c.left >= self.left
            && c.left - self.right <= max_gap
    }

    fn push(&mut self, c: PositionedChar) {
        if self.pending_space {
            self.text.push(' ');
            self.pending_space = false;
        }
        self.text.push(c.ch);
        self.right = self.right.max(c.right);
        self.top = self.top.max(c.top);
        self.bottom = self.bottom.min(c.bottom);
    }

    fn finish(self) -> GlyphRun {
        GlyphRun {
            text: self.text,
            origin_x: self.origin_x,
            origin_y: self.baseline,
            width: self.right - self.left,
            height: self.top - self.bottom,
            font_id: self.font,
        }
    }
}

/// Group a page's characters (in content-stream order) into glyph runs.
///
/// Consecutive characters sharing font and baseline that sit next to each
/// other form one run, with single spaces kept between words. Line breaks and
/// control characters end the current run and are dropped.
pub fn group_chars_into_runs(chars: impl IntoIterator<Item = PositionedChar>) -> Vec<GlyphRun> {
    let mut runs = Vec::new();
    let mut current: Option<RunBuilder> = None;

    for c in chars {
        if c.ch.is_control() || matches!(c.ch, '\u{2028}' | '\u{2029}') {
            if let Some(run) = current.take() {
                runs.push(run.finish());
            }
            continue;
        }

        if c.ch.is_whitespace() {
            if let Some(run) = current.as_mut() {
                run.pending_space = true;
            }
            continue;
        }

        match current.as_mut() {
            Some(run) if run.accepts(&c) => run.push(c),
            _ => {
                if let Some(run) = current.take() {
                    runs.push(run.finish());
                }
                current = Some(RunBuilder::start(c));
            }
        }
    }

    if let Some(run) = current {
        runs.push(run.finish());
    }

    runs
}

/// Get PDFium instance (creates new instance each time - PDFium is not thread-safe)
fn create_pdfium() -> Result<Pdfium> {
    // Try to bind to system library or use static linking
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::Pdfium {
            reason: format!("Failed to initialize PDFium: {}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

/// PDF reader producing the glyph runs of every page
pub struct PdfReader {
    page_count: u32,
    pages: Vec<Vec<GlyphRun>>,
}

impl PdfReader {
    /// Open a PDF from a file path
    pub fn open<P: AsRef<Path>>(path: P, password: Option<&str>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Error::DocumentNotFound {
                path: path.display().to_string(),
            });
        }

        let data = std::fs::read(path)?;
        Self::open_bytes(&data, password)
    }

    /// Open a PDF from bytes
    pub fn open_bytes(data: &[u8], password: Option<&str>) -> Result<Self> {
        if data.len() < 4 || &data[0..4] != b"%PDF" {
            return Err(Error::InvalidPdf {
                reason: "Not a valid PDF file".to_string(),
            });
        }

        let pdfium = create_pdfium()?;

        let document = pdfium
            .load_pdf_from_byte_slice(data, password)
            .map_err(Self::map_pdfium_error)?;

        // Read every page upfront so the PDFium handle can be dropped
        let page_count = document.pages().len() as u32;
        let pages = Self::collect_page_runs(&document)?;

        tracing::debug!(
            page_count,
            run_count = pages.iter().map(Vec::len).sum::<usize>(),
            "Read glyph runs from PDF"
        );

        Ok(Self { page_count, pages })
    }

    fn collect_page_runs(document: &PdfDocument) -> Result<Vec<Vec<GlyphRun>>> {
        let pages = document.pages();
        let mut runs = Vec::with_capacity(pages.len() as usize);

        for index in 0..pages.len() {
            let page = pages.get(index).map_err(|e| Error::Pdfium {
                reason: format!("Failed to get page {}: {}", index + 1, e),
            })?;

            runs.push(Self::page_glyph_runs(&page, index as u32 + 1)?);
        }

        Ok(runs)
    }

    /// Read the glyph runs of one page (`page_num` is 1-indexed, for errors)
    fn page_glyph_runs(page: &PdfPage, page_num: u32) -> Result<Vec<GlyphRun>> {
        let text = page.text().map_err(|e| Error::PageText {
            page: page_num,
            reason: e.to_string(),
        })?;

        let mut chars = Vec::new();
        for char_result in text.chars().iter() {
            let Some(ch) = char_result.unicode_char() else {
                continue;
            };
            // Unplaceable chars keep their text with zero extent
            let Ok(bounds) = char_result.loose_bounds() else {
                chars.push(PositionedChar {
                    ch,
                    origin_x: 0.0,
                    origin_y: 0.0,
                    left: 0.0,
                    bottom: 0.0,
                    right: 0.0,
                    top: 0.0,
                    font: String::new(),
                });
                continue;
            };

            // Fall back to the loose box corner when pdfium has no origin
            let (origin_x, origin_y) = char_result
                .origin()
                .map(|(x, y)| (x.value, y.value))
                .unwrap_or((bounds.left().value, bounds.bottom().value));

            chars.push(PositionedChar {
                ch,
                origin_x,
                origin_y,
                left: bounds.left().value,
                bottom: bounds.bottom().value,
                right: bounds.right().value,
                top: bounds.top().value,
                font: char_result.font_name(),
            });
        }

        Ok(group_chars_into_runs(chars))
    }

    /// Map PDFium errors to our error type
    fn map_pdfium_error(err: PdfiumError) -> Error {
        match err {
            PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
                Error::PasswordRequired
            }
            _ => Error::Pdfium {
                reason: format!("{}", err),
            },
        }
    }

    /// Get the number of pages
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Glyph runs of a specific page (1-indexed)
    pub fn page_runs(&self, page_num: u32) -> Result<&[GlyphRun]> {
        if page_num < 1 || page_num > self.page_count {
            return Err(Error::PageOutOfBounds {
                page: page_num,
                total: self.page_count,
            });
        }

        Ok(&self.pages[(page_num - 1) as usize])
    }

    /// Reconstructed text of the whole document
    pub fn document_text(&self, config: &LayoutConfig) -> String {
        reconstruct_document(self.pages.iter().map(Vec::as_slice), config)
    }

    /// Reconstructed text of the given pages, joined as one document
    pub fn pages_text(&self, pages: &[u32], config: &LayoutConfig) -> Result<String> {
        let runs = pages
            .iter()
            .map(|&page| self.page_runs(page))
            .collect::<Result<Vec<_>>>()?;
        Ok(reconstruct_document(runs, config))
    }
}

/// Parse page range string (e.g., "1-5,10,15-20")
pub fn parse_page_range(range: &str, max_pages: u32) -> Result<Vec<u32>> {
    let mut pages = Vec::new();

    for part in range.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start, end)) = part.split_once('-') {
            let start: u32 = start.trim().parse().map_err(|_| Error::InvalidPageRange {
                range: range.to_string(),
            })?;
            let end: u32 = end.trim().parse().map_err(|_| Error::InvalidPageRange {
                range: range.to_string(),
            })?;

            if start < 1 || end > max_pages || start > end {
                return Err(Error::InvalidPageRange {
                    range: range.to_string(),
                });
            }

            pages.extend(start..=end);
        } else {
            let page: u32 = part.parse().map_err(|_| Error::InvalidPageRange {
                range: range.to_string(),
            })?;

            if page < 1 || page > max_pages {
                return Err(Error::InvalidPageRange {
                    range: range.to_string(),
                });
            }

            pages.push(page);
        }
    }

    // Remove duplicates and sort
    pages.sort();
    pages.dedup();

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::reconstruct_page;
    use pretty_assertions::assert_eq;

    /// A 5pt wide glyph on `baseline` with 2pt of descent and 8pt of ascent
    fn glyph(ch: char, left: f32, baseline: f32, font: &str) -> PositionedChar {
        PositionedChar {
            ch,
            origin_x: left,
            origin_y: baseline,
            left,
            bottom: baseline - 2.0,
            right: left + 5.0,
            top: baseline + 8.0,
            font: font.to_string(),
        }
    }

    fn word(text: &str, left: f32, baseline: f32, font: &str) -> Vec<PositionedChar> {
        text.chars()
            .enumerate()
            .map(|(i, ch)| glyph(ch, left + i as f32 * 5.0, baseline, font))
            .collect()
    }

    #[test]
    fn test_invalid_pdf_detection() {
        let result = PdfReader::open_bytes(b"not a pdf", None);
        assert!(matches!(result, Err(Error::InvalidPdf { .. })));
    }

    #[test]
    fn test_open_missing_file() {
        let result = PdfReader::open("/nonexistent/lease.pdf", None);
        assert!(matches!(result, Err(Error::DocumentNotFound { .. })));
    }

    #[test]
    fn test_group_chars_keeps_words_of_a_line_together() {
        let mut chars = word("Lease", 0.0, 700.0, "F1");
        chars.push(glyph(' ', 25.0, 700.0, "F1"));
        chars.push(glyph(' ', 25.0, 700.0, "F1"));
        chars.extend(word("term", 30.0, 700.0, "F1"));

        let runs = group_chars_into_runs(chars);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Lease term");
        assert_eq!(runs[0].origin_x, 0.0);
        assert_eq!(runs[0].origin_y, 700.0);
        assert_eq!(runs[0].width, 50.0);
        assert_eq!(runs[0].height, 10.0);
    }

    #[test]
    fn test_leading_and_trailing_spaces_are_dropped() {
        let mut chars = vec![glyph(' ', 0.0, 700.0, "F1")];
        chars.extend(word("Rent", 5.0, 700.0, "F1"));
        chars.push(glyph(' ', 25.0, 700.0, "F1"));
        chars.push(glyph('\n', 30.0, 700.0, "F1"));

        let runs = group_chars_into_runs(chars);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Rent");
    }

    #[test]
    fn test_group_chars_splits_on_font_and_baseline() {
        let mut chars = word("Bold", 0.0, 700.0, "F1-Bold");
        chars.extend(word("Body", 20.0, 700.0, "F1"));
        chars.extend(word("Next", 0.0, 686.0, "F1"));

        let runs = group_chars_into_runs(chars);
        let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Bold", "Body", "Next"]);
        assert_eq!(runs[0].font_id, "F1-Bold");
        assert_eq!(runs[2].origin_y, 686.0);
    }

    #[test]
    fn test_group_chars_splits_on_horizontal_gap() {
        let mut chars = word("Party", 0.0, 700.0, "F1");
        chars.extend(word("A", 100.0, 700.0, "F1"));

        let runs = group_chars_into_runs(chars);
        assert_eq!(runs.len(), 2);
    }

    #[test]
    fn test_group_chars_drops_control_chars() {
        let mut chars = word("in", 0.0, 700.0, "F1");
        chars.push(glyph('\u{2}', 10.0, 700.0, "F1"));
        chars.push(glyph('\r', 10.0, 700.0, "F1"));
        chars.push(glyph('\n', 10.0, 700.0, "F1"));

        let runs = group_chars_into_runs(chars);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "in");
    }

    #[test]
    fn test_grouped_runs_reconstruct_text() {
        let mut chars = word("The", 0.0, 700.0, "F1");
        chars.push(glyph(' ', 15.0, 700.0, "F1"));
        chars.extend(word("Tenant", 20.0, 700.0, "F1"));
        chars.push(glyph('\n', 50.0, 700.0, "F1"));
        chars.extend(word("agrees.", 0.0, 686.0, "F1"));

        let runs = group_chars_into_runs(chars);
        let text = reconstruct_page(&runs, &LayoutConfig::default());
        assert_eq!(text, "The Tenant\nagrees.");
    }

    #[test]
    fn test_mixed_fonts_share_the_baseline() {
        // The bold face reports a deeper loose box than the regular one
        let bold: Vec<PositionedChar> = word("Tenant", 20.0, 700.0, "F1-Bold")
            .into_iter()
            .map(|c| PositionedChar {
                bottom: c.bottom - 0.4,
                ..c
            })
            .collect();

        let mut chars = word("The", 0.0, 700.0, "F1");
        chars.push(glyph(' ', 15.0, 700.0, "F1"));
        chars.extend(bold);
        chars.push(glyph(' ', 50.0, 700.0, "F1-Bold"));
        chars.extend(word("shall", 55.0, 700.0, "F1"));

        let runs = group_chars_into_runs(chars);
        let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["The", "Tenant", "shall"]);
        assert!(runs.iter().all(|r| r.origin_y == 700.0));
        assert!((runs[1].height - 10.4).abs() < 1e-3);

        let text = reconstruct_page(&runs, &LayoutConfig::default());
        assert_eq!(text, "The Tenant shall");
    }

    #[test]
    fn test_run_origin_is_first_pen_position() {
        // Italic overhang puts the loose box left of the pen position
        let chars: Vec<PositionedChar> = word("Lessor", 10.0, 500.0, "F1-Italic")
            .into_iter()
            .map(|c| PositionedChar {
                left: c.left - 1.0,
                ..c
            })
            .collect();

        let runs = group_chars_into_runs(chars);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].origin_x, 10.0);
        assert_eq!(runs[0].origin_y, 500.0);
        assert_eq!(runs[0].width, 31.0);
    }

    #[test]
    fn test_empty_char_stream() {
        assert!(group_chars_into_runs(Vec::new()).is_empty());
    }

    #[test]
    fn test_parse_page_range() {
        assert_eq!(parse_page_range("1-3", 10).unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_page_range("1,3,5", 10).unwrap(), vec![1, 3, 5]);
        assert_eq!(
            parse_page_range("1-3,5,7-9", 10).unwrap(),
            vec![1, 2, 3, 5, 7, 8, 9]
        );
        assert_eq!(parse_page_range("1,1,2,2", 10).unwrap(), vec![1, 2]); // Dedup
    }

    #[test]
    fn test_parse_page_range_invalid() {
        assert!(parse_page_range("0-3", 10).is_err()); // 0 is invalid
        assert!(parse_page_range("1-15", 10).is_err()); // Out of bounds
        assert!(parse_page_range("5-3", 10).is_err()); // Start > End
        assert!(parse_page_range("abc", 10).is_err()); // Not a number
    }
}
