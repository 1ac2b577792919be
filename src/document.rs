//! Document-level text extraction

use crate::error::{Error, Result};
use crate::layout::{normalize_text, LayoutConfig};
use crate::pdf::{parse_page_range, PdfReader};
use crate::source::{DocumentKind, ResolvedDocument};

/// Extract normalized text from a resolved document.
///
/// PDFs are rebuilt page by page from their glyph layout and joined with
/// paragraph breaks; `pages` selects a subset (e.g. "1-3,5"). Text files are
/// decoded and normalized. A page whose text cannot be read fails the whole
/// document.
pub fn extract_document_text(
    document: &ResolvedDocument,
    password: Option<&str>,
    pages: Option<&str>,
    config: &LayoutConfig,
) -> Result<String> {
    let text = match document.kind {
        DocumentKind::Pdf => {
            let reader = PdfReader::open_bytes(&document.data, password)?;
            match pages {
                Some(range) => {
                    let selected = parse_page_range(range, reader.page_count())?;
                    reader.pages_text(&selected, config)?
                }
                None => reader.document_text(config),
            }
        }
        DocumentKind::Text => normalize_text(&String::from_utf8_lossy(&document.data)),
        DocumentKind::Docx => {
            return Err(Error::UnsupportedFileType {
                extension: "docx".to_string(),
            })
        }
    };

    tracing::debug!(
        source = %document.source_name,
        kind = ?document.kind,
        chars = text.len(),
        "Extracted document text"
    );

    Ok(text)
}
