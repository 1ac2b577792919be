//! Folding ordered runs into text

use super::{classify_gap, normalize_text, reading_order, GlyphRun, LayoutConfig};

/// Reconstruct the text of one page from its glyph runs.
///
/// The input order is irrelevant: runs are sorted into reading order first.
/// An empty page yields an empty string.
pub fn reconstruct_page(runs: &[GlyphRun], config: &LayoutConfig) -> String {
    let ordered = reading_order(runs);
    let capacity = ordered.iter().map(|r| r.text.len() + 2).sum();
    let mut text = String::with_capacity(capacity);

    let mut prev: Option<&GlyphRun> = None;
    for run in ordered {
        if let Some(p) = prev {
            text.push_str(classify_gap(p, run, config).as_str());
        }
        text.push_str(&run.text);
        prev = Some(run);
    }

    normalize_text(&text)
}

/// Reconstruct a whole document, page by page.
///
/// Pages are joined with a paragraph break; pages without text are skipped.
pub fn reconstruct_document<'a, I>(pages: I, config: &LayoutConfig) -> String
where
    I: IntoIterator<Item = &'a [GlyphRun]>,
{
    let texts: Vec<String> = pages
        .into_iter()
        .map(|runs| reconstruct_page(runs, config))
        .filter(|text| !text.is_empty())
        .collect();

    normalize_text(&texts.join("\n\n"))
}
