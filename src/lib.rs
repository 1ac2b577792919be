//! Legal Lens Library
//!
//! This crate turns legal documents into layout-faithful text and exposes it
//! over MCP:
//! - `layout`: reading-order reconstruction of positioned glyph runs
//! - `pdf`: glyph runs from PDF pages via pdfium
//! - `analysis`: typed boundary to an external language-understanding service
//! - `server`: MCP tools for extraction, normalization and analysis

pub mod actions;
pub mod analysis;
pub mod document;
pub mod error;
pub mod layout;
pub mod pdf;
pub mod server;
pub mod source;

pub use actions::ProcessedDocument;
pub use document::extract_document_text;
pub use error::{Error, Result};
pub use layout::{normalize_text, reconstruct_document, reconstruct_page, GlyphRun, LayoutConfig};
pub use server::{run_server_with_config, DocumentSource, LegalServer, ServerConfig};
