//! Error types for legal-lens

use crate::analysis::ServiceError;
use thiserror::Error;

/// Result type alias for legal-lens
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for legal-lens
#[derive(Error, Debug)]
pub enum Error {
    /// Document file not found
    #[error("Document not found: {path}")]
    DocumentNotFound { path: String },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// PDF is password protected and no password was provided
    #[error("PDF is password protected")]
    PasswordRequired,

    /// Invalid page range
    #[error("Invalid page range: {range}")]
    InvalidPageRange { range: String },

    /// Page out of bounds
    #[error("Page {page} out of bounds (total: {total})")]
    PageOutOfBounds { page: u32, total: u32 },

    /// Text layer of a page could not be read
    #[error("Failed to read text of page {page}: {reason}")]
    PageText { page: u32, reason: String },

    /// Cache key not found
    #[error("Cache key not found: {key}")]
    CacheKeyNotFound { key: String },

    /// Source resolution error
    #[error("Failed to resolve source: {reason}")]
    SourceResolution { reason: String },

    /// Base64 decode error
    #[error("Invalid base64 data: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// Path access denied (outside allowed resource directories)
    #[error("Path access denied: {path}")]
    PathAccessDenied { path: String },

    /// SSRF blocked (URL resolves to private/reserved IP)
    #[error("SSRF blocked: {url}")]
    SsrfBlocked { url: String },

    /// Download too large
    #[error("Download too large: {size} bytes (max: {max_size} bytes)")]
    DownloadTooLarge { size: u64, max_size: u64 },

    /// Uploaded document exceeds the accepted size
    #[error("File too large: {size} bytes (max: {max_size} bytes)")]
    FileTooLarge { size: u64, max_size: u64 },

    /// Unsupported document type
    #[error("Unsupported file type: {extension}")]
    UnsupportedFileType { extension: String },

    /// No text left after extraction and normalization
    #[error("Document text is empty")]
    EmptyDocument,

    /// Document was classified as not being a legal document
    #[error("Document is not a legal document")]
    NotLegalDocument,

    /// Request field failed validation
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// No analysis service configured
    #[error("Analysis service is not configured")]
    AnalyzerUnavailable,

    /// Analysis service failure
    #[error("Analysis failed: {0}")]
    Analysis(#[from] ServiceError),
}

impl Error {
    /// Return a sanitized error message safe to send to clients.
    /// Internal details (paths, library errors, file sizes) are omitted.
    /// Full details should be logged via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::DocumentNotFound { .. } => "Document not found".to_string(),
            Error::InvalidPdf { .. } | Error::Pdfium { .. } | Error::PageText { .. } => {
                "Could not extract text from the PDF. Please check your file format.".to_string()
            }
            Error::PasswordRequired => "PDF is password protected".to_string(),
            Error::InvalidPageRange { range } => format!("Invalid page range: {}", range),
            Error::PageOutOfBounds { page, total } => {
                format!("Page {} out of bounds (total: {})", page, total)
            }
            Error::CacheKeyNotFound { .. } => "Cache key not found".to_string(),
            Error::SourceResolution { .. } => "Failed to resolve document source".to_string(),
            Error::Base64Decode(_) => "Invalid base64 data".to_string(),
            Error::HttpRequest(_) => "HTTP request failed".to_string(),
            Error::Io(_) => "I/O error".to_string(),
            Error::PathAccessDenied { .. } => "Access denied".to_string(),
            Error::SsrfBlocked { .. } => "URL not allowed".to_string(),
            Error::DownloadTooLarge { max_size, .. } => {
                format!("Download exceeds maximum size of {} bytes", max_size)
            }
            Error::FileTooLarge { max_size, .. } => format!(
                "File size exceeds the {}MB limit.",
                max_size / (1024 * 1024)
            ),
            Error::UnsupportedFileType { .. } => {
                "Unsupported file type. Only PDF or TXT files are allowed.".to_string()
            }
            Error::EmptyDocument => "Document text is empty.".to_string(),
            Error::NotLegalDocument => {
                "The provided document does not appear to be a legal document.".to_string()
            }
            Error::InvalidInput { reason, .. } => reason.clone(),
            Error::AnalyzerUnavailable => "Analysis service is not configured".to_string(),
            Error::Analysis(_) => {
                "An unexpected error occurred during document analysis.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_hides_internals() {
        let err = Error::DocumentNotFound {
            path: "/secret/lease.pdf".to_string(),
        };
        assert!(!err.client_message().contains("/secret"));

        let err = Error::Pdfium {
            reason: "FPDF_ERR_FORMAT".to_string(),
        };
        assert!(!err.client_message().contains("FPDF"));
    }

    #[test]
    fn test_file_too_large_message() {
        let err = Error::FileTooLarge {
            size: 20 * 1024 * 1024,
            max_size: 10 * 1024 * 1024,
        };
        assert_eq!(err.client_message(), "File size exceeds the 10MB limit.");
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let err = Error::InvalidInput {
            field: "clause".to_string(),
            reason: "Clause cannot be empty.".to_string(),
        };
        assert_eq!(err.client_message(), "Clause cannot be empty.");
    }
}
