//! Source resolution for document data

use crate::error::{Error, Result};
use base64::Engine;
use futures_util::StreamExt;
use std::net::IpAddr;
use std::path::Path;

/// Accepted document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
    Docx,
}

impl DocumentKind {
    /// Detect the kind from a file name's extension
    pub fn from_file_name(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "txt" => Ok(DocumentKind::Text),
            "docx" => Ok(DocumentKind::Docx),
            _ => Err(Error::UnsupportedFileType { extension }),
        }
    }

    /// Guess the kind from content when no file name is available
    pub fn sniff(data: &[u8]) -> Result<Self> {
        if has_pdf_header(data) {
            Ok(DocumentKind::Pdf)
        } else if std::str::from_utf8(data).is_ok() {
            Ok(DocumentKind::Text)
        } else {
            Err(Error::UnsupportedFileType {
                extension: String::new(),
            })
        }
    }
}

/// Resolved document data
#[derive(Debug)]
pub struct ResolvedDocument {
    pub data: Vec<u8>,
    pub kind: DocumentKind,
    pub source_name: String,
}

fn has_pdf_header(data: &[u8]) -> bool {
    data.len() >= 4 && &data[0..4] == b"%PDF"
}

fn check_size(size: u64, max_bytes: u64) -> Result<()> {
    if size > max_bytes {
        return Err(Error::FileTooLarge {
            size,
            max_size: max_bytes,
        });
    }
    Ok(())
}

fn finish(data: Vec<u8>, kind: DocumentKind, source_name: String) -> Result<ResolvedDocument> {
    if kind == DocumentKind::Pdf && !has_pdf_header(&data) {
        return Err(Error::InvalidPdf {
            reason: "Not a valid PDF file".to_string(),
        });
    }

    Ok(ResolvedDocument {
        data,
        kind,
        source_name,
    })
}

/// Resolve a file path to document data
pub fn resolve_path<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<ResolvedDocument> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::DocumentNotFound {
            path: path.display().to_string(),
        });
    }

    let kind = DocumentKind::from_file_name(&path.to_string_lossy())?;
    check_size(std::fs::metadata(path)?.len(), max_bytes)?;

    let data = std::fs::read(path).map_err(Error::Io)?;
    finish(data, kind, path.display().to_string())
}

/// Resolve base64 encoded data to document data.
/// The kind comes from `file_name` when given, otherwise from the content.
pub fn resolve_base64(
    base64_data: &str,
    file_name: Option<&str>,
    max_bytes: u64,
) -> Result<ResolvedDocument> {
    let engine = base64::engine::general_purpose::STANDARD;
    let data = engine.decode(base64_data)?;
    check_size(data.len() as u64, max_bytes)?;

    let kind = match file_name {
        Some(name) => DocumentKind::from_file_name(name)?,
        None => DocumentKind::sniff(&data)?,
    };

    let source_name = file_name.unwrap_or("<base64>").to_string();
    finish(data, kind, source_name)
}

/// Check if an IP address is private/reserved (loopback, link-local, private ranges, etc.)
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()                           // 127.0.0.0/8
                || v4.is_private()                     // 10/8, 172.16/12, 192.168/16
                || v4.is_link_local()                  // 169.254/16 (cloud metadata!)
                || v4.is_broadcast()                   // 255.255.255.255
                || v4.is_unspecified()                 // 0.0.0.0
                || v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64  // CGNAT 100.64/10
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()                           // ::1
                || v6.is_unspecified()                 // ::
                || {
                    let segments = v6.segments();
                    // fc00::/7 (unique local)
                    (segments[0] & 0xFE00) == 0xFC00
                    // fe80::/10 (link-local)
                    || (segments[0] & 0xFFC0) == 0xFE80
                }
        }
    }
}

/// Check URL for SSRF by resolving DNS and verifying IPs are public
async fn check_ssrf(url_str: &str) -> Result<()> {
    let parsed = url::Url::parse(url_str).map_err(|e| Error::SourceResolution {
        reason: format!("Invalid URL: {}", e),
    })?;

    let host = parsed.host_str().ok_or_else(|| Error::SourceResolution {
        reason: "URL has no host".to_string(),
    })?;

    let port = parsed.port_or_known_default().unwrap_or(443);
    let addr_str = format!("{}:{}", host, port);

    let addrs = tokio::net::lookup_host(&addr_str).await.map_err(|e| {
        Error::SourceResolution {
            reason: format!("DNS resolution failed for {}: {}", host, e),
        }
    })?;

    for addr in addrs {
        if is_private_ip(&addr.ip()) {
            return Err(Error::SsrfBlocked {
                url: url_str.to_string(),
            });
        }
    }

    Ok(())
}

/// Resolve a URL to document data with SSRF protection and download size limits
pub async fn resolve_url(
    url: &str,
    allow_private_urls: bool,
    max_download_bytes: u64,
) -> Result<ResolvedDocument> {
    // SSRF check
    if !allow_private_urls {
        check_ssrf(url).await?;
    }

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .build()
        .map_err(Error::HttpRequest)?;

    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(Error::SourceResolution {
            reason: format!("HTTP request failed with status: {}", response.status()),
        });
    }

    // Check Content-Length header for early rejection
    if let Some(content_length) = response.content_length() {
        if content_length > max_download_bytes {
            return Err(Error::DownloadTooLarge {
                size: content_length,
                max_size: max_download_bytes,
            });
        }
    }

    // Stream the response body with incremental size checking to prevent OOM
    let mut data = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Error::HttpRequest)?;
        data.extend_from_slice(&chunk);
        if data.len() as u64 > max_download_bytes {
            return Err(Error::DownloadTooLarge {
                size: data.len() as u64,
                max_size: max_download_bytes,
            });
        }
    }

    let path = url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_default();
    let kind = DocumentKind::from_file_name(&path).or_else(|_| DocumentKind::sniff(&data))?;

    finish(data, kind, url.to_string())
}
