//! MCP Server implementation using rmcp

use crate::actions::{self, ProcessedDocument};
use crate::analysis::{AnalysisClient, Answer, ClauseExplanation, Summary};
use crate::document::extract_document_text;
use crate::error::Error;
use crate::layout::{normalize_text, LayoutConfig};
use crate::source::{
    resolve_base64, resolve_path, resolve_url, CacheManager, CachedText, ResolvedDocument,
};
use anyhow::Result;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    schemars::JsonSchema, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Document source specification
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum DocumentSource {
    /// File path (absolute or relative)
    Path {
        /// Path to a .pdf or .txt file
        path: String,
    },
    /// Base64 encoded upload
    Base64 {
        /// Base64 encoded file content
        base64: String,
        /// Original file name, used to detect the file type
        #[serde(skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
    },
    /// URL to download the document from
    Url {
        /// URL of the document
        url: String,
    },
    /// Pasted document text
    Text {
        /// Raw document text
        text: String,
    },
    /// Reference to a previously extracted text
    CacheRef {
        /// Cache key from a previous operation
        cache_key: String,
    },
}

fn string_field<E: serde::de::Error>(
    value: &serde_json::Value,
    name: &str,
) -> std::result::Result<String, E> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| E::custom(format!("\"{}\" must be a string", name)))
}

impl<'de> serde::Deserialize<'de> for DocumentSource {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;

        let Some(obj) = value.as_object() else {
            return Err(serde::de::Error::custom(format!(
                "Invalid source: expected an object with one of \"path\", \"base64\", \"url\", \"text\", or \"cache_key\", but got {}",
                match &value {
                    serde_json::Value::Array(_) => "an array",
                    serde_json::Value::String(_) => "a string",
                    serde_json::Value::Number(_) => "a number",
                    serde_json::Value::Bool(_) => "a boolean",
                    serde_json::Value::Null => "null",
                    _ => "unknown type",
                }
            )));
        };

        if let Some(v) = obj.get("path") {
            return Ok(DocumentSource::Path {
                path: string_field(v, "path")?,
            });
        }
        if let Some(v) = obj.get("base64") {
            let file_name = match obj.get("file_name") {
                Some(serde_json::Value::Null) | None => None,
                Some(name) => Some(string_field(name, "file_name")?),
            };
            return Ok(DocumentSource::Base64 {
                base64: string_field(v, "base64")?,
                file_name,
            });
        }
        if let Some(v) = obj.get("url") {
            return Ok(DocumentSource::Url {
                url: string_field(v, "url")?,
            });
        }
        if let Some(v) = obj.get("text") {
            return Ok(DocumentSource::Text {
                text: string_field(v, "text")?,
            });
        }
        if let Some(v) = obj.get("cache_key") {
            return Ok(DocumentSource::CacheRef {
                cache_key: string_field(v, "cache_key")?,
            });
        }

        let keys: Vec<&String> = obj.keys().collect();
        Err(serde::de::Error::custom(format!(
            "Invalid source: expected an object with one of \"path\", \"base64\", \"url\", \"text\", or \"cache_key\", but got keys: {:?}",
            keys
        )))
    }
}

/// Security and resource configuration for the server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directories that path sources are restricted to (empty: unrestricted)
    pub resource_dirs: Vec<String>,
    /// Allow URLs that resolve to private/reserved IPs (default: false)
    pub allow_private_urls: bool,
    /// Maximum download size in bytes for URL sources (default: 100MB)
    pub max_download_bytes: u64,
    /// Maximum accepted document size in bytes (default: 10MB)
    pub max_file_bytes: u64,
    /// Maximum total bytes in cache (default: 64MB)
    pub cache_max_bytes: usize,
    /// Maximum number of cache entries (default: 100)
    pub cache_max_entries: usize,
}

impl ServerConfig {
    pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            resource_dirs: Vec::new(),
            allow_private_urls: false,
            max_download_bytes: 100 * 1024 * 1024, // 100MB
            max_file_bytes: Self::DEFAULT_MAX_FILE_BYTES,
            cache_max_bytes: 64 * 1024 * 1024, // 64MB
            cache_max_entries: 100,
        }
    }
}

/// Legal document MCP Server
#[derive(Clone)]
pub struct LegalServer {
    cache: Arc<CacheManager>,
    tool_router: ToolRouter<Self>,
    /// Server configuration
    config: Arc<ServerConfig>,
    analysis: Option<AnalysisClient>,
}

// ============================================================================
// Request/Response types for extract_text
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExtractTextParams {
    /// Documents to process
    pub sources: Vec<DocumentSource>,
    /// PDF page selection (e.g., "1-5,10,15-20")
    #[serde(default)]
    pub pages: Option<String>,
    /// Password for encrypted PDFs
    #[serde(default)]
    pub password: Option<String>,
    /// Layout reconstruction thresholds
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Keep the extracted text for follow-up calls
    #[serde(default)]
    pub cache: bool,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ExtractTextResult {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Request/Response types for normalize_text
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NormalizeTextParams {
    /// Text to normalize
    pub text: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct NormalizeTextResult {
    pub text: String,
}

// ============================================================================
// Request/Response types for analysis tools
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProcessDocumentParams {
    /// Document to process
    pub source: DocumentSource,
    /// Password for encrypted PDFs
    #[serde(default)]
    pub password: Option<String>,
    /// Language for party names (default: English)
    #[serde(default)]
    pub language: Option<String>,
    /// Keep the extracted text for follow-up calls
    #[serde(default)]
    pub cache: bool,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ProcessDocumentResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
    #[serde(flatten)]
    pub document: ProcessedDocument,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SummarizeDocumentParams {
    /// Document to summarize
    pub source: DocumentSource,
    /// Reader's role in the document (e.g., "Tenant")
    #[serde(default)]
    pub user_role: Option<String>,
    /// Output language (default: English)
    #[serde(default)]
    pub language: Option<String>,
    /// Password for encrypted PDFs
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExplainClauseParams {
    /// Clause text
    pub clause: String,
    /// Reader's role in the document
    #[serde(default)]
    pub user_role: Option<String>,
    /// Output language (default: English)
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AskQuestionParams {
    /// Document the question is about
    pub source: DocumentSource,
    /// Question to answer
    pub question: String,
    /// Reader's role in the document
    #[serde(default)]
    pub user_role: Option<String>,
    /// Password for encrypted PDFs
    #[serde(default)]
    pub password: Option<String>,
}

/// Serialize a tool outcome, replacing failures with a sanitized error object
fn respond<T: Serialize>(tool: &str, result: crate::error::Result<T>) -> String {
    let response = match result {
        Ok(value) => serde_json::to_value(value).unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, tool, "tool failed");
            serde_json::json!({ "error": e.client_message() })
        }
    };
    serde_json::to_string_pretty(&response).unwrap_or_default()
}

// ============================================================================
// Tool implementations
// ============================================================================

#[tool_router]
impl LegalServer {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Create a new LegalServer with full configuration
    pub fn with_config(config: ServerConfig) -> Self {
        let cache = CacheManager::new(config.cache_max_entries, config.cache_max_bytes);
        Self {
            cache: Arc::new(cache),
            tool_router: Self::tool_router(),
            config: Arc::new(config),
            analysis: None,
        }
    }

    /// Attach the analysis service used by the analysis tools
    pub fn with_analysis(mut self, client: AnalysisClient) -> Self {
        self.analysis = Some(client);
        self
    }

    /// Extract layout-faithful text from documents
    #[tool(
        description = "Extract reading-order text from PDF or TXT documents. PDF text is rebuilt from glyph positions so lines, paragraphs and word spacing follow the page layout.

Source format: each element must be one of {\"path\": \"/absolute/path.pdf\"}, {\"url\": \"https://...\"}, {\"base64\": \"...\", \"file_name\": \"lease.pdf\"}, {\"text\": \"...\"}, or {\"cache_key\": \"...\"}"
    )]
    async fn extract_text(&self, Parameters(params): Parameters<ExtractTextParams>) -> String {
        let mut results = Vec::new();

        for source in &params.sources {
            let result = self
                .process_extract_text(source, &params)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "extract_text failed");
                    ExtractTextResult {
                        source: Self::source_name(source),
                        cache_key: None,
                        text: String::new(),
                        error: Some(e.client_message()),
                    }
                });
            results.push(result);
        }

        let response = serde_json::json!({ "results": results });
        serde_json::to_string_pretty(&response).unwrap_or_default()
    }

    /// Collapse blank-line runs and trim text
    #[tool(
        description = "Normalize text: collapse runs of blank lines into a single paragraph break and trim surrounding whitespace."
    )]
    async fn normalize_text(&self, Parameters(params): Parameters<NormalizeTextParams>) -> String {
        respond(
            "normalize_text",
            Ok(NormalizeTextResult {
                text: normalize_text(&params.text),
            }),
        )
    }

    /// Validate a legal document and split it into clauses and parties
    #[tool(
        description = "Process a legal document: extract its text, check that it is a legal document, then identify its clauses and its two primary parties."
    )]
    async fn process_document(
        &self,
        Parameters(params): Parameters<ProcessDocumentParams>,
    ) -> String {
        respond(
            "process_document",
            self.process_process_document(&params).await,
        )
    }

    /// Summarize a document for the reader's role
    #[tool(
        description = "Summarize a legal document from the reader's perspective, optionally in another language."
    )]
    async fn summarize_document(
        &self,
        Parameters(params): Parameters<SummarizeDocumentParams>,
    ) -> String {
        respond(
            "summarize_document",
            self.process_summarize_document(&params).await,
        )
    }

    /// Explain a clause with a risk score
    #[tool(
        description = "Explain a single clause in plain language with a Low/Medium/High risk score and negotiation suggestions."
    )]
    async fn explain_clause(&self, Parameters(params): Parameters<ExplainClauseParams>) -> String {
        respond(
            "explain_clause",
            self.process_explain_clause(&params).await,
        )
    }

    /// Answer a question about a document
    #[tool(
        description = "Answer a question about a legal document. Pass {\"cache_key\": ...} from a previous call to avoid re-extracting the document."
    )]
    async fn ask_question(&self, Parameters(params): Parameters<AskQuestionParams>) -> String {
        respond("ask_question", self.process_ask_question(&params).await)
    }
}

impl LegalServer {
    fn source_name(source: &DocumentSource) -> String {
        match source {
            DocumentSource::Path { path } => path.clone(),
            DocumentSource::Base64 { file_name, .. } => {
                file_name.clone().unwrap_or_else(|| "<base64>".to_string())
            }
            DocumentSource::Url { url } => url.clone(),
            DocumentSource::Text { .. } => "<text>".to_string(),
            DocumentSource::CacheRef { cache_key } => format!("<cache:{}>", cache_key),
        }
    }

    fn analysis(&self) -> crate::error::Result<&AnalysisClient> {
        self.analysis.as_ref().ok_or(Error::AnalyzerUnavailable)
    }

    async fn resolve_source(&self, source: &DocumentSource) -> crate::error::Result<ResolvedDocument> {
        let max_bytes = self.config.max_file_bytes;
        match source {
            DocumentSource::Path { path } => {
                let path = self.validate_path_access(path)?;
                resolve_path(path, max_bytes)
            }
            DocumentSource::Base64 { base64, file_name } => {
                resolve_base64(base64, file_name.as_deref(), max_bytes)
            }
            DocumentSource::Url { url } => {
                let resolved = resolve_url(
                    url,
                    self.config.allow_private_urls,
                    self.config.max_download_bytes,
                )
                .await?;
                let size = resolved.data.len() as u64;
                if size > max_bytes {
                    return Err(Error::FileTooLarge {
                        size,
                        max_size: max_bytes,
                    });
                }
                Ok(resolved)
            }
            DocumentSource::Text { .. } | DocumentSource::CacheRef { .. } => {
                Err(Error::SourceResolution {
                    reason: "source carries text, not a file".to_string(),
                })
            }
        }
    }

    /// Validate that a path is within allowed resource directories.
    /// If no resource_dirs are configured, all paths are allowed.
    fn validate_path_access(&self, path: &str) -> crate::error::Result<std::path::PathBuf> {
        if self.config.resource_dirs.is_empty() {
            return Ok(std::path::PathBuf::from(path));
        }

        let canonical = std::fs::canonicalize(path).map_err(|_| Error::PathAccessDenied {
            path: path.to_string(),
        })?;

        for dir in &self.config.resource_dirs {
            if let Ok(canonical_dir) = std::fs::canonicalize(dir) {
                if canonical.starts_with(&canonical_dir) {
                    return Ok(canonical);
                }
            }
        }

        Err(Error::PathAccessDenied {
            path: path.to_string(),
        })
    }

    /// Produce the normalized text of a source along with its display name.
    /// Cached texts report the name of the source they were extracted from.
    /// Fails with `EmptyDocument` when nothing is left after normalization.
    async fn load_text(
        &self,
        source: &DocumentSource,
        password: Option<&str>,
        pages: Option<&str>,
        layout: &LayoutConfig,
    ) -> crate::error::Result<CachedText> {
        let text = match source {
            DocumentSource::Text { text } => normalize_text(text),
            DocumentSource::CacheRef { cache_key } => {
                return self
                    .cache
                    .get(cache_key)
                    .ok_or_else(|| Error::CacheKeyNotFound {
                        key: cache_key.clone(),
                    });
            }
            _ => {
                let resolved = self.resolve_source(source).await?;

                // Move CPU-heavy PDF work to blocking thread pool
                let password = password.map(str::to_string);
                let pages = pages.map(str::to_string);
                let layout = layout.clone();
                tokio::task::spawn_blocking(move || {
                    extract_document_text(
                        &resolved,
                        password.as_deref(),
                        pages.as_deref(),
                        &layout,
                    )
                })
                .await
                .map_err(|e| Error::Pdfium {
                    reason: format!("Task join error: {}", e),
                })??
            }
        };

        if text.is_empty() {
            return Err(Error::EmptyDocument);
        }
        Ok(CachedText {
            source: Self::source_name(source),
            text,
        })
    }

    fn cache_text(&self, source: &str, text: &str) -> Option<String> {
        let key = self.cache.insert(source, text.to_string());
        if key.is_none() {
            tracing::warn!(source, bytes = text.len(), "Text exceeds the cache budget, not cached");
        }
        key
    }

    async fn process_extract_text(
        &self,
        source: &DocumentSource,
        params: &ExtractTextParams,
    ) -> crate::error::Result<ExtractTextResult> {
        let loaded = self
            .load_text(
                source,
                params.password.as_deref(),
                params.pages.as_deref(),
                &params.layout,
            )
            .await?;

        let cache_key = if params.cache {
            self.cache_text(&loaded.source, &loaded.text)
        } else {
            None
        };

        Ok(ExtractTextResult {
            source: loaded.source,
            cache_key,
            text: loaded.text,
            error: None,
        })
    }

    async fn process_process_document(
        &self,
        params: &ProcessDocumentParams,
    ) -> crate::error::Result<ProcessDocumentResult> {
        let client = self.analysis()?;
        let loaded = self
            .load_text(
                &params.source,
                params.password.as_deref(),
                None,
                &LayoutConfig::default(),
            )
            .await?;

        let document =
            actions::process_document(client, loaded.text, params.language.clone()).await?;
        let cache_key = if params.cache {
            self.cache_text(&loaded.source, &document.document_text)
        } else {
            None
        };

        Ok(ProcessDocumentResult {
            cache_key,
            document,
        })
    }

    async fn process_summarize_document(
        &self,
        params: &SummarizeDocumentParams,
    ) -> crate::error::Result<Summary> {
        let client = self.analysis()?;
        let loaded = self
            .load_text(
                &params.source,
                params.password.as_deref(),
                None,
                &LayoutConfig::default(),
            )
            .await?;

        actions::summarize_document(
            client,
            &loaded.text,
            params.user_role.clone(),
            params.language.clone(),
        )
        .await
    }

    async fn process_explain_clause(
        &self,
        params: &ExplainClauseParams,
    ) -> crate::error::Result<ClauseExplanation> {
        let client = self.analysis()?;
        actions::explain_clause(
            client,
            &params.clause,
            params.user_role.clone(),
            params.language.clone(),
        )
        .await
    }

    async fn process_ask_question(&self, params: &AskQuestionParams) -> crate::error::Result<Answer> {
        let client = self.analysis()?;
        let text = match self
            .load_text(
                &params.source,
                params.password.as_deref(),
                None,
                &LayoutConfig::default(),
            )
            .await
        {
            // Reported as a validation failure of the document content
            Err(Error::EmptyDocument) => String::new(),
            other => other?.text,
        };

        actions::ask_question(client, &text, &params.question, params.user_role.clone()).await
    }
}

impl Default for LegalServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for LegalServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Legal Lens extracts layout-faithful text from legal documents and, when an \
                 analysis service is configured, summarizes them, splits them into clauses, \
                 explains clauses with a risk score and answers questions about them."
                    .into(),
            ),
        }
    }
}

/// Run the MCP server with full configuration
pub async fn run_server_with_config(
    config: ServerConfig,
    analysis: Option<AnalysisClient>,
) -> Result<()> {
    let mut server = LegalServer::with_config(config);
    match analysis {
        Some(client) => server = server.with_analysis(client),
        None => tracing::warn!("No analysis service configured, analysis tools are disabled"),
    }

    tracing::info!("Legal Lens MCP Server ready, waiting for connections...");

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}
