//! Legal Lens - Entry point
//!
//! MCP server over stdio for reading and analyzing legal documents.

use clap::Parser;
use legal_lens::analysis::{AnalysisClient, HttpAnalyzer, PromptSet};
use legal_lens::{run_server_with_config, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directories that file path sources are restricted to
    #[arg(long = "resource-dir", env = "LEGAL_LENS_RESOURCE_DIRS", value_delimiter = ',')]
    resource_dirs: Vec<String>,

    /// Allow URL sources that resolve to private or reserved addresses
    #[arg(long, env = "LEGAL_LENS_ALLOW_PRIVATE_URLS", default_value = "false")]
    allow_private_urls: bool,

    /// Maximum accepted document size in bytes
    #[arg(long, env = "LEGAL_LENS_MAX_FILE_BYTES", default_value_t = ServerConfig::DEFAULT_MAX_FILE_BYTES)]
    max_file_bytes: u64,

    /// Maximum number of cached document texts
    #[arg(long, env = "LEGAL_LENS_CACHE_ENTRIES", default_value = "100")]
    cache_entries: usize,

    /// Analysis service endpoint; analysis tools are disabled without it
    #[arg(long, env = "LEGAL_LENS_ANALYZER_URL")]
    analyzer_url: Option<String>,

    /// Bearer token sent to the analysis service
    #[arg(long, env = "LEGAL_LENS_ANALYZER_API_KEY", hide_env_values = true)]
    analyzer_api_key: Option<String>,

    /// Analysis request timeout in seconds
    #[arg(long, env = "LEGAL_LENS_ANALYZER_TIMEOUT", default_value = "120")]
    analyzer_timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "legal_lens=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Legal Lens MCP Server");

    let analysis = match &args.analyzer_url {
        Some(url) => {
            let analyzer = HttpAnalyzer::new(
                url,
                args.analyzer_api_key.clone(),
                Duration::from_secs(args.analyzer_timeout),
            )?;
            tracing::info!(endpoint = %analyzer.endpoint(), "Using analysis service");
            let prompts = Arc::new(PromptSet::default());
            Some(AnalysisClient::new(Arc::new(analyzer), prompts))
        }
        None => None,
    };

    let config = ServerConfig {
        resource_dirs: args.resource_dirs,
        allow_private_urls: args.allow_private_urls,
        max_file_bytes: args.max_file_bytes,
        cache_max_entries: args.cache_entries,
        ..ServerConfig::default()
    };

    run_server_with_config(config, analysis).await
}
