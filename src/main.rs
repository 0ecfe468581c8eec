use anyhow::Result;
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use tracing_subscriber::{self, filter::EnvFilter};

use widget_mcp::{config::ServiceConfig, widget_service::WidgetService};

/// Widget MCP Server - view, search and edit widget source files
#[derive(Parser, Debug)]
#[command(name = "widget-mcp")]
#[command(about = "Model Context Protocol server for widget code mutation and search")]
#[command(version)]
struct Args {
    /// YAML config file; command line flags override its values
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Remote file store base URL
    #[arg(long = "store-url", env = "WIDGET_STORE_URL")]
    store_url: Option<String>,

    /// Bearer token for the remote store and index
    #[arg(long = "store-token", env = "WIDGET_STORE_TOKEN", hide_env_values = true)]
    store_token: Option<String>,

    /// Search index base URL (defaults to the store URL)
    #[arg(long = "index-url", env = "WIDGET_INDEX_URL")]
    index_url: Option<String>,

    /// Mirror writes and deletes into the search index
    #[arg(long = "index-writes")]
    index_writes: bool,

    /// OpenAI-compatible embeddings endpoint
    #[arg(long = "embedding-url", env = "EMBEDDING_API_URL")]
    embedding_url: Option<String>,

    /// API key for the embeddings endpoint
    #[arg(long = "embedding-api-key", env = "EMBEDDING_API_KEY", hide_env_values = true)]
    embedding_api_key: Option<String>,

    /// Directory store used when no remote store is configured
    #[arg(
        long = "local-root",
        help = "Local widget directory (default: ~/.widget-mcp/widgets)",
        value_name = "PATH"
    )]
    local_root: Option<PathBuf>,

    /// Upper bound for any single remote call, in milliseconds
    #[arg(long = "timeout-ms")]
    timeout_ms: Option<u64>,

    /// Maximum line breaks a single `...` may span in replace_lines
    #[arg(long = "ellipsis-max-lines")]
    ellipsis_max_lines: Option<usize>,

    /// Glob excluded from search_files by default (can be specified multiple times)
    #[arg(long = "exclude", value_name = "GLOB")]
    excludes: Vec<String>,

    /// Maximum number of compiled regexes to cache
    #[arg(long = "pattern-cache-size")]
    pattern_cache_size: Option<usize>,
}

#[tokio::main]
#[tracing::instrument]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = create_config_from_args(args)?;
    tracing::info!(
        remote = config.store_url.is_some(),
        index_writes = config.index_writes_enabled,
        timeout_ms = config.remote_timeout_ms,
        "starting widget MCP server"
    );

    let service = WidgetService::from_config(config)?.serve(stdio()).await?;

    tracing::info!("Service started, waiting for connections");
    service.waiting().await?;
    Ok(())
}

/// Build a ServiceConfig from the optional YAML file and command line arguments
fn create_config_from_args(args: Args) -> Result<ServiceConfig> {
    let mut config = match &args.config {
        Some(path) => ServiceConfig::from_yaml_file(path)?,
        None => ServiceConfig::default(),
    };

    if args.store_url.is_some() {
        config.store_url = args.store_url;
    }
    if args.store_token.is_some() {
        config.store_token = args.store_token;
    }
    if args.index_url.is_some() {
        config.index_url = args.index_url;
    }
    if args.index_writes {
        config.index_writes_enabled = true;
    }
    if args.embedding_url.is_some() {
        config.embedding_url = args.embedding_url;
    }
    if args.embedding_api_key.is_some() {
        config.embedding_api_key = args.embedding_api_key;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.remote_timeout_ms = timeout_ms;
    }
    if args.ellipsis_max_lines.is_some() {
        config.ellipsis_max_lines = args.ellipsis_max_lines;
    }
    if !args.excludes.is_empty() {
        config.default_excludes = args.excludes;
    }
    if let Some(size) = args.pattern_cache_size {
        config.pattern_cache_size = size;
    }

    if args.local_root.is_some() {
        config.local_root = args.local_root;
    } else if config.store_url.is_none() && config.local_root.is_none() {
        // Default to ~/.widget-mcp/widgets
        config.local_root = Some(
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".widget-mcp")
                .join("widgets"),
        );
    }

    Ok(config)
}
