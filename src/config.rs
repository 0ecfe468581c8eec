use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the remote file store
    pub store_url: Option<String>,
    /// Bearer token for the file store and search index
    pub store_token: Option<String>,
    /// Base URL of the search index (defaults to the store URL)
    pub index_url: Option<String>,
    /// Whether writes and deletes are mirrored into the search index
    pub index_writes_enabled: bool,
    /// OpenAI-compatible embeddings endpoint
    pub embedding_url: Option<String>,
    /// API key for the embeddings endpoint
    pub embedding_api_key: Option<String>,
    /// Embedding model name sent with each request
    pub embedding_model: String,
    /// Length of every embedding vector
    pub embedding_dimensions: usize,
    /// Upper bound for any single store, index or embedding call (milliseconds)
    pub remote_timeout_ms: u64,
    /// Lines shown by view_file when no range is requested
    pub default_view_lines: usize,
    /// Context lines around each search_files match when not specified
    pub default_context_lines: usize,
    /// Result limit for search when not specified
    pub default_search_limit: usize,
    /// Semantic candidates scoring below this are discarded
    pub semantic_min_score: f32,
    /// Maximum line breaks a single `...` may span in replace_lines
    /// (None leaves it unbounded within the replaced range)
    pub ellipsis_max_lines: Option<usize>,
    /// Globs excluded from search_files unless the caller passes its own exclude
    pub default_excludes: Vec<String>,
    /// Maximum number of compiled regexes to cache
    pub pattern_cache_size: usize,
    /// Root directory for the local development store
    pub local_root: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_url: None,
            store_token: None,
            index_url: None,
            index_writes_enabled: false,
            embedding_url: None,
            embedding_api_key: None,
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimensions: 1536,
            remote_timeout_ms: 30_000,
            default_view_lines: 500,
            default_context_lines: 2,
            default_search_limit: 10,
            semantic_min_score: 0.4,
            ellipsis_max_lines: None,
            default_excludes: Vec::new(),
            pattern_cache_size: 256,
            local_root: None,
        }
    }
}

impl ServiceConfig {
    /// Load a YAML config file; keys left out keep their defaults
    pub fn from_yaml_file(path: &Path) -> Result<Self, ServiceError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ServiceError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    /// Index endpoint, falling back to the store endpoint
    pub fn effective_index_url(&self) -> Option<&str> {
        self.index_url.as_deref().or(self.store_url.as_deref())
    }
}

/// Fails with `ConfigurationMissing` when a required setting is absent or blank
pub fn require<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ServiceError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ServiceError::ConfigurationMissing(name.to_string())),
    }
}
