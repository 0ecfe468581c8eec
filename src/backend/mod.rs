//! # Backend Capabilities
//!
//! The engines never talk to a concrete store. They receive these capability
//! traits at construction: production binds them to the HTTP backend, local
//! development to a directory, and tests to the in-memory double.

pub mod http;
pub mod local;
pub mod memory;
pub mod noop;

use crate::errors::ServiceError;
use crate::types::Granularity;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

pub use http::{HttpEmbeddingProvider, HttpFileStore, HttpSearchIndex};
pub use local::LocalDirStore;
pub use memory::{MemoryBackend, MemoryEmbeddingProvider};
pub use noop::NoopIndexWriter;

/// Path to content map for one widget, iterated in path order.
pub type FileMap = BTreeMap<String, String>;

/// A plain match returned by the exact and filename index queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexHit {
    pub file_path: String,
    pub content: String,
    pub line_start: usize,
    pub line_end: usize,
}

/// A nearest-neighbour candidate returned by the vector index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredChunk {
    pub file_path: String,
    pub content: String,
    pub line_start: usize,
    pub line_end: usize,
    pub score: f32,
    pub granularity: Granularity,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Overwrite the given files and remove `deleted` in one request.
    async fn upsert_files(
        &self,
        widget_id: &str,
        files: FileMap,
        deleted: Vec<String>,
    ) -> Result<(), ServiceError>;

    /// Every file of the widget.
    async fn fetch_files(&self, widget_id: &str) -> Result<FileMap, ServiceError>;
}

#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn exact_match(&self, widget_id: &str, pattern: &str)
    -> Result<Vec<IndexHit>, ServiceError>;

    async fn filename_match(
        &self,
        widget_id: &str,
        pattern: &str,
    ) -> Result<Vec<IndexHit>, ServiceError>;

    async fn vector_search(
        &self,
        widget_id: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, ServiceError>;
}

/// Best-effort index maintenance after mutations.
#[async_trait]
pub trait IndexWriter: Send + Sync {
    async fn upsert(&self, widget_id: &str, file_path: &str, content: &str)
    -> Result<(), ServiceError>;

    async fn delete(&self, widget_id: &str, file_path: &str) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError>;

    /// Length of every vector this provider returns.
    fn dimensions(&self) -> usize;
}

/// Run a remote call with an upper time bound.
///
/// Elapsed calls become `RemoteOperationFailure`; nothing is retried.
pub async fn bounded<T, F>(timeout: Duration, operation: &str, fut: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::RemoteOperationFailure(format!(
            "{operation} timed out after {}ms",
            timeout.as_millis()
        ))),
    }
}

/// Fetch a single file, mapping absence to `NotFound`.
pub async fn fetch_file(
    store: &dyn FileStore,
    timeout: Duration,
    widget_id: &str,
    file_path: &str,
) -> Result<String, ServiceError> {
    let mut files = bounded(timeout, "fetch_files", store.fetch_files(widget_id)).await?;
    files
        .remove(file_path)
        .ok_or_else(|| ServiceError::NotFound(file_path.to_string()))
}
