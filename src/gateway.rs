//! # File Mutation Gateway
//!
//! Whole-file writes and deletes against the remote store, with best-effort
//! index maintenance. Never returns an error: every failure is folded into a
//! `MutationResult`.

use crate::backend::{FileMap, FileStore, IndexWriter, bounded};
use crate::config::ServiceConfig;
use crate::errors::ServiceError;
use crate::path_validation::{normalize_file_path, validate_widget_id};
use crate::types::MutationResult;
use sha2::{Digest, Sha256};
use std::sync::Arc;

#[derive(Clone)]
pub struct FileMutationGateway {
    config: ServiceConfig,
    store: Arc<dyn FileStore>,
    index_writer: Arc<dyn IndexWriter>,
}

impl FileMutationGateway {
    pub fn new(
        config: ServiceConfig,
        store: Arc<dyn FileStore>,
        index_writer: Arc<dyn IndexWriter>,
    ) -> Self {
        Self {
            config,
            store,
            index_writer,
        }
    }

    pub async fn write(&self, widget_id: &str, file_path: &str, content: &str) -> MutationResult {
        let path = match Self::checked_path(widget_id, file_path) {
            Ok(path) => path,
            Err(e) => return MutationResult::failure("Invalid file path", None, &e),
        };

        let mut files = FileMap::new();
        files.insert(path.clone(), content.to_string());
        if let Err(e) = self.upsert(widget_id, files, vec![]).await {
            tracing::error!(widget_id, file_path = %path, error = %e, "write failed");
            return MutationResult::failure(format!("Failed to write {path}"), Some(path), &e);
        }

        if let Err(e) = bounded(
            self.config.remote_timeout(),
            "index upsert",
            self.index_writer.upsert(widget_id, &path, content),
        )
        .await
        {
            tracing::warn!(widget_id, file_path = %path, error = %e, "index update failed after write");
        }

        MutationResult {
            success: true,
            message: format!("Wrote {} ({} bytes)", path, content.len()),
            file_hash: Some(file_hash(content)),
            file_path: Some(path),
            error: None,
        }
    }

    pub async fn delete(
        &self,
        widget_id: &str,
        file_path: &str,
        remove_from_index: bool,
    ) -> MutationResult {
        let path = match Self::checked_path(widget_id, file_path) {
            Ok(path) => path,
            Err(e) => return MutationResult::failure("Invalid file path", None, &e),
        };

        if let Err(e) = self.upsert(widget_id, FileMap::new(), vec![path.clone()]).await {
            tracing::error!(widget_id, file_path = %path, error = %e, "delete failed");
            return MutationResult::failure(format!("Failed to delete {path}"), Some(path), &e);
        }

        if remove_from_index
            && let Err(e) = bounded(
                self.config.remote_timeout(),
                "index delete",
                self.index_writer.delete(widget_id, &path),
            )
            .await
        {
            tracing::warn!(widget_id, file_path = %path, error = %e, "index removal failed after delete");
        }

        MutationResult {
            success: true,
            message: format!("Deleted {path}"),
            file_path: Some(path),
            file_hash: None,
            error: None,
        }
    }

    fn checked_path(widget_id: &str, file_path: &str) -> Result<String, ServiceError> {
        validate_widget_id(widget_id)?;
        normalize_file_path(file_path)
    }

    async fn upsert(
        &self,
        widget_id: &str,
        files: FileMap,
        deleted: Vec<String>,
    ) -> Result<(), ServiceError> {
        bounded(
            self.config.remote_timeout(),
            "upsert_files",
            self.store.upsert_files(widget_id, files, deleted),
        )
        .await
    }
}

/// `sha256:<hex>` digest of file content.
pub fn file_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, NoopIndexWriter};

    fn gateway(backend: &Arc<MemoryBackend>) -> FileMutationGateway {
        FileMutationGateway::new(ServiceConfig::default(), backend.clone(), backend.clone())
    }

    #[tokio::test]
    async fn test_write_is_full_overwrite() {
        let backend = Arc::new(MemoryBackend::new().with_files("w", [("/a.ts", "old\ncontent")]));
        let result = gateway(&backend).write("w", "a.ts", "new").await;
        assert!(result.success);
        assert_eq!(result.file_path.as_deref(), Some("/a.ts"));
        assert_eq!(result.file_hash, Some(file_hash("new")));
        assert_eq!(backend.file("w", "/a.ts").as_deref(), Some("new"));
        assert!(backend.is_indexed("w", "/a.ts"));
    }

    #[tokio::test]
    async fn test_index_failure_does_not_fail_mutation() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail_index_writes(true);
        let gw = gateway(&backend);

        let written = gw.write("w", "/a.ts", "x").await;
        assert!(written.success);
        assert!(written.error.is_none());

        let deleted = gw.delete("w", "/a.ts", true).await;
        assert!(deleted.success);
        assert!(backend.file("w", "/a.ts").is_none());
    }

    #[tokio::test]
    async fn test_store_failure_becomes_result() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail_store(true);
        let result = gateway(&backend).write("w", "/a.ts", "x").await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("store unavailable"));
    }

    #[tokio::test]
    async fn test_delete_without_index_removal_keeps_index_entry() {
        let backend = Arc::new(MemoryBackend::new());
        let gw = gateway(&backend);
        gw.write("w", "/a.ts", "x").await;
        let result = gw.delete("w", "/a.ts", false).await;
        assert!(result.success);
        assert!(backend.is_indexed("w", "/a.ts"));
    }

    #[tokio::test]
    async fn test_invalid_path_never_reaches_store() {
        let backend = Arc::new(MemoryBackend::new());
        let gw = FileMutationGateway::new(
            ServiceConfig::default(),
            backend.clone(),
            Arc::new(NoopIndexWriter),
        );
        let result = gw.write("w", "../x", "x").await;
        assert!(!result.success);
        assert_eq!(backend.upsert_calls(), 0);
    }

    #[test]
    fn test_file_hash_format() {
        assert_eq!(
            file_hash(""),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
