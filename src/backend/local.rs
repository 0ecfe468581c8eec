//! Directory-backed file store for local development.
//!
//! Widget `w` lives under `<root>/w/`; the file `/src/App.tsx` is stored at
//! `<root>/w/src/App.tsx`.
//!
//! Exact and filename queries scan the directory on every call. No vectors
//! are kept, so semantic queries find nothing.

use super::memory::{scan_lines, scan_paths};
use super::{FileMap, FileStore, IndexHit, ScoredChunk, SearchIndex};
use crate::errors::ServiceError;
use crate::path_validation::{normalize_file_path, validate_widget_id};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct LocalDirStore {
    root: PathBuf,
}

impl LocalDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn widget_dir(&self, widget_id: &str) -> Result<PathBuf, ServiceError> {
        validate_widget_id(widget_id)?;
        Ok(self.root.join(widget_id))
    }

    fn file_location(&self, widget_dir: &Path, file_path: &str) -> Result<PathBuf, ServiceError> {
        let normalized = normalize_file_path(file_path)?;
        Ok(widget_dir.join(normalized.trim_start_matches('/')))
    }
}

#[async_trait]
impl FileStore for LocalDirStore {
    async fn upsert_files(
        &self,
        widget_id: &str,
        files: FileMap,
        deleted: Vec<String>,
    ) -> Result<(), ServiceError> {
        let widget_dir = self.widget_dir(widget_id)?;
        for (path, content) in files {
            let location = self.file_location(&widget_dir, &path)?;
            if let Some(parent) = location.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&location, content).await?;
        }
        for path in deleted {
            let location = self.file_location(&widget_dir, &path)?;
            match tokio::fs::remove_file(&location).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn fetch_files(&self, widget_id: &str) -> Result<FileMap, ServiceError> {
        let widget_dir = self.widget_dir(widget_id)?;
        let mut files = FileMap::new();
        if !widget_dir.is_dir() {
            return Ok(files);
        }
        for entry in WalkDir::new(&widget_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let Ok(rel_path) = entry.path().strip_prefix(&widget_dir) else {
                continue;
            };
            // Non-UTF-8 files are not widget source
            let Ok(content) = std::fs::read_to_string(entry.path()) else {
                continue;
            };
            let key = format!(
                "/{}",
                rel_path
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            );
            files.insert(key, content);
        }
        Ok(files)
    }
}

#[async_trait]
impl SearchIndex for LocalDirStore {
    async fn exact_match(
        &self,
        widget_id: &str,
        pattern: &str,
    ) -> Result<Vec<IndexHit>, ServiceError> {
        let files = self.fetch_files(widget_id).await?;
        scan_lines(&files, pattern)
    }

    async fn filename_match(
        &self,
        widget_id: &str,
        pattern: &str,
    ) -> Result<Vec<IndexHit>, ServiceError> {
        let files = self.fetch_files(widget_id).await?;
        scan_paths(files, pattern)
    }

    async fn vector_search(
        &self,
        widget_id: &str,
        _vector: &[f32],
        _limit: usize,
    ) -> Result<Vec<ScoredChunk>, ServiceError> {
        tracing::debug!(widget_id, "local store keeps no vectors");
        Ok(vec![])
    }
}
