//! In-memory store and index double.
//!
//! Store and index share one map, so a deleted file disappears from both.
//! Locks are taken per call and never held across an `.await`.

use super::{
    EmbeddingProvider, FileMap, FileStore, IndexHit, IndexWriter, ScoredChunk, SearchIndex,
};
use crate::errors::ServiceError;
use crate::types::Granularity;
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredChunk {
    file_path: String,
    content: String,
    line_start: usize,
    line_end: usize,
    granularity: Granularity,
    vector: Vec<f32>,
}

#[derive(Default)]
pub struct MemoryBackend {
    files: RwLock<HashMap<String, FileMap>>,
    chunks: RwLock<HashMap<String, Vec<StoredChunk>>>,
    indexed: RwLock<HashSet<(String, String)>>,
    upsert_calls: AtomicUsize,
    fail_store: AtomicBool,
    fail_index_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a widget with files without counting as a store write.
    pub fn with_files<I, P, C>(self, widget_id: &str, files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        if let Ok(mut map) = self.files.write() {
            let widget = map.entry(widget_id.to_string()).or_default();
            for (path, content) in files {
                widget.insert(path.into(), content.into());
            }
        }
        self
    }

    /// Register a vector-indexed chunk for semantic search.
    pub fn add_chunk(
        &self,
        widget_id: &str,
        file_path: &str,
        content: &str,
        lines: (usize, usize),
        granularity: Granularity,
        vector: Vec<f32>,
    ) {
        if let Ok(mut chunks) = self.chunks.write() {
            chunks
                .entry(widget_id.to_string())
                .or_default()
                .push(StoredChunk {
                    file_path: file_path.to_string(),
                    content: content.to_string(),
                    line_start: lines.0,
                    line_end: lines.1,
                    granularity,
                    vector,
                });
        }
    }

    /// Current content of a file, if present.
    pub fn file(&self, widget_id: &str, file_path: &str) -> Option<String> {
        self.files
            .read()
            .ok()?
            .get(widget_id)?
            .get(file_path)
            .cloned()
    }

    /// Number of `upsert_files` calls received.
    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn is_indexed(&self, widget_id: &str, file_path: &str) -> bool {
        self.indexed
            .read()
            .map(|set| set.contains(&(widget_id.to_string(), file_path.to_string())))
            .unwrap_or(false)
    }

    /// Make every store call fail.
    pub fn fail_store(&self, fail: bool) {
        self.fail_store.store(fail, Ordering::SeqCst);
    }

    /// Make index upserts and deletes fail.
    pub fn fail_index_writes(&self, fail: bool) {
        self.fail_index_writes.store(fail, Ordering::SeqCst);
    }

    fn check_store(&self) -> Result<(), ServiceError> {
        if self.fail_store.load(Ordering::SeqCst) {
            return Err(ServiceError::RemoteOperationFailure(
                "store unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn widget_files(&self, widget_id: &str) -> Result<FileMap, ServiceError> {
        let map = self
            .files
            .read()
            .map_err(|_| ServiceError::Internal("file map lock poisoned".to_string()))?;
        Ok(map.get(widget_id).cloned().unwrap_or_default())
    }
}

/// Case-insensitive regex for index queries; invalid patterns are matched literally.
fn index_regex(pattern: &str) -> Result<Regex, ServiceError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build()
        })
        .map_err(ServiceError::from)
}

/// One hit per content line matching `pattern`, in path then line order.
pub(crate) fn scan_lines(files: &FileMap, pattern: &str) -> Result<Vec<IndexHit>, ServiceError> {
    let regex = index_regex(pattern)?;
    let mut hits = Vec::new();
    for (path, content) in files {
        for (idx, line) in content.split('\n').enumerate() {
            if regex.is_match(line) {
                hits.push(IndexHit {
                    file_path: path.clone(),
                    content: line.to_string(),
                    line_start: idx + 1,
                    line_end: idx + 1,
                });
            }
        }
    }
    Ok(hits)
}

/// One whole-file hit per path matching `pattern`.
pub(crate) fn scan_paths(files: FileMap, pattern: &str) -> Result<Vec<IndexHit>, ServiceError> {
    let regex = index_regex(pattern)?;
    Ok(files
        .into_iter()
        .filter(|(path, _)| regex.is_match(path))
        .map(|(path, content)| {
            let total = content.split('\n').count();
            IndexHit {
                file_path: path,
                content,
                line_start: 1,
                line_end: total,
            }
        })
        .collect())
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl FileStore for MemoryBackend {
    async fn upsert_files(
        &self,
        widget_id: &str,
        files: FileMap,
        deleted: Vec<String>,
    ) -> Result<(), ServiceError> {
        self.check_store()?;
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        let mut map = self
            .files
            .write()
            .map_err(|_| ServiceError::Internal("file map lock poisoned".to_string()))?;
        let widget = map.entry(widget_id.to_string()).or_default();
        widget.extend(files);
        for path in &deleted {
            widget.remove(path);
        }
        drop(map);

        if !deleted.is_empty()
            && let Ok(mut chunks) = self.chunks.write()
            && let Some(widget_chunks) = chunks.get_mut(widget_id)
        {
            widget_chunks.retain(|c| !deleted.contains(&c.file_path));
        }
        Ok(())
    }

    async fn fetch_files(&self, widget_id: &str) -> Result<FileMap, ServiceError> {
        self.check_store()?;
        self.widget_files(widget_id)
    }
}

#[async_trait]
impl SearchIndex for MemoryBackend {
    async fn exact_match(
        &self,
        widget_id: &str,
        pattern: &str,
    ) -> Result<Vec<IndexHit>, ServiceError> {
        let files = self.widget_files(widget_id)?;
        scan_lines(&files, pattern)
    }

    async fn filename_match(
        &self,
        widget_id: &str,
        pattern: &str,
    ) -> Result<Vec<IndexHit>, ServiceError> {
        let files = self.widget_files(widget_id)?;
        scan_paths(files, pattern)
    }

    async fn vector_search(
        &self,
        widget_id: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, ServiceError> {
        let chunks = self
            .chunks
            .read()
            .map_err(|_| ServiceError::Internal("chunk lock poisoned".to_string()))?;
        let mut scored: Vec<ScoredChunk> = chunks
            .get(widget_id)
            .map(|widget_chunks| {
                widget_chunks
                    .iter()
                    .map(|c| ScoredChunk {
                        file_path: c.file_path.clone(),
                        content: c.content.clone(),
                        line_start: c.line_start,
                        line_end: c.line_end,
                        score: cosine_similarity(vector, &c.vector),
                        granularity: c.granularity,
                    })
                    .collect()
            })
            .unwrap_or_default();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        Ok(scored)
    }
}

#[async_trait]
impl IndexWriter for MemoryBackend {
    async fn upsert(
        &self,
        widget_id: &str,
        file_path: &str,
        _content: &str,
    ) -> Result<(), ServiceError> {
        if self.fail_index_writes.load(Ordering::SeqCst) {
            return Err(ServiceError::RemoteOperationFailure(
                "index unavailable".to_string(),
            ));
        }
        if let Ok(mut indexed) = self.indexed.write() {
            indexed.insert((widget_id.to_string(), file_path.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, widget_id: &str, file_path: &str) -> Result<(), ServiceError> {
        if self.fail_index_writes.load(Ordering::SeqCst) {
            return Err(ServiceError::RemoteOperationFailure(
                "index unavailable".to_string(),
            ));
        }
        if let Ok(mut indexed) = self.indexed.write() {
            indexed.remove(&(widget_id.to_string(), file_path.to_string()));
        }
        if let Ok(mut chunks) = self.chunks.write()
            && let Some(widget_chunks) = chunks.get_mut(widget_id)
        {
            widget_chunks.retain(|c| c.file_path != file_path);
        }
        Ok(())
    }
}

/// Deterministic bag-of-words embedder for tests and offline use.
///
/// Each lowercase alphanumeric token is hashed into one of `dimensions`
/// buckets, so texts sharing words have a positive cosine similarity.
pub struct MemoryEmbeddingProvider {
    dimensions: usize,
    fixed: HashMap<String, Vec<f32>>,
}

impl MemoryEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            fixed: HashMap::new(),
        }
    }

    /// Return `vector` verbatim whenever `text` is embedded.
    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.fixed.insert(text.to_string(), vector);
        self
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        if let Some(vector) = self.fixed.get(text) {
            return vector.clone();
        }
        let mut vector = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return vector;
        }
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            // FNV-1a
            let hash = token
                .to_lowercase()
                .bytes()
                .fold(0xcbf29ce484222325u64, |h, b| {
                    (h ^ u64::from(b)).wrapping_mul(0x100000001b3)
                });
            vector[(hash % self.dimensions as u64) as usize] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for MemoryEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        Ok(self.embed_text(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
