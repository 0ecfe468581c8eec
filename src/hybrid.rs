//! # Hybrid Search Router
//!
//! Dispatches a query to semantic, exact or filename search and returns every
//! mode in the same `SearchResult` shape.

use crate::backend::{EmbeddingProvider, IndexHit, SearchIndex, bounded};
use crate::config::ServiceConfig;
use crate::errors::ServiceError;
use crate::types::{MatchKind, SearchParam, SearchResult, SearchType};
use std::sync::Arc;

#[derive(Clone)]
pub struct HybridSearchRouter {
    config: ServiceConfig,
    index: Arc<dyn SearchIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl HybridSearchRouter {
    pub fn new(
        config: ServiceConfig,
        index: Arc<dyn SearchIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            config,
            index,
            embedder,
        }
    }

    pub async fn search(&self, param: &SearchParam) -> Result<Vec<SearchResult>, ServiceError> {
        if param.query.trim().is_empty() {
            return Err(ServiceError::InvalidQuery("query is empty".to_string()));
        }
        let limit = param.limit.unwrap_or(self.config.default_search_limit);

        let results = match param.search_type {
            SearchType::Semantic => self.semantic(&param.widget_id, &param.query, limit).await?,
            SearchType::Exact => {
                let hits = bounded(
                    self.config.remote_timeout(),
                    "exact_match",
                    self.index.exact_match(&param.widget_id, &param.query),
                )
                .await?;
                tag_hits(hits, MatchKind::Exact, limit)
            }
            SearchType::Filename => {
                let hits = bounded(
                    self.config.remote_timeout(),
                    "filename_match",
                    self.index.filename_match(&param.widget_id, &param.query),
                )
                .await?;
                tag_hits(hits, MatchKind::Filename, limit)
            }
        };

        tracing::debug!(
            search_type = %param.search_type,
            results = results.len(),
            "hybrid search complete"
        );
        Ok(results)
    }

    async fn semantic(
        &self,
        widget_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, ServiceError> {
        let timeout = self.config.remote_timeout();
        let vector = bounded(timeout, "embed", self.embedder.embed(query)).await?;
        let expected = self.config.embedding_dimensions;
        if vector.len() != expected {
            return Err(ServiceError::RemoteOperationFailure(format!(
                "embedding has {} dimensions, expected {expected}",
                vector.len()
            )));
        }

        let candidates = bounded(
            timeout,
            "vector_search",
            self.index.vector_search(widget_id, &vector, limit),
        )
        .await?;
        let candidate_count = candidates.len();

        let mut results: Vec<SearchResult> = candidates
            .into_iter()
            .filter(|c| c.score >= self.config.semantic_min_score)
            .map(|c| SearchResult {
                file_path: c.file_path,
                content: c.content,
                line_start: c.line_start,
                line_end: c.line_end,
                kind: MatchKind::Semantic {
                    score: c.score,
                    granularity: c.granularity,
                },
            })
            .collect();
        results.sort_by(|a, b| {
            b.score()
                .partial_cmp(&a.score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        tracing::debug!(
            candidates = candidate_count,
            kept = results.len(),
            min_score = self.config.semantic_min_score,
            "semantic candidates filtered"
        );
        Ok(results)
    }
}

/// Exact and filename hits keep storage iteration order.
fn tag_hits(hits: Vec<IndexHit>, kind: MatchKind, limit: usize) -> Vec<SearchResult> {
    hits.into_iter()
        .take(limit)
        .map(|hit| SearchResult {
            file_path: hit.file_path,
            content: hit.content,
            line_start: hit.line_start,
            line_end: hit.line_end,
            kind: kind.clone(),
        })
        .collect()
}
