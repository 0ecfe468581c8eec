//! Production HTTP bindings for the remote store, search index and embeddings.
//!
//! Every call builds its own client, so the connection is acquired inside the
//! call and released when it returns on any path.

use super::{EmbeddingProvider, FileMap, FileStore, IndexHit, IndexWriter, ScoredChunk, SearchIndex};
use crate::config::{ServiceConfig, require};
use crate::errors::ServiceError;
use crate::path_validation::validate_widget_id;
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Endpoint {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl Endpoint {
    fn client(&self) -> Result<reqwest::Client, ServiceError> {
        Ok(reqwest::Client::builder().timeout(self.timeout).build()?)
    }

    /// Builds `<base>/widgets/<widget_id>/<suffix>`.
    ///
    /// The widget id is pushed as one percent-encoded segment, so it can never
    /// add path segments, a query or a fragment to the request.
    fn url(&self, widget_id: &str, suffix: &str) -> Result<Url, ServiceError> {
        validate_widget_id(widget_id)?;
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ServiceError::ConfigurationMissing(format!("invalid base url '{}': {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ServiceError::ConfigurationMissing(format!(
                    "base url '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push("widgets")
            .push(widget_id)
            .extend(suffix.split('/'));
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<R: DeserializeOwned>(&self, url: Url) -> Result<R, ServiceError> {
        let client = self.client()?;
        let response = self.authorize(client.get(url)).send().await?;
        decode(response).await
    }

    /// POST expecting only a success status; the body is ignored.
    async fn send<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<(), ServiceError> {
        let client = self.client()?;
        let response = self.authorize(client.post(url)).json(body).send().await?;
        check_status(response).await.map(|_| ())
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<R, ServiceError> {
        let client = self.client()?;
        let response = self.authorize(client.post(url)).json(body).send().await?;
        decode(response).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::RemoteOperationFailure(format!(
        "HTTP {status}: {}",
        body.trim()
    )))
}

async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ServiceError> {
    Ok(check_status(response).await?.json::<R>().await?)
}

#[derive(Deserialize)]
struct FilesResponse {
    files: FileMap,
}

#[derive(Serialize)]
struct UpsertFilesRequest<'a> {
    files: &'a FileMap,
    deleted: &'a [String],
}

#[derive(Deserialize)]
struct MatchesResponse<T> {
    matches: Vec<T>,
}

#[derive(Serialize)]
struct PatternRequest<'a> {
    pattern: &'a str,
}

#[derive(Serialize)]
struct VectorRequest<'a> {
    vector: &'a [f32],
    limit: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexFileRequest<'a> {
    file_path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
}

pub struct HttpFileStore {
    endpoint: Endpoint,
}

impl HttpFileStore {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let base_url = require(config.store_url.as_deref(), "store_url (WIDGET_STORE_URL)")?;
        let token = require(config.store_token.as_deref(), "store_token (WIDGET_STORE_TOKEN)")?;
        Ok(Self {
            endpoint: Endpoint {
                base_url: base_url.to_string(),
                token: Some(token.to_string()),
                timeout: config.remote_timeout(),
            },
        })
    }
}

#[async_trait]
impl FileStore for HttpFileStore {
    #[tracing::instrument(skip(self, files, deleted), fields(files = files.len(), deleted = deleted.len()))]
    async fn upsert_files(
        &self,
        widget_id: &str,
        files: FileMap,
        deleted: Vec<String>,
    ) -> Result<(), ServiceError> {
        let url = self.endpoint.url(widget_id, "files")?;
        self.endpoint
            .send(
                url,
                &UpsertFilesRequest {
                    files: &files,
                    deleted: &deleted,
                },
            )
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_files(&self, widget_id: &str) -> Result<FileMap, ServiceError> {
        let url = self.endpoint.url(widget_id, "files")?;
        let response: FilesResponse = self.endpoint.get(url).await?;
        Ok(response.files)
    }
}

pub struct HttpSearchIndex {
    endpoint: Endpoint,
}

impl HttpSearchIndex {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let base_url = require(config.effective_index_url(), "index_url (WIDGET_INDEX_URL)")?;
        Ok(Self {
            endpoint: Endpoint {
                base_url: base_url.to_string(),
                token: config.store_token.clone(),
                timeout: config.remote_timeout(),
            },
        })
    }
}

#[async_trait]
impl SearchIndex for HttpSearchIndex {
    async fn exact_match(
        &self,
        widget_id: &str,
        pattern: &str,
    ) -> Result<Vec<IndexHit>, ServiceError> {
        let url = self.endpoint.url(widget_id, "search/exact")?;
        let response: MatchesResponse<IndexHit> =
            self.endpoint.post(url, &PatternRequest { pattern }).await?;
        Ok(response.matches)
    }

    async fn filename_match(
        &self,
        widget_id: &str,
        pattern: &str,
    ) -> Result<Vec<IndexHit>, ServiceError> {
        let url = self.endpoint.url(widget_id, "search/filename")?;
        let response: MatchesResponse<IndexHit> =
            self.endpoint.post(url, &PatternRequest { pattern }).await?;
        Ok(response.matches)
    }

    async fn vector_search(
        &self,
        widget_id: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, ServiceError> {
        let url = self.endpoint.url(widget_id, "search/vector")?;
        let response: MatchesResponse<ScoredChunk> = self
            .endpoint
            .post(url, &VectorRequest { vector, limit })
            .await?;
        Ok(response.matches)
    }
}

#[async_trait]
impl IndexWriter for HttpSearchIndex {
    async fn upsert(
        &self,
        widget_id: &str,
        file_path: &str,
        content: &str,
    ) -> Result<(), ServiceError> {
        let url = self.endpoint.url(widget_id, "index/upsert")?;
        self.endpoint
            .send(
                url,
                &IndexFileRequest {
                    file_path,
                    content: Some(content),
                },
            )
            .await
    }

    async fn delete(&self, widget_id: &str, file_path: &str) -> Result<(), ServiceError> {
        let url = self.endpoint.url(widget_id, "index/delete")?;
        self.endpoint
            .send(
                url,
                &IndexFileRequest {
                    file_path,
                    content: None,
                },
            )
            .await
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

fn first_embedding(body: EmbeddingResponse) -> Result<Vec<f32>, ServiceError> {
    body.data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| {
            ServiceError::RemoteOperationFailure("embedding response had no data".to_string())
        })
}

/// OpenAI-compatible embeddings client.
pub struct HttpEmbeddingProvider {
    url: String,
    api_key: String,
    model: String,
    dimensions: usize,
    timeout: Duration,
}

impl HttpEmbeddingProvider {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let url = require(config.embedding_url.as_deref(), "embedding_url (EMBEDDING_API_URL)")?;
        let api_key = require(
            config.embedding_api_key.as_deref(),
            "embedding_api_key (EMBEDDING_API_KEY)",
        )?;
        Ok(Self {
            url: url.to_string(),
            api_key: api_key.to_string(),
            model: config.embedding_model.clone(),
            dimensions: config.embedding_dimensions,
            timeout: config.remote_timeout(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    #[tracing::instrument(skip(self, text), fields(model = %self.model, chars = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        let response = client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await?;
        first_embedding(decode(response).await?)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
