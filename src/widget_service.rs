use crate::backend::{
    EmbeddingProvider, FileStore, HttpEmbeddingProvider, HttpFileStore, HttpSearchIndex,
    IndexWriter, LocalDirStore, MemoryEmbeddingProvider, NoopIndexWriter, SearchIndex, fetch_file,
};
use crate::config::ServiceConfig;
use crate::errors::ServiceError;
use crate::gateway::{FileMutationGateway, file_hash};
use crate::hybrid::HybridSearchRouter;
use crate::path_validation::{normalize_file_path, validate_widget_id};
use crate::pattern::RegexCache;
use crate::replace::LineReplaceEngine;
use crate::search::RegexSearchEngine;
use crate::tool_router::ToolRouter;
use crate::tools::ToolService;
use crate::types::*;
use crate::viewer::render_view;

use std::sync::Arc;

use rmcp::{
    ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, ErrorData, Implementation, InitializeResult,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities,
    },
    service::{RequestContext, RoleServer},
};

/// The capabilities a `WidgetService` runs against.
#[derive(Clone)]
pub struct Backends {
    pub store: Arc<dyn FileStore>,
    pub index: Arc<dyn SearchIndex>,
    pub index_writer: Arc<dyn IndexWriter>,
    pub embedder: Arc<dyn EmbeddingProvider>,
}

impl Backends {
    /// Remote bindings when `store_url` is set, otherwise the directory store
    /// under `local_root`.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        if config.store_url.is_some() {
            let store = Arc::new(HttpFileStore::from_config(config)?);
            let index = Arc::new(HttpSearchIndex::from_config(config)?);
            let index_writer: Arc<dyn IndexWriter> = if config.index_writes_enabled {
                index.clone()
            } else {
                Arc::new(NoopIndexWriter)
            };
            let embedder = Arc::new(HttpEmbeddingProvider::from_config(config)?);
            tracing::info!("using remote widget store");
            return Ok(Self {
                store,
                index,
                index_writer,
                embedder,
            });
        }

        let Some(root) = &config.local_root else {
            return Err(ServiceError::ConfigurationMissing(
                "store_url (WIDGET_STORE_URL) or local_root".to_string(),
            ));
        };
        let local = Arc::new(LocalDirStore::new(root));
        let embedder: Arc<dyn EmbeddingProvider> = if config.embedding_url.is_some() {
            Arc::new(HttpEmbeddingProvider::from_config(config)?)
        } else {
            Arc::new(MemoryEmbeddingProvider::new(config.embedding_dimensions))
        };
        tracing::info!(root = %root.display(), "using local widget directory");
        Ok(Self {
            store: local.clone(),
            index: local,
            index_writer: Arc::new(NoopIndexWriter),
            embedder,
        })
    }
}

#[derive(Clone)]
pub struct WidgetService {
    config: ServiceConfig,
    store: Arc<dyn FileStore>,
    gateway: FileMutationGateway,
    search_engine: RegexSearchEngine,
    search_router: HybridSearchRouter,
    replace_engine: LineReplaceEngine,
}

impl WidgetService {
    pub fn from_config(config: ServiceConfig) -> Result<Self, ServiceError> {
        let backends = Backends::from_config(&config)?;
        Ok(Self::with_backends(config, backends))
    }

    pub fn with_backends(config: ServiceConfig, backends: Backends) -> Self {
        let regex_cache = RegexCache::new(config.pattern_cache_size);
        let gateway = FileMutationGateway::new(
            config.clone(),
            backends.store.clone(),
            backends.index_writer,
        );
        let search_engine =
            RegexSearchEngine::new(config.clone(), backends.store.clone(), regex_cache);
        let search_router =
            HybridSearchRouter::new(config.clone(), backends.index, backends.embedder);
        let replace_engine =
            LineReplaceEngine::new(config.clone(), backends.store.clone(), gateway.clone());

        Self {
            config,
            store: backends.store,
            gateway,
            search_engine,
            search_router,
            replace_engine,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    #[tracing::instrument(skip(self, param), fields(widget_id = %param.widget_id, file_path = %param.file_path, bytes = param.content.len()))]
    pub async fn write_file(&self, param: WriteFileParam) -> MutationResult {
        self.gateway
            .write(&param.widget_id, &param.file_path, &param.content)
            .await
    }

    #[tracing::instrument(skip(self, param), fields(widget_id = %param.widget_id, file_path = %param.file_path))]
    pub async fn view_file(&self, param: ViewFileParam) -> ViewFileResult {
        match self.try_view_file(&param).await {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(error = %e, "view failed");
                ViewFileResult::failure(&e)
            }
        }
    }

    async fn try_view_file(&self, param: &ViewFileParam) -> Result<ViewFileResult, ServiceError> {
        validate_widget_id(&param.widget_id)?;
        let path = normalize_file_path(&param.file_path)?;
        let content = fetch_file(
            self.store.as_ref(),
            self.config.remote_timeout(),
            &param.widget_id,
            &path,
        )
        .await?;
        let view = render_view(
            &content,
            param.lines.as_deref(),
            self.config.default_view_lines,
        );
        Ok(ViewFileResult {
            success: true,
            content: view.content,
            total_lines: view.total_lines,
            lines_shown: view.lines_shown,
            file_hash: Some(file_hash(&content)),
            error: None,
        })
    }

    #[tracing::instrument(skip(self, param), fields(widget_id = %param.widget_id, file_path = %param.file_path))]
    pub async fn delete_file(&self, param: DeleteFileParam) -> MutationResult {
        self.gateway
            .delete(&param.widget_id, &param.file_path, param.remove_from_index)
            .await
    }

    #[tracing::instrument(skip(self, param), fields(widget_id = %param.widget_id, query = %param.query, include = %param.include_pattern))]
    pub async fn search_files(&self, param: SearchFilesParam) -> SearchFilesResult {
        let outcome = match validate_widget_id(&param.widget_id) {
            Ok(()) => self.search_engine.search_files(&param).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(matches) => SearchFilesResult {
                success: true,
                total_matches: matches.len(),
                matches,
                error: None,
            },
            Err(e) => {
                tracing::debug!(error = %e, "search_files failed");
                SearchFilesResult::failure(&e)
            }
        }
    }

    #[tracing::instrument(skip(self, param), fields(widget_id = %param.widget_id, search_type = %param.search_type))]
    pub async fn search(&self, param: SearchParam) -> SearchResponse {
        let outcome = match validate_widget_id(&param.widget_id) {
            Ok(()) => self.search_router.search(&param).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(results) => SearchResponse {
                success: true,
                total_results: results.len(),
                results,
                error: None,
            },
            Err(e) => {
                tracing::debug!(error = %e, "search failed");
                SearchResponse::failure(&e)
            }
        }
    }

    #[tracing::instrument(skip(self, param), fields(widget_id = %param.widget_id, file_path = %param.file_path, first = param.first_replaced_line, last = param.last_replaced_line))]
    pub async fn replace_lines(&self, param: ReplaceLinesParam) -> ReplaceLinesResult {
        match self.replace_engine.replace_lines(&param).await {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(error = %e, "replace_lines aborted");
                ReplaceLinesResult::failure(&e)
            }
        }
    }
}

impl ServerHandler for WidgetService {
    fn get_info(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation::from_build_env(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some("This MCP server edits and searches the source files of a widget. View a file before replacing lines in it: replace_lines checks the search text against the current content of the range and refuses stale edits. Use `...` in the search text to elide unchanged lines.".into()),
        }
    }

    #[tracing::instrument(skip(self, _request, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ToolService::list_tools())
    }

    #[tracing::instrument(skip(self, request, _context), fields(tool_name = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        ToolRouter::route_tool_call(self, request).await
    }
}
