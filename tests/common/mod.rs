// Common test utilities
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use widget_mcp::backend::{FileMap, FileStore, MemoryBackend, MemoryEmbeddingProvider};
use widget_mcp::config::ServiceConfig;
use widget_mcp::errors::ServiceError;
use widget_mcp::{Backends, WidgetService};

pub const WIDGET: &str = "widget-1";
pub const DIMENSIONS: usize = 4;

pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        embedding_dimensions: DIMENSIONS,
        remote_timeout_ms: 500,
        ..Default::default()
    }
}

/// A small React widget spread over a few files.
pub fn sample_backend() -> Arc<MemoryBackend> {
    Arc::new(MemoryBackend::new().with_files(
        WIDGET,
        [
            (
                "/src/App.tsx",
                "import { Card } from './Card';\n\nexport default function App() {\n  return <Card title=\"hi\" />;\n}",
            ),
            (
                "/src/Card.tsx",
                "export function Card({ title }) {\n  const [open, setOpen] = useState(false);\n  return <div>{title}</div>;\n}",
            ),
            ("/src/cardList.ts", "export const cards = [];"),
            ("/src/Button.tsx", "export const Button = () => <button />;"),
            ("/node_modules/react/index.js", "module.exports = useState;"),
        ],
    ))
}

pub fn service_with(backend: &Arc<MemoryBackend>, config: ServiceConfig) -> WidgetService {
    WidgetService::with_backends(
        config,
        Backends {
            store: backend.clone(),
            index: backend.clone(),
            index_writer: backend.clone(),
            embedder: Arc::new(MemoryEmbeddingProvider::new(DIMENSIONS)),
        },
    )
}

pub fn service(backend: &Arc<MemoryBackend>) -> WidgetService {
    service_with(backend, test_config())
}

/// Store whose calls never finish within any sensible timeout.
pub struct SlowStore {
    pub delay: Duration,
}

#[async_trait]
impl FileStore for SlowStore {
    async fn upsert_files(
        &self,
        _widget_id: &str,
        _files: FileMap,
        _deleted: Vec<String>,
    ) -> Result<(), ServiceError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    async fn fetch_files(&self, _widget_id: &str) -> Result<FileMap, ServiceError> {
        tokio::time::sleep(self.delay).await;
        Ok(FileMap::new())
    }
}
