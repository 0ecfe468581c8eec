use super::IndexWriter;
use crate::errors::ServiceError;
use async_trait::async_trait;

/// Index writer used while index maintenance is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIndexWriter;

#[async_trait]
impl IndexWriter for NoopIndexWriter {
    async fn upsert(&self, widget_id: &str, file_path: &str, _content: &str) -> Result<(), ServiceError> {
        tracing::trace!(widget_id, file_path, "index upsert skipped");
        Ok(())
    }

    async fn delete(&self, widget_id: &str, file_path: &str) -> Result<(), ServiceError> {
        tracing::trace!(widget_id, file_path, "index delete skipped");
        Ok(())
    }
}
