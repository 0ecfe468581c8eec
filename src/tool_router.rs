//! # Tool Router Module
//!
//! Routes MCP tool calls to `WidgetService` operations. Argument decoding
//! failures and unknown tools are protocol errors; everything else comes back
//! as a structured result.

use crate::response_formatter::ResponseFormatter;
use crate::types::*;
use crate::widget_service::WidgetService;

use rmcp::model::{CallToolRequestParam, CallToolResult, ErrorData};
use serde::de::DeserializeOwned;
use std::borrow::Cow;

/// Routes tool calls to appropriate service methods
pub struct ToolRouter;

impl ToolRouter {
    /// Helper function to parse request parameters
    fn parse_params<T: DeserializeOwned>(request: &CallToolRequestParam) -> Result<T, ErrorData> {
        serde_json::from_value(serde_json::Value::Object(
            request.arguments.clone().unwrap_or_default(),
        ))
        .map_err(|e| ErrorData::invalid_params(Cow::Owned(e.to_string()), None))
    }

    /// Helper function to create formatted response
    fn create_formatted_response<T: serde::Serialize>(
        result: &T,
        summary: String,
        success: bool,
    ) -> Result<CallToolResult, ErrorData> {
        ResponseFormatter::create_formatted_response(result, summary, success)
            .map_err(|e| ErrorData::internal_error(Cow::Owned(e.to_string()), None))
    }

    /// Route a tool call to the appropriate service method
    pub async fn route_tool_call(
        service: &WidgetService,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ErrorData> {
        match request.name.as_ref() {
            // Mutations
            "write_file" => Self::handle_write_file(service, request).await,
            "delete_file" => Self::handle_delete_file(service, request).await,
            "replace_lines" => Self::handle_replace_lines(service, request).await,

            // Reads
            "view_file" => Self::handle_view_file(service, request).await,
            "search_files" => Self::handle_search_files(service, request).await,
            "search" => Self::handle_search(service, request).await,

            _ => Err(ErrorData::method_not_found::<
                rmcp::model::CallToolRequestMethod,
            >()),
        }
    }

    async fn handle_write_file(
        service: &WidgetService,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ErrorData> {
        let param: WriteFileParam = Self::parse_params(&request)?;
        let result = service.write_file(param).await;
        let summary = ResponseFormatter::format_mutation_result(&result);
        Self::create_formatted_response(&result, summary, result.success)
    }

    async fn handle_delete_file(
        service: &WidgetService,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ErrorData> {
        let param: DeleteFileParam = Self::parse_params(&request)?;
        let result = service.delete_file(param).await;
        let summary = ResponseFormatter::format_mutation_result(&result);
        Self::create_formatted_response(&result, summary, result.success)
    }

    async fn handle_replace_lines(
        service: &WidgetService,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ErrorData> {
        let param: ReplaceLinesParam = Self::parse_params(&request)?;
        let result = service.replace_lines(param).await;
        let summary = ResponseFormatter::format_replace_result(&result);
        Self::create_formatted_response(&result, summary, result.success)
    }

    async fn handle_view_file(
        service: &WidgetService,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ErrorData> {
        let param: ViewFileParam = Self::parse_params(&request)?;
        let result = service.view_file(param).await;
        let summary = ResponseFormatter::format_view_result(&result);
        Self::create_formatted_response(&result, summary, result.success)
    }

    async fn handle_search_files(
        service: &WidgetService,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ErrorData> {
        let param: SearchFilesParam = Self::parse_params(&request)?;
        let result = service.search_files(param).await;
        let summary = ResponseFormatter::format_search_files_result(&result);
        Self::create_formatted_response(&result, summary, result.success)
    }

    async fn handle_search(
        service: &WidgetService,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ErrorData> {
        // LLMs sometimes send the regex tool's field names here
        if let Some(args) = &request.arguments
            && args.contains_key("includePattern")
        {
            return Err(ErrorData::invalid_params(
                Cow::Borrowed(
                    "The 'search' tool does not accept 'includePattern'. For regex search over files matching a glob, use the 'search_files' tool.",
                ),
                None,
            ));
        }

        let param: SearchParam = Self::parse_params(&request)?;
        let result = service.search(param).await;
        let summary = ResponseFormatter::format_search_response(&result);
        Self::create_formatted_response(&result, summary, result.success)
    }
}
