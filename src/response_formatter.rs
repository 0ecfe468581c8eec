use crate::types::*;
use rmcp::model::{CallToolResult, Content};
use serde_json;

pub struct ResponseFormatter;

/// Matches listed individually before the summary switches to per-file counts.
const MAX_LISTED_MATCHES: usize = 20;

impl ResponseFormatter {
    /// Create a formatted response with both JSON data and human-readable text.
    /// Results with `success: false` are flagged as tool errors.
    pub fn create_formatted_response<T>(
        result: &T,
        summary: String,
        success: bool,
    ) -> Result<CallToolResult, Box<dyn std::error::Error + Send + Sync>>
    where
        T: serde::Serialize,
    {
        let json_value = serde_json::to_value(result)?;

        let contents = vec![Content::text(summary), Content::json(json_value)?];

        if success {
            Ok(CallToolResult::success(contents))
        } else {
            Ok(CallToolResult::error(contents))
        }
    }

    pub fn format_mutation_result(result: &MutationResult) -> String {
        if !result.success {
            return Self::format_failure(&result.message, result.error.as_deref());
        }
        match &result.file_hash {
            Some(hash) => format!("✅ {}\n🔑 {}", result.message, hash),
            None => format!("✅ {}", result.message),
        }
    }

    pub fn format_view_result(result: &ViewFileResult) -> String {
        if !result.success {
            return Self::format_failure("View failed", result.error.as_deref());
        }
        format!(
            "📄 Lines {} of {}\n\n{}",
            result.lines_shown, result.total_lines, result.content
        )
    }

    pub fn format_search_files_result(result: &SearchFilesResult) -> String {
        if !result.success {
            return Self::format_failure("Search failed", result.error.as_deref());
        }
        if result.matches.is_empty() {
            return "🔍 **No matches found**".to_string();
        }

        let files: std::collections::BTreeSet<&str> =
            result.matches.iter().map(|m| m.file_path.as_str()).collect();
        let mut summary = format!(
            "🔍 **{} matches** in {} files\n",
            result.total_matches,
            files.len()
        );

        if result.matches.len() <= MAX_LISTED_MATCHES {
            for m in &result.matches {
                summary.push_str(&format!(
                    "\n{}:{}:{}  {}",
                    m.file_path, m.line, m.column, m.match_text
                ));
            }
        } else {
            for file in files {
                let count = result.matches.iter().filter(|m| m.file_path == file).count();
                summary.push_str(&format!("\n{file}: {count} matches"));
            }
        }
        summary
    }

    pub fn format_search_response(result: &SearchResponse) -> String {
        if !result.success {
            return Self::format_failure("Search failed", result.error.as_deref());
        }
        if result.results.is_empty() {
            return "🔍 **No results**".to_string();
        }

        let mut summary = format!("🔍 **{} results**\n", result.total_results);
        for r in &result.results {
            let detail = match &r.kind {
                MatchKind::Semantic { score, granularity } => {
                    format!("semantic {score:.2} {granularity:?}").to_lowercase()
                }
                MatchKind::Exact => "exact".to_string(),
                MatchKind::Filename => "filename".to_string(),
            };
            summary.push_str(&format!(
                "\n{}:{}-{} ({})",
                r.file_path, r.line_start, r.line_end, detail
            ));
        }
        summary
    }

    pub fn format_replace_result(result: &ReplaceLinesResult) -> String {
        if result.success {
            format!("✏️ {}", result.message)
        } else {
            Self::format_failure(&result.message, result.error.as_deref())
        }
    }

    fn format_failure(message: &str, error: Option<&str>) -> String {
        match error {
            Some(error) => format!("❌ {message}: {error}"),
            None => format!("❌ {message}"),
        }
    }
}
