use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};

// Mutation types

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteFileParam {
    pub widget_id: String,
    pub file_path: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileParam {
    pub widget_id: String,
    pub file_path: String,
    #[serde(default = "default_true")]
    pub remove_from_index: bool,
}

/// Outcome of a whole-file write or delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MutationResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MutationResult {
    pub fn failure(message: impl Into<String>, file_path: Option<String>, err: &ServiceError) -> Self {
        Self {
            success: false,
            message: message.into(),
            file_path,
            file_hash: None,
            error: Some(err.to_string()),
        }
    }
}

// View types

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewFileParam {
    pub widget_id: String,
    pub file_path: String,
    /// Comma-separated ranges such as "1-50, 100-150"; omitted shows the default window
    pub lines: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewFileResult {
    pub success: bool,
    pub content: String,
    pub total_lines: usize,
    pub lines_shown: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ViewFileResult {
    pub fn failure(err: &ServiceError) -> Self {
        Self {
            success: false,
            content: String::new(),
            total_lines: 0,
            lines_shown: String::new(),
            file_hash: None,
            error: Some(err.to_string()),
        }
    }
}

// Regex search types

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilesParam {
    pub widget_id: String,
    pub query: String,
    #[serde(default = "default_include_pattern")]
    pub include_pattern: String,
    pub exclude_pattern: Option<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    pub context_lines: Option<usize>,
}

impl SearchFilesParam {
    pub fn new(widget_id: &str, query: &str, include_pattern: &str) -> Self {
        Self {
            widget_id: widget_id.to_string(),
            query: query.to_string(),
            include_pattern: include_pattern.to_string(),
            exclude_pattern: None,
            case_sensitive: false,
            context_lines: None,
        }
    }
}

/// A single regex hit with its surrounding lines. `line` and `column` are 1-indexed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    pub file_path: String,
    pub line: usize,
    pub column: usize,
    pub match_text: String,
    pub before_context: Vec<String>,
    pub after_context: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilesResult {
    pub success: bool,
    pub matches: Vec<SearchMatch>,
    pub total_matches: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchFilesResult {
    pub fn failure(err: &ServiceError) -> Self {
        Self {
            success: false,
            matches: vec![],
            total_matches: 0,
            error: Some(err.to_string()),
        }
    }
}

// Hybrid search types

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Semantic,
    Exact,
    Filename,
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchType::Semantic => write!(f, "semantic"),
            SearchType::Exact => write!(f, "exact"),
            SearchType::Filename => write!(f, "filename"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParam {
    pub widget_id: String,
    pub query: String,
    #[serde(default)]
    pub search_type: SearchType,
    pub limit: Option<usize>,
}

/// Grouping level of an indexed chunk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    File,
    Component,
    Function,
    Block,
}

/// Mode-specific part of a search result, tagged by `matchType`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "matchType", rename_all = "lowercase")]
pub enum MatchKind {
    Semantic { score: f32, granularity: Granularity },
    Exact,
    Filename,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub file_path: String,
    pub content: String,
    pub line_start: usize,
    pub line_end: usize,
    #[serde(flatten)]
    pub kind: MatchKind,
}

impl SearchResult {
    pub fn score(&self) -> Option<f32> {
        match self.kind {
            MatchKind::Semantic { score, .. } => Some(score),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<SearchResult>,
    pub total_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn failure(err: &ServiceError) -> Self {
        Self {
            success: false,
            results: vec![],
            total_results: 0,
            error: Some(err.to_string()),
        }
    }
}

// Replace types

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceLinesParam {
    pub widget_id: String,
    pub file_path: String,
    pub search: String,
    pub first_replaced_line: usize,
    pub last_replaced_line: usize,
    pub replace: String,
}

impl ReplaceLinesParam {
    pub fn new(
        widget_id: &str,
        file_path: &str,
        search: &str,
        first_replaced_line: usize,
        last_replaced_line: usize,
        replace: &str,
    ) -> Self {
        Self {
            widget_id: widget_id.to_string(),
            file_path: file_path.to_string(),
            search: search.to_string(),
            first_replaced_line,
            last_replaced_line,
            replace: replace.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceLinesResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplaceLinesResult {
    pub fn failure(err: &ServiceError) -> Self {
        Self {
            success: false,
            message: "Replace aborted".to_string(),
            error: Some(err.to_string()),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_include_pattern() -> String {
    "**/*".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_semantic_result_serializes_flat() {
        let result = SearchResult {
            file_path: "/src/Card.tsx".into(),
            content: "export function Card() {}".into(),
            line_start: 1,
            line_end: 1,
            kind: MatchKind::Semantic {
                score: 0.5,
                granularity: Granularity::Function,
            },
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["matchType"], "semantic");
        assert_eq!(value["score"], 0.5);
        assert_eq!(value["granularity"], "function");
        assert_eq!(value["filePath"], "/src/Card.tsx");
    }

    #[test]
    fn test_exact_result_has_no_score() {
        let value = serde_json::to_value(SearchResult {
            file_path: "/a.ts".into(),
            content: "x".into(),
            line_start: 2,
            line_end: 2,
            kind: MatchKind::Exact,
        })
        .unwrap();
        assert_eq!(value["matchType"], "exact");
        assert!(value.get("score").is_none());
        assert!(value.get("granularity").is_none());
    }

    #[test]
    fn test_param_defaults() {
        let param: SearchFilesParam =
            serde_json::from_value(json!({ "widgetId": "w", "query": "foo" })).unwrap();
        assert_eq!(param.include_pattern, "**/*");
        assert!(!param.case_sensitive);

        let param: DeleteFileParam =
            serde_json::from_value(json!({ "widgetId": "w", "filePath": "/a" })).unwrap();
        assert!(param.remove_from_index);

        let param: SearchParam =
            serde_json::from_value(json!({ "widgetId": "w", "query": "q", "searchType": "filename" }))
                .unwrap();
        assert_eq!(param.search_type, SearchType::Filename);
    }
}
