//! End-to-end tests for WidgetService over the in-memory backend.

mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use widget_mcp::backend::{MemoryBackend, MemoryEmbeddingProvider};
use widget_mcp::config::ServiceConfig;
use widget_mcp::types::*;
use widget_mcp::{Backends, WidgetService};

fn view(path: &str, lines: Option<&str>) -> ViewFileParam {
    ViewFileParam {
        widget_id: WIDGET.to_string(),
        file_path: path.to_string(),
        lines: lines.map(str::to_string),
    }
}

fn write(path: &str, content: &str) -> WriteFileParam {
    WriteFileParam {
        widget_id: WIDGET.to_string(),
        file_path: path.to_string(),
        content: content.to_string(),
    }
}

fn delete(path: &str) -> DeleteFileParam {
    DeleteFileParam {
        widget_id: WIDGET.to_string(),
        file_path: path.to_string(),
        remove_from_index: true,
    }
}

fn search(query: &str, search_type: SearchType) -> SearchParam {
    SearchParam {
        widget_id: WIDGET.to_string(),
        query: query.to_string(),
        search_type,
        limit: None,
    }
}

#[tokio::test]
async fn test_write_then_view() {
    let backend = Arc::new(MemoryBackend::new());
    let service = service(&backend);

    let written = service.write_file(write("src/new.ts", "a\nb\nc")).await;
    assert!(written.success);
    assert_eq!(written.file_path.as_deref(), Some("/src/new.ts"));

    let viewed = service.view_file(view("/src/new.ts", None)).await;
    assert!(viewed.success);
    assert_eq!(viewed.content, "1|a\n2|b\n3|c");
    assert_eq!(viewed.total_lines, 3);
    assert_eq!(viewed.lines_shown, "1-3");
    assert_eq!(viewed.file_hash, written.file_hash);
}

#[tokio::test]
async fn test_default_view_is_capped_at_500_lines() {
    let content = (1..=750)
        .map(|i| format!("line {i}"))
        .collect::<Vec<_>>()
        .join("\n");
    let backend = Arc::new(MemoryBackend::new().with_files(WIDGET, [("/big.ts", content)]));

    let viewed = service(&backend).view_file(view("/big.ts", None)).await;
    assert!(viewed.success);
    assert_eq!(viewed.total_lines, 750);
    assert_eq!(viewed.lines_shown, "1-500 (truncated)");
    let rows: Vec<&str> = viewed.content.split('\n').collect();
    assert_eq!(rows.len(), 500);
    assert_eq!(rows[0], "1|line 1");
}

#[tokio::test]
async fn test_view_ranges_keep_request_order() {
    let backend = sample_backend();
    let viewed = service(&backend)
        .view_file(view("/src/Card.tsx", Some("4, 1-2, bogus")))
        .await;
    assert!(viewed.success);
    assert_eq!(
        viewed.content,
        "4|}\n1|export function Card({ title }) {\n2|  const [open, setOpen] = useState(false);"
    );
    assert_eq!(viewed.lines_shown, "4, 1-2, bogus");
}

#[tokio::test]
async fn test_delete_then_view_is_not_found() {
    let backend = sample_backend();
    let service = service(&backend);

    let deleted = service.delete_file(delete("/src/Button.tsx")).await;
    assert!(deleted.success);

    let viewed = service.view_file(view("/src/Button.tsx", None)).await;
    assert!(!viewed.success);
    assert!(viewed.error.unwrap().contains("File not found"));
}

#[tokio::test]
async fn test_index_failure_does_not_fail_write_or_delete() {
    let backend = sample_backend();
    backend.fail_index_writes(true);
    let service = service(&backend);

    assert!(service.write_file(write("/src/x.ts", "x")).await.success);
    assert!(service.delete_file(delete("/src/x.ts")).await.success);
    assert!(backend.file(WIDGET, "/src/x.ts").is_none());
}

#[tokio::test]
async fn test_search_files_reports_column_and_context() {
    let backend = sample_backend();
    let mut param = SearchFilesParam::new(WIDGET, "useState", "**/*");
    param.exclude_pattern = Some("node_modules/**".to_string());

    let result = service(&backend).search_files(param).await;
    assert!(result.success);
    assert_eq!(result.total_matches, 1);
    let m = &result.matches[0];
    assert_eq!(m.file_path, "/src/Card.tsx");
    assert_eq!((m.line, m.column), (2, 27));
    assert_eq!(m.before_context, vec!["export function Card({ title }) {"]);
    assert_eq!(m.after_context, vec!["  return <div>{title}</div>;", "}"]);
}

#[tokio::test]
async fn test_search_files_default_excludes_come_from_config() {
    let backend = sample_backend();
    let config = ServiceConfig {
        default_excludes: vec!["**/node_modules/**".to_string()],
        ..test_config()
    };
    let service = service_with(&backend, config);

    let result = service
        .search_files(SearchFilesParam::new(WIDGET, "usestate", "**/*"))
        .await;
    assert_eq!(result.total_matches, 1);

    // A per-call exclude replaces the defaults
    let mut param = SearchFilesParam::new(WIDGET, "usestate", "**/*");
    param.exclude_pattern = Some("**/*.tsx".to_string());
    let result = service.search_files(param).await;
    assert_eq!(result.total_matches, 1);
    assert_eq!(result.matches[0].file_path, "/node_modules/react/index.js");
}

#[tokio::test]
async fn test_search_files_case_sensitivity() {
    let backend = sample_backend();
    let service = service(&backend);

    let mut param = SearchFilesParam::new(WIDGET, "usestate", "src/**");
    param.case_sensitive = true;
    assert_eq!(service.search_files(param).await.total_matches, 0);

    let param = SearchFilesParam::new(WIDGET, "usestate", "src/**");
    assert_eq!(service.search_files(param).await.total_matches, 1);
}

#[tokio::test]
async fn test_search_files_invalid_regex_is_failure() {
    let backend = sample_backend();
    let result = service(&backend)
        .search_files(SearchFilesParam::new(WIDGET, "(unclosed", "**/*"))
        .await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("Regex error"));
}

#[tokio::test]
async fn test_filename_search_for_card() {
    let backend = sample_backend();
    let response = service(&backend)
        .search(search("Card", SearchType::Filename))
        .await;
    assert!(response.success);
    let paths: Vec<&str> = response
        .results
        .iter()
        .map(|r| r.file_path.as_str())
        .collect();
    assert_eq!(paths, vec!["/src/Card.tsx", "/src/cardList.ts"]);
    assert!(
        response
            .results
            .iter()
            .all(|r| r.file_path.to_lowercase().contains("card"))
    );
}

#[tokio::test]
async fn test_semantic_search_never_returns_low_scores() {
    let backend = sample_backend();
    let embedder = MemoryEmbeddingProvider::new(DIMENSIONS);
    let query = embedder.embed_text("card title component");
    let opposite: Vec<f32> = query.iter().map(|x| -x).collect();
    backend.add_chunk(WIDGET, "/src/Card.tsx", "export function Card", (1, 4), Granularity::Component, query);
    backend.add_chunk(WIDGET, "/src/Button.tsx", "export const Button", (1, 1), Granularity::Component, opposite);

    let response = service(&backend)
        .search(search("card title component", SearchType::Semantic))
        .await;
    assert!(response.success);
    assert_eq!(response.total_results, 1);
    assert_eq!(response.results[0].file_path, "/src/Card.tsx");
    assert!(response.results.iter().all(|r| r.score().unwrap() >= 0.4));
}

#[tokio::test]
async fn test_empty_query_is_failure() {
    let backend = sample_backend();
    let response = service(&backend).search(search("", SearchType::Exact)).await;
    assert!(!response.success);
    assert!(response.results.is_empty());
}

#[tokio::test]
async fn test_replace_lines_splices_range() {
    let backend = Arc::new(MemoryBackend::new().with_files(WIDGET, [("/f.ts", "a\nb\nc\nd")]));
    let service = service(&backend);

    let result = service
        .replace_lines(ReplaceLinesParam::new(WIDGET, "/f.ts", "b\nc", 2, 3, "X\nY\nZ"))
        .await;
    assert!(result.success, "{result:?}");

    let viewed = service.view_file(view("/f.ts", None)).await;
    assert_eq!(viewed.content, "1|a\n2|X\n3|Y\n4|Z\n5|d");
}

#[tokio::test]
async fn test_replace_lines_mismatch_writes_nothing() {
    let backend = Arc::new(MemoryBackend::new().with_files(WIDGET, [("/f.ts", "a\nb\nc\nd")]));
    let calls_before = backend.upsert_calls();

    let result = service(&backend)
        .replace_lines(ReplaceLinesParam::new(WIDGET, "/f.ts", "q", 2, 3, "X"))
        .await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("does not match lines 2-3"));
    assert_eq!(backend.upsert_calls(), calls_before);
}

#[tokio::test]
async fn test_replace_lines_with_ellipsis() {
    let backend = Arc::new(MemoryBackend::new().with_files(
        WIDGET,
        [("/f.ts", "function f() {\n  x();\n  y();\n}")],
    ));
    let result = service(&backend)
        .replace_lines(ReplaceLinesParam::new(
            WIDGET,
            "/f.ts",
            "function f() {\n...\n}",
            1,
            4,
            "function f() {\n  z();\n}",
        ))
        .await;
    assert!(result.success);
    assert_eq!(
        backend.file(WIDGET, "/f.ts").as_deref(),
        Some("function f() {\n  z();\n}")
    );
}

#[tokio::test]
async fn test_replace_lines_invalid_range() {
    let backend = Arc::new(MemoryBackend::new().with_files(WIDGET, [("/f.ts", "a\nb")]));
    let result = service(&backend)
        .replace_lines(ReplaceLinesParam::new(WIDGET, "/f.ts", "b", 2, 5, "x"))
        .await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("Invalid line range 2-5"));
}

#[tokio::test]
async fn test_slow_store_times_out() {
    let config = ServiceConfig {
        remote_timeout_ms: 50,
        ..test_config()
    };
    let store = Arc::new(SlowStore {
        delay: Duration::from_secs(5),
    });
    let backend = Arc::new(MemoryBackend::new());
    let service = WidgetService::with_backends(
        config,
        Backends {
            store,
            index: backend.clone(),
            index_writer: backend,
            embedder: Arc::new(MemoryEmbeddingProvider::new(DIMENSIONS)),
        },
    );

    let viewed = service.view_file(view("/a.ts", None)).await;
    assert!(!viewed.success);
    let error = viewed.error.unwrap();
    assert!(error.contains("Remote operation failed"), "{error}");
    assert!(error.contains("timed out"), "{error}");

    let written = service.write_file(write("/a.ts", "x")).await;
    assert!(!written.success);
}

#[tokio::test]
async fn test_paths_escaping_the_root_are_rejected() {
    let backend = sample_backend();
    let service = service(&backend);

    let written = service.write_file(write("/src/../../etc/passwd", "x")).await;
    assert!(!written.success);
    assert!(written.error.unwrap().contains("Invalid path"));

    let viewed = service.view_file(view("../secret", None)).await;
    assert!(!viewed.success);
}

#[tokio::test]
async fn test_widget_ids_that_escape_their_scope_are_rejected() {
    let backend = sample_backend();
    let service = service(&backend);
    let calls_before = backend.upsert_calls();

    for widget_id in ["victim/files?x=../../other", "a/../../admin", ".."] {
        let written = service
            .write_file(WriteFileParam {
                widget_id: widget_id.to_string(),
                file_path: "/a.ts".to_string(),
                content: "x".to_string(),
            })
            .await;
        assert!(!written.success, "{widget_id:?}");
        assert!(written.error.unwrap().contains("Invalid path"));

        let response = service
            .search(SearchParam {
                widget_id: widget_id.to_string(),
                query: "card".to_string(),
                search_type: SearchType::Filename,
                limit: None,
            })
            .await;
        assert!(!response.success, "{widget_id:?}");
    }
    assert_eq!(backend.upsert_calls(), calls_before);
}
