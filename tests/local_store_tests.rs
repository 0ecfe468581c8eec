use tempfile::TempDir;
use widget_mcp::config::ServiceConfig;
use widget_mcp::types::*;
use widget_mcp::WidgetService;

fn local_service(temp_dir: &TempDir) -> WidgetService {
    let config = ServiceConfig {
        local_root: Some(temp_dir.path().to_path_buf()),
        ..Default::default()
    };
    WidgetService::from_config(config).unwrap()
}

#[tokio::test]
async fn test_local_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let service = local_service(&temp_dir);

    let written = service
        .write_file(WriteFileParam {
            widget_id: "demo".into(),
            file_path: "src/App.tsx".into(),
            content: "export default function App() {\n  return null;\n}".into(),
        })
        .await;
    assert!(written.success, "{written:?}");
    assert!(temp_dir.path().join("demo/src/App.tsx").is_file());

    let replaced = service
        .replace_lines(ReplaceLinesParam::new(
            "demo",
            "/src/App.tsx",
            "  return null;",
            2,
            2,
            "  return <main />;",
        ))
        .await;
    assert!(replaced.success, "{replaced:?}");

    let on_disk = std::fs::read_to_string(temp_dir.path().join("demo/src/App.tsx")).unwrap();
    assert_eq!(on_disk, "export default function App() {\n  return <main />;\n}");

    let found = service
        .search(SearchParam {
            widget_id: "demo".into(),
            query: "main".into(),
            search_type: SearchType::Exact,
            limit: None,
        })
        .await;
    assert!(found.success);
    assert_eq!(found.total_results, 1);
    assert_eq!(found.results[0].line_start, 2);

    let deleted = service
        .delete_file(DeleteFileParam {
            widget_id: "demo".into(),
            file_path: "/src/App.tsx".into(),
            remove_from_index: true,
        })
        .await;
    assert!(deleted.success);
    assert!(!temp_dir.path().join("demo/src/App.tsx").exists());
}

#[tokio::test]
async fn test_yaml_config_drives_local_service() {
    let temp_dir = TempDir::new().unwrap();
    let yaml = format!(
        "local_root: {}\ndefault_view_lines: 2\n",
        temp_dir.path().display()
    );
    let config = ServiceConfig::from_yaml_str(&yaml).unwrap();
    let service = WidgetService::from_config(config).unwrap();

    service
        .write_file(WriteFileParam {
            widget_id: "demo".into(),
            file_path: "/notes.md".into(),
            content: "a\nb\nc".into(),
        })
        .await;
    let viewed = service
        .view_file(ViewFileParam {
            widget_id: "demo".into(),
            file_path: "/notes.md".into(),
            lines: None,
        })
        .await;
    assert_eq!(viewed.lines_shown, "1-2 (truncated)");
    assert_eq!(viewed.content, "1|a\n2|b");
}
