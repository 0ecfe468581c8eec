/// Lines surrounding a match, clipped at the file edges and never padded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextWindow {
    pub before: Vec<String>,
    pub after: Vec<String>,
}

/// Extract up to `count` lines before and after the 0-based line `index`.
pub fn extract_context_lines(lines: &[&str], index: usize, count: usize) -> ContextWindow {
    if count == 0 || index >= lines.len() {
        return ContextWindow::default();
    }

    let before_start = index.saturating_sub(count);
    let after_end = std::cmp::min(index + 1 + count, lines.len());

    ContextWindow {
        before: lines[before_start..index]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        after: lines[index + 1..after_end]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<&'static str> {
        vec!["line 1", "line 2", "MATCH", "line 4", "line 5"]
    }

    #[test]
    fn test_extract_context_lines_basic() {
        let window = extract_context_lines(&lines(), 2, 1);
        assert_eq!(window.before, vec!["line 2"]);
        assert_eq!(window.after, vec!["line 4"]);
    }

    #[test]
    fn test_extract_context_lines_at_boundary() {
        let source = vec!["MATCH", "line 2", "line 3"];
        let window = extract_context_lines(&source, 0, 2);
        assert!(window.before.is_empty()); // Empty at file start
        assert_eq!(window.after, vec!["line 2", "line 3"]);

        let window = extract_context_lines(&source, 2, 5);
        assert_eq!(window.before, vec!["MATCH", "line 2"]);
        assert!(window.after.is_empty());
    }

    #[test]
    fn test_zero_context() {
        assert_eq!(extract_context_lines(&lines(), 2, 0), ContextWindow::default());
    }
}
