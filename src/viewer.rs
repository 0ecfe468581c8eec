//! Numbered line views of a file.

use crate::line_range::{LineRange, parse_line_ranges};

/// Rendered view plus the bookkeeping reported back to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileView {
    pub content: String,
    pub total_lines: usize,
    pub lines_shown: String,
}

/// Render `content` as `"{n}|{line}"` rows.
///
/// With a `lines` string, each parsed range is emitted in order, clipped to the
/// file and never merged, so overlapping ranges repeat lines. Without one (or
/// when nothing in it parses) the first `default_lines` lines are shown.
pub fn render_view(content: &str, lines: Option<&str>, default_lines: usize) -> FileView {
    let all_lines: Vec<&str> = content.split('\n').collect();
    let total_lines = all_lines.len();

    let requested = lines
        .map(|raw| (raw, parse_line_ranges(raw)))
        .filter(|(_, ranges)| !ranges.is_empty());

    match requested {
        Some((raw, ranges)) => FileView {
            content: render_ranges(&all_lines, &ranges),
            total_lines,
            lines_shown: raw.trim().to_string(),
        },
        None => {
            let shown = total_lines.min(default_lines);
            let lines_shown = if total_lines > default_lines {
                format!("1-{default_lines} (truncated)")
            } else {
                format!("1-{total_lines}")
            };
            let content = match LineRange::new(1, shown) {
                Some(range) => render_ranges(&all_lines, &[range]),
                None => String::new(),
            };
            FileView {
                content,
                total_lines,
                lines_shown,
            }
        }
    }
}

fn render_ranges(lines: &[&str], ranges: &[LineRange]) -> String {
    let mut rows = Vec::new();
    for range in ranges {
        if range.start > lines.len() {
            continue;
        }
        let end = range.end.min(lines.len());
        for (offset, line) in lines[range.start - 1..end].iter().enumerate() {
            rows.push(format!("{}|{}", range.start + offset, line));
        }
    }
    rows.join("\n")
}
