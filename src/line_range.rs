//! Parsing of human-supplied line range strings such as `"1-50, 100-150"`.

use serde::{Deserialize, Serialize};

/// Closed, 1-indexed line range. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Option<Self> {
        (start >= 1 && start <= end).then_some(Self { start, end })
    }

    pub fn single(line: usize) -> Option<Self> {
        Self::new(line, line)
    }
}

/// Parse a comma-separated list of `a-b` ranges and bare line numbers.
///
/// Tokens are returned in input order. Malformed tokens (non-numeric bounds,
/// `a > b`, line 0) are dropped rather than reported.
pub fn parse_line_ranges(input: &str) -> Vec<LineRange> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(parse_token)
        .collect()
}

fn parse_token(token: &str) -> Option<LineRange> {
    match token.split_once('-') {
        Some((start, end)) => {
            let start = start.trim().parse().ok()?;
            let end = end.trim().parse().ok()?;
            LineRange::new(start, end)
        }
        None => LineRange::single(token.parse().ok()?),
    }
}
