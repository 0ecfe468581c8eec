use crate::backend::{FileStore, bounded};
use crate::config::ServiceConfig;
use crate::context_lines::extract_context_lines;
use crate::errors::ServiceError;
use crate::pattern::RegexCache;
use crate::types::*;

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::sync::Arc;

/// Regex content search over every file of a widget.
#[derive(Clone)]
pub struct RegexSearchEngine {
    config: ServiceConfig,
    store: Arc<dyn FileStore>,
    regex_cache: RegexCache,
}

impl RegexSearchEngine {
    pub fn new(config: ServiceConfig, store: Arc<dyn FileStore>, regex_cache: RegexCache) -> Self {
        Self {
            config,
            store,
            regex_cache,
        }
    }

    pub async fn search_files(
        &self,
        param: &SearchFilesParam,
    ) -> Result<Vec<SearchMatch>, ServiceError> {
        let regex = self
            .regex_cache
            .get_or_compile(&param.query, param.case_sensitive)?;
        let include = build_glob_set(std::slice::from_ref(&param.include_pattern))?;
        let exclude = match &param.exclude_pattern {
            Some(pattern) => build_glob_set(std::slice::from_ref(pattern))?,
            None => build_glob_set(&self.config.default_excludes)?,
        };
        let context = param
            .context_lines
            .unwrap_or(self.config.default_context_lines);

        let files = bounded(
            self.config.remote_timeout(),
            "fetch_files",
            self.store.fetch_files(&param.widget_id),
        )
        .await?;

        let mut matches = Vec::new();
        let mut files_scanned = 0;
        for (path, content) in &files {
            if !path_matches(&include, path) || path_matches(&exclude, path) {
                continue;
            }
            files_scanned += 1;
            matches.extend(search_content(path, content, &regex, context));
        }

        tracing::debug!(
            files_total = files.len(),
            files_scanned,
            matches = matches.len(),
            "regex search complete"
        );
        Ok(matches)
    }
}

/// Scan `content` line by line, recording every non-overlapping match.
pub fn search_content(path: &str, content: &str, regex: &Regex, context: usize) -> Vec<SearchMatch> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut matches = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let mut line_matches = regex.find_iter(line).peekable();
        if line_matches.peek().is_none() {
            continue;
        }
        let window = extract_context_lines(&lines, idx, context);
        for m in line_matches {
            matches.push(SearchMatch {
                file_path: path.to_string(),
                line: idx + 1,
                column: line[..m.start()].chars().count() + 1,
                match_text: m.as_str().to_string(),
                before_context: window.before.clone(),
                after_context: window.after.clone(),
            });
        }
    }

    matches
}

pub fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ServiceError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Paths are root-anchored; globs may be written either way.
fn path_matches(set: &GlobSet, path: &str) -> bool {
    set.is_match(path) || set.is_match(path.trim_start_matches('/'))
}
