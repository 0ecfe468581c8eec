use crate::backend::{FileStore, fetch_file};
use crate::config::ServiceConfig;
use crate::errors::ServiceError;
use crate::gateway::FileMutationGateway;
use crate::path_validation::{normalize_file_path, validate_widget_id};
use crate::types::*;
use regex::Regex;
use std::sync::Arc;

/// Literal token in `search` standing for elided content.
pub const ELLIPSIS: &str = "...";

/// Targeted edits over an inclusive line range, guarded by an
/// ellipsis-tolerant check that the caller's view of the range is current.
#[derive(Clone)]
pub struct LineReplaceEngine {
    config: ServiceConfig,
    store: Arc<dyn FileStore>,
    gateway: FileMutationGateway,
}

impl LineReplaceEngine {
    pub fn new(
        config: ServiceConfig,
        store: Arc<dyn FileStore>,
        gateway: FileMutationGateway,
    ) -> Self {
        Self {
            config,
            store,
            gateway,
        }
    }

    pub async fn replace_lines(
        &self,
        param: &ReplaceLinesParam,
    ) -> Result<ReplaceLinesResult, ServiceError> {
        validate_widget_id(&param.widget_id)?;
        let path = normalize_file_path(&param.file_path)?;
        let original = fetch_file(
            self.store.as_ref(),
            self.config.remote_timeout(),
            &param.widget_id,
            &path,
        )
        .await?;

        let first = param.first_replaced_line;
        let last = param.last_replaced_line;
        let lines: Vec<&str> = original.split('\n').collect();
        if first < 1 || first > last || last > lines.len() {
            return Err(ServiceError::InvalidRange {
                first,
                last,
                total: lines.len(),
            });
        }

        let target = lines[first - 1..last].join("\n");
        if !ellipsis_matches(&param.search, &target, self.config.ellipsis_max_lines)? {
            tracing::info!(
                file_path = %path,
                first,
                last,
                "search text does not match target range"
            );
            return Err(ServiceError::PatternMismatch { first, last });
        }

        let updated = splice_lines(&lines, first, last, &param.replace);
        let written = self
            .gateway
            .write(&param.widget_id, &path, &updated)
            .await;
        if !written.success {
            return Err(ServiceError::RemoteOperationFailure(
                written.error.unwrap_or(written.message),
            ));
        }

        let inserted = param.replace.split('\n').count();
        tracing::debug!(file_path = %path, first, last, inserted, "range replaced");
        Ok(ReplaceLinesResult {
            success: true,
            message: format!(
                "Replaced lines {first}-{last} of {path} with {inserted} line{}",
                if inserted == 1 { "" } else { "s" }
            ),
            error: None,
        })
    }
}

/// Compile `search` into a regex where every `...` is a lazy capture that
/// may cross newlines and everything else is literal.
pub fn build_ellipsis_regex(search: &str) -> Result<Regex, ServiceError> {
    let pattern = search
        .split(ELLIPSIS)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("(?s:(.*?))");
    Ok(Regex::new(&pattern)?)
}

/// True when some occurrence of `search` in `target` keeps every elided
/// section within `max_span` line breaks. With no cap an elided section may
/// cover anything inside `target`.
pub fn ellipsis_matches(
    search: &str,
    target: &str,
    max_span: Option<usize>,
) -> Result<bool, ServiceError> {
    let regex = build_ellipsis_regex(search)?;
    let Some(max_span) = max_span else {
        return Ok(regex.is_match(target));
    };
    Ok(regex.captures_iter(target).any(|caps| {
        caps.iter()
            .skip(1)
            .flatten()
            .all(|elided| elided.as_str().matches('\n').count() <= max_span)
    }))
}

/// Swap lines `first..=last` (1-indexed) for the lines of `replace`.
pub fn splice_lines(lines: &[&str], first: usize, last: usize, replace: &str) -> String {
    let mut spliced: Vec<&str> = Vec::with_capacity(lines.len());
    spliced.extend_from_slice(&lines[..first - 1]);
    spliced.extend(replace.split('\n'));
    spliced.extend_from_slice(&lines[last..]);
    spliced.join("\n")
}
