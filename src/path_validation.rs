use crate::errors::ServiceError;

/// Normalizes a widget file path to its root-anchored form.
///
/// `src/App.tsx` becomes `/src/App.tsx`. Empty paths, backslashes, `..`
/// segments and paths naming only the root are rejected.
pub fn normalize_file_path(path: &str) -> Result<String, ServiceError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidPath("path is empty".to_string()));
    }
    if trimmed.contains('\\') {
        return Err(ServiceError::InvalidPath(format!(
            "'{trimmed}' must use '/' separators"
        )));
    }

    let segments: Vec<&str> = trimmed
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    if segments.contains(&"..") {
        return Err(ServiceError::InvalidPath(
            "Path traversal patterns are not allowed".to_string(),
        ));
    }
    if segments.is_empty() {
        return Err(ServiceError::InvalidPath(format!(
            "'{trimmed}' does not name a file"
        )));
    }

    Ok(format!("/{}", segments.join("/")))
}

/// Validates a widget id before it scopes any storage call.
///
/// The id becomes a single URL path segment and a single directory name, so
/// separators, dot segments, URL delimiters and control characters are
/// rejected.
pub fn validate_widget_id(widget_id: &str) -> Result<(), ServiceError> {
    if widget_id.trim().is_empty() {
        return Err(ServiceError::InvalidPath("widget id is empty".to_string()));
    }
    if widget_id == "." || widget_id == ".." {
        return Err(ServiceError::InvalidPath(format!(
            "widget id '{widget_id}' is a dot segment"
        )));
    }
    if let Some(c) = widget_id
        .chars()
        .find(|c| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_control())
    {
        return Err(ServiceError::InvalidPath(format!(
            "widget id '{}' contains forbidden character {c:?}",
            widget_id.escape_debug()
        )));
    }
    Ok(())
}
