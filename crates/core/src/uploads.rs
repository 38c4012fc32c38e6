//! Upload filename rules.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Extensions accepted for uploaded documents (lower-case, without the dot).
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];

/// Runs of characters that are not safe in a stored filename.
static UNSAFE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.\-]+").expect("valid regex"));

/// Lower-cased extension of `filename`, if it has one.
pub fn extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

pub fn is_allowed_extension(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Directory components are dropped, unsafe character runs become `_` and
/// leading dots or underscores are removed. Returns `None` when nothing is
/// left.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let replaced = UNSAFE_RUN_RE.replace_all(base.trim(), "_");
    let trimmed = replaced.trim_start_matches(['.', '_']);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Sanitize and check the extension of an upload in one step.
pub fn validate_upload_name(raw: &str) -> Result<String, CoreError> {
    if raw.trim().is_empty() {
        return Err(CoreError::Validation("No file selected".into()));
    }
    let name = sanitize_filename(raw)
        .ok_or_else(|| CoreError::Validation("File name is not usable".into()))?;
    if !is_allowed_extension(&name) {
        return Err(CoreError::Validation(format!(
            "File type not allowed. Accepted: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    Ok(name)
}

/// True when `name` is already a sanitized filename, so it can be used to
/// address a stored file without further checks.
pub fn is_stored_name(name: &str) -> bool {
    sanitize_filename(name).as_deref() == Some(name)
}
