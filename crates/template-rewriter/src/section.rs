//! Regenerating the marked section of a companion file.
//!
//! Generated code lives between two marker lines. Updating the file replaces
//! only what is between them, so hand-written code around the section survives.

use crate::error::RewriteError;

/// Line opening a generated section.
pub const GENERATED_CODE_START: &str =
    "/* ------------------- GENERATED CODE START ------------------- */";

/// Line closing a generated section.
pub const GENERATED_CODE_END: &str =
    "/* -------------------- GENERATED CODE END -------------------- */";

/// Replaces the text between `start_mark` and `end_mark` in `existing` with
/// `body`.
pub fn splice_generated_section(
    existing: &str,
    start_mark: &str,
    end_mark: &str,
    body: &str,
) -> Result<String, RewriteError> {
    let start = existing
        .find(start_mark)
        .ok_or_else(|| RewriteError::MissingMarker {
            marker: start_mark.to_string(),
        })?;
    let end = existing
        .find(end_mark)
        .ok_or_else(|| RewriteError::MissingMarker {
            marker: end_mark.to_string(),
        })?;
    if end < start + start_mark.len() {
        return Err(RewriteError::MisorderedMarkers);
    }

    let keep = start + start_mark.len();
    let mut out = String::with_capacity(existing.len() + body.len());
    out.push_str(&existing[..keep]);
    out.push('\n');
    out.push_str(body);
    if !body.is_empty() && !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&existing[end..]);
    Ok(out)
}

/// Replaces the section delimited by the default markers.
pub fn update_generated_section(existing: &str, body: &str) -> Result<String, RewriteError> {
    splice_generated_section(existing, GENERATED_CODE_START, GENERATED_CODE_END, body)
}
