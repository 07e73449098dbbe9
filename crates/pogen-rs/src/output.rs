//! Output formatting.

use camino::Utf8Path;
use serde::Serialize;
use template_parser::TemplateInfo;
use template_span::{LineCol, LineIndex};

use crate::cli::OutputFormat;
use crate::orchestrator::{FileError, RunSummary};

/// One tag in `list` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedTag {
    /// The template file.
    pub path: String,
    /// The tag name.
    pub tag: String,
    /// 1-indexed line of the opening tag.
    pub line: u32,
    /// Current identity value, if any.
    pub identity: Option<String>,
    /// Names of the template variables rendered by the tag.
    pub variables: Vec<String>,
    /// Whether the tag sits in a repeated region.
    pub repeated: bool,
}

impl ListedTag {
    /// Collects the tags of one template. Synthesized names for interactive
    /// tags are left out.
    pub fn collect(path: &Utf8Path, info: &TemplateInfo) -> Vec<Self> {
        let line_index = LineIndex::new(info.template());
        info.tags()
            .iter()
            .filter_map(|tag| {
                let start = tag.start()?;
                let line = line_index.line_col(start).unwrap_or_default().line + 1;
                Some(ListedTag {
                    path: path.to_string(),
                    tag: tag.name.to_string(),
                    line,
                    identity: tag.identity.as_ref().map(ToString::to_string),
                    variables: tag
                        .variables()
                        .filter(|variable| !variable.is_synthetic)
                        .map(|variable| variable.name.to_string())
                        .collect(),
                    repeated: info.is_repeated(tag),
                })
            })
            .collect()
    }
}

/// Formats `list` output.
pub fn format_list(entries: &[ListedTag], format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => entries
            .iter()
            .map(|entry| {
                let mut fields = vec![
                    entry.path.as_str(),
                    entry.identity.as_deref().unwrap_or(""),
                ];
                fields.extend(entry.variables.iter().map(String::as_str));
                format!("{}\n", fields.join(", "))
            })
            .collect(),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(entries).unwrap_or_default();
            json.push('\n');
            json
        }
    }
}

/// Formats a per-file failure, with `path:line:col` for parse errors.
pub fn format_file_error(path: &Utf8Path, source: Option<&str>, error: &FileError) -> String {
    match (error, source) {
        (FileError::Parse(err), Some(source)) => {
            let start = LineIndex::new(source)
                .line_col(err.span.start)
                .unwrap_or(LineCol::new(0, 0));
            format!("{}:{}:{}: error: {}", path, start.line + 1, start.col + 1, err)
        }
        (FileError::Read(_), _) => format!("{path}: error: failed to read: {error}"),
        (FileError::Write(_), _) => format!("{path}: error: failed to write: {error}"),
        (FileError::Parse(_), None) => format!("{path}: error: {error}"),
    }
}

/// One-line summary after `generate`.
pub fn format_summary(summary: &RunSummary, dry_run: bool) -> String {
    let verb = if dry_run { "would update" } else { "updated" };
    let mut line = format!(
        "{} template(s) checked, {} {verb}, {} new identit{}",
        summary.files,
        summary.changed,
        summary.assigned,
        if summary.assigned == 1 { "y" } else { "ies" }
    );
    if summary.failed > 0 {
        line.push_str(&format!(", {} failed", summary.failed));
    }
    line
}
