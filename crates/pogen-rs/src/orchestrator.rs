//! Main orchestration logic.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use miette::Diagnostic;
use rayon::prelude::*;
use template_parser::{parse, ParseError, ParseOptions, TemplateInfo};
use template_rewriter::{RewriteError, Rewriter, ValueGenerator};
use thiserror::Error;
use walkdir::WalkDir;

use crate::cli::{GenerateArgs, ListArgs};
use crate::config::Settings;
use crate::output::{self, ListedTag};

/// Orchestration errors.
#[derive(Debug, Error, Diagnostic)]
pub enum RunError {
    /// Failed to read a file or directory.
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(pogen::read))]
    ReadFailed {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write a rewritten template.
    #[error("failed to write {path}: {source}")]
    #[diagnostic(code(pogen::write))]
    WriteFailed {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    #[diagnostic(code(pogen::glob))]
    InvalidGlob(String),

    /// Invalid configuration.
    #[error("invalid configuration in {path}: {message}")]
    #[diagnostic(code(pogen::config), help("see `pogen-rs --help` for the accepted keys"))]
    Config { path: Utf8PathBuf, message: String },

    /// The rewriter could not be set up.
    #[error(transparent)]
    #[diagnostic(code(pogen::rewrite))]
    Rewrite(#[from] RewriteError),

    /// A path that is not valid UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    /// Logging could not be installed.
    #[error("failed to set up logging: {0}")]
    Logging(String),
}

/// Why one template was not processed.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("{0}")]
    Read(io::Error),
    #[error("{0}")]
    Parse(ParseError),
    #[error("{0}")]
    Write(io::Error),
}

/// Counts reported after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Templates found.
    pub files: usize,
    /// Templates whose text changed.
    pub changed: usize,
    /// Templates that failed to read, parse or write.
    pub failed: usize,
    /// Identity values issued.
    pub assigned: usize,
}

/// A parsed template, or why it could not be parsed.
struct ParsedFile {
    path: Utf8PathBuf,
    source: Option<String>,
    result: Result<TemplateInfo, FileError>,
}

fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, RunError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| RunError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| RunError::InvalidGlob(e.to_string()))
}

/// Expands the given paths into template files.
///
/// Files named explicitly are always included. Directories are walked for
/// files with a known template extension, skipping ignored paths relative to
/// the walked directory. The result is sorted and deduplicated.
pub fn discover(paths: &[Utf8PathBuf], settings: &Settings) -> Result<Vec<Utf8PathBuf>, RunError> {
    let ignore_set = build_ignore_set(&settings.ignore)?;
    let mut files = Vec::new();

    for root in paths {
        let metadata = fs::metadata(root).map_err(|source| RunError::ReadFailed {
            path: root.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            files.push(root.clone());
            continue;
        }

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(%root, %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = Utf8PathBuf::try_from(entry.into_path())
                .map_err(|err| RunError::NonUtf8Path(err.into_path_buf().display().to_string()))?;
            let relative = path.strip_prefix(root).unwrap_or(&path);
            if ignore_set.is_match(relative.as_str()) {
                tracing::debug!(%path, "ignored");
                continue;
            }
            if settings.dialects.is_template(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    files.dedup();
    tracing::info!(count = files.len(), "discovered templates");
    Ok(files)
}

/// Parses every file in parallel, keeping input order.
fn parse_all(files: &[Utf8PathBuf], settings: &Settings) -> Vec<ParsedFile> {
    let options = ParseOptions {
        identity_attribute: settings.attribute.clone(),
    };

    files
        .par_iter()
        .map(|path| {
            let source = match fs::read_to_string(path) {
                Ok(source) => source,
                Err(err) => {
                    return ParsedFile {
                        path: path.clone(),
                        source: None,
                        result: Err(FileError::Read(err)),
                    }
                }
            };
            let dialect = settings.dialects.for_path(path);
            tracing::debug!(%path, dialect = dialect.name(), "parsing");
            let result = parse(&source, dialect, &options).map_err(FileError::Parse);
            ParsedFile {
                path: path.clone(),
                source: Some(source),
                result,
            }
        })
        .collect()
}

fn report_failure(path: &Utf8Path, source: Option<&str>, error: &FileError) {
    eprintln!("{}", output::format_file_error(path, source, error));
}

/// Rewrites templates in place, sharing one value generator across files.
pub fn generate(args: &GenerateArgs, settings: &Settings) -> Result<RunSummary, RunError> {
    let files = discover(&args.paths, settings)?;
    let parsed = parse_all(&files, settings);

    let rewriter = Rewriter::new(&settings.attribute, &settings.prefix)?;
    let mut generator = ValueGenerator::new(settings.prefix.as_str());
    let mut summary = RunSummary {
        files: files.len(),
        ..RunSummary::default()
    };

    for ParsedFile {
        path,
        source,
        result,
    } in parsed
    {
        let mut info = match result {
            Ok(info) => info,
            Err(err) => {
                report_failure(&path, source.as_deref(), &err);
                summary.failed += 1;
                continue;
            }
        };

        let before = generator.issued();
        let rewritten = rewriter.rewrite(&mut info, &mut generator);
        let assigned = generator.issued() - before;
        summary.assigned += assigned;
        if rewritten == info.template() {
            tracing::debug!(%path, "unchanged");
            continue;
        }

        summary.changed += 1;
        if args.dry_run {
            println!("would update {path} ({assigned} new)");
            continue;
        }
        if let Err(err) = fs::write(&path, rewritten) {
            report_failure(&path, None, &FileError::Write(err));
            summary.failed += 1;
            continue;
        }
        tracing::info!(%path, assigned, "updated");
    }

    println!("{}", output::format_summary(&summary, args.dry_run));
    Ok(summary)
}

/// Lists the variable-bearing tags of every template.
pub fn list(args: &ListArgs, settings: &Settings) -> Result<RunSummary, RunError> {
    let files = discover(&args.paths, settings)?;
    let parsed = parse_all(&files, settings);

    let mut summary = RunSummary {
        files: files.len(),
        ..RunSummary::default()
    };
    let mut entries = Vec::new();
    for ParsedFile {
        path,
        source,
        result,
    } in parsed
    {
        match result {
            Ok(info) => entries.extend(ListedTag::collect(&path, &info)),
            Err(err) => {
                report_failure(&path, source.as_deref(), &err);
                summary.failed += 1;
            }
        }
    }

    print!("{}", output::format_list(&entries, args.output));
    Ok(summary)
}
