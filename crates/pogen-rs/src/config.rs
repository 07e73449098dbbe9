//! Configuration loading.

use std::collections::BTreeMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use template_parser::{Dialect, DEFAULT_IDENTITY_ATTRIBUTE};
use template_rewriter::DEFAULT_PREFIX;

use crate::orchestrator::RunError;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "pogen.json";

/// Extensions walked in directories besides any configured ones.
const BUILTIN_EXTENSIONS: [&str; 4] = [".soy", ".ejs", ".erb", ".xhtml"];

/// Contents of `pogen.json`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Identity attribute.
    pub attribute: Option<String>,
    /// Prefix of generated values.
    pub prefix: Option<String>,
    /// Glob patterns to ignore, relative to each walked directory.
    pub ignore: Vec<String>,
    /// Extension to dialect name, e.g. `".tpl": "soy"`.
    pub dialects: BTreeMap<String, String>,
}

impl FileConfig {
    /// Loads the explicit config file, or `pogen.json` in `cwd` if present.
    ///
    /// A missing explicit file is an error; a missing default file is not.
    pub fn load(explicit: Option<&Utf8Path>, cwd: &Utf8Path) -> Result<Self, RunError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = cwd.join(CONFIG_FILE_NAME);
                if !path.is_file() {
                    tracing::debug!(%path, "no configuration file");
                    return Ok(Self::default());
                }
                path
            }
        };

        let text = fs::read_to_string(&path).map_err(|source| RunError::ReadFailed {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&text, &path)?;
        tracing::debug!(%path, ?config, "loaded configuration");
        Ok(config)
    }

    /// Parses config text; `path` is only used in errors.
    pub fn parse(text: &str, path: &Utf8Path) -> Result<Self, RunError> {
        serde_json::from_str(text).map_err(|err| RunError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

/// Dialect selection by file extension, with configured overrides first.
#[derive(Debug, Clone, Default)]
pub struct DialectTable {
    overrides: Vec<(String, &'static Dialect)>,
}

impl DialectTable {
    /// Resolves configured dialect names. Extensions may be given with or
    /// without the leading dot.
    pub fn new(
        dialects: &BTreeMap<String, String>,
        config_path: &Utf8Path,
    ) -> Result<Self, RunError> {
        let mut overrides = Vec::with_capacity(dialects.len());
        for (extension, name) in dialects {
            let dialect = Dialect::by_name(name).ok_or_else(|| RunError::Config {
                path: config_path.to_path_buf(),
                message: format!("unknown dialect `{name}` for extension `{extension}`"),
            })?;
            let extension = if extension.starts_with('.') {
                extension.clone()
            } else {
                format!(".{extension}")
            };
            overrides.push((extension, dialect));
        }
        // Longest first so `.html.ejs` wins over `.ejs`.
        overrides.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Ok(Self { overrides })
    }

    /// The dialect for a template path.
    pub fn for_path(&self, path: &Utf8Path) -> &'static Dialect {
        self.overrides
            .iter()
            .find(|(extension, _)| path.as_str().ends_with(extension.as_str()))
            .map(|(_, dialect)| *dialect)
            .unwrap_or_else(|| Dialect::for_path(path.as_str()))
    }

    /// Returns true if a walked file should be treated as a template.
    pub fn is_template(&self, path: &Utf8Path) -> bool {
        let name = path.file_name().unwrap_or("");
        BUILTIN_EXTENSIONS
            .iter()
            .copied()
            .chain(self.overrides.iter().map(|(extension, _)| extension.as_str()))
            .any(|extension| name.ends_with(extension))
    }
}

/// Effective settings: command-line flags over the config file over defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub attribute: String,
    pub prefix: String,
    pub ignore: Vec<String>,
    pub dialects: DialectTable,
}

impl Settings {
    /// Merges the config file with command-line values. Ignore patterns from
    /// both sources apply.
    pub fn resolve(
        file: FileConfig,
        config_path: &Utf8Path,
        attribute: Option<String>,
        prefix: Option<String>,
        ignore: &[String],
    ) -> Result<Self, RunError> {
        let dialects = DialectTable::new(&file.dialects, config_path)?;
        let mut patterns = file.ignore;
        patterns.extend(ignore.iter().cloned());

        let attribute = attribute
            .or(file.attribute)
            .unwrap_or_else(|| DEFAULT_IDENTITY_ATTRIBUTE.to_string());
        if attribute.trim().is_empty() {
            return Err(RunError::Config {
                path: config_path.to_path_buf(),
                message: "identity attribute must not be empty".to_string(),
            });
        }

        let prefix = prefix
            .or(file.prefix)
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        if prefix.is_empty() {
            return Err(RunError::Config {
                path: config_path.to_path_buf(),
                message: "identity prefix must not be empty".to_string(),
            });
        }

        Ok(Self {
            attribute,
            prefix,
            ignore: patterns,
            dialects,
        })
    }
}

/// Where the config came from, for error messages.
pub fn config_path(explicit: Option<&Utf8Path>, cwd: &Utf8Path) -> Utf8PathBuf {
    explicit
        .map(Utf8Path::to_path_buf)
        .unwrap_or_else(|| cwd.join(CONFIG_FILE_NAME))
}
