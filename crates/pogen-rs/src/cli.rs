//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use crate::logging::{LogFormat, LogLevel};

/// Tags template elements that render variables so page objects can find them.
#[derive(Debug, Parser)]
#[command(name = "pogen-rs")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Default log level (RUST_LOG takes precedence)
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "compact")]
    pub log_format: LogFormat,

    /// Path to a pogen.json configuration file
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add identifying attributes to templates in place
    Generate(GenerateArgs),
    /// Print the variable-bearing tags of templates
    List(ListArgs),
}

/// Arguments of `generate`.
#[derive(Debug, ClapArgs)]
pub struct GenerateArgs {
    /// Attribute carrying the identity (names ending in `class` get marker comments)
    #[arg(long)]
    pub attribute: Option<String>,

    /// Prefix of generated values
    #[arg(long)]
    pub prefix: Option<String>,

    /// Report what would change without writing files
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Template files or directories
    #[arg(required = true)]
    pub paths: Vec<Utf8PathBuf>,
}

/// Arguments of `list`.
#[derive(Debug, ClapArgs)]
pub struct ListArgs {
    /// Attribute carrying the identity
    #[arg(long)]
    pub attribute: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Template files or directories
    #[arg(required = true)]
    pub paths: Vec<Utf8PathBuf>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per tag (default)
    #[default]
    Human,
    /// JSON output
    Json,
}
