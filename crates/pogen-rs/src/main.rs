//! pogen-rs: tags template elements that render variables so page objects can
//! find them.

mod cli;
mod config;
mod logging;
mod orchestrator;
mod output;

use camino::Utf8PathBuf;
use clap::Parser;
use cli::{Args, Command};
use config::{FileConfig, Settings};
use miette::Result;
use orchestrator::RunError;

fn main() -> Result<()> {
    let args = Args::parse();
    logging::setup_logging(args.log_level, args.log_format)?;

    let cwd = std::env::current_dir().map_err(|source| RunError::ReadFailed {
        path: Utf8PathBuf::from("."),
        source,
    })?;
    let cwd = Utf8PathBuf::try_from(cwd)
        .map_err(|err| RunError::NonUtf8Path(err.into_path_buf().display().to_string()))?;
    let file_config = FileConfig::load(args.config.as_deref(), &cwd)?;
    let config_path = config::config_path(args.config.as_deref(), &cwd);

    let summary = match &args.command {
        Command::Generate(generate) => {
            let settings = Settings::resolve(
                file_config,
                &config_path,
                generate.attribute.clone(),
                generate.prefix.clone(),
                &generate.ignore,
            )?;
            orchestrator::generate(generate, &settings)?
        }
        Command::List(list) => {
            let settings = Settings::resolve(
                file_config,
                &config_path,
                list.attribute.clone(),
                None,
                &list.ignore,
            )?;
            orchestrator::list(list, &settings)?
        }
    };

    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
