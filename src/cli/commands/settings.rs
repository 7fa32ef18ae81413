//! Config file commands.

use crate::cli::args::{ConfigCommands, OutputFormat};
use crate::config::{Config, Paths};
use crate::error::StudyFlowError;
use crate::output::to_json;

/// Execute config subcommands against the files under `paths`.
///
/// Runs without a [`super::Context`] so a broken config file can still be
/// replaced with `init --force`.
///
/// # Errors
///
/// Returns an error if the file exists and `--force` was not given, or the
/// file cannot be read, parsed or written.
pub fn config(
    paths: &Paths,
    cmd: ConfigCommands,
    format: Option<OutputFormat>,
) -> Result<String, StudyFlowError> {
    match cmd {
        ConfigCommands::Init { force } => {
            if paths.config_file.exists() && !force {
                return Err(StudyFlowError::invalid(format!(
                    "{} already exists (use --force to overwrite)",
                    paths.config_file.display()
                )));
            }
            paths.ensure_dirs()?;
            Config::default().save_to_path(&paths.config_file)?;
            tracing::info!(path = %paths.config_file.display(), "wrote default config");
            Ok(format!("Wrote default configuration to {}", paths.config_file.display()))
        }
        ConfigCommands::Show => {
            let config = Config::load_from_path(&paths.config_file)?;
            match format.unwrap_or(config.general.default_output) {
                OutputFormat::Json => to_json(&config),
                OutputFormat::Pretty => serde_yaml::to_string(&config)
                    .map_err(|e| StudyFlowError::Config(format!("Failed to serialize config: {e}"))),
            }
        }
        ConfigCommands::Path => Ok(paths.config_file.display().to_string()),
    }
}
