//! Command implementations for studyflow.
//!
//! Every command returns the text to print, already formatted for the
//! requested output format.

mod revision;
mod settings;
mod stats;
mod study;
mod transfer;

pub use revision::{due, revise};
pub use settings::config;
pub use stats::stats;
pub use study::{deadline, plan, session, subject, topic};
pub use transfer::{export, import};

use chrono::{DateTime, NaiveDate, Utc};
use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::args::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::StudyFlowError;
use crate::storage::StudyStore;

/// Everything a command needs: storage, settings, the acting user and the
/// moment the command runs.
pub struct Context {
    pub store: StudyStore,
    pub config: Config,
    pub user: String,
    pub format: OutputFormat,
    pub now: DateTime<Utc>,
}

impl Context {
    /// Resolve the user and output format, falling back to the config.
    #[must_use]
    pub fn new(
        store: StudyStore,
        config: Config,
        user: Option<String>,
        format: Option<OutputFormat>,
        now: DateTime<Utc>,
    ) -> Self {
        let user = user
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| config.general.user.clone());
        let format = format.unwrap_or(config.general.default_output);
        Self { store, config, user, format, now }
    }

    /// Calendar day of `now`, in UTC.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}

/// Generate the completion script for `shell`.
///
/// # Errors
///
/// Returns `StudyFlowError::Parse` if the generated script is not UTF-8.
pub fn completions(shell: Shell) -> Result<String, StudyFlowError> {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, "studyflow", &mut buf);
    String::from_utf8(buf).map_err(|e| StudyFlowError::Parse(format!("UTF-8 error: {e}")))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_falls_back_to_config() {
        let mut config = Config::default();
        config.general.user = "configured".to_string();
        config.general.default_output = OutputFormat::Json;

        let store = StudyStore::with_database(crate::storage::Database::open_in_memory().unwrap());
        let ctx = Context::new(store, config, Some("  ".to_string()), None, Utc::now());
        assert_eq!(ctx.user, "configured");
        assert_eq!(ctx.format, OutputFormat::Json);
    }

    #[test]
    fn test_completions_bash() {
        let script = completions(Shell::Bash).unwrap();
        assert!(script.contains("studyflow"));
    }
}
