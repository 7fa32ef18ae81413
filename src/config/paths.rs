//! Path resolution for studyflow configuration and data files.
//!
//! All studyflow data is stored in `~/.studyflow/` (or `$STUDYFLOW_HOME`):
//! - `config.yaml` - Main configuration file
//! - `studyflow.db` - SQLite database with subjects, topics, sessions, revisions
//! - `exports/` - Default location for JSON export bundles

use std::path::PathBuf;

use crate::error::StudyFlowError;

/// Environment variable that overrides the data directory.
pub const HOME_ENV: &str = "STUDYFLOW_HOME";

/// Paths to studyflow configuration and data directories.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.studyflow/`
    pub root: PathBuf,
    /// Config file: `~/.studyflow/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.studyflow/studyflow.db`
    pub database: PathBuf,
    /// Exports directory: `~/.studyflow/exports/`
    pub exports: PathBuf,
}

impl Paths {
    /// Resolve paths from `$STUDYFLOW_HOME`, falling back to `$HOME/.studyflow`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither variable is set.
    pub fn new() -> Result<Self, StudyFlowError> {
        if let Ok(root) = std::env::var(HOME_ENV) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }

        let home = std::env::var("HOME").map_err(|_| {
            StudyFlowError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".studyflow")))
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("studyflow.db"),
            exports: root.join("exports"),
            root,
        }
    }

    /// Ensure all directories exist, creating them if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), StudyFlowError> {
        for dir in [&self.root, &self.exports] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    StudyFlowError::Config(format!("Failed to create directory {}: {e}", dir.display()))
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_with_root() {
        let root = PathBuf::from("/tmp/test-studyflow");
        let paths = Paths::with_root(root.clone());

        assert_eq!(paths.root, root);
        assert_eq!(paths.config_file, root.join("config.yaml"));
        assert_eq!(paths.database, root.join("studyflow.db"));
        assert_eq!(paths.exports, root.join("exports"));
    }

    #[test]
    fn test_ensure_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().join("nested"));

        paths.ensure_dirs().unwrap();

        assert!(paths.root.exists());
        assert!(paths.exports.exists());
    }
}
