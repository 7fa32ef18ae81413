//! Configuration settings for studyflow.
//!
//! Settings are loaded from `~/.studyflow/config.yaml`.

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::error::StudyFlowError;
use crate::features::analytics::{FocusTargets, MAX_DAYS, MAX_WEEKS};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Analytics settings.
    pub analytics: AnalyticsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Color output setting.
    #[serde(default = "default_color")]
    pub color: ColorSetting,
    /// User id used when `--user` is not given.
    #[serde(default = "default_user")]
    pub user: String,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

impl ColorSetting {
    /// Apply this setting to the `colored` crate's global override.
    pub fn apply(self) {
        match self {
            Self::Auto => {}
            Self::Always => colored::control::set_override(true),
            Self::Never => colored::control::set_override(false),
        }
    }
}

/// Analytics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Trailing weeks shown in weekly totals.
    #[serde(default = "default_weeks")]
    pub weeks: usize,
    /// Trailing days used for consistency and streaks.
    #[serde(default = "default_days")]
    pub days: usize,
    /// Percentage change inside which the trend counts as stable.
    #[serde(default = "default_trend_band")]
    pub trend_band_percent: i64,
    /// Targets the focus score measures against.
    #[serde(default)]
    pub focus: FocusTargets,
}

// Default value functions for serde
const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_color() -> ColorSetting {
    ColorSetting::Auto
}

fn default_user() -> String {
    "local".to_string()
}

const fn default_weeks() -> usize {
    8
}

const fn default_days() -> usize {
    30
}

const fn default_trend_band() -> i64 {
    5
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color(),
            user: default_user(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            weeks: default_weeks(),
            days: default_days(),
            trend_band_percent: default_trend_band(),
            focus: FocusTargets::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self, StudyFlowError> {
        let paths = Paths::new()?;
        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, StudyFlowError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            StudyFlowError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            StudyFlowError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), StudyFlowError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| StudyFlowError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            StudyFlowError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }

    fn validate(&self) -> Result<(), StudyFlowError> {
        if !(1..=usize::from(MAX_WEEKS)).contains(&self.analytics.weeks) {
            return Err(StudyFlowError::Config(format!(
                "analytics.weeks must be between 1 and {MAX_WEEKS}"
            )));
        }
        if !(1..=usize::from(MAX_DAYS)).contains(&self.analytics.days) {
            return Err(StudyFlowError::Config(format!(
                "analytics.days must be between 1 and {MAX_DAYS}"
            )));
        }
        if self.analytics.trend_band_percent < 0 {
            return Err(StudyFlowError::Config(
                "analytics.trend_band_percent must not be negative".to_string(),
            ));
        }
        self.analytics.focus.validate()
    }
}
