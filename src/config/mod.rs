//! Configuration management for studyflow.
//!
//! This module handles loading configuration from `~/.studyflow/`.

mod paths;
mod settings;

pub use paths::{Paths, HOME_ENV};
pub use settings::{AnalyticsConfig, ColorSetting, Config, GeneralConfig};
