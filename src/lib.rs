//! studyflow - study planning, spaced-repetition revision and study
//! analytics from the command line.
//!
//! Records live in a local `SQLite` database. The revision scheduler and the
//! analytics are pure functions over records fetched through
//! [`core::StudyDataSource`].

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod output;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::StudyFlowError;
pub use storage::StudyStore;
