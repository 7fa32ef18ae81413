use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;

use studyflow::cli::args::{Cli, Commands};
use studyflow::cli::commands::{self, Context};
use studyflow::config::{Config, Paths};
use studyflow::storage::StudyStore;

/// Environment variable holding the log filter, e.g. `STUDYFLOW_LOG=debug`.
const LOG_ENV: &str = "STUDYFLOW_LOG";

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn run() -> Result<()> {
    init_tracing()?;
    let Cli { output, user, command } = Cli::parse();

    match command {
        Commands::Completions { shell } => {
            print!("{}", commands::completions(shell)?);
            return Ok(());
        }
        Commands::Config(args) => {
            let paths = Paths::new()?;
            println!("{}", commands::config(&paths, args.command, output)?);
            return Ok(());
        }
        _ => {}
    }

    let config = Config::load().context("failed to load configuration")?;
    config.general.color.apply();
    let store = StudyStore::new().context("failed to open the study database")?;
    let ctx = Context::new(store, config, user, output, Utc::now());
    tracing::debug!(user = %ctx.user, "running command");

    let rendered = match command {
        Commands::Subject(args) => commands::subject(&ctx, args.command)?,
        Commands::Topic(args) => commands::topic(&ctx, args.command)?,
        Commands::Session(args) => commands::session(&ctx, args.command)?,
        Commands::Deadline(args) => commands::deadline(&ctx, args.command)?,
        Commands::Plan(args) => commands::plan(&ctx, args.command)?,
        Commands::Revise { topic, confidence, at } => {
            commands::revise(&ctx, topic, confidence, at.as_deref())?
        }
        Commands::Due { as_of } => commands::due(&ctx, as_of.as_deref())?,
        Commands::Stats(args) => commands::stats(&ctx, args.command)?,
        Commands::Export { file } => commands::export(&ctx, file.as_deref())?,
        Commands::Import { file } => commands::import(&ctx, &file)
            .with_context(|| format!("nothing was imported from {}", file.display()))?,
        Commands::Completions { .. } | Commands::Config(_) => String::new(),
    };

    if !rendered.is_empty() {
        println!("{rendered}");
    }
    Ok(())
}
