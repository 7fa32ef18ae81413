//! Export and import commands.

use colored::Colorize;
use std::path::{Path, PathBuf};

use super::Context;
use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::error::StudyFlowError;
use crate::features::transfer::{export_bundle, import_bundle, read_bundle, write_bundle};
use crate::output::to_json;

/// Write all of the user's records to `path`, or to a dated file in the
/// exports directory when no path is given.
///
/// # Errors
///
/// Returns an error if reading records or writing the file fails.
pub fn export(ctx: &Context, path: Option<&Path>) -> Result<String, StudyFlowError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_export_path(ctx)?,
    };
    let path = path.as_path();

    let bundle = export_bundle(&ctx.store, &ctx.user, ctx.now)?;
    write_bundle(path, &bundle)?;
    tracing::info!(path = %path.display(), user = %ctx.user, "exported records");

    let total = bundle.subjects.len()
        + bundle.topics.len()
        + bundle.sessions.len()
        + bundle.deadlines.len()
        + bundle.plans.len()
        + bundle.revisions.len();

    match ctx.format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "path": path.display().to_string(),
            "records": total,
        })),
        OutputFormat::Pretty => Ok(format!("Exported {total} records to {}", path.display())),
    }
}

fn default_export_path(ctx: &Context) -> Result<PathBuf, StudyFlowError> {
    let paths = Paths::new()?;
    paths.ensure_dirs()?;
    Ok(paths
        .exports
        .join(format!("studyflow-{}-{}.json", ctx.user, ctx.now.format("%Y%m%d-%H%M%S"))))
}

/// Import every record in the export at `path` for the current user.
///
/// # Errors
///
/// Returns an error if the file is unreadable or any record is invalid; in
/// that case nothing is imported.
pub fn import(ctx: &Context, path: &Path) -> Result<String, StudyFlowError> {
    let bundle = read_bundle(path)?;
    let summary = import_bundle(&ctx.store, &ctx.user, &bundle)?;

    match ctx.format {
        OutputFormat::Json => to_json(&summary),
        OutputFormat::Pretty => Ok(format!(
            "{} {} subjects, {} topics, {} sessions, {} deadlines, {} plans, {} revisions",
            "Imported".green(),
            summary.subjects,
            summary.topics,
            summary.sessions,
            summary.deadlines,
            summary.plans,
            summary.revisions
        )),
    }
}
