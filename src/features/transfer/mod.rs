//! JSON export and import of one user's study records.

mod bundle;

pub use bundle::{export_bundle, import_bundle, read_bundle, write_bundle, ExportBundle, ImportSummary, EXPORT_VERSION};
