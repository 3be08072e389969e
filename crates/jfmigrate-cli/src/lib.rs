//! jfmigrate CLI
//!
//! Command line front-end of the converter:
//! - `convert` turns one Jenkinsfile into a workflow and its composite actions
//! - `scan` walks a directory tree and converts every Jenkinsfile found
//!
//! Diagnostics are reported through `tracing`; documents go to the
//! filesystem, or to stdout with `--dry-run`.

pub mod commands;
pub mod config;
pub mod fs;

use jfmigrate_core::{Diagnostic, Severity};

pub use config::load_options;
pub use fs::{FsSink, FsSource, PrintSink};

/// Log every diagnostic of a conversion, prefixed with the converted file
pub fn report_diagnostics(file: &str, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity() {
            Severity::Warning => tracing::warn!("{}: {}", file, diagnostic),
            Severity::Info => tracing::info!("{}: {}", file, diagnostic),
        }
    }
}
