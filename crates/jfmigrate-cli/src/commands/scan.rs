//! `jfmigrate scan` - Convert every Jenkinsfile below a directory
//!
//! Each `Jenkinsfile` is converted next to itself: the workflow is named after
//! its directory and written to `<dir>/.github/`. A `Jenkinsfile.<suffix>`
//! variant gets the workflow name `<dir>-<suffix>` and keeps its actions under
//! `<actions_dir>/<suffix>/` so several variants can share one directory.

use super::convert::split_location;
use crate::fs::{FsSink, FsSource, PrintSink};
use crate::report_diagnostics;
use anyhow::{bail, Result};
use clap::Args;
use jfmigrate_compiler::{Conversion, Converter, ConverterOptions, DocumentSink};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const JENKINSFILE: &str = "Jenkinsfile";

/// Directories never descended into
const SKIPPED_DIRS: &[&str] = &[".git", ".github", "node_modules", "target"];

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Root directory to search
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Print the documents to stdout instead of writing them
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ScanArgs, options: ConverterOptions) -> Result<()> {
    let files = find_jenkinsfiles(&args.dir)?;
    if files.is_empty() {
        tracing::warn!("No Jenkinsfile found under {}", args.dir.display());
        return Ok(());
    }

    let mut failed = 0;
    for file in &files {
        match convert_file(file, &options, args.dry_run) {
            Ok(jobs) => tracing::info!("Converted {} ({} jobs)", file.display(), jobs),
            Err(e) => {
                tracing::error!("Failed to convert {}: {:#}", file.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} Jenkinsfiles failed to convert", failed, files.len());
    }
    Ok(())
}

/// Find `Jenkinsfile` and `Jenkinsfile.*` files below `root`, sorted by path
pub fn find_jenkinsfiles(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped(e))
    {
        let entry = entry?;
        if entry.file_type().is_file() && variant_of(entry.path()).is_some() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && SKIPPED_DIRS.contains(&entry.file_name().to_string_lossy().as_ref())
}

/// `Some(None)` for a plain Jenkinsfile, `Some(Some(suffix))` for a variant
fn variant_of(path: &Path) -> Option<Option<String>> {
    let name = path.file_name()?.to_str()?;
    if name == JENKINSFILE {
        return Some(None);
    }
    name.strip_prefix(JENKINSFILE)?
        .strip_prefix('.')
        .filter(|suffix| !suffix.is_empty())
        .map(|suffix| Some(suffix.to_string()))
}

/// Options for one discovered Jenkinsfile
pub fn options_for(path: &Path, base: &ConverterOptions) -> ConverterOptions {
    let dir_name = directory_name(path).unwrap_or_else(|| base.workflow_name.clone());

    match variant_of(path).flatten() {
        Some(suffix) => {
            let actions_dir = format!("{}/{}", base.actions_dir.trim_end_matches('/'), suffix);
            base.clone()
                .with_workflow_name(format!("{}-{}", dir_name, suffix))
                .with_actions_dir(actions_dir)
        }
        None => base.clone().with_workflow_name(dir_name),
    }
}

fn directory_name(path: &Path) -> Option<String> {
    let parent = path.parent()?;
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    let resolved = parent.canonicalize().ok()?;
    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

fn convert_file(path: &Path, base: &ConverterOptions, dry_run: bool) -> Result<usize> {
    let (root, location) = split_location(path)?;
    let converter = Converter::with_options(options_for(path, base));
    let conversion = converter.convert_document(&FsSource::new(&root), &location)?;

    report_diagnostics(&path.display().to_string(), &conversion.diagnostics);

    if dry_run {
        write(&conversion, &mut PrintSink::new(io::stdout().lock()))?;
    } else {
        write(&conversion, &mut FsSink::new(root))?;
    }
    Ok(conversion.workflow.jobs.len())
}

fn write(conversion: &Conversion, sink: &mut dyn DocumentSink) -> Result<()> {
    conversion.write_to(sink)?;
    Ok(())
}
