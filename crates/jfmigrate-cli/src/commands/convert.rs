//! `jfmigrate convert <jenkinsfile>` - Convert a single Jenkinsfile

use crate::fs::{FsSink, FsSource, PrintSink};
use crate::report_diagnostics;
use anyhow::{Context, Result};
use clap::Args;
use jfmigrate_compiler::{Converter, ConverterOptions};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Path of the Jenkinsfile to convert
    pub jenkinsfile: PathBuf,

    /// Root directory receiving `.github/`
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Workflow name (also names the workflow file)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Print the documents to stdout instead of writing them
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ConvertArgs, options: ConverterOptions) -> Result<()> {
    let options = match args.name {
        Some(name) => options.with_workflow_name(name),
        None => options,
    };

    let (root, location) = split_location(&args.jenkinsfile)?;
    let converter = Converter::with_options(options);
    let conversion = converter
        .convert_document(&FsSource::new(root), &location)
        .with_context(|| format!("Failed to convert {}", args.jenkinsfile.display()))?;

    report_diagnostics(&args.jenkinsfile.display().to_string(), &conversion.diagnostics);

    if args.dry_run {
        let mut sink = PrintSink::new(io::stdout().lock());
        conversion.write_to(&mut sink)?;
        return Ok(());
    }

    let mut sink = FsSink::new(&args.output);
    conversion.write_to(&mut sink)?;
    tracing::info!(
        "Converted {} into {} jobs under {}",
        args.jenkinsfile.display(),
        conversion.workflow.jobs.len(),
        sink.root().display()
    );
    Ok(())
}

/// Split a Jenkinsfile path into its directory and file name
pub(crate) fn split_location(path: &Path) -> Result<(PathBuf, String)> {
    let file = path
        .file_name()
        .with_context(|| format!("Not a file path: {}", path.display()))?
        .to_string_lossy()
        .into_owned();
    let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok((root, file))
}
