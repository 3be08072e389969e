//! Filesystem and console document sinks

use jfmigrate_compiler::{ConvertError, DocumentSink, DocumentSource};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reads documents from paths relative to a root directory
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DocumentSource for FsSource {
    fn read_document(&self, location: &str) -> Result<String, ConvertError> {
        let path = self.root.join(location);
        fs::read_to_string(&path).map_err(|e| ConvertError::io(path.display().to_string(), e))
    }
}

/// Writes documents below a root directory, creating parent directories
#[derive(Debug, Clone)]
pub struct FsSink {
    root: PathBuf,
    written: Vec<PathBuf>,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DocumentSink for FsSink {
    fn write_document(&mut self, path: &str, content: &str) -> Result<(), ConvertError> {
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConvertError::io(parent.display().to_string(), e))?;
        }
        fs::write(&target, content)
            .map_err(|e| ConvertError::io(target.display().to_string(), e))?;

        tracing::debug!("Wrote {}", target.display());
        self.written.push(target);
        Ok(())
    }
}

/// Prints documents instead of writing them (`--dry-run`)
pub struct PrintSink<W: Write> {
    out: W,
}

impl<W: Write> PrintSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DocumentSink for PrintSink<W> {
    fn write_document(&mut self, path: &str, content: &str) -> Result<(), ConvertError> {
        writeln!(self.out, "# --- {} ---\n{}", path, content)
            .map_err(|e| ConvertError::io(path, e))
    }
}
