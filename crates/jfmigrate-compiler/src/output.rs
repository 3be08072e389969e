//! Conversion output
//!
//! All documents of a conversion are rendered to strings before anything is
//! written, so a serialization failure never leaves a partial tree behind.
//! Where the documents go is decided by a [`DocumentSink`].

use crate::error::ConvertError;
use indexmap::IndexMap;
use jfmigrate_core::{CompositeAction, Workflow};

/// Where source documents are read from
pub trait DocumentSource {
    /// Read the document at `location`
    fn read_document(&self, location: &str) -> Result<String, ConvertError>;
}

/// Where rendered documents are written to
pub trait DocumentSink {
    /// Write `content` as the document at `path` (relative to the sink root)
    fn write_document(&mut self, path: &str, content: &str) -> Result<(), ConvertError>;
}

/// A rendered document and its relative path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub path: String,
    pub content: String,
}

/// Every rendered document of one conversion, workflow first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionOutput {
    documents: Vec<RenderedDocument>,
}

impl ConversionOutput {
    /// Render the workflow and the actions
    pub fn render(
        workflow_path: &str,
        workflow: &Workflow,
        actions: &[(String, CompositeAction)],
    ) -> Result<Self, ConvertError> {
        let mut documents = Vec::with_capacity(actions.len() + 1);
        documents.push(RenderedDocument {
            path: workflow_path.to_string(),
            content: serde_yaml::to_string(workflow)?,
        });
        for (path, action) in actions {
            documents.push(RenderedDocument {
                path: path.clone(),
                content: serde_yaml::to_string(action)?,
            });
        }
        Ok(Self { documents })
    }

    pub fn documents(&self) -> &[RenderedDocument] {
        &self.documents
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.documents
            .iter()
            .find(|document| document.path == path)
            .map(|document| document.content.as_str())
    }

    /// Write every document, in order
    pub fn write_to(&self, sink: &mut dyn DocumentSink) -> Result<(), ConvertError> {
        for document in &self.documents {
            sink.write_document(&document.path, &document.content)?;
        }
        Ok(())
    }
}

/// In-memory sink
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    documents: IndexMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.documents.get(path).map(String::as_str)
    }

    pub fn paths(&self) -> Vec<&str> {
        self.documents.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentSink for MemorySink {
    fn write_document(&mut self, path: &str, content: &str) -> Result<(), ConvertError> {
        self.documents.insert(path.to_string(), content.to_string());
        Ok(())
    }
}

/// In-memory source
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: IndexMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, location: impl Into<String>, content: impl Into<String>) -> Self {
        self.documents.insert(location.into(), content.into());
        self
    }
}

impl DocumentSource for MemorySource {
    fn read_document(&self, location: &str) -> Result<String, ConvertError> {
        self.documents.get(location).cloned().ok_or_else(|| {
            ConvertError::io(
                location,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
            )
        })
    }
}
