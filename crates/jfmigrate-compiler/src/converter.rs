//! Converter
//!
//! Provides a single entry point running the whole conversion: parse the
//! Jenkinsfile, compile the job graph, generate and render the documents.

use crate::codegen::{BundleCodegen, WorkflowCodegen};
use crate::error::ConvertError;
use crate::graph_compiler::{CompiledPipeline, JobGraphCompiler};
use crate::output::{ConversionOutput, DocumentSink, DocumentSource};
use crate::slug::slugify;
use jfmigrate_core::{CompositeAction, Diagnostic, Pipeline, Workflow};
use jfmigrate_parser::PipelineParser;
use serde::{Deserialize, Serialize};

/// Converter options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterOptions {
    /// Workflow `name:` (default: "CI")
    pub workflow_name: String,
    /// Workflow file name; derived from the workflow name when unset
    pub workflow_file: Option<String>,
    /// Branches triggering the workflow on push
    pub push_branches: Vec<String>,
    /// Directory of workflow files, relative to the output root
    pub workflows_dir: String,
    /// Directory of composite actions, relative to the output root
    pub actions_dir: String,
    /// Action checking out the repository at the start of every job
    pub checkout_action: String,
    /// Action uploading archived artifacts
    pub upload_artifact_action: String,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            workflow_name: "CI".to_string(),
            workflow_file: None,
            push_branches: vec!["main".to_string(), "master".to_string()],
            workflows_dir: ".github/workflows".to_string(),
            actions_dir: ".github/actions".to_string(),
            checkout_action: "actions/checkout@v4".to_string(),
            upload_artifact_action: "actions/upload-artifact@v4".to_string(),
        }
    }
}

impl ConverterOptions {
    pub fn with_workflow_name(mut self, name: impl Into<String>) -> Self {
        self.workflow_name = name.into();
        self
    }

    pub fn with_actions_dir(mut self, dir: impl Into<String>) -> Self {
        self.actions_dir = dir.into();
        self
    }

    /// Path of the workflow file, relative to the output root
    pub fn workflow_path(&self) -> String {
        let file = self
            .workflow_file
            .clone()
            .unwrap_or_else(|| format!("{}.yml", slugify(&self.workflow_name)));
        format!("{}/{}", self.workflows_dir.trim_end_matches('/'), file)
    }

    /// Path of a bundle's action file, relative to the output root
    pub fn action_path(&self, bundle_id: &str) -> String {
        format!("{}/{}/action.yml", self.actions_dir.trim_end_matches('/'), bundle_id)
    }
}

/// Everything produced by one conversion
#[derive(Debug, Clone)]
pub struct Conversion {
    pub pipeline: Pipeline,
    pub compiled: CompiledPipeline,
    pub workflow: Workflow,
    /// Composite actions with their relative paths, in job order
    pub actions: Vec<(String, CompositeAction)>,
    /// Every diagnostic of the run: parser first, then compiler and codegen
    pub diagnostics: Vec<Diagnostic>,
    pub output: ConversionOutput,
}

impl Conversion {
    /// Write every rendered document to `sink`
    pub fn write_to(&self, sink: &mut dyn DocumentSink) -> Result<(), ConvertError> {
        self.output.write_to(sink)
    }
}

/// Jenkinsfile to workflow converter
pub struct Converter {
    options: ConverterOptions,
}

impl Converter {
    /// Create a converter with default options
    pub fn new() -> Self {
        Self::with_options(ConverterOptions::default())
    }

    /// Create a converter with custom options
    pub fn with_options(options: ConverterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Convert Jenkinsfile source text
    pub fn convert(&self, source: &str) -> Result<Conversion, ConvertError> {
        let (pipeline, mut diagnostics) = PipelineParser::parse(source)?.into_parts();

        let compiled = JobGraphCompiler::compile(&pipeline)?;
        diagnostics.extend(compiled.diagnostics.iter().cloned());

        let (workflow, codegen_diagnostics) =
            WorkflowCodegen::generate(&pipeline, &compiled, &self.options).into_parts();
        diagnostics.extend(codegen_diagnostics);

        let actions: Vec<(String, CompositeAction)> = compiled
            .bundles
            .iter()
            .map(|bundle| {
                (
                    self.options.action_path(&bundle.id),
                    BundleCodegen::generate(bundle, &self.options),
                )
            })
            .collect();

        let output = ConversionOutput::render(&self.options.workflow_path(), &workflow, &actions)?;

        tracing::debug!(
            "Converted pipeline into {} jobs and {} actions ({} diagnostics)",
            workflow.jobs.len(),
            actions.len(),
            diagnostics.len()
        );

        Ok(Conversion {
            pipeline,
            compiled,
            workflow,
            actions,
            diagnostics,
            output,
        })
    }

    /// Read a Jenkinsfile from `source` and convert it
    pub fn convert_document(
        &self,
        source: &dyn DocumentSource,
        location: &str,
    ) -> Result<Conversion, ConvertError> {
        let text = source.read_document(location)?;
        self.convert(&text)
    }

    /// Convert and write the documents to `sink`; nothing is written when any
    /// step of the conversion fails
    pub fn convert_into(
        &self,
        source: &str,
        sink: &mut dyn DocumentSink,
    ) -> Result<Conversion, ConvertError> {
        let conversion = self.convert(source)?;
        conversion.write_to(sink)?;
        Ok(conversion)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}
