//! jfmigrate Compiler - pipeline model to workflow compiler
//!
//! This crate compiles the pipeline model produced by `jfmigrate-parser` into
//! a dependency-ordered job graph, then generates the workflow and composite
//! action documents from it.

pub mod codegen;
pub mod converter;
pub mod error;
pub mod graph_compiler;
pub mod output;
pub mod slug;

// Re-export main types
pub use converter::{Conversion, Converter, ConverterOptions};
pub use error::{CompileError, ConvertError, Result};
pub use graph_compiler::{CompiledPipeline, JobGraphCompiler, PIPELINE_POST_JOB};
pub use output::{
    ConversionOutput, DocumentSink, DocumentSource, MemorySink, MemorySource, RenderedDocument,
};

// Re-export codegen types
pub use codegen::{BundleCodegen, WorkflowCodegen};
