//! jfmigrate Parser - Jenkinsfile to AST parser
//!
//! This crate extracts the pipeline model from declarative Jenkinsfiles.
//! Only structural keywords are recognized; shell text is kept opaque.
//!
//! Extraction is best-effort: optional elements that cannot be understood are
//! reported as diagnostics next to the extracted value. Only a missing
//! `pipeline` block, a missing `stages` block or an ambiguous stage abort
//! parsing.

pub mod error;
pub mod scanner;

mod agent_parser;
mod args;
mod commands;
mod environment_parser;
mod parameter_parser;
mod pipeline_parser;
mod post_parser;
mod stage_parser;

// Re-export main parser types
pub use error::{ParseError, Result};
pub use pipeline_parser::PipelineParser;
pub use scanner::{find_block, find_top_level_block, strip_comments, Span};
pub use stage_parser::StageParser;
