//! Pipeline parser
//!
//! Parses a declarative Jenkinsfile into a [`Pipeline`].
//!
//! Only two structural absences are fatal: a missing `pipeline { }` block and
//! a missing `stages { }` block. Agents, parameters, environment, triggers and
//! post hooks are extracted on a best-effort basis.

use crate::agent_parser::AgentParser;
use crate::environment_parser::EnvironmentParser;
use crate::error::{ParseError, Result};
use crate::parameter_parser::ParameterParser;
use crate::post_parser::PostParser;
use crate::scanner::{find_block, find_top_level_block, strip_comments};
use crate::stage_parser::StageParser;
use jfmigrate_core::{Diagnostic, DiagnosticCode, Extracted, Pipeline};
use once_cell::sync::Lazy;
use regex::Regex;

static CRON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bcron\s*\(?\s*(?:spec\s*:\s*)?['"]([^'"]+)['"]"#).expect("Valid cron regex")
});

static LIBRARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@Library\s*\(([^)]*)\)").expect("Valid library regex"));

static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).expect("Valid quoted regex"));

/// Pipeline parser
pub struct PipelineParser;

impl PipelineParser {
    /// Parse a Jenkinsfile from source text
    pub fn parse(source: &str) -> Result<Extracted<Pipeline>> {
        let text = strip_comments(source);

        let span = find_top_level_block(&text, "pipeline")
            .or_else(|| find_block(&text, "pipeline"))
            .ok_or(ParseError::NotDeclarativePipeline)?;
        let body = span.slice(&text);

        let stages_span =
            find_top_level_block(body, "stages").ok_or(ParseError::MissingStages)?;

        let mut result = Extracted::new(());

        let agent = result.absorb(AgentParser::parse(body, "pipeline"));
        let parameters = result.absorb(ParameterParser::parse(body));
        let environment = EnvironmentParser::parse(body);
        let cron = result.absorb(Self::parse_triggers(body));
        let stages = result.absorb(StageParser::parse_stages(stages_span.slice(body))?);
        let post = result.absorb(PostParser::parse(body, "pipeline"));
        let libraries = result.absorb(Self::parse_libraries(&text));

        let pipeline = Pipeline {
            agent,
            parameters,
            environment,
            cron,
            stages,
            post,
            libraries,
        };

        tracing::debug!(
            "Parsed pipeline: {} stages, {} parameters, {} diagnostics",
            pipeline.leaf_count(),
            pipeline.parameters.len(),
            result.diagnostics.len()
        );

        Ok(result.map(|_| pipeline))
    }

    /// First cron expression of the top-level `triggers { }` block
    fn parse_triggers(body: &str) -> Extracted<Option<String>> {
        let Some(span) = find_top_level_block(body, "triggers") else {
            return Extracted::new(None);
        };

        let mut expressions = CRON
            .captures_iter(span.slice(body))
            .map(|caps| caps[1].trim().to_string());
        let mut result = Extracted::new(expressions.next());

        for extra in expressions {
            result.push(Diagnostic::new(
                DiagnosticCode::ExtraCronTrigger,
                "triggers",
                format!("only the first cron trigger is kept, '{}' ignored", extra),
            ));
        }

        result
    }

    /// Shared libraries referenced by `@Library(...)` annotations
    fn parse_libraries(text: &str) -> Extracted<Vec<String>> {
        let mut result = Extracted::new(Vec::new());

        for caps in LIBRARY.captures_iter(text) {
            for library in QUOTED.captures_iter(&caps[1]) {
                let library = library[1].trim().to_string();
                result.push(Diagnostic::new(
                    DiagnosticCode::SharedLibrary,
                    format!("library '{}'", library),
                    "shared library steps are not translated",
                ));
                result.value.push(library);
            }
        }

        result
    }
}
