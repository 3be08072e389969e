//! Agent parser
//!
//! Supported forms:
//! - `agent any`, `agent none`
//! - `agent { any }`
//! - `agent { label 'linux' }`, `agent { node { label 'linux' } }`
//! - `agent { docker { image 'node:20' args '-v /tmp:/tmp' } }`
//! - `agent { docker 'node:20' }`

use crate::args::read_string_at;
use crate::scanner::{find_block, find_top_level_block, mask_nested};
use jfmigrate_core::{AgentSpec, Diagnostic, DiagnosticCode, Extracted};
use once_cell::sync::Lazy;
use regex::Regex;

static INLINE_AGENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bagent\s+([A-Za-z_]\w*)").expect("Valid agent regex"));

static AGENT_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bagent\b").expect("Valid agent regex"));

/// Agent parser
pub(crate) struct AgentParser;

impl AgentParser {
    /// Parse the top-level agent of a pipeline or stage body.
    ///
    /// `None` means no agent was declared, `agent none` was used, or the
    /// declaration was not understood (reported as a diagnostic).
    pub(crate) fn parse(body: &str, element: &str) -> Extracted<Option<AgentSpec>> {
        if let Some(span) = find_top_level_block(body, "agent") {
            return Self::parse_block(span.slice(body), element);
        }

        let top_level = mask_nested(body);
        if let Some(caps) = INLINE_AGENT.captures(&top_level) {
            return match &caps[1] {
                "any" => Extracted::new(Some(AgentSpec::Any)),
                "none" => Extracted::new(None),
                other => Self::unsupported(element, other),
            };
        }

        if AGENT_KEYWORD.is_match(&top_level) {
            return Self::unsupported(element, "agent declaration");
        }

        Extracted::new(None)
    }

    fn parse_block(block: &str, element: &str) -> Extracted<Option<AgentSpec>> {
        let trimmed = block.trim();
        match trimmed {
            "any" => return Extracted::new(Some(AgentSpec::Any)),
            "none" => return Extracted::new(None),
            _ => {}
        }

        if let Some(span) = find_block(block, "docker") {
            let docker = span.slice(block);
            return match quoted_after(docker, "image") {
                Some(image) => {
                    let agent = AgentSpec::docker(image);
                    Extracted::new(Some(match quoted_after(docker, "args") {
                        Some(args) => agent.with_args(args),
                        None => agent,
                    }))
                }
                None => Self::unsupported(element, "docker block without image"),
            };
        }

        if let Some(image) = quoted_after(block, "docker") {
            return Extracted::new(Some(AgentSpec::docker(image)));
        }

        let label_zone = find_block(block, "node")
            .map(|span| span.slice(block))
            .unwrap_or(block);
        if let Some(label) = quoted_after(label_zone, "label") {
            return Extracted::new(Some(AgentSpec::label(label)));
        }

        let kind = trimmed
            .split(|c: char| c.is_whitespace() || c == '{')
            .next()
            .unwrap_or_default();
        Self::unsupported(element, kind)
    }

    fn unsupported(element: &str, kind: &str) -> Extracted<Option<AgentSpec>> {
        Extracted::with_diagnostics(
            None,
            vec![Diagnostic::new(
                DiagnosticCode::UnsupportedAgent,
                element,
                format!(
                    "unsupported agent '{}', falling back to the default runner",
                    kind
                ),
            )],
        )
    }
}

/// First quoted value following `keyword`, as in `label 'x'` or `label: 'x'`
fn quoted_after(text: &str, keyword: &str) -> Option<String> {
    let pattern = format!(r"\b{}\b\s*:?\s*\(?\s*", regex::escape(keyword));
    let re = Regex::new(&pattern).ok()?;
    let value = re
        .find_iter(text)
        .find_map(|found| read_string_at(text, found.end()))
        .map(|(value, _)| value.trim().to_string());
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(body: &str) -> Option<AgentSpec> {
        AgentParser::parse(body, "pipeline").value
    }

    #[test]
    fn test_inline_forms() {
        assert_eq!(agent("agent any\nstages { }"), Some(AgentSpec::Any));
        assert_eq!(agent("agent none\nstages { }"), None);
        assert_eq!(agent("stages { }"), None);
    }

    #[test]
    fn test_block_forms() {
        assert_eq!(agent("agent { any }"), Some(AgentSpec::Any));
        assert_eq!(
            agent("agent { label 'linux' }"),
            Some(AgentSpec::label("linux"))
        );
        assert_eq!(
            agent("agent {\n node {\n label 'gpu'\n customWorkspace '/ws'\n }\n}"),
            Some(AgentSpec::label("gpu"))
        );
    }

    #[test]
    fn test_docker_forms() {
        assert_eq!(
            agent("agent { docker { image 'maven:3-jdk-11' args '-v $HOME/.m2:/root/.m2' } }"),
            Some(AgentSpec::docker("maven:3-jdk-11").with_args("-v $HOME/.m2:/root/.m2"))
        );
        assert_eq!(
            agent("agent { docker 'node:20' }"),
            Some(AgentSpec::docker("node:20"))
        );
    }

    #[test]
    fn test_nested_agent_is_ignored() {
        let body = "stages { stage('a') { agent { label 'x' } } }";
        assert_eq!(agent(body), None);
    }

    #[test]
    fn test_unsupported_agent_is_reported() {
        let extracted = AgentParser::parse("agent { kubernetes { yaml 'pod' } }", "stage 'Deploy'");
        assert_eq!(extracted.value, None);
        assert_eq!(extracted.diagnostics.len(), 1);
        assert_eq!(extracted.diagnostics[0].code, DiagnosticCode::UnsupportedAgent);
        assert!(extracted.diagnostics[0].message.contains("kubernetes"));
    }

    #[test]
    fn test_quoted_after() {
        assert_eq!(quoted_after("label 'linux'", "label"), Some("linux".to_string()));
        assert_eq!(
            quoted_after("node { label: \" gpu \" }", "label"),
            Some("gpu".to_string())
        );
        assert_eq!(quoted_after("labels 'x'", "label"), None);
    }
}
