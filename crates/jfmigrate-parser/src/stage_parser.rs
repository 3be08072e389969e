//! Stage tree builder
//!
//! Walks a `stages { }` (or `parallel { }`) body stage by stage. Each
//! `stage('name') {` header is located from the current scan offset and its
//! body is skipped with the block scanner, so nested stages are only ever seen
//! through the recursion into `parallel` groups.

use crate::agent_parser::AgentParser;
use crate::args::{match_paren, parse_call_args, ArgValue};
use crate::commands::extract_commands;
use crate::environment_parser::EnvironmentParser;
use crate::error::{ParseError, Result};
use crate::post_parser::PostParser;
use crate::scanner::{find_top_level_block, mask_nested, match_brace};
use jfmigrate_core::{
    BranchGuard, Diagnostic, DiagnosticCode, Extracted, StageBody, StageNode,
};
use once_cell::sync::Lazy;
use regex::Regex;

static STAGE_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bstage\s*\(").expect("Valid stage header regex"));

static BRANCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\bbranch\s*\(?\s*(?:pattern\s*:\s*)?['"]([^'"]+)['"](?:\s*,\s*comparator\s*:\s*['"](\w+)['"])?\s*\)?"#,
    )
    .expect("Valid branch regex")
});

/// `when` options that do not affect the condition
static WHEN_OPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bbefore(?:Agent|Input|Options)\s*\(?\s*(?:true|false)\s*\)?")
        .expect("Valid when option regex")
});

/// Stage tree builder
pub struct StageParser;

impl StageParser {
    /// Build the stage nodes of a `stages` or `parallel` body, in order
    pub fn parse_stages(body: &str) -> Result<Extracted<Vec<StageNode>>> {
        let mut result = Extracted::new(Vec::new());

        let split = Self::split_stages(body);
        let headers = result.absorb(split);

        for (name, stage_body) in headers {
            let stage = Self::parse_stage(&name, stage_body)?;
            let stage = result.absorb(stage);
            result.value.push(stage);
        }

        Ok(result)
    }

    /// Ordered `(name, body)` pairs of the stages declared directly in `body`
    pub fn split_stages(body: &str) -> Extracted<Vec<(String, &str)>> {
        let mut result = Extracted::new(Vec::new());
        let mut offset = 0;

        while let Some(call) = STAGE_CALL.find_at(body, offset) {
            let paren = call.end() - 1;
            let element = format!("stage #{}", result.value.len() + 1);
            let Some(close) = match_paren(body, paren) else {
                result.push(Diagnostic::new(
                    DiagnosticCode::MalformedStage,
                    &element,
                    "stage header never closes, remaining stages skipped",
                ));
                break;
            };

            let header = &body[paren + 1..close];
            let after = &body[close + 1..];
            if !after.trim_start().starts_with('{') {
                result.push(Diagnostic::new(
                    DiagnosticCode::MalformedStage,
                    &element,
                    format!("stage({}) has no block, stage skipped", header.trim()),
                ));
                offset = close + 1;
                continue;
            }
            let open = close + 1 + (after.len() - after.trim_start().len());

            let args = parse_call_args(header);
            let name = args
                .text("name")
                .or_else(|| args.positional.first().and_then(ArgValue::as_text))
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty());

            let Some(end) = match_brace(body, open) else {
                result.push(Diagnostic::new(
                    DiagnosticCode::UnbalancedBlock,
                    name.map_or(element, |name| format!("stage '{}'", name)),
                    "stage block never closes, remaining stages skipped",
                ));
                break;
            };
            offset = end + 1;

            let Some(name) = name else {
                result.push(Diagnostic::new(
                    DiagnosticCode::MalformedStage,
                    &element,
                    format!("stage name cannot be read from '{}', stage skipped", header.trim()),
                ));
                continue;
            };

            result.value.push((name, &body[open + 1..end]));
        }

        result
    }

    /// Build one stage node from its name and body
    pub fn parse_stage(name: &str, body: &str) -> Result<Extracted<StageNode>> {
        let element = format!("stage '{}'", name);
        let mut result = Extracted::new(());

        let agent = result.absorb(AgentParser::parse(body, &element));
        let environment = EnvironmentParser::parse(body);
        let when = result.absorb(Self::parse_when(body, &element));
        let post = result.absorb(PostParser::parse(body, &element));

        let parallel = find_top_level_block(body, "parallel");
        let commands = match find_top_level_block(body, "steps") {
            Some(span) => extract_commands(span.slice(body)),
            None if parallel.is_none() => extract_commands(&Self::without_post(body)),
            None => Vec::new(),
        };

        let stage_body = match parallel {
            Some(span) => {
                if !commands.is_empty() {
                    return Err(ParseError::AmbiguousStage {
                        stage: name.to_string(),
                    });
                }
                let children = Self::parse_stages(span.slice(body))?;
                StageBody::Parallel {
                    stages: result.absorb(children),
                }
            }
            None => StageBody::Steps { commands },
        };

        tracing::debug!("Parsed {} ({} diagnostics)", element, result.diagnostics.len());

        Ok(result.map(|_| StageNode {
            name: name.to_string(),
            agent,
            environment,
            when,
            post,
            body: stage_body,
        }))
    }

    /// Branch guard of the top-level `when { }` block.
    ///
    /// Only a single `branch` directive is translated. Nested conditions
    /// (`not`, `anyOf`, `allOf`) and other directives leave the job unguarded.
    fn parse_when(body: &str, element: &str) -> Extracted<Option<BranchGuard>> {
        let Some(span) = find_top_level_block(body, "when") else {
            return Extracted::new(None);
        };
        let masked = mask_nested(span.slice(body));

        let Some(caps) = BRANCH.captures(&masked) else {
            return Self::unguarded(
                element,
                "when block has no branch condition, the job runs unconditionally",
            );
        };

        if let Some(comparator) = caps.get(2).map(|m| m.as_str()) {
            if !matches!(comparator, "GLOB" | "EQUALS") {
                return Self::unguarded(
                    element,
                    &format!(
                        "branch comparator '{}' is not supported, the job runs unconditionally",
                        comparator
                    ),
                );
            }
        }

        let (start, end) = caps.get(0).map_or((0, 0), |m| (m.start(), m.end()));
        let rest = format!("{}{}", &masked[..start], &masked[end..]);
        let rest = WHEN_OPTION.replace_all(&rest, "");
        if !rest.trim_matches(|c: char| c.is_whitespace() || c == ';').is_empty() {
            return Self::unguarded(
                element,
                "when block holds more than a single branch condition, the job runs unconditionally",
            );
        }

        Extracted::new(Some(BranchGuard::new(caps[1].trim())))
    }

    fn unguarded(element: &str, message: &str) -> Extracted<Option<BranchGuard>> {
        Extracted::with_diagnostics(
            None,
            vec![Diagnostic::new(DiagnosticCode::UnsupportedWhen, element, message)],
        )
    }

    /// Stage body with its top-level post block cut out
    fn without_post(body: &str) -> String {
        match find_top_level_block(body, "post") {
            Some(span) => format!("{}{}", &body[..span.start], &body[span.end..]),
            None => body.to_string(),
        }
    }
}
