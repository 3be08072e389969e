//! Parameter declaration parser
//!
//! Parses the `parameters { }` block of a pipeline:
//! - `string(name: 'X', defaultValue: 'v', description: '...')`
//! - `text(...)` (treated as a string)
//! - `booleanParam(name: 'X', defaultValue: true)`
//! - `choice(name: 'X', choices: ['a', 'b'])` or `choices: 'a\nb'`
//!
//! Any other declaration kind is dropped with a diagnostic.

use crate::args::{match_paren, parse_call_args, ArgValue, CallArgs};
use crate::scanner::find_top_level_block;
use jfmigrate_core::{Diagnostic, DiagnosticCode, Extracted, ParameterSpec};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z_]\w*)\s*\(").expect("Valid declaration regex"));

/// Parameter parser
pub(crate) struct ParameterParser;

impl ParameterParser {
    /// Parse the top-level `parameters { }` block of a pipeline body
    pub(crate) fn parse(body: &str) -> Extracted<Vec<ParameterSpec>> {
        match find_top_level_block(body, "parameters") {
            Some(span) => Self::parse_declarations(span.slice(body)),
            None => Extracted::new(Vec::new()),
        }
    }

    /// Parse every declaration of a parameters block, in order
    pub(crate) fn parse_declarations(block: &str) -> Extracted<Vec<ParameterSpec>> {
        let mut result = Extracted::new(Vec::new());
        let mut seen = HashSet::new();
        let mut offset = 0;
        let mut position = 0;

        while let Some(caps) = DECLARATION.captures_at(block, offset) {
            let (Some(whole), Some(kind)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let open = whole.end() - 1;
            let Some(close) = match_paren(block, open) else {
                break;
            };
            offset = close + 1;
            position += 1;

            let args = parse_call_args(&block[open + 1..close]);
            let element = match args.text("name") {
                Some(name) => format!("parameter '{}'", name),
                None => format!("parameter #{}", position),
            };

            let Some(mut spec) = Self::build(kind.as_str(), &args, &element, &mut result)
            else {
                continue;
            };

            if !seen.insert(spec.name.clone()) {
                let original = spec.name.clone();
                let mut suffix = 2;
                while seen.contains(&format!("{}_{}", original, suffix)) {
                    suffix += 1;
                }
                spec.name = format!("{}_{}", original, suffix);
                seen.insert(spec.name.clone());
                result.push(Diagnostic::new(
                    DiagnosticCode::DuplicateParameter,
                    &element,
                    format!("declared more than once, renamed to '{}'", spec.name),
                ));
            }

            result.value.push(spec);
        }

        result
    }

    fn build(
        kind: &str,
        args: &CallArgs,
        element: &str,
        result: &mut Extracted<Vec<ParameterSpec>>,
    ) -> Option<ParameterSpec> {
        if !matches!(kind, "string" | "text" | "booleanParam" | "choice") {
            result.push(Diagnostic::new(
                DiagnosticCode::UnsupportedParameter,
                element,
                format!("unsupported parameter type '{}', skipped", kind),
            ));
            return None;
        }

        let Some(name) = args.text("name").filter(|name| !name.trim().is_empty()) else {
            result.push(Diagnostic::new(
                DiagnosticCode::ParameterMissingName,
                element,
                format!("{}(...) declaration has no name, skipped", kind),
            ));
            return None;
        };
        let name = name.trim().to_string();

        let spec = match kind {
            "booleanParam" => {
                let default = args
                    .get("defaultValue")
                    .and_then(ArgValue::as_bool)
                    .unwrap_or(false);
                ParameterSpec::boolean(name, default)
            }
            "choice" => {
                let options = args
                    .get("choices")
                    .map(ArgValue::as_list)
                    .unwrap_or_default();
                ParameterSpec::choice(name, options)
            }
            _ => ParameterSpec::string(name, args.text("defaultValue").unwrap_or_default()),
        };

        Some(match args.text("description").filter(|d| !d.is_empty()) {
            Some(description) => spec.with_description(description),
            None => spec,
        })
    }
}
