//! Environment block parser

use crate::scanner::find_top_level_block;
use jfmigrate_core::EnvironmentMap;
use once_cell::sync::Lazy;
use regex::Regex;

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*)$").expect("Valid assignment regex")
});

/// Environment parser
pub(crate) struct EnvironmentParser;

impl EnvironmentParser {
    /// Parse the top-level `environment { }` block of a pipeline or stage body
    pub(crate) fn parse(body: &str) -> EnvironmentMap {
        find_top_level_block(body, "environment")
            .map(|span| Self::parse_assignments(span.slice(body)))
            .unwrap_or_default()
    }

    /// Line-oriented `KEY = value` pairs; a later assignment of the same key
    /// replaces the earlier value
    pub(crate) fn parse_assignments(block: &str) -> EnvironmentMap {
        let mut environment = EnvironmentMap::new();

        for line in block.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }
            if let Some(caps) = ASSIGNMENT.captures(line) {
                let value = unquote(caps[2].trim());
                environment.insert(caps[1].to_string(), value.to_string());
            }
        }

        environment
    }
}

/// Strip one pair of matching surrounding quotes
fn unquote(value: &str) -> &str {
    for quote in ["'''", "\"\"\"", "'", "\""] {
        if value.len() >= quote.len() * 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[quote.len()..value.len() - quote.len()];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_environment_block() {
        let body = r#"
            environment {
                APP_NAME = 'demo'
                // comment
                # another comment
                REGION = "eu-west-1"

                TOKEN = credentials('api-token')
            }
            stages { }
        "#;
        let env = EnvironmentParser::parse(body);
        let pairs: Vec<_> = env.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("APP_NAME", "demo"),
                ("REGION", "eu-west-1"),
                ("TOKEN", "credentials('api-token')"),
            ]
        );
    }

    #[test]
    fn test_nested_environment_is_not_global() {
        let body = "stages { stage('a') { environment { A = '1' } } }";
        assert!(EnvironmentParser::parse(body).is_empty());
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote("\"\""), "");
        assert_eq!(unquote("'mismatched\""), "'mismatched\"");
        assert_eq!(unquote("'"), "'");
    }
}
