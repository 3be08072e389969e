//! Shell command extraction
//!
//! Commands are collected in document order from `sh` and `echo` steps. Shell
//! text is opaque: it is copied verbatim, only split into lines when it spans
//! several of them.

use crate::args::{match_paren, parse_call_args, read_string_at, ArgValue, CallArgs};
use once_cell::sync::Lazy;
use regex::Regex;

static STEP_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(sh|echo)\b[ \t]*(\()?[ \t]*(?:script[ \t]*:[ \t]*)?")
        .expect("Valid step call regex")
});

/// `key:` opening an unparenthesized named argument list
static NAMED_ARG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_]\w*[ \t]*:").expect("Valid named argument regex"));

/// Commands of a step zone, in document order.
///
/// Recognized forms: `sh '…'`, `sh "…"`, `sh '''…'''`, `sh """…"""`,
/// `sh(script: '…')`, `sh script: '…'`, `sh label: '…', script: '…'`
/// and `echo '…'`.
pub(crate) fn extract_commands(zone: &str) -> Vec<String> {
    let mut commands = Vec::new();
    let mut offset = 0;

    while let Some(found) = STEP_CALL.captures_at(zone, offset) {
        let (Some(whole), Some(step)) = (found.get(0), found.get(1)) else {
            break;
        };
        let is_echo = step.as_str() == "echo";

        let parsed = if found.get(2).is_some() {
            let open = whole.start() + whole.as_str().find('(').unwrap_or(0);
            call_script(zone, open)
        } else if NAMED_ARG.is_match(&zone[whole.end()..]) {
            named_script(zone, whole.end())
        } else {
            read_string_at(zone, whole.end())
        };

        match parsed {
            Some((text, end)) => {
                if is_echo {
                    let message = text.trim();
                    if !message.is_empty() {
                        commands.push(format!("echo {}", message));
                    }
                } else {
                    commands.extend(script_lines(&text));
                }
                offset = end.max(whole.end());
            }
            None => offset = whole.end(),
        }

        if offset >= zone.len() {
            break;
        }
    }

    commands
}

/// Script of a parenthesized call such as `sh(script: '…', returnStdout: true)`
fn call_script(zone: &str, open: usize) -> Option<(String, usize)> {
    let close = match_paren(zone, open)?;
    let script = script_argument(&parse_call_args(&zone[open + 1..close]))?;
    Some((script, close + 1))
}

/// Script of an unparenthesized call such as `sh label: 'Build', script: 'make'`
fn named_script(zone: &str, start: usize) -> Option<(String, usize)> {
    let end = argument_list_end(zone, start);
    let script = script_argument(&parse_call_args(&zone[start..end]))?;
    Some((script, end))
}

fn script_argument(args: &CallArgs) -> Option<String> {
    args.get("script")
        .or_else(|| args.get("message"))
        .or_else(|| args.positional.first())
        .and_then(ArgValue::as_text)
}

/// End of an argument list without parentheses: the first line break not
/// following a comma, or the end of the enclosing block
fn argument_list_end(zone: &str, start: usize) -> usize {
    let bytes = zone.as_bytes();
    let mut index = start;
    let mut continued = false;

    while index < bytes.len() {
        match bytes[index] {
            b'\'' | b'"' => match read_string_at(zone, index) {
                Some((_, end)) => {
                    index = end;
                    continued = false;
                    continue;
                }
                None => return zone.len(),
            },
            b'\n' if !continued => return index,
            b'}' | b';' => return index,
            b',' => continued = true,
            byte if !byte.is_ascii_whitespace() => continued = false,
            _ => {}
        }
        index += 1;
    }
    index
}

/// Split a script into trimmed, non-empty, non-comment lines
pub(crate) fn script_lines(script: &str) -> Vec<String> {
    script
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('#') && !line.starts_with("//"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_order_is_kept() {
        let zone = r#"
            echo 'Starting'
            sh 'make'
            sh "make test"
        "#;
        assert_eq!(
            extract_commands(zone),
            vec!["echo Starting", "make", "make test"]
        );
    }

    #[test]
    fn test_triple_quoted_script() {
        let zone = "sh '''\n  # prepare\n  npm ci\n\n  npm run build\n'''";
        assert_eq!(extract_commands(zone), vec!["npm ci", "npm run build"]);
    }

    #[test]
    fn test_script_argument_forms() {
        let zone = r#"
            sh(script: './gradlew check', returnStatus: true)
            sh script: "./deploy.sh"
            sh('ls -la')
        "#;
        assert_eq!(
            extract_commands(zone),
            vec!["./gradlew check", "./deploy.sh", "ls -la"]
        );
    }

    #[test]
    fn test_quotes_inside_commands() {
        let zone = r#"sh "echo 'hello world'""#;
        assert_eq!(extract_commands(zone), vec!["echo 'hello world'"]);
    }

    #[test]
    fn test_unrelated_words_are_ignored() {
        let zone = "bash 'x'\nshell 'y'\nfinish 'z'";
        assert!(extract_commands(zone).is_empty());
    }

    #[test]
    fn test_labelled_script_without_parentheses() {
        let zone = r#"
            sh label: 'Compile', script: 'make all'
            sh label: "Package",
               script: """
                 tar czf app.tgz build/
               """
            echo message: 'done'
        "#;
        assert_eq!(
            extract_commands(zone),
            vec!["make all", "tar czf app.tgz build/", "echo done"]
        );
    }

    #[test]
    fn test_labelled_script_on_one_line_block() {
        let zone = "sh label: 'Lint', script: 'make lint' }\nsh 'make'";
        assert_eq!(extract_commands(zone), vec!["make lint", "make"]);
    }
}
