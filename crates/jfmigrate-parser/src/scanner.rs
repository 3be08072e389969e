//! Block scanner
//!
//! Every structural extractor is built on the same primitive: find the
//! keyword that introduces a block, then skip to the balancing closing brace
//! while counting depth. Spans are byte offsets into the scanned text.
//!
//! Braces inside string literals are not special. Comments are removed by
//! [`strip_comments`] before any scanning so commented-out braces never
//! unbalance a block.

use regex::Regex;

/// Half-open byte range of a block body, relative to the scanned text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Remove `/* ... */` and `// ...` comments.
///
/// Comment markers inside quoted strings (single, double and triple quoted)
/// are kept. Newlines inside block comments are kept so line-oriented
/// extraction still sees the same lines.
pub fn strip_comments(text: &str) -> String {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum State {
        Code,
        Single,
        Double,
        TripleSingle,
        TripleDouble,
        LineComment,
        BlockComment,
    }

    let chars: Vec<char> = text.chars().collect();
    let starts_with = |at: usize, pattern: &str| {
        pattern
            .chars()
            .enumerate()
            .all(|(offset, expected)| chars.get(at + offset) == Some(&expected))
    };

    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match state {
            State::Code => {
                if c == '/' && next == Some('/') {
                    state = State::LineComment;
                    i += 2;
                    continue;
                }
                if c == '/' && next == Some('*') {
                    state = State::BlockComment;
                    i += 2;
                    continue;
                }
                if starts_with(i, "'''") || starts_with(i, "\"\"\"") {
                    state = if c == '\'' {
                        State::TripleSingle
                    } else {
                        State::TripleDouble
                    };
                    out.extend([c, c, c]);
                    i += 3;
                    continue;
                }
                match c {
                    '\'' => state = State::Single,
                    '"' => state = State::Double,
                    _ => {}
                }
                out.push(c);
                i += 1;
            }
            State::Single | State::Double => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = next {
                        out.push(escaped);
                        i += 2;
                        continue;
                    }
                }
                // single-line strings never span lines
                let closes = (c == '\'' && state == State::Single)
                    || (c == '"' && state == State::Double)
                    || c == '\n';
                if closes {
                    state = State::Code;
                }
                i += 1;
            }
            State::TripleSingle | State::TripleDouble => {
                let delimiter = if state == State::TripleSingle {
                    "'''"
                } else {
                    "\"\"\""
                };
                if c == '\\' {
                    if let Some(escaped) = next {
                        out.push(c);
                        out.push(escaped);
                        i += 2;
                        continue;
                    }
                }
                if starts_with(i, delimiter) {
                    out.push_str(delimiter);
                    state = State::Code;
                    i += 3;
                    continue;
                }
                out.push(c);
                i += 1;
            }
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                }
                i += 1;
            }
            State::BlockComment => {
                if c == '*' && next == Some('/') {
                    state = State::Code;
                    i += 2;
                    continue;
                }
                if c == '\n' {
                    out.push('\n');
                }
                i += 1;
            }
        }
    }

    out
}

/// Replace everything nested inside braces with spaces.
///
/// Depth-0 text and the outermost braces are kept, newlines are kept, and
/// every masked character is replaced by as many spaces as it has bytes, so
/// offsets in the masked text are valid offsets in `text`.
pub fn mask_nested(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;

    for c in text.chars() {
        match c {
            '{' => {
                out.push(if depth == 0 { '{' } else { ' ' });
                depth += 1;
            }
            '}' => {
                if depth == 0 {
                    out.push('}');
                } else {
                    depth -= 1;
                    out.push(if depth == 0 { '}' } else { ' ' });
                }
            }
            '\n' => out.push('\n'),
            _ if depth == 0 => out.push(c),
            _ => out.extend(std::iter::repeat(' ').take(c.len_utf8())),
        }
    }

    out
}

/// Index of the `}` balancing the `{` at `open`
pub fn match_brace(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    for (offset, byte) in bytes[open + 1..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(open + 1 + offset),
            b'}' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn keyword_regex(keyword: &str) -> Option<Regex> {
    Regex::new(&format!(r"\b{}\b", regex::escape(keyword))).ok()
}

/// Body span of the first `keyword { ... }` block anywhere in `text`.
///
/// Only whitespace may separate the keyword from its opening brace.
/// Returns `None` when no such block exists or it never balances.
pub fn find_block(text: &str, keyword: &str) -> Option<Span> {
    block_after_keyword(text, text, keyword)
}

/// Like [`find_block`], restricted to keywords at brace depth 0 of `text`
pub fn find_top_level_block(text: &str, keyword: &str) -> Option<Span> {
    let masked = mask_nested(text);
    block_after_keyword(text, &masked, keyword)
}

/// Whether `keyword` appears at brace depth 0 of `text`
pub fn has_top_level_keyword(text: &str, keyword: &str) -> bool {
    keyword_regex(keyword)
        .map(|re| re.is_match(&mask_nested(text)))
        .unwrap_or(false)
}

fn block_after_keyword(text: &str, searched: &str, keyword: &str) -> Option<Span> {
    let re = keyword_regex(keyword)?;

    for found in re.find_iter(searched) {
        let rest = &searched[found.end()..];
        let open = found.end() + (rest.len() - rest.trim_start().len());
        if text.as_bytes().get(open) == Some(&b'{') {
            let close = match_brace(text, open)?;
            return Some(Span {
                start: open + 1,
                end: close,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net_balance(text: &str) -> i64 {
        text.chars().fold(0, |acc, c| match c {
            '{' => acc + 1,
            '}' => acc - 1,
            _ => acc,
        })
    }

    #[test]
    fn test_find_simple_block() {
        let text = "steps { sh 'make' }";
        let span = find_block(text, "steps").unwrap();
        assert_eq!(span.slice(text), " sh 'make' ");
    }

    #[test]
    fn test_nested_blocks_are_skipped() {
        let text = "stage('A') { steps { script { if (x) { y() } } } post { always { z() } } }";
        let span = find_block(text, "steps").unwrap();
        assert_eq!(span.slice(text), " script { if (x) { y() } } ");
    }

    #[test]
    fn test_balanced_spans_have_zero_net_balance() {
        let inputs = [
            "pipeline { a { b { c } } d { } }",
            "pipeline {\n stages {\n stage('x') { steps { sh 'a' } }\n }\n}",
            "pipeline{{{}}{}}",
            "pipeline { }",
        ];
        for input in inputs {
            let span = find_block(input, "pipeline").unwrap();
            assert_eq!(net_balance(span.slice(input)), 0, "input: {}", input);
        }
    }

    #[test]
    fn test_missing_and_unbalanced() {
        assert_eq!(find_block("stages { }", "pipeline"), None);
        assert_eq!(find_block("pipeline { stages {", "pipeline"), None);
    }

    #[test]
    fn test_keyword_must_be_followed_by_brace() {
        let text = "agent any\nagent { label 'x' }";
        let span = find_block(text, "agent").unwrap();
        assert_eq!(span.slice(text).trim(), "label 'x'");
    }

    #[test]
    fn test_keyword_is_word_bounded() {
        let text = "stages { stage('x') { } }";
        assert!(find_block(text, "stage").is_none());
        assert!(find_block(text, "stages").is_some());
    }

    #[test]
    fn test_top_level_ignores_nested_keywords() {
        let text = "stages { stage('a') { post { always { } } } }\npost { failure { } }";
        let span = find_top_level_block(text, "post").unwrap();
        assert_eq!(span.slice(text).trim(), "failure { }");
        assert!(has_top_level_keyword(text, "stages"));
        assert!(!has_top_level_keyword(text, "always"));
    }

    #[test]
    fn test_mask_preserves_offsets() {
        let text = "a { é { b } }\nc";
        let masked = mask_nested(text);
        assert_eq!(masked.len(), text.len());
        assert_eq!(masked, format!("a {{{}}}\nc", " ".repeat(10)));
    }

    #[test]
    fn test_strip_comments() {
        let text = "a // line\n/* block\n{ */ b";
        assert_eq!(strip_comments(text), "a \n\n b");
    }

    #[test]
    fn test_strip_comments_keeps_strings() {
        let text = "sh 'curl https://example.com' // fetch\nsh \"\"\"\n  echo /* kept */\n\"\"\"";
        let stripped = strip_comments(text);
        assert!(stripped.contains("https://example.com'"));
        assert!(stripped.contains("/* kept */"));
        assert!(!stripped.contains("fetch"));
    }
}
