//! Call argument tokenizer
//!
//! Declarations such as `string(name: 'ENV', defaultValue: 'dev')` or
//! `choice(name = 'TARGET', choices: ['a', 'b'])` are parsed generically into
//! positional and named values. Quoted strings are unescaped; everything the
//! tokenizer does not understand is kept as raw text.

use indexmap::IndexMap;

/// A single argument value
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ArgValue {
    Text(String),
    Bool(bool),
    List(Vec<String>),
    Raw(String),
}

impl ArgValue {
    /// Textual form of scalars; lists have none
    pub(crate) fn as_text(&self) -> Option<String> {
        match self {
            ArgValue::Text(text) | ArgValue::Raw(text) => Some(text.clone()),
            ArgValue::Bool(value) => Some(value.to_string()),
            ArgValue::List(_) => None,
        }
    }

    pub(crate) fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(value) => Some(*value),
            ArgValue::Text(text) | ArgValue::Raw(text) => match text.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            ArgValue::List(_) => None,
        }
    }

    /// List items; a text value is split on newlines
    pub(crate) fn as_list(&self) -> Vec<String> {
        match self {
            ArgValue::List(items) => items.clone(),
            ArgValue::Text(text) | ArgValue::Raw(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            ArgValue::Bool(value) => vec![value.to_string()],
        }
    }
}

/// Parsed arguments of one call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CallArgs {
    pub positional: Vec<ArgValue>,
    pub named: IndexMap<String, ArgValue>,
}

impl CallArgs {
    pub(crate) fn get(&self, key: &str) -> Option<&ArgValue> {
        self.named.get(key)
    }

    pub(crate) fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(ArgValue::as_text)
    }
}

/// Tokenize the text between the parentheses of a call
pub(crate) fn parse_call_args(text: &str) -> CallArgs {
    let mut cursor = Cursor::new(text);
    let mut args = CallArgs::default();

    loop {
        cursor.skip_separators();
        if cursor.at_end() {
            break;
        }

        let checkpoint = cursor.pos;
        if let Some(key) = cursor.read_ident() {
            cursor.skip_ws();
            if matches!(cursor.peek(), Some(':') | Some('=')) {
                cursor.bump();
                cursor.skip_ws();
                let value = cursor.read_value();
                args.named.insert(key, value);
                continue;
            }
            cursor.pos = checkpoint;
        }

        let value = cursor.read_value();
        args.positional.push(value);
    }

    args
}

/// Read the string literal starting at byte offset `at`.
///
/// Returns the unescaped content and the byte offset just past the closing
/// quote, or `None` when `at` is not a quote or the literal never closes.
pub(crate) fn read_string_at(text: &str, at: usize) -> Option<(String, usize)> {
    let prefix = text.get(..at)?;
    let mut cursor = Cursor::new(text.get(at..)?);
    let content = cursor.read_string()?;
    let consumed: usize = cursor.chars[..cursor.pos].iter().map(|c| c.len_utf8()).sum();
    Some((content, prefix.len() + consumed))
}

/// Index of the `)` balancing the `(` at `open`, skipping string literals
pub(crate) fn match_paren(text: &str, open: usize) -> Option<usize> {
    if text.as_bytes().get(open) != Some(&b'(') {
        return None;
    }

    let mut depth = 0usize;
    let mut index = open + 1;
    while index < text.len() {
        match text.as_bytes()[index] {
            b'\'' | b'"' => {
                let (_, end) = read_string_at(text, index)?;
                index = end;
                continue;
            }
            b'(' => depth += 1,
            b')' if depth == 0 => return Some(index),
            b')' => depth -= 1,
            _ => {}
        }
        index += 1;
    }
    None
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn starts_with(&self, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(offset, expected)| self.chars.get(self.pos + offset) == Some(&expected))
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn skip_separators(&mut self) {
        while self
            .peek()
            .is_some_and(|c| c.is_whitespace() || c == ',')
        {
            self.pos += 1;
        }
    }

    fn read_ident(&mut self) -> Option<String> {
        let first = self.peek()?;
        if !(first.is_alphabetic() || first == '_') {
            return None;
        }
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        Some(self.chars[start..self.pos].iter().collect())
    }

    fn read_value(&mut self) -> ArgValue {
        match self.peek() {
            Some('\'') | Some('"') => match self.read_string() {
                Some(text) => ArgValue::Text(text),
                None => ArgValue::Raw(self.read_rest()),
            },
            Some('[') => {
                self.bump();
                ArgValue::List(self.read_list())
            }
            _ => {
                let raw = self.read_raw();
                match raw.as_str() {
                    "true" => ArgValue::Bool(true),
                    "false" => ArgValue::Bool(false),
                    _ => ArgValue::Raw(raw),
                }
            }
        }
    }

    /// Quoted literal at the cursor; single, double or triple quoted
    fn read_string(&mut self) -> Option<String> {
        let quote = self.peek().filter(|c| *c == '\'' || *c == '"')?;
        let triple: String = std::iter::repeat(quote).take(3).collect();
        let is_triple = self.starts_with(&triple);
        let start = self.pos;
        self.pos += if is_triple { 3 } else { 1 };

        let mut out = String::new();
        loop {
            let Some(c) = self.peek() else {
                self.pos = start;
                return None;
            };

            if c == '\\' {
                self.pos += 1;
                match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(other) => out.push(other),
                    None => out.push('\\'),
                }
                continue;
            }

            if is_triple && self.starts_with(&triple) {
                self.pos += 3;
                return Some(out);
            }
            if !is_triple && c == quote {
                self.pos += 1;
                return Some(out);
            }

            out.push(c);
            self.pos += 1;
        }
    }

    fn read_list(&mut self) -> Vec<String> {
        let mut items = Vec::new();
        loop {
            self.skip_separators();
            match self.peek() {
                None => break,
                Some(']') => {
                    self.bump();
                    break;
                }
                Some('\'') | Some('"') => match self.read_string() {
                    Some(item) => items.push(item),
                    None => {
                        self.read_rest();
                        break;
                    }
                },
                Some(_) => {
                    let start = self.pos;
                    while self.peek().is_some_and(|c| c != ',' && c != ']') {
                        self.pos += 1;
                    }
                    let item: String = self.chars[start..self.pos].iter().collect();
                    let item = item.trim();
                    if !item.is_empty() {
                        items.push(item.to_string());
                    }
                }
            }
        }
        items
    }

    /// Unquoted value up to the next top-level comma
    fn read_raw(&mut self) -> String {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => break,
                '\'' | '"' => {
                    if self.read_string().is_some() {
                        continue;
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        raw.trim().to_string()
    }

    fn read_rest(&mut self) -> String {
        let rest: String = self.chars[self.pos..].iter().collect();
        self.pos = self.chars.len();
        rest.trim().to_string()
    }
}
