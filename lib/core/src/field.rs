//! Loosely typed product fields.
//!
//! Catalog rows arrive with `highlights` and `ingredients` as plain text, as
//! JSON arrays, or as text holding a serialized literal such as
//! `['Vegan', 'Cruelty-Free']`. [`FieldValue::parse`] resolves that once, when
//! the product is built, so filters and the normalizer only ever match on a
//! handful of shapes.

use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    #[default]
    Missing,
    /// Free text that is not a literal
    Text(String),
    /// A list of entries. `raw` keeps the source text when the list was
    /// parsed from a string.
    List { items: Vec<String>, raw: Option<String> },
    /// A literal that is not a list: a quoted string, a number,
    /// `True`/`False`/`None`, a tuple or a mapping. Never matches a keyword.
    Scalar(String),
}

impl FieldValue {
    /// Parse raw text: list literals become [`FieldValue::List`], other
    /// literals become [`FieldValue::Scalar`], blank text becomes
    /// [`FieldValue::Missing`], anything else stays as-is.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return FieldValue::Missing;
        }
        match parse_literal(raw) {
            Some(Literal::List(items)) => FieldValue::List {
                items,
                raw: Some(raw.to_string()),
            },
            Some(Literal::Other) => FieldValue::Scalar(raw.to_string()),
            None => FieldValue::Text(raw.to_string()),
        }
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Missing,
            Value::String(s) => FieldValue::parse(s),
            Value::Array(items) => FieldValue::List {
                items: items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
                raw: None,
            },
            other => FieldValue::Scalar(other.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// List entries, if this is a list
    pub fn items(&self) -> Option<&[String]> {
        match self {
            FieldValue::List { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Text descriptions are built from: the original string when there was
    /// one, otherwise list entries joined with `", "`.
    pub fn source_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Missing => None,
            FieldValue::Text(s) | FieldValue::Scalar(s) => Some(Cow::Borrowed(s)),
            FieldValue::List { raw: Some(raw), .. } => Some(Cow::Borrowed(raw)),
            FieldValue::List { items, raw: None } => Some(Cow::Owned(items.join(", "))),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(raw: &str) -> Self {
        FieldValue::parse(raw)
    }
}

impl From<String> for FieldValue {
    fn from(raw: String) -> Self {
        FieldValue::parse(&raw)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List { items, raw: None }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Missing => serializer.serialize_none(),
            FieldValue::Text(s) | FieldValue::Scalar(s) => serializer.serialize_str(s),
            // Parsed lists go back out as they came in
            FieldValue::List { raw: Some(raw), .. } => serializer.serialize_str(raw),
            FieldValue::List { items, raw: None } => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().map(FieldValue::from_json).unwrap_or_default())
    }
}

/// Entries of a Python-style list literal, or `None` when `raw` is not one
pub fn parse_list_literal(raw: &str) -> Option<Vec<String>> {
    match parse_literal(raw)? {
        Literal::List(items) => Some(items),
        Literal::Other => None,
    }
}

#[derive(Debug, PartialEq)]
enum Literal {
    List(Vec<String>),
    Other,
}

fn parse_literal(raw: &str) -> Option<Literal> {
    let mut reader = LiteralReader { src: raw.trim(), pos: 0 };
    let node = reader.expression()?;
    reader.skip_ws();
    if reader.peek().is_some() {
        return None;
    }
    Some(match node {
        Node::List(items) => Literal::List(items),
        Node::Str(_) | Node::Other => Literal::Other,
    })
}

enum Node {
    Str(String),
    List(Vec<String>),
    Other,
}

/// Recursive reader for the literal subset: strings (with implicit
/// concatenation), numbers, `True`/`False`/`None`, lists, tuples, sets and
/// dicts.
struct LiteralReader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> LiteralReader<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// A value, or a bare tuple `a, b` at the top level
    fn expression(&mut self) -> Option<Node> {
        let first = self.value()?;
        self.skip_ws();
        if !self.eat(',') {
            return Some(first);
        }
        loop {
            self.skip_ws();
            if self.peek().is_none() {
                break;
            }
            self.value()?;
            self.skip_ws();
            if !self.eat(',') {
                break;
            }
        }
        Some(Node::Other)
    }

    fn value(&mut self) -> Option<Node> {
        self.skip_ws();
        match self.peek()? {
            '[' => {
                self.bump();
                let (items, _) = self.sequence(']')?;
                Some(Node::List(items.into_iter().map(|(_, text)| text).collect()))
            }
            '(' => {
                self.bump();
                let (mut items, trailing_comma) = self.sequence(')')?;
                // `(x)` is just `x`
                if items.len() == 1 && !trailing_comma {
                    return items.pop().map(|(node, _)| node);
                }
                Some(Node::Other)
            }
            '{' => {
                self.bump();
                self.mapping()?;
                Some(Node::Other)
            }
            '\'' | '"' => self.strings().map(Node::Str),
            '-' | '+' => {
                self.bump();
                self.skip_ws();
                self.number()?;
                Some(Node::Other)
            }
            c if c.is_ascii_digit() || c == '.' => {
                self.number()?;
                Some(Node::Other)
            }
            c if c.is_alphabetic() || c == '_' => {
                if self.at_prefixed_string() {
                    return self.strings().map(Node::Str);
                }
                match self.word() {
                    "True" | "False" | "None" => Some(Node::Other),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Comma separated values up to `close`; returns each node with its text
    /// form and whether a trailing comma was present
    fn sequence(&mut self, close: char) -> Option<(Vec<(Node, String)>, bool)> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Some((items, trailing_comma));
            }
            if !items.is_empty() && !trailing_comma {
                return None;
            }
            let start = self.pos;
            let node = self.value()?;
            let text = match &node {
                Node::Str(s) => s.clone(),
                _ => self.src[start..self.pos].trim().to_string(),
            };
            items.push((node, text));
            self.skip_ws();
            trailing_comma = self.eat(',');
        }
    }

    fn mapping(&mut self) -> Option<()> {
        let mut first = true;
        loop {
            self.skip_ws();
            if self.eat('}') {
                return Some(());
            }
            if !first && !self.eat(',') {
                return None;
            }
            self.skip_ws();
            if self.eat('}') {
                return Some(());
            }
            self.value()?;
            self.skip_ws();
            if self.eat(':') {
                self.value()?;
            }
            first = false;
        }
    }

    fn word(&mut self) -> &'a str {
        let src = self.src;
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        &src[start..self.pos]
    }

    fn at_prefixed_string(&self) -> bool {
        let rest = &self.src[self.pos..];
        let prefix_len = rest.chars().take_while(|c| c.is_ascii_alphabetic()).count();
        let (prefix, after) = rest.split_at(prefix_len);
        (1..=2).contains(&prefix_len)
            && prefix.chars().all(|c| matches!(c, 'r' | 'R' | 'b' | 'B' | 'u' | 'U'))
            && matches!(after.chars().next(), Some('\'' | '"'))
    }

    /// One or more adjacent string literals, concatenated
    fn strings(&mut self) -> Option<String> {
        let mut out = String::new();
        loop {
            let mut raw = false;
            if self.at_prefixed_string() {
                raw = self.word().contains(['r', 'R']);
            }
            self.string_body(raw, &mut out)?;

            let save = self.pos;
            self.skip_ws();
            if matches!(self.peek(), Some('\'' | '"')) || self.at_prefixed_string() {
                continue;
            }
            self.pos = save;
            return Some(out);
        }
    }

    fn string_body(&mut self, raw: bool, out: &mut String) -> Option<()> {
        let quote = self.bump()?;
        loop {
            match self.bump()? {
                '\n' => return None,
                '\\' => {
                    let escaped = self.bump()?;
                    if raw {
                        out.push('\\');
                        out.push(escaped);
                        continue;
                    }
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '\\' | '\'' | '"' => out.push(escaped),
                        '\n' => {}
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                c if c == quote => return Some(()),
                c => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Option<()> {
        let start = self.pos;
        let mut prev = '\0';
        while let Some(c) = self.peek() {
            let exponent_sign = matches!(c, '+' | '-') && matches!(prev, 'e' | 'E');
            if !(c.is_ascii_alphanumeric() || c == '.' || c == '_' || exponent_sign) {
                break;
            }
            prev = c;
            self.bump();
        }
        is_number(&self.src[start..self.pos]).then_some(())
    }
}

fn is_number(token: &str) -> bool {
    let token = token.replace('_', "");
    let token = token.strip_suffix(['j', 'J']).unwrap_or(&token);
    if !token.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return false;
    }
    let radix = match token.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => return token.parse::<f64>().is_ok(),
    };
    let digits = &token[2..];
    !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix))
}
