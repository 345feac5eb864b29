//! Restricted literal evaluator.
//!
//! Test-case text is data, never code: this module parses a JSON superset
//! (single-quoted strings, tuples, trailing commas, `null/true/false` and the
//! Python spellings `None/True/False`) plus `name = literal` statements. Any
//! other identifier is rejected.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::error::HarnessError;

/// A literal value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Integer view; integral floats qualify.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Str(_) => 3,
            Value::List(_) => 4,
            Value::Object(_) => 5,
        }
    }

    /// Total order used for canonical sorting: null < bool < number < string
    /// < list < object, lists and objects lexicographically.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                let a = self.as_f64().unwrap_or_default();
                let b = other.as_f64().unwrap_or_default();
                a.total_cmp(&b)
            }
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    let ord = x.total_cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Object(a), Value::Object(b)) => {
                for ((ka, va), (kb, vb)) in a.iter().zip(b) {
                    let ord = ka.cmp(kb).then_with(|| va.total_cmp(vb));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Deep structural equality. Integers and floats compare numerically;
/// booleans never equal numbers.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write_quoted(f, s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_quoted(f, key)?;
                    write!(f, ": {}", value)?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

/// Variables bound by a test-case input, in statement order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    entries: Vec<(String, Value)>,
}

impl Bindings {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Rebinding a name replaces its value in place.
    pub fn insert(&mut self, name: String, value: Value) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl From<ParseError> for HarnessError {
    fn from(err: ParseError) -> Self {
        HarnessError::Parse(err.to_string())
    }
}

/// Parse `name = literal` statements separated by `,`, `;` or newlines.
pub fn parse_bindings(text: &str) -> Result<Bindings, ParseError> {
    let mut p = Parser::new(text);
    let mut bindings = Bindings::default();

    loop {
        p.skip_separators();
        if p.at_end() {
            break;
        }

        let start = p.pos;
        let name = p
            .identifier()
            .ok_or_else(|| p.error("expected a variable name"))?;
        p.skip_inline_ws();
        if !p.eat('=') || p.peek() == Some('=') {
            return Err(ParseError {
                offset: start,
                message: format!("expected `{} = <literal>`", name),
            });
        }

        let mut items = vec![p.expression()?];
        loop {
            let save = p.pos;
            p.skip_inline_ws();
            if p.peek() != Some(',') {
                p.pos = save;
                break;
            }
            p.bump();
            p.skip_inline_ws();
            if p.at_end() || matches!(p.peek(), Some('\n' | ';')) || p.at_assignment() {
                // the comma separates statements; leave it for the separator check
                p.pos = save;
                break;
            }
            items.push(p.expression()?);
        }

        p.skip_inline_ws();
        match p.peek() {
            None | Some('\n' | ';' | ',') => {}
            Some(c) => return Err(p.error(format!("unexpected `{}`", c))),
        }

        let value = if items.len() == 1 {
            items.remove(0)
        } else {
            Value::List(items)
        };
        bindings.insert(name, value);
    }

    Ok(bindings)
}

/// Parse a single literal expression (a bare top-level comma list is a tuple).
pub fn parse_value(text: &str) -> Result<Value, ParseError> {
    let mut p = Parser::new(text);
    let first = p.expression()?;
    let mut items = vec![first];
    loop {
        p.skip_ws();
        if !p.eat(',') {
            break;
        }
        p.skip_ws();
        if p.at_end() {
            break;
        }
        items.push(p.expression()?);
    }
    p.skip_ws();
    if !p.at_end() {
        return Err(p.error("unexpected trailing input"));
    }
    Ok(if items.len() == 1 {
        items.remove(0)
    } else {
        Value::List(items)
    })
}

/// Deepest bracket nesting accepted in a literal.
pub const MAX_NESTING: usize = 1000;

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0, depth: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.src[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' {
                self.skip_comment();
            } else {
                break;
            }
        }
    }

    fn skip_inline_ws(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '#' => self.skip_comment(),
                _ => break,
            }
        }
    }

    fn skip_separators(&mut self) {
        loop {
            self.skip_ws();
            if !(self.eat(',') || self.eat(';')) {
                break;
            }
        }
    }

    fn identifier(&mut self) -> Option<String> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => {}
            _ => return None,
        }
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        Some(self.src[start..self.pos].to_string())
    }

    fn at_assignment(&self) -> bool {
        let mut ahead = Parser::new(self.src);
        ahead.pos = self.pos;
        if ahead.identifier().is_none() {
            return false;
        }
        ahead.skip_inline_ws();
        ahead.peek() == Some('=') && ahead.peek_second() != Some('=')
    }

    fn expression(&mut self) -> Result<Value, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(format!("nesting too deep (limit is {})", MAX_NESTING)));
        }
        self.depth += 1;
        let value = self.term();
        self.depth -= 1;
        value
    }

    fn term(&mut self) -> Result<Value, ParseError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('[') => {
                self.bump();
                let (items, _) = self.sequence(']')?;
                Ok(Value::List(items))
            }
            Some('(') => {
                self.bump();
                let (mut items, trailing_comma) = self.sequence(')')?;
                if items.len() == 1 && !trailing_comma {
                    Ok(items.remove(0))
                } else {
                    Ok(Value::List(items))
                }
            }
            Some('{') => self.object(),
            Some('"' | '\'') => self.string().map(Value::Str),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => {
                let start = self.pos;
                let word = self.identifier().unwrap_or_default();
                match word.as_str() {
                    "null" | "None" => Ok(Value::Null),
                    "true" | "True" => Ok(Value::Bool(true)),
                    "false" | "False" => Ok(Value::Bool(false)),
                    other => Err(ParseError {
                        offset: start,
                        message: format!("unknown name `{}`; only literals are allowed", other),
                    }),
                }
            }
            Some(c) => Err(self.error(format!("unexpected `{}`", c))),
        }
    }

    /// Items up to `close`; also reports whether the last item had a trailing comma.
    fn sequence(&mut self, close: char) -> Result<(Vec<Value>, bool), ParseError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok((items, trailing_comma));
            }
            items.push(self.expression()?);
            trailing_comma = false;
            self.skip_ws();
            if self.eat(',') {
                trailing_comma = true;
                continue;
            }
            if self.eat(close) {
                return Ok((items, trailing_comma));
            }
            return Err(match self.peek() {
                None => self.error(format!("unterminated sequence, expected `{}`", close)),
                Some(c) => self.error(format!("expected `,` or `{}`, found `{}`", close, c)),
            });
        }
    }

    fn object(&mut self) -> Result<Value, ParseError> {
        self.bump();
        let mut map = BTreeMap::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            let key_offset = self.pos;
            let key = match self.expression()? {
                Value::Str(s) => s,
                scalar @ (Value::Int(_) | Value::Float(_) | Value::Bool(_)) => scalar.to_string(),
                other => {
                    return Err(ParseError {
                        offset: key_offset,
                        message: format!("unsupported object key of kind {}", other.kind()),
                    })
                }
            };
            self.skip_ws();
            if !self.eat(':') {
                return Err(self.error("expected `:` after object key"));
            }
            let value = self.expression()?;
            map.insert(key, value);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            return Err(self.error("expected `,` or `}` in object"));
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        let quote = self.bump().unwrap_or('"');
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some('\n') => return Err(self.error("newline inside string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('b') => out.push('\u{8}'),
                    Some('f') => out.push('\u{c}'),
                    Some('0') => out.push('\0'),
                    Some('u') => out.push(self.unicode_escape()?),
                    Some(c @ ('\\' | '\'' | '"' | '/')) => out.push(c),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn hex4(&mut self) -> Result<u32, ParseError> {
        let end = self.pos + 4;
        let digits = self
            .src
            .get(self.pos..end)
            .ok_or_else(|| self.error("truncated \\u escape"))?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| self.error("invalid \\u escape"))?;
        self.pos = end;
        Ok(code)
    }

    fn unicode_escape(&mut self) -> Result<char, ParseError> {
        let high = self.hex4()?;
        let code = if (0xD800..0xDC00).contains(&high) {
            if !(self.eat('\\') && self.eat('u')) {
                return Err(self.error("unpaired surrogate in \\u escape"));
            }
            let low = self.hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(self.error("invalid low surrogate in \\u escape"));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };
        char::from_u32(code).ok_or_else(|| self.error("invalid code point in \\u escape"))
    }

    fn eat_digits(&mut self) -> usize {
        let mut count = 0;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
            count += 1;
        }
        count
    }

    fn number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        if matches!(self.peek(), Some('+' | '-')) {
            self.bump();
        }
        let mut digits = self.eat_digits();
        let mut is_float = false;
        if self.peek() == Some('.') {
            self.bump();
            is_float = true;
            digits += self.eat_digits();
        }
        if digits == 0 {
            return Err(ParseError {
                offset: start,
                message: "malformed number".to_string(),
            });
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            is_float = true;
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if self.eat_digits() == 0 {
                return Err(self.error("malformed exponent"));
            }
        }

        let text = self.src[start..self.pos].trim_start_matches('+');
        let malformed = || ParseError {
            offset: start,
            message: format!("malformed number `{}`", text),
        };
        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::Int(i));
            }
        }
        text.parse::<f64>().map(Value::Float).map_err(|_| malformed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: Vec<Value>) -> Value {
        Value::List(items)
    }

    fn ints(items: &[i64]) -> Value {
        list(items.iter().map(|i| Value::Int(*i)).collect())
    }

    #[test]
    fn test_comma_separated_bindings() {
        let b = parse_bindings("nums = [2,7,11,15], target = 9").unwrap();
        assert_eq!(b.len(), 2);
        assert_eq!(b.get("nums"), Some(&ints(&[2, 7, 11, 15])));
        assert_eq!(b.get("target"), Some(&Value::Int(9)));
        let names: Vec<&str> = b.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["nums", "target"]);
    }

    #[test]
    fn test_newline_and_semicolon_separators() {
        let b = parse_bindings("a = 1\nb = 'x'; c = null\n").unwrap();
        assert_eq!(b.get("a"), Some(&Value::Int(1)));
        assert_eq!(b.get("b"), Some(&Value::Str("x".into())));
        assert_eq!(b.get("c"), Some(&Value::Null));
    }

    #[test]
    fn test_multiline_value() {
        let b = parse_bindings("grid = [\n  [1, 2],\n  [3, 4],\n]\nk = 2").unwrap();
        assert_eq!(b.get("grid"), Some(&list(vec![ints(&[1, 2]), ints(&[3, 4])])));
        assert_eq!(b.get("k"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_empty_input_binds_nothing() {
        assert!(parse_bindings("").unwrap().is_empty());
        assert!(parse_bindings("   \n ").unwrap().is_empty());
    }

    #[test]
    fn test_bare_tuple_binding() {
        let b = parse_bindings("pair = 1, 2\nnext = 3").unwrap();
        assert_eq!(b.get("pair"), Some(&ints(&[1, 2])));
        assert_eq!(b.get("next"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_comma_before_next_statement() {
        let b = parse_bindings("head = [3,2,0,-4], pos = 1").unwrap();
        assert_eq!(b.get("pos"), Some(&Value::Int(1)));

        let b = parse_bindings("a = 1,\nb = 2,").unwrap();
        assert_eq!(b.get("a"), Some(&Value::Int(1)));
        assert_eq!(b.get("b"), Some(&Value::Int(2)));

        let b = parse_bindings("pair = 1, 2, k = 3").unwrap();
        assert_eq!(b.get("pair"), Some(&ints(&[1, 2])));
        assert_eq!(b.get("k"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let deep = format!("x = {}{}", "[".repeat(200_000), "]".repeat(200_000));
        let err = parse_bindings(&deep).unwrap_err();
        assert!(err.message.starts_with("nesting too deep"), "{}", err);

        let ok = format!("{}{}", "[".repeat(MAX_NESTING - 1), "]".repeat(MAX_NESTING - 1));
        assert!(parse_value(&ok).is_ok());
    }

    #[test]
    fn test_rebinding_replaces_in_place() {
        let b = parse_bindings("a = 1, b = 2, a = 3").unwrap();
        assert_eq!(b.len(), 2);
        assert_eq!(b.get("a"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_python_spellings() {
        let v = parse_value("[None, True, False, null, true, false]").unwrap();
        assert_eq!(
            v,
            list(vec![
                Value::Null,
                Value::Bool(true),
                Value::Bool(false),
                Value::Null,
                Value::Bool(true),
                Value::Bool(false),
            ])
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse_value("-42").unwrap(), Value::Int(-42));
        assert_eq!(parse_value("+7").unwrap(), Value::Int(7));
        assert_eq!(parse_value("2.5").unwrap(), Value::Float(2.5));
        assert_eq!(parse_value("1e3").unwrap(), Value::Float(1000.0));
        assert!(matches!(parse_value("99999999999999999999").unwrap(), Value::Float(_)));
        assert!(parse_value("-").is_err());
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(parse_value(r#""a\"b""#).unwrap(), Value::Str("a\"b".into()));
        assert_eq!(parse_value(r"'it\'s'").unwrap(), Value::Str("it's".into()));
        assert_eq!(parse_value(r#""é\n""#).unwrap(), Value::Str("é\n".into()));
        assert_eq!(parse_value(r#""😀""#).unwrap(), Value::Str("😀".into()));
        assert!(parse_value("\"open").is_err());
    }

    #[test]
    fn test_tuples_and_parentheses() {
        assert_eq!(parse_value("(1, 2)").unwrap(), ints(&[1, 2]));
        assert_eq!(parse_value("(5)").unwrap(), Value::Int(5));
        assert_eq!(parse_value("(5,)").unwrap(), ints(&[5]));
        assert_eq!(parse_value("1, 2").unwrap(), ints(&[1, 2]));
    }

    #[test]
    fn test_objects() {
        let v = parse_value("{'a': 1, \"b\": [true], 3: null,}").unwrap();
        let Value::Object(map) = v else {
            panic!("expected object");
        };
        assert_eq!(map["a"], Value::Int(1));
        assert_eq!(map["b"], list(vec![Value::Bool(true)]));
        assert_eq!(map["3"], Value::Null);
    }

    #[test]
    fn test_rejects_code() {
        assert!(parse_value("__import__('os')").is_err());
        assert!(parse_value("[1, 2] + [3]").is_err());
        assert!(parse_bindings("x = len([1])").is_err());
        assert!(parse_bindings("[1, 2, 3]").is_err());
        assert!(parse_bindings("x == 3").is_err());
    }

    #[test]
    fn test_error_offset() {
        let err = parse_value("[1, 2,, 3]").unwrap_err();
        assert_eq!(err.offset, 6);
    }

    #[test]
    fn test_numeric_equality_and_order() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Bool(true), Value::Int(1));
        assert_eq!(Value::Int(2).total_cmp(&Value::Float(1.5)), Ordering::Greater);
        assert_eq!(Value::Null.total_cmp(&Value::Int(0)), Ordering::Less);
        assert_eq!(ints(&[1, 2]).total_cmp(&ints(&[1, 2, 0])), Ordering::Less);
    }

    #[test]
    fn test_display_literal_form() {
        let v = parse_value(r#"[0, 1.5, "a\"b", null, true, {"k": []}]"#).unwrap();
        assert_eq!(v.to_string(), r#"[0, 1.5, "a\"b", null, true, {"k": []}]"#);
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
    }
}
