//! Encoding values into configuration text.
//!
//! Encoding builds an [`Ast`] and renders its flattened tokens with
//! [`render`]. Sections and keys are emitted in sorted order, so the same
//! input always produces byte-identical output.
//!
//! ## Layout
//!
//! ```text
//! config {
//! 	profile_dir = "/some/dir"
//! 	some_field = 1
//! }
//! ```
//!
//! Assignments inside a section are indented with one tab. Strings are
//! wrapped in `"`; lists (unquoted `String` tokens) and integers are written
//! bare.

use crate::ast::{Ast, Statement};
use crate::fields::{validate_name, FieldMap, Schema};
use crate::map::KEY_SEPARATOR;
use crate::options::EncodeOptions;
use crate::token::{Token, TokenKind};
use crate::{ConfigMap, Error, Result, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Renders a token sequence to text.
///
/// `StartOfFile` is skipped and `EndOfFile` stops rendering. `Error` tokens
/// return their error; `Unclassified` has no output rule and is a
/// [`Error::Format`].
///
/// # Examples
///
/// ```rust
/// use lvmconf::{lex_str, render};
///
/// let input = "global {\n\tumask = 63 # 077\n}\n";
/// assert_eq!(render(&lex_str(input).unwrap()).unwrap(), input);
/// ```
pub fn render(tokens: &[Token]) -> Result<String> {
    let estimate: usize = tokens.iter().map(|t| t.value.len()).sum();
    let mut out = String::with_capacity(estimate + estimate * 15 / 100);
    let mut in_section = false;
    let mut line_start = true;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::StartOfFile => continue,
            TokenKind::EndOfFile => break,
            TokenKind::EndOfStatement => {
                out.push_str(&token.value);
                line_start = true;
                continue;
            }
            TokenKind::Comment => {
                if !line_start {
                    out.push(' ');
                } else if in_section {
                    out.push('\t');
                }
                out.push_str(&token.value);
                let has_text = tokens
                    .get(i + 1)
                    .map_or(false, |next| next.is(TokenKind::CommentValue) && !next.value.is_empty());
                if has_text {
                    out.push(' ');
                }
            }
            TokenKind::CommentValue | TokenKind::Int64 => out.push_str(&token.value),
            TokenKind::Section => {
                out.push_str(&token.value);
                out.push(' ');
            }
            TokenKind::StartOfSection => {
                out.push_str(&token.value);
                in_section = true;
            }
            TokenKind::EndOfSection => {
                out.push_str(&token.value);
                in_section = false;
            }
            TokenKind::Identifier => {
                if !line_start {
                    out.push(' ');
                } else if in_section {
                    out.push('\t');
                }
                out.push_str(&token.value);
                out.push(' ');
            }
            TokenKind::Assignment => {
                out.push_str(&token.value);
                out.push(' ');
            }
            TokenKind::String => {
                if token.unquoted {
                    out.push_str(&token.value);
                } else {
                    out.push('"');
                    out.push_str(&token.value);
                    out.push('"');
                }
            }
            TokenKind::Error => {
                return Err(token
                    .take_error()
                    .unwrap_or_else(|| Error::custom(&token.value)))
            }
            kind @ TokenKind::Unclassified => return Err(Error::Format { kind }),
        }
        line_start = false;
    }
    Ok(out)
}

/// An encoder for configuration text.
///
/// # Examples
///
/// ```rust
/// use lvmconf::{config_map, Encoder};
///
/// let map = config_map! { "devices/dir" => "/dev", "devices/scan_lvs" => 0 };
/// let text = Encoder::new().encode_map(&map).unwrap();
/// assert_eq!(text, "devices {\n\tdir = \"/dev\"\n\tscan_lvs = 0\n}\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    options: EncodeOptions,
}

impl Encoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: EncodeOptions) -> Self {
        Encoder { options }
    }

    /// Encodes a [`Schema`] target, building its field map first.
    pub fn encode<T: Schema>(&self, value: &T) -> Result<String> {
        let fields = FieldMap::<T>::new()?;
        self.encode_with(&fields, value)
    }

    /// Encodes through a prebuilt field map: one section per bound section,
    /// one assignment per bound key.
    pub fn encode_with<T>(&self, fields: &FieldMap<T>, value: &T) -> Result<String> {
        let mut ast = self.start();
        for section in fields.sections() {
            let mut statement = Statement::section(section);
            for binding in fields.fields(section) {
                let assignment = match binding.read(value)? {
                    Value::Int64(i) => Statement::assignment_i64(binding.key(), i),
                    Value::String(s) => {
                        check_text(binding.key(), &s)?;
                        Statement::assignment_str(binding.key(), &s)
                    }
                    other => {
                        return Err(Error::type_mismatch(
                            section,
                            binding.key(),
                            binding.kind().as_str(),
                            other.kind(),
                        ))
                    }
                };
                statement.push_line(assignment)?;
            }
            ast.push_line(statement);
        }
        self.finish(&ast, fields.len())
    }

    /// Encodes a flat map whose keys are all `section/field`.
    ///
    /// Integers are written bare; every other value is written in its
    /// [`Display`](std::fmt::Display) form.
    pub fn encode_map(&self, map: &ConfigMap) -> Result<String> {
        let mut grouped: BTreeMap<&str, BTreeMap<&str, &Value>> = BTreeMap::new();
        for (key, value) in map {
            let (section, field) = split_key(key)?;
            grouped.entry(section).or_default().insert(field, value);
        }

        let mut ast = self.start();
        for (section, entries) in grouped {
            let mut statement = Statement::section(section);
            for (field, value) in entries {
                statement.push_line(map_assignment(field, value)?)?;
            }
            ast.push_line(statement);
        }
        self.finish(&ast, map.len())
    }

    fn start(&self) -> Ast {
        let mut ast = Ast::new();
        if let Some(header) = &self.options.header {
            for statement in Statement::comment_block(header) {
                ast.push(statement);
            }
        }
        ast
    }

    fn finish(&self, ast: &Ast, assignments: usize) -> Result<String> {
        let out = render(&ast.tokens())?;
        debug!(
            sections = ast.sections().count(),
            assignments,
            bytes = out.len(),
            "encoded config"
        );
        Ok(out)
    }
}

/// Splits `section/field`; exactly one separator, both halves valid names.
fn split_key(key: &str) -> Result<(&str, &str)> {
    let (section, field) = key
        .split_once(KEY_SEPARATOR)
        .ok_or_else(|| Error::invalid_key(key))?;
    if section.is_empty() || field.is_empty() || field.contains(KEY_SEPARATOR) {
        return Err(Error::invalid_key(key));
    }
    validate_name(section)?;
    validate_name(field)?;
    Ok((section, field))
}

fn map_assignment(field: &str, value: &Value) -> Result<Statement> {
    match value {
        Value::Int64(i) => Ok(Statement::assignment_i64(field, *i)),
        Value::String(s) => {
            check_text(field, s)?;
            if s.contains('[') {
                return Err(Error::unsupported_value(
                    field,
                    "string containing '[' would decode as a list",
                ));
            }
            Ok(Statement::assignment_str(field, s))
        }
        Value::List(items) => {
            for item in items {
                check_list_item(field, item)?;
            }
            Ok(Statement::assignment_list(field, &value.to_string()))
        }
        Value::EmptyList => Ok(Statement::assignment_list(field, &value.to_string())),
    }
}

fn check_text(key: &str, text: &str) -> Result<()> {
    if text.contains(['\n', '\r']) {
        return Err(Error::unsupported_value(key, "string contains a line break"));
    }
    if text.contains('"') {
        return Err(Error::unsupported_value(key, "string contains a quote"));
    }
    Ok(())
}

fn check_list_item(key: &str, item: &str) -> Result<()> {
    if let Some(ch) = item.chars().find(|ch| matches!(ch, ',' | '"' | '[' | ']' | '\n' | '\r')) {
        return Err(Error::unsupported_value(
            key,
            format!("list element {:?} contains {:?}", item, ch),
        ));
    }
    if item.trim() != item {
        return Err(Error::unsupported_value(
            key,
            format!("list element {:?} has surrounding whitespace", item),
        ));
    }
    Ok(())
}
