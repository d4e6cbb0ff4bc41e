//! Decoding token sequences into values.
//!
//! Both codecs walk the flat token sequence produced by the lexer and pick up
//! assignments by adjacency: the token before `=` must be an identifier and
//! the token after it must be a value. The enclosing section is tracked as the
//! walk passes `Section` and `EndOfSection` tokens.
//!
//! - [`Decoder::decode`] builds a [`ConfigMap`] keyed by `"section/key"`.
//! - [`Decoder::decode_into`] writes into a [`Schema`] target through its
//!   [`FieldMap`].

use crate::fields::{FieldBinding, FieldKind, FieldMap, Schema};
use crate::map::KEY_SEPARATOR;
use crate::options::DecodeOptions;
use crate::token::{Token, TokenKind};
use crate::{ConfigMap, Error, Result, Value};
use tracing::{debug, trace};

/// A decoder for configuration token sequences.
///
/// # Examples
///
/// ```rust
/// use lvmconf::{lex_str, Decoder, Value};
///
/// let tokens = lex_str("config {\n\tsome_field = 1\n}\n").unwrap();
/// let map = Decoder::new().decode(&tokens).unwrap();
/// assert_eq!(map.get("config/some_field"), Some(&Value::Int64(1)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    options: DecodeOptions,
}

impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: DecodeOptions) -> Self {
        Decoder { options }
    }

    /// Decodes every assignment into a flat map.
    ///
    /// Inside a section the key is `section/key`; an assignment outside any
    /// section is stored under its bare key. Later assignments to the same key
    /// replace earlier ones.
    pub fn decode(&self, tokens: &[Token]) -> Result<ConfigMap> {
        let mut map = ConfigMap::new();
        let assignments = walk(tokens, |section, key, value| {
            let key = match section {
                Some(section) => format!("{}{}{}", section, KEY_SEPARATOR, key.value),
                None => key.value.clone(),
            };
            let value = match value.kind {
                TokenKind::Int64 => Value::Int64(parse_int64(&key, value)?),
                _ => parse_string(&value.value),
            };
            map.insert(key, value);
            Ok(())
        })?;
        debug!(assignments, keys = map.len(), "decoded config map");
        Ok(map)
    }

    /// Decodes into `target`, building its field map first.
    ///
    /// See [`decode_into_with`](Self::decode_into_with).
    pub fn decode_into<T: Schema>(&self, tokens: &[Token], target: &mut T) -> Result<()> {
        let fields = FieldMap::<T>::new()?;
        self.decode_into_with(&fields, tokens, target)
    }

    /// Decodes into `target` through a prebuilt field map.
    ///
    /// Keys with no binding are skipped. A key with a section hint belongs to
    /// the hinted section wherever it is assigned. Any other key belongs to
    /// its enclosing section, or to the section `""` at top level. The
    /// target is only written once the whole sequence has decoded, so a
    /// failure leaves it untouched.
    pub fn decode_into_with<T>(
        &self,
        fields: &FieldMap<T>,
        tokens: &[Token],
        target: &mut T,
    ) -> Result<()> {
        let mut writes: Vec<(&FieldBinding<T>, Value)> = Vec::new();
        let mut skipped = 0usize;

        let assignments = walk(tokens, |section, key, value| {
            let section = self
                .options
                .section_hint(&key.value)
                .or(section)
                .unwrap_or("");
            let binding = match fields.get(section, &key.value) {
                Some(binding) => binding,
                None => {
                    skipped += 1;
                    trace!(section, key = %key.value, "skipping unbound key");
                    return Ok(());
                }
            };
            let decoded = match (binding.kind(), value.kind) {
                (FieldKind::Int64, TokenKind::Int64) => {
                    Value::Int64(parse_int64(&key.value, value)?)
                }
                (FieldKind::String, TokenKind::String) => Value::String(value.value.clone()),
                (kind, found) => {
                    return Err(Error::type_mismatch(
                        section,
                        &key.value,
                        kind.as_str(),
                        found.as_str(),
                    ))
                }
            };
            writes.push((binding, decoded));
            Ok(())
        })?;

        let applied = writes.len();
        for (binding, value) in writes {
            binding.write(target, value)?;
        }
        debug!(assignments, applied, skipped, "decoded into schema");
        Ok(())
    }
}

/// Walks `tokens`, calling `visit` with the enclosing section, the key token
/// and the value token of every assignment. Returns the assignment count.
fn walk<'t, F>(tokens: &'t [Token], mut visit: F) -> Result<usize>
where
    F: FnMut(Option<&'t str>, &'t Token, &'t Token) -> Result<()>,
{
    let mut section: Option<&'t str> = None;
    let mut count = 0;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Section => section = Some(&token.value),
            TokenKind::EndOfSection => section = None,
            TokenKind::Assignment => {
                let key = i
                    .checked_sub(1)
                    .and_then(|p| tokens.get(p))
                    .filter(|t| t.is(TokenKind::Identifier))
                    .ok_or_else(|| {
                        let prev = i.checked_sub(1).and_then(|p| tokens.get(p));
                        Error::structure(
                            token.line(),
                            "identifier before assignment",
                            prev.map_or("start of input", |t| t.kind.as_str()),
                        )
                    })?;
                let value = tokens.get(i + 1).ok_or_else(|| {
                    Error::structure(token.line(), "value after assignment", "end of input")
                })?;
                if !value.kind.is_value() {
                    return Err(Error::unsupported_value(
                        &key.value,
                        format!("unrecognized value token kind {}", value.kind),
                    ));
                }
                visit(section, key, value)?;
                count += 1;
            }
            TokenKind::Error => {
                return Err(token
                    .take_error()
                    .unwrap_or_else(|| Error::custom(&token.value)))
            }
            TokenKind::EndOfFile => break,
            _ => {}
        }
    }
    Ok(count)
}

fn parse_int64(key: &str, token: &Token) -> Result<i64> {
    token
        .value
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::invalid_integer(key, &token.value, token.line()))
}

/// Content with a `[` is a list: brackets stripped, split on commas, each
/// element trimmed of whitespace and quotes. Anything else is a scalar.
fn parse_string(content: &str) -> Value {
    if !content.contains('[') {
        return Value::String(content.trim_matches('"').to_string());
    }
    let inner = content
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim();
    if inner.is_empty() {
        return Value::EmptyList;
    }
    Value::List(
        inner
            .split(',')
            .map(|item| item.trim().trim_matches('"').to_string())
            .collect(),
    )
}
