//! # lvmconf
//!
//! A codec for LVM-style configuration text.
//!
//! ## What is the format?
//!
//! A file is a sequence of one-level-deep sections holding `key = value`
//! assignments, with `#` comments anywhere:
//!
//! ```text
//! # lvm.conf
//! config {
//! 	profile_dir = "/etc/lvm/profile"
//! 	checks = 1
//! }
//! devices {
//! 	filter = [ "a|.*|", "r|.*|" ]
//! }
//! ```
//!
//! Values are quoted strings, signed 64-bit integers, or bracketed lists of
//! strings.
//!
//! ## Key Features
//!
//! - **Streaming Lexer**: reads line by line from any `BufRead`, one batch of
//!   tokens per line
//! - **Lossless Tree**: [`Ast`] keeps every token, so parse then render gives
//!   back the input
//! - **Structured Codec**: decode into and encode from plain structs described
//!   with [`schema!`]
//! - **Unstructured Codec**: decode into and encode from a flat [`ConfigMap`]
//!   keyed by `"section/key"`
//! - **Deterministic Output**: sections and keys are sorted on encode
//!
//! ## Quick Start
//!
//! ```rust
//! use lvmconf::{from_str_into, schema, to_string};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct LvmConfig {
//!     config: ConfigSection,
//! }
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct ConfigSection {
//!     some_field: i64,
//!     profile_dir: String,
//! }
//!
//! schema! { impl Schema for LvmConfig { "config" => config } }
//! schema! {
//!     impl Section for ConfigSection {
//!         "some_field" => some_field,
//!         "profile_dir" => profile_dir,
//!     }
//! }
//!
//! let text = "config {\n\tprofile_dir = \"/some/dir\"\n\tsome_field = 1\n}\n";
//!
//! let mut lvm = LvmConfig::default();
//! from_str_into(text, &mut lvm).unwrap();
//! assert_eq!(lvm.config.some_field, 1);
//!
//! assert_eq!(to_string(&lvm).unwrap(), text);
//! ```
//!
//! ### Working with Flat Maps
//!
//! ```rust
//! use lvmconf::{from_str, to_string_map, Value};
//!
//! let map = from_str("global {\n\tumask = 63\n}\n").unwrap();
//! assert_eq!(map.get("global/umask"), Some(&Value::Int64(63)));
//! assert_eq!(to_string_map(&map).unwrap(), "global {\n\tumask = 63\n}\n");
//! ```
//!
//! ### Tokens and Trees
//!
//! ```rust
//! use lvmconf::{lex_str, render, Ast, TokenKind};
//!
//! let tokens = lex_str("a = 1\n").unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::StartOfFile);
//! let ast = Ast::from_tokens(&tokens).unwrap();
//! assert_eq!(render(&ast.tokens()).unwrap(), "a = 1\n");
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `debug` summaries per decode, encode
//! and lex, and `trace` events for individual tokens and skipped keys.
//! Install any subscriber to see them.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Structured decode and encode
//! - **`unstructured.rs`** - Flat maps, lists and headers
//! - **`round_trip.rs`** - Lexing, the statement tree and rendering
//!
//! Run any example with: `cargo run --example <name>`

pub mod ast;
pub mod de;
pub mod error;
pub mod fields;
pub mod lexer;
pub mod macros;
pub mod map;
pub mod options;
pub mod ser;
pub mod token;
pub mod value;

pub use ast::{Ast, Statement};
pub use de::Decoder;
pub use error::{Error, Result};
pub use fields::{FieldBinding, FieldKind, FieldMap, Schema, Section};
pub use lexer::{lex_reader, lex_str, Lexer};
pub use map::{ConfigMap, KEY_SEPARATOR};
pub use options::{DecodeOptions, EncodeOptions};
pub use ser::{render, Encoder};
pub use token::{Position, Token, TokenKind};
pub use value::Value;

use std::io;

/// Decode configuration text into a flat map.
///
/// # Examples
///
/// ```rust
/// use lvmconf::{from_str, Value};
///
/// let map = from_str("devices {\n\tdir = \"/dev\"\n}\n").unwrap();
/// assert_eq!(map.get("devices/dir"), Some(&Value::from("/dev")));
/// ```
///
/// # Errors
///
/// Returns an error if the text does not lex, the assignments are malformed,
/// or an unquoted value is not an integer.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(s: &str) -> Result<ConfigMap> {
    Decoder::new().decode(&lex_str(s)?)
}

/// Decode a flat map from bytes of configuration text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8 or do not decode.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(v: &[u8]) -> Result<ConfigMap> {
    let s = std::str::from_utf8(v).map_err(|e| Error::io(&e.to_string()))?;
    from_str(s)
}

/// Decode a flat map from an I/O stream, reading it line by line.
///
/// # Examples
///
/// ```rust
/// use lvmconf::from_reader;
/// use std::io::Cursor;
///
/// let map = from_reader(Cursor::new(b"global {\n\tumask = 63\n}\n")).unwrap();
/// assert_eq!(map.len(), 1);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or the text does not decode.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R: io::Read>(reader: R) -> Result<ConfigMap> {
    Decoder::new().decode(&lex_reader(reader)?)
}

/// Decode configuration text into a [`Schema`] target.
///
/// Keys the target does not bind are ignored. On error the target is left
/// unchanged.
///
/// # Errors
///
/// Returns an error if the schema cannot be bound, the text does not lex, or
/// a value does not fit its field.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_into<T: Schema>(s: &str, target: &mut T) -> Result<()> {
    from_str_into_with_options(s, target, &DecodeOptions::default())
}

/// Decode configuration text into a [`Schema`] target with custom options.
///
/// # Errors
///
/// See [`from_str_into`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_into_with_options<T: Schema>(
    s: &str,
    target: &mut T,
    options: &DecodeOptions,
) -> Result<()> {
    Decoder::with_options(options.clone()).decode_into(&lex_str(s)?, target)
}

/// Decode an I/O stream into a [`Schema`] target.
///
/// # Errors
///
/// See [`from_str_into`]; also fails if reading fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader_into<R: io::Read, T: Schema>(reader: R, target: &mut T) -> Result<()> {
    Decoder::new().decode_into(&lex_reader(reader)?, target)
}

/// Encode a [`Schema`] target to configuration text.
///
/// # Errors
///
/// Returns an error if the schema cannot be bound or a string field holds a
/// line break.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T: Schema>(value: &T) -> Result<String> {
    to_string_with_options(value, &EncodeOptions::default())
}

/// Encode a [`Schema`] target with custom options.
///
/// # Errors
///
/// See [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T: Schema>(value: &T, options: &EncodeOptions) -> Result<String> {
    Encoder::with_options(options.clone()).encode(value)
}

/// Encode a [`Schema`] target to bytes.
///
/// # Errors
///
/// See [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T: Schema>(value: &T) -> Result<Vec<u8>> {
    to_string(value).map(String::into_bytes)
}

/// Encode a [`Schema`] target to a writer.
///
/// # Errors
///
/// See [`to_string`]; also fails if writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W: io::Write, T: Schema>(mut writer: W, value: &T) -> Result<()> {
    let text = to_string(value)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// Encode a flat map to configuration text.
///
/// # Examples
///
/// ```rust
/// use lvmconf::{config_map, to_string_map};
///
/// let map = config_map! { "config/some_field" => 1 };
/// assert_eq!(to_string_map(&map).unwrap(), "config {\n\tsome_field = 1\n}\n");
/// ```
///
/// # Errors
///
/// Returns an error if a key is not `section/field` or a value cannot be
/// written so that it decodes back unchanged.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_map(map: &ConfigMap) -> Result<String> {
    to_string_map_with_options(map, &EncodeOptions::default())
}

/// Encode a flat map with custom options.
///
/// # Errors
///
/// See [`to_string_map`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_map_with_options(map: &ConfigMap, options: &EncodeOptions) -> Result<String> {
    Encoder::with_options(options.clone()).encode_map(map)
}

/// Encode a flat map to a writer.
///
/// # Errors
///
/// See [`to_string_map`]; also fails if writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_map<W: io::Write>(mut writer: W, map: &ConfigMap) -> Result<()> {
    let text = to_string_map(map)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct LvmConfig {
        config: ConfigSection,
    }

    #[derive(Debug, Default, PartialEq)]
    struct ConfigSection {
        some_field: i64,
        profile_dir: String,
    }

    schema! { impl Schema for LvmConfig { "config" => config } }
    schema! {
        impl Section for ConfigSection {
            "some_field" => some_field,
            "profile_dir" => profile_dir,
        }
    }

    #[test]
    fn test_from_slice_rejects_bad_utf8() {
        assert!(matches!(from_slice(&[0xff, b'\n']), Err(Error::Io(_))));
    }

    #[test]
    fn test_writer_round_trip() {
        let lvm = LvmConfig {
            config: ConfigSection {
                some_field: 7,
                profile_dir: "/p".to_string(),
            },
        };
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &lvm).unwrap();
        assert_eq!(buffer, to_vec(&lvm).unwrap());

        let mut back = LvmConfig::default();
        from_reader_into(buffer.as_slice(), &mut back).unwrap();
        assert_eq!(back, lvm);
    }

    #[test]
    fn test_map_writer() {
        let map = from_str("a {\n\tb = \"c\"\n}\n").unwrap();
        let mut buffer = Vec::new();
        to_writer_map(&mut buffer, &map).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "a {\n\tb = \"c\"\n}\n");
    }
}
