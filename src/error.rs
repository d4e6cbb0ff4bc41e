//! Error types for lexing, decoding and encoding configuration text.
//!
//! Every failure is terminal for the call in progress: the first error
//! encountered is returned and nothing decoded up to that point is kept.
//!
//! ## Error Categories
//!
//! - **Stream errors**: the byte source failed or was not valid UTF-8
//! - **Lex errors**: text on a line that resolves to no token
//! - **Structural errors**: tokens in an order the format does not allow
//! - **Value errors**: an integer slot that does not parse, an unsupported value
//! - **Schema errors**: a binding table that cannot be built
//!
//! ## Examples
//!
//! ```rust
//! use lvmconf::{from_str, Error};
//!
//! let result = from_str("config {\n\tsize = twelve\n}\n");
//! assert!(matches!(result, Err(Error::InvalidInteger { .. })));
//! ```

use crate::token::TokenKind;
use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by this crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error while reading the byte stream or writing output
    #[error("IO error: {0}")]
    Io(String),

    /// Text the lexer could not turn into a token
    #[error("Lex error at line {line}, offset {offset}: {msg}")]
    Lex {
        line: usize,
        offset: usize,
        msg: String,
    },

    /// Token sequence violates the expected adjacency
    #[error("Structural error at line {line}: expected {expected}, found {found}")]
    Structure {
        line: usize,
        expected: String,
        found: String,
    },

    /// Non-numeric content in an integer slot
    #[error("Invalid integer {value:?} for key {key:?} at line {line}")]
    InvalidInteger {
        key: String,
        value: String,
        line: usize,
    },

    /// A value the codec has no representation for
    #[error("Unsupported value for key {key:?}: {msg}")]
    UnsupportedValue { key: String, msg: String },

    /// Decoded token kind does not match the bound field kind
    #[error("Type mismatch for {section}/{key}: expected {expected}, found {found}")]
    TypeMismatch {
        section: String,
        key: String,
        expected: String,
        found: String,
    },

    /// Schema member whose type is neither a signed 64-bit integer nor a string
    #[error("Unsupported field kind for {section}/{key}: {type_name}")]
    UnsupportedKind {
        section: String,
        key: String,
        type_name: String,
    },

    /// Two schema members bound to the same section and key
    #[error("Duplicate binding for {section}/{key}")]
    DuplicateField { section: String, key: String },

    /// Section or key name that cannot be written in the text format
    #[error("Invalid name {name:?}: {msg}")]
    InvalidName { name: String, msg: String },

    /// Unstructured key not of the form `section/field`
    #[error("Invalid key {key:?}: expected \"section/field\"")]
    InvalidKey { key: String },

    /// Token kind the renderer has no output rule for
    #[error("Cannot format token of kind {kind}")]
    Format { kind: TokenKind },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a lex error at the given position.
    pub fn lex(line: usize, offset: usize, msg: &str) -> Self {
        Error::Lex {
            line,
            offset,
            msg: msg.to_string(),
        }
    }

    /// Creates a structural error naming what was expected and what was seen.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lvmconf::Error;
    ///
    /// let err = Error::structure(3, "identifier before assignment", "section");
    /// assert!(err.to_string().contains("expected identifier before assignment"));
    /// ```
    pub fn structure(line: usize, expected: &str, found: impl fmt::Display) -> Self {
        Error::Structure {
            line,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn invalid_integer(key: &str, value: &str, line: usize) -> Self {
        Error::InvalidInteger {
            key: key.to_string(),
            value: value.to_string(),
            line,
        }
    }

    pub fn unsupported_value(key: &str, msg: impl fmt::Display) -> Self {
        Error::UnsupportedValue {
            key: key.to_string(),
            msg: msg.to_string(),
        }
    }

    pub fn type_mismatch(section: &str, key: &str, expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            section: section.to_string(),
            key: key.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn unsupported_kind(section: &str, key: &str, type_name: &str) -> Self {
        Error::UnsupportedKind {
            section: section.to_string(),
            key: key.to_string(),
            type_name: type_name.to_string(),
        }
    }

    pub fn duplicate_field(section: &str, key: &str) -> Self {
        Error::DuplicateField {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    pub fn invalid_name(name: &str, msg: &str) -> Self {
        Error::InvalidName {
            name: name.to_string(),
            msg: msg.to_string(),
        }
    }

    pub fn invalid_key(key: &str) -> Self {
        Error::InvalidKey {
            key: key.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for stream read/write failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
