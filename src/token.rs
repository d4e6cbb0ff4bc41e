//! Token model shared by the lexer, the AST and both codecs.
//!
//! A [`Token`] is the smallest lexical unit: a [`TokenKind`], the raw text it
//! was built from, where it started, and an optional embedded [`Error`] for
//! the terminal `Error` token.

use crate::Error;
use std::fmt;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `#`
    Comment,
    /// Trimmed text following a `#`
    CommentValue,
    /// `\n` (empty when the stream ended without one)
    EndOfStatement,
    /// Section name preceding `{`
    Section,
    /// `{`
    StartOfSection,
    /// `}`
    EndOfSection,
    /// Content between the quotes of a quoted value
    String,
    /// Key preceding `=`
    Identifier,
    /// `=`
    Assignment,
    /// Unquoted value; validated only at decode time
    Int64,
    StartOfFile,
    EndOfFile,
    Error,
    /// Internal classification for text still being buffered; never emitted.
    Unclassified,
}

/// Structural characters and the kind each one resolves to.
const RUNE_KINDS: [(char, TokenKind); 5] = [
    ('{', TokenKind::StartOfSection),
    ('}', TokenKind::EndOfSection),
    ('=', TokenKind::Assignment),
    ('\n', TokenKind::EndOfStatement),
    ('#', TokenKind::Comment),
];

impl TokenKind {
    /// Classifies a single character.
    ///
    /// Anything that is not a structural character is `Unclassified` and gets
    /// buffered by the lexer until a structural character resolves it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lvmconf::TokenKind;
    ///
    /// assert_eq!(TokenKind::classify('{'), TokenKind::StartOfSection);
    /// assert_eq!(TokenKind::classify('a'), TokenKind::Unclassified);
    /// ```
    #[must_use]
    pub fn classify(ch: char) -> TokenKind {
        RUNE_KINDS
            .iter()
            .find(|(rune, _)| *rune == ch)
            .map_or(TokenKind::Unclassified, |(_, kind)| *kind)
    }

    /// Returns `true` for the kinds that can follow an assignment marker.
    #[inline]
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self, TokenKind::String | TokenKind::Int64)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Comment => "comment",
            TokenKind::CommentValue => "comment value",
            TokenKind::EndOfStatement => "end of statement",
            TokenKind::Section => "section",
            TokenKind::StartOfSection => "start of section",
            TokenKind::EndOfSection => "end of section",
            TokenKind::String => "string",
            TokenKind::Identifier => "identifier",
            TokenKind::Assignment => "assignment",
            TokenKind::Int64 => "int64",
            TokenKind::StartOfFile => "start of file",
            TokenKind::EndOfFile => "end of file",
            TokenKind::Error => "error",
            TokenKind::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a token started: 1-based line and 0-based byte offset in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub offset: usize,
}

/// A token with its kind, raw text and position.
///
/// A `String` token is written back between quotes unless it is marked
/// `unquoted`, which the lexer does for bracketed lists.
///
/// Sentinel tokens (`EndOfFile`, `Error`) and tokens built by the encoder
/// carry no position until [`Ast::tokens`](crate::Ast::tokens) renumbers them.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub position: Option<Position>,
    pub error: Option<Error>,
    pub unquoted: bool,
}

impl Token {
    /// Create a token with no position.
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Token {
            kind,
            value: value.into(),
            position: None,
            error: None,
            unquoted: false,
        }
    }

    /// Create a token positioned in the source stream.
    pub fn at(kind: TokenKind, value: impl Into<String>, line: usize, offset: usize) -> Self {
        Token {
            kind,
            value: value.into(),
            position: Some(Position { line, offset }),
            error: None,
            unquoted: false,
        }
    }

    /// Marks the token as written without quotes.
    #[must_use]
    pub fn unquoted(mut self) -> Self {
        self.unquoted = true;
        self
    }

    /// The end-of-file sentinel.
    pub fn eof() -> Self {
        Token::new(TokenKind::EndOfFile, "")
    }

    /// A terminal token wrapping a failure.
    pub fn error(err: Error) -> Self {
        Token {
            kind: TokenKind::Error,
            value: err.to_string(),
            position: None,
            error: Some(err),
            unquoted: false,
        }
    }

    /// Line the token starts on, `0` when it has no position.
    #[inline]
    #[must_use]
    pub fn line(&self) -> usize {
        self.position.map_or(0, |p| p.line)
    }

    #[inline]
    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Turns an `Error` token back into its error, any other kind into `None`.
    pub fn take_error(&self) -> Option<Error> {
        if self.kind != TokenKind::Error {
            return None;
        }
        Some(
            self.error
                .clone()
                .unwrap_or_else(|| Error::lex(self.line(), 0, &self.value)),
        )
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.value == other.value
            && self.position == other.position
            && self.unquoted == other.unquoted
            && self.error.as_ref().map(ToString::to_string)
                == other.error.as_ref().map(ToString::to_string)
    }
}
