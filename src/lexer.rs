//! Line-oriented lexer.
//!
//! The [`Lexer`] reads a byte stream one line at a time and classifies each
//! character with [`TokenKind::classify`]. Ordinary characters accumulate in a
//! lookbehind region of the current line until a structural character decides
//! what they were:
//!
//! - text before `{` is a section name
//! - text before `=` is an assignment key, and the rest of the line is the value
//! - `#` turns the rest of the line into a comment
//! - `}` and `\n` must not be preceded by any text
//!
//! The lexer knows nothing about sections beyond their delimiters; grouping is
//! left to [`Ast`](crate::Ast) and the decoders.
//!
//! ## Examples
//!
//! ```rust
//! use lvmconf::{lex_str, TokenKind};
//!
//! let tokens = lex_str("config {\n\tsome_field = 1\n}\n").unwrap();
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         TokenKind::StartOfFile,
//!         TokenKind::Section,
//!         TokenKind::StartOfSection,
//!         TokenKind::EndOfStatement,
//!         TokenKind::Identifier,
//!         TokenKind::Assignment,
//!         TokenKind::Int64,
//!         TokenKind::EndOfStatement,
//!         TokenKind::EndOfSection,
//!         TokenKind::EndOfStatement,
//!         TokenKind::EndOfFile,
//!     ]
//! );
//! ```

use crate::token::{Token, TokenKind};
use crate::{Error, Result};
use std::io::{BufRead, BufReader, Read};
use tracing::{debug, trace};

/// Converts a byte stream into tokens.
///
/// A lexer is single-use: once it has produced an `EndOfFile` or `Error`
/// token every further call to [`Lexer::next_batch`] yields only `EndOfFile`.
pub struct Lexer<R> {
    reader: R,
    line: usize,
    offset: usize,
    started: bool,
    finished: bool,
}

impl<R: BufRead> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Lexer {
            reader,
            line: 1,
            offset: 0,
            started: false,
            finished: false,
        }
    }

    /// Returns the tokens of the next line.
    ///
    /// A line is the smallest group that can be resolved on its own: an
    /// assignment yields its identifier, marker, value, an optional trailing
    /// comment pair and the end of statement together. The first batch starts
    /// with `StartOfFile`; the batch in which the stream ends carries
    /// `EndOfFile`, and a failure ends the batch with an `Error` token.
    pub fn next_batch(&mut self) -> Vec<Token> {
        let mut batch = Vec::new();
        if self.finished {
            batch.push(Token::eof());
            return batch;
        }
        if !self.started {
            self.started = true;
            batch.push(Token::at(TokenKind::StartOfFile, "", self.line, self.offset));
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => {
                self.finished = true;
                batch.push(Token::eof());
            }
            Ok(read) => {
                let end_of_stream = !line.ends_with('\n');
                if let Err(err) = self.scan_line(&line, &mut batch) {
                    self.finished = true;
                    batch.push(Token::error(err));
                } else if end_of_stream {
                    self.finished = true;
                    batch.push(Token::eof());
                }
                self.offset += read;
            }
            Err(err) => {
                self.finished = true;
                batch.push(Token::error(Error::io(&format!(
                    "line {}: {}",
                    self.line, err
                ))));
            }
        }

        trace!(line = self.line, tokens = batch.len(), "lexed batch");
        batch
    }

    /// Lexes the whole stream.
    ///
    /// The returned sequence always ends with either `EndOfFile` or the
    /// terminal `Error` token; the lexer never resynchronizes after an error.
    pub fn lex(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let batch = self.next_batch();
            let done = batch
                .iter()
                .any(|t| matches!(t.kind, TokenKind::EndOfFile | TokenKind::Error));
            tokens.extend(batch);
            if done {
                break;
            }
        }
        debug!(tokens = tokens.len(), lines = self.line - 1, "lexed stream");
        tokens
    }

    fn scan_line(&mut self, line: &str, batch: &mut Vec<Token>) -> Result<()> {
        let content_end = line.strip_suffix('\n').map_or(line.len(), str::len);
        let mut start = 0;

        for (i, ch) in line.char_indices() {
            match TokenKind::classify(ch) {
                TokenKind::Unclassified => {}
                TokenKind::StartOfSection => {
                    let (name, at) = trimmed(line, start, i);
                    if name.is_empty() {
                        return Err(self.error_at(i, "section start without a name"));
                    }
                    batch.push(self.token(TokenKind::Section, name, at));
                    batch.push(self.token(TokenKind::StartOfSection, "{", i));
                    start = i + 1;
                }
                TokenKind::EndOfSection => {
                    self.expect_blank(line, start, i, "end of section")?;
                    batch.push(self.token(TokenKind::EndOfSection, "}", i));
                    start = i + 1;
                }
                TokenKind::Assignment => {
                    let (key, at) = trimmed(line, start, i);
                    if key.is_empty() {
                        return Err(self.error_at(i, "assignment without a key"));
                    }
                    batch.push(self.token(TokenKind::Identifier, key, at));
                    batch.push(self.token(TokenKind::Assignment, "=", i));
                    self.scan_value(line, i + 1, content_end, batch)?;
                    self.end_statement(line, content_end, batch);
                    return Ok(());
                }
                TokenKind::Comment => {
                    self.expect_blank(line, start, i, "comment")?;
                    self.push_comment(line, i, content_end, batch);
                    self.end_statement(line, content_end, batch);
                    return Ok(());
                }
                TokenKind::EndOfStatement => {
                    self.expect_blank(line, start, i, "end of statement")?;
                    self.end_statement(line, i, batch);
                    return Ok(());
                }
                kind => {
                    return Err(self.error_at(i, &format!("cannot emit a token for {}", kind)));
                }
            }
        }

        // The stream ended without a final newline.
        self.expect_blank(line, start, line.len(), "end of file")?;
        self.end_statement(line, line.len(), batch);
        Ok(())
    }

    /// Scans the value half of an assignment, `line[from..to]`.
    fn scan_value(
        &mut self,
        line: &str,
        from: usize,
        to: usize,
        batch: &mut Vec<Token>,
    ) -> Result<()> {
        let text = &line[from..to];
        let (value, comment_at) = match find_comment(text) {
            Some(j) => (&text[..j], Some(from + j)),
            None => (text, None),
        };
        let (trimmed_value, at) = trimmed(line, from, from + value.len());

        if trimmed_value.starts_with('[') {
            if !trimmed_value.ends_with(']') {
                return Err(self.error_at(at, "unterminated list"));
            }
            batch.push(self.token(TokenKind::String, trimmed_value, at).unquoted());
        } else if let Some(first) = value.find('"') {
            let last = value.rfind('"').unwrap_or(first);
            if last == first {
                return Err(self.error_at(from + first, "unterminated string"));
            }
            if !value[..first].trim().is_empty() || !value[last + 1..].trim().is_empty() {
                return Err(self.error_at(at, "unexpected text around quoted value"));
            }
            batch.push(self.token(TokenKind::String, &value[first + 1..last], from + first));
        } else {
            batch.push(self.token(TokenKind::Int64, trimmed_value, at));
        }

        if let Some(at) = comment_at {
            self.push_comment(line, at, to, batch);
        }
        Ok(())
    }

    fn push_comment(&self, line: &str, at: usize, to: usize, batch: &mut Vec<Token>) {
        batch.push(self.token(TokenKind::Comment, "#", at));
        let (text, text_at) = trimmed(line, at + 1, to);
        batch.push(self.token(TokenKind::CommentValue, text, text_at));
    }

    fn end_statement(&mut self, line: &str, at: usize, batch: &mut Vec<Token>) {
        batch.push(self.token(TokenKind::EndOfStatement, &line[at..], at));
        self.line += 1;
    }

    fn expect_blank(&self, line: &str, from: usize, to: usize, before: &str) -> Result<()> {
        let (text, at) = trimmed(line, from, to);
        if text.is_empty() {
            Ok(())
        } else {
            Err(self.error_at(
                at,
                &format!("unrecognized text {:?} before {}", text, before),
            ))
        }
    }

    fn token(&self, kind: TokenKind, value: &str, at: usize) -> Token {
        Token::at(kind, value, self.line, self.offset + at)
    }

    fn error_at(&self, at: usize, msg: &str) -> Error {
        Error::lex(self.line, self.offset + at, msg)
    }
}

impl<R: Read> Lexer<BufReader<R>> {
    /// Wraps an unbuffered reader (a file, a child process pipe).
    pub fn from_reader(reader: R) -> Self {
        Lexer::new(BufReader::new(reader))
    }
}

impl<'a> Lexer<&'a [u8]> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        Lexer::new(input.as_bytes())
    }
}

/// Returns `line[from..to]` trimmed, with the byte index where it starts.
fn trimmed(line: &str, from: usize, to: usize) -> (&str, usize) {
    let text = &line[from..to];
    let lead = text.len() - text.trim_start().len();
    (text.trim(), from + lead)
}

/// Byte index of the first `#` outside a quoted region.
fn find_comment(text: &str) -> Option<usize> {
    let mut quoted = false;
    for (i, ch) in text.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            '#' if !quoted => return Some(i),
            _ => {}
        }
    }
    None
}

/// Lexes a string, turning a terminal `Error` token into an `Err`.
///
/// # Examples
///
/// ```rust
/// use lvmconf::lex_str;
///
/// assert!(lex_str("stray text\n").is_err());
/// ```
pub fn lex_str(input: &str) -> Result<Vec<Token>> {
    finish(Lexer::from_str(input).lex())
}

/// Lexes everything readable from `reader`.
pub fn lex_reader<R: Read>(reader: R) -> Result<Vec<Token>> {
    finish(Lexer::from_reader(reader).lex())
}

fn finish(tokens: Vec<Token>) -> Result<Vec<Token>> {
    match tokens.last().and_then(Token::take_error) {
        Some(err) => Err(err),
        None => Ok(tokens),
    }
}
