//! Statement tree over the flat token sequence.
//!
//! [`Ast::parse`] groups tokens into [`Statement`]s in one linear scan and
//! [`Ast::tokens`] flattens the tree back. Every statement keeps the tokens
//! it was built from, so rendering the flattened sequence reproduces the
//! original text.
//!
//! Sections are exactly one level deep: a section never contains another.
//!
//! ## Examples
//!
//! ```rust
//! use lvmconf::{lex_str, render, Ast};
//!
//! let input = "# volume defaults\nallocation {\n\tcling_tag_list = [\"@site1\"]\n}\n";
//! let tokens = lex_str(input).unwrap();
//! let ast = Ast::from_tokens(&tokens).unwrap();
//! assert_eq!(ast.section("allocation").map(|s| s.children().len()), Some(3));
//! assert_eq!(render(&ast.tokens()).unwrap(), input);
//! ```

use crate::token::{Position, Token, TokenKind};
use crate::{Error, Result};

/// One node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A bare end of statement: a blank line, or the end of the line that
    /// held the previous statement.
    Newline(Token),
    Comment {
        indicator: Token,
        value: Token,
    },
    Assignment {
        key: Token,
        assign: Token,
        value: Token,
    },
    Section {
        name: Token,
        start: Token,
        children: Vec<Statement>,
        end: Token,
    },
}

impl Statement {
    pub fn newline() -> Self {
        Statement::Newline(Token::new(TokenKind::EndOfStatement, "\n"))
    }

    /// An empty section; its only child is the newline after `{`.
    pub fn section(name: &str) -> Self {
        Statement::Section {
            name: Token::new(TokenKind::Section, name),
            start: Token::new(TokenKind::StartOfSection, "{"),
            children: vec![Statement::newline()],
            end: Token::new(TokenKind::EndOfSection, "}"),
        }
    }

    pub fn assignment_i64(key: &str, value: i64) -> Self {
        Self::assignment(key, Token::new(TokenKind::Int64, value.to_string()))
    }

    pub fn assignment_str(key: &str, value: &str) -> Self {
        Self::assignment(key, Token::new(TokenKind::String, value))
    }

    /// An assignment whose bracketed `list` text is written without quotes.
    pub fn assignment_list(key: &str, list: &str) -> Self {
        Self::assignment(key, Token::new(TokenKind::String, list).unquoted())
    }

    fn assignment(key: &str, value: Token) -> Self {
        Statement::Assignment {
            key: Token::new(TokenKind::Identifier, key),
            assign: Token::new(TokenKind::Assignment, "="),
            value,
        }
    }

    pub fn comment(text: &str) -> Self {
        Statement::Comment {
            indicator: Token::new(TokenKind::Comment, "#"),
            value: Token::new(TokenKind::CommentValue, text.trim()),
        }
    }

    /// One comment line per line of `text`, each followed by a newline.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lvmconf::Statement;
    ///
    /// let block = Statement::comment_block("generated\ndo not edit");
    /// assert_eq!(block.len(), 4);
    /// ```
    pub fn comment_block(text: &str) -> Vec<Statement> {
        text.lines()
            .flat_map(|line| [Statement::comment(line), Statement::newline()])
            .collect()
    }

    /// Appends a child to a section.
    ///
    /// Fails when `self` is not a section or `child` is one.
    pub fn push(&mut self, child: Statement) -> Result<()> {
        if let Statement::Section { name, .. } = &child {
            return Err(Error::structure(
                name.line(),
                "statement inside section",
                TokenKind::Section,
            ));
        }
        match self {
            Statement::Section { children, .. } => {
                children.push(child);
                Ok(())
            }
            other => Err(Error::structure(0, "section", other.kind())),
        }
    }

    /// Appends a child followed by a newline.
    pub fn push_line(&mut self, child: Statement) -> Result<()> {
        self.push(child)?;
        self.push(Statement::newline())
    }

    /// The section name or assignment key.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Statement::Section { name, .. } => Some(&name.value),
            Statement::Assignment { key, .. } => Some(&key.value),
            _ => None,
        }
    }

    #[must_use]
    pub fn children(&self) -> &[Statement] {
        match self {
            Statement::Section { children, .. } => children,
            _ => &[],
        }
    }

    /// Kind of the statement's leading token.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        match self {
            Statement::Newline(_) => TokenKind::EndOfStatement,
            Statement::Comment { .. } => TokenKind::Comment,
            Statement::Assignment { .. } => TokenKind::Assignment,
            Statement::Section { .. } => TokenKind::Section,
        }
    }

    fn flatten_into(&self, out: &mut Vec<Token>) {
        match self {
            Statement::Newline(token) => out.push(token.clone()),
            Statement::Comment { indicator, value } => {
                out.push(indicator.clone());
                out.push(value.clone());
            }
            Statement::Assignment { key, assign, value } => {
                out.push(key.clone());
                out.push(assign.clone());
                out.push(value.clone());
            }
            Statement::Section {
                name,
                start,
                children,
                end,
            } => {
                out.push(name.clone());
                out.push(start.clone());
                for child in children {
                    child.flatten_into(out);
                }
                out.push(end.clone());
            }
        }
    }
}

/// Section still waiting for its `}` during a parse.
struct OpenSection {
    name: Token,
    start: Token,
    children: Vec<Statement>,
}

/// An ordered list of top-level statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ast {
    statements: Vec<Statement>,
}

impl Ast {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: &[Token]) -> Result<Self> {
        let mut ast = Ast::new();
        ast.parse(tokens)?;
        Ok(ast)
    }

    /// Discards the current tree and rebuilds it from `tokens`.
    ///
    /// On error the tree is left empty.
    pub fn parse(&mut self, tokens: &[Token]) -> Result<()> {
        self.statements.clear();
        let result = self.parse_statements(tokens);
        if result.is_err() {
            self.statements.clear();
        }
        result
    }

    fn parse_statements(&mut self, tokens: &[Token]) -> Result<()> {
        let mut open: Option<OpenSection> = None;
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            match token.kind {
                TokenKind::StartOfFile => {}
                TokenKind::EndOfFile => break,
                TokenKind::Error => {
                    return Err(token
                        .take_error()
                        .unwrap_or_else(|| Error::custom(&token.value)));
                }
                TokenKind::Section => {
                    if let Some(section) = &open {
                        return Err(Error::structure(
                            token.line(),
                            &format!("end of section {:?}", section.name.value),
                            TokenKind::Section,
                        ));
                    }
                    let start = expect(tokens, i + 1, TokenKind::StartOfSection, token)?;
                    open = Some(OpenSection {
                        name: token.clone(),
                        start: start.clone(),
                        children: Vec::new(),
                    });
                    i += 1;
                }
                TokenKind::EndOfSection => {
                    let section = open.take().ok_or_else(|| {
                        Error::structure(token.line(), "open section", TokenKind::EndOfSection)
                    })?;
                    self.statements.push(Statement::Section {
                        name: section.name,
                        start: section.start,
                        children: section.children,
                        end: token.clone(),
                    });
                }
                TokenKind::Comment => {
                    let value = expect(tokens, i + 1, TokenKind::CommentValue, token)?;
                    self.attach(
                        &mut open,
                        Statement::Comment {
                            indicator: token.clone(),
                            value: value.clone(),
                        },
                    );
                    i += 1;
                }
                TokenKind::Identifier => {
                    let assign = expect(tokens, i + 1, TokenKind::Assignment, token)?;
                    let value = match tokens.get(i + 2) {
                        Some(value) if value.kind.is_value() => value,
                        other => {
                            return Err(Error::structure(
                                assign.line(),
                                "value after assignment",
                                found(other),
                            ))
                        }
                    };
                    self.attach(
                        &mut open,
                        Statement::Assignment {
                            key: token.clone(),
                            assign: assign.clone(),
                            value: value.clone(),
                        },
                    );
                    i += 2;
                }
                TokenKind::EndOfStatement => {
                    self.attach(&mut open, Statement::Newline(token.clone()));
                }
                TokenKind::Assignment => {
                    return Err(Error::structure(
                        token.line(),
                        "identifier before assignment",
                        found(i.checked_sub(1).and_then(|p| tokens.get(p))),
                    ));
                }
                kind => {
                    return Err(Error::structure(token.line(), "statement", kind));
                }
            }
            i += 1;
        }

        match open {
            Some(section) => Err(Error::structure(
                section.name.line(),
                &format!("end of section {:?}", section.name.value),
                TokenKind::EndOfFile,
            )),
            None => Ok(()),
        }
    }

    fn attach(&mut self, open: &mut Option<OpenSection>, statement: Statement) {
        match open {
            Some(section) => section.children.push(statement),
            None => self.statements.push(statement),
        }
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Appends a statement followed by a newline.
    pub fn push_line(&mut self, statement: Statement) {
        self.statements.push(statement);
        self.statements.push(Statement::newline());
    }

    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn sections(&self) -> impl Iterator<Item = &Statement> {
        self.statements
            .iter()
            .filter(|s| matches!(s, Statement::Section { .. }))
    }

    /// First section called `name`.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Statement> {
        self.sections().find(|s| s.name() == Some(name))
    }

    /// Flattens the tree depth-first.
    ///
    /// Lines are renumbered from 1, advancing once per end of statement, so
    /// hand-built trees get the same numbering as lexed ones. A non-empty
    /// sequence ends with `EndOfFile`.
    pub fn tokens(&self) -> Vec<Token> {
        let mut tokens = Vec::new();
        for statement in &self.statements {
            statement.flatten_into(&mut tokens);
        }

        let mut line = 1;
        for token in &mut tokens {
            let offset = token.position.map_or(0, |p| p.offset);
            token.position = Some(Position { line, offset });
            if token.is(TokenKind::EndOfStatement) {
                line += 1;
            }
        }

        if !tokens.is_empty() {
            tokens.push(Token::eof());
        }
        tokens
    }
}

fn expect<'t>(tokens: &'t [Token], i: usize, kind: TokenKind, after: &Token) -> Result<&'t Token> {
    match tokens.get(i) {
        Some(token) if token.kind == kind => Ok(token),
        other => Err(Error::structure(
            after.line(),
            &format!("{} after {}", kind, after.kind),
            found(other),
        )),
    }
}

fn found(token: Option<&Token>) -> String {
    token.map_or_else(|| "end of input".to_string(), |t| t.kind.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex_str;
    use crate::ser::render;

    #[test]
    fn test_parse_groups_sections() {
        let tokens = lex_str("# top\nconfig {\n\ta = 1\n\tb = \"x\"\n}\n\n").unwrap();
        let ast = Ast::from_tokens(&tokens).unwrap();
        let kinds: Vec<_> = ast.statements().iter().map(Statement::kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Comment,
                TokenKind::EndOfStatement,
                TokenKind::Section,
                TokenKind::EndOfStatement,
                TokenKind::EndOfStatement,
            ]
        );

        let config = ast.section("config").unwrap();
        let names: Vec<_> = config.children().iter().filter_map(Statement::name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(config
            .children()
            .iter()
            .all(|c| !matches!(c, Statement::Section { .. })));
    }

    #[test]
    fn test_round_trip_through_tree() {
        let input = "# header\nglobal {\n\tumask = 63 # octal 077\n\n\tetc = \"/etc\"\n}\n";
        let tokens = lex_str(input).unwrap();
        let ast = Ast::from_tokens(&tokens).unwrap();
        assert_eq!(render(&ast.tokens()).unwrap(), input);
    }

    #[test]
    fn test_tokens_renumber_lines() {
        let mut ast = Ast::new();
        let mut section = Statement::section("devices");
        section.push_line(Statement::assignment_str("dir", "/dev")).unwrap();
        section.push_line(Statement::assignment_i64("scan_lvs", 0)).unwrap();
        ast.push_line(section);

        let tokens = ast.tokens();
        let lines: Vec<_> = tokens
            .iter()
            .filter(|t| t.is(TokenKind::Identifier))
            .map(Token::line)
            .collect();
        assert_eq!(lines, vec![2, 3]);
        assert!(tokens.last().unwrap().is(TokenKind::EndOfFile));
        assert_eq!(
            render(&tokens).unwrap(),
            "devices {\n\tdir = \"/dev\"\n\tscan_lvs = 0\n}\n"
        );
    }

    #[test]
    fn test_lexed_and_renumbered_lines_agree() {
        let tokens = lex_str("a {\n\tk = 1\n}\n# c\n").unwrap();
        let ast = Ast::from_tokens(&tokens).unwrap();
        let lexed: Vec<_> = tokens
            .iter()
            .filter(|t| !matches!(t.kind, TokenKind::StartOfFile | TokenKind::EndOfFile))
            .map(Token::line)
            .collect();
        let renumbered: Vec<_> = ast
            .tokens()
            .iter()
            .filter(|t| !t.is(TokenKind::EndOfFile))
            .map(Token::line)
            .collect();
        assert_eq!(lexed, renumbered);
    }

    #[test]
    fn test_empty_tree_has_no_tokens() {
        assert!(Ast::new().tokens().is_empty());
    }

    #[test]
    fn test_parse_discards_previous_tree() {
        let mut ast = Ast::from_tokens(&lex_str("a = 1\n").unwrap()).unwrap();
        ast.parse(&lex_str("b = 2\n").unwrap()).unwrap();
        let names: Vec<_> = ast.statements().iter().filter_map(Statement::name).collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn test_assignment_without_identifier() {
        let tokens = vec![
            Token::new(TokenKind::Section, "s"),
            Token::new(TokenKind::StartOfSection, "{"),
            Token::new(TokenKind::Assignment, "="),
            Token::new(TokenKind::Int64, "1"),
        ];
        let err = Ast::from_tokens(&tokens).unwrap_err();
        assert!(err
            .to_string()
            .contains("expected identifier before assignment"));
    }

    #[test]
    fn test_nested_section_is_rejected() {
        let tokens = vec![
            Token::new(TokenKind::Section, "outer"),
            Token::new(TokenKind::StartOfSection, "{"),
            Token::new(TokenKind::Section, "inner"),
            Token::new(TokenKind::StartOfSection, "{"),
        ];
        assert!(matches!(
            Ast::from_tokens(&tokens),
            Err(Error::Structure { .. })
        ));

        let mut section = Statement::section("outer");
        assert!(section.push(Statement::section("inner")).is_err());
    }

    #[test]
    fn test_unclosed_section() {
        let err = Ast::from_tokens(&lex_str("a {\n\tk = 1\n").unwrap()).unwrap_err();
        assert!(err.to_string().contains("found end of file"));
    }

    #[test]
    fn test_comment_block_builder() {
        let mut ast = Ast::new();
        for statement in Statement::comment_block("first\n  second  ") {
            ast.push(statement);
        }
        assert_eq!(render(&ast.tokens()).unwrap(), "# first\n# second\n");
    }
}
