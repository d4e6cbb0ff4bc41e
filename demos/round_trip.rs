//! Lexing, the statement tree and byte-exact rendering.
//!
//! Run with: cargo run --example round_trip

use lvmconf::{lex_str, render, Ast, Statement, TokenKind};
use std::error::Error;

const INPUT: &str = "\
# lvm.conf excerpt
activation {
\t# udev handles device nodes
\tudev_sync = 1
\tvolume_list = [ \"vg0\", \"@tag\" ] # restrict activation
}
";

fn main() -> Result<(), Box<dyn Error>> {
    let tokens = lex_str(INPUT)?;
    for token in &tokens {
        if matches!(token.kind, TokenKind::EndOfStatement | TokenKind::EndOfFile) {
            continue;
        }
        println!("{:>3}  {:<16} {:?}", token.line(), token.kind.as_str(), token.value);
    }

    let mut ast = Ast::from_tokens(&tokens)?;
    assert_eq!(render(&ast.tokens())?, INPUT);
    println!("\n✓ Render reproduces the input byte for byte");

    let mut section = Statement::section("backup");
    section.push_line(Statement::comment("added by the demo"))?;
    section.push_line(Statement::assignment_i64("retain_days", 30))?;
    ast.push_line(section);

    println!("\n{}", render(&ast.tokens())?);
    Ok(())
}
