//! # Lexer for coprocessor scripts

use logos::Logos;

/// Tokens for one script line
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")] // Skip whitespace
#[logos(skip r"#[^\n]*")] // Skip comments
pub enum Token {
    /// Command names, mnemonics, directions
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    /// Decimal integer
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse().ok())]
    Number(i64),

    /// Hexadecimal integer
    #[regex(r"0x[0-9a-fA-F]+", |lex| u64::from_str_radix(&lex.slice()[2..], 16).ok())]
    Hex(u64),

    /// Floating-point literal (must contain a decimal point). Kept as text so
    /// it is rounded once, at the width it is written with.
    #[regex(r"-?[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    Float(String),
}

/// Tokenize a single line. Yields `(token, column)` with 1-based columns;
/// an unrecognized character is returned as `Err(column)`.
pub fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, usize> {
    let mut lex = Token::lexer(text);
    let mut tokens = Vec::new();
    while let Some(token) = lex.next() {
        let column = lex.span().start + 1;
        match token {
            Ok(token) => tokens.push((token, column)),
            Err(()) => return Err(column),
        }
    }
    Ok(tokens)
}
