//! Lexer wrapping the logos-generated `Token` with span tracking.

use logos::Logos;

use crate::error::ParseError;
use crate::span::{SourceMap, Span};
use crate::token::Token;

#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Tokenize the full source up front into a `Vec`, since SysY programs are
/// small and the parser wants unlimited lookahead-free backtracking-free
/// recursive descent driven by a simple cursor over this vector.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let source_map = SourceMap::new(source);
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let span = source_map.span(lexer.span().start, lexer.span().end);
        match result {
            Ok(token) => tokens.push(SpannedToken { token, span }),
            Err(()) => return Err(ParseError::LexerError { offset: span.start }),
        }
    }
    Ok(tokens)
}
