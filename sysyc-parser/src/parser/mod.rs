//! Recursive-descent parser: `Vec<SpannedToken>` -> `ast::CompUnit`.

mod decl;
mod expr;
mod func;
mod stmt;

use crate::ast::CompUnit;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{tokenize, SpannedToken};
use crate::span::Span;
use crate::token::Token;

pub(crate) struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|t| t.span)
            .or_else(|| self.tokens.last().map(|t| t.span))
            .unwrap_or_else(Span::empty)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> ParseResult<Span> {
        let span = self.peek_span();
        if self.eat(&token) {
            Ok(span)
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let span = self.peek_span();
        match self.peek() {
            Some(tok) => ParseError::unexpected_token(tok.to_string(), expected, span),
            None => ParseError::unexpected_eof(expected),
        }
    }

    fn expect_ident(&mut self, what: &str) -> ParseResult<(String, Span)> {
        let span = self.peek_span();
        match self.peek() {
            Some(Token::Ident(_)) => {
                let Some(SpannedToken {
                    token: Token::Ident(name),
                    ..
                }) = self.advance()
                else {
                    unreachable!()
                };
                Ok((name, span))
            }
            _ => Err(self.unexpected(what)),
        }
    }
}

/// Parse a full SysY translation unit.
pub fn parse(source: &str) -> ParseResult<CompUnit> {
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(tokens);
    let mut items = Vec::new();
    while !parser.at_eof() {
        items.push(func::parse_item(&mut parser)?);
    }
    Ok(CompUnit { items })
}
