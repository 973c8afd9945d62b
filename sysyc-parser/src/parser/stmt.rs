use super::decl::parse_local_decl;
use super::expr::{parse_expr, try_parse_lval};
use super::Parser;
use crate::ast::{Block, BlockItem, Stmt};
use crate::error::ParseResult;
use crate::token::Token;

pub(super) fn parse_block(p: &mut Parser) -> ParseResult<Block> {
    let start = p.expect(Token::LBrace, "'{'")?;
    let mut items = Vec::new();
    while !p.check(&Token::RBrace) {
        items.push(parse_block_item(p)?);
    }
    let end = p.expect(Token::RBrace, "'}'")?;
    Ok(Block {
        items,
        span: start.merge(&end),
    })
}

fn parse_block_item(p: &mut Parser) -> ParseResult<BlockItem> {
    if p.check(&Token::Const) || p.check(&Token::Int) {
        Ok(BlockItem::Decl(parse_local_decl(p)?))
    } else {
        Ok(BlockItem::Stmt(parse_stmt(p)?))
    }
}

fn parse_stmt(p: &mut Parser) -> ParseResult<Stmt> {
    match p.peek() {
        Some(Token::LBrace) => Ok(Stmt::Block(parse_block(p)?)),
        Some(Token::Semi) => {
            p.advance();
            Ok(Stmt::Null)
        }
        Some(Token::If) => parse_if(p),
        Some(Token::While) => parse_while(p),
        Some(Token::Break) => {
            let span = p.peek_span();
            p.advance();
            p.expect(Token::Semi, "';'")?;
            Ok(Stmt::Break(span))
        }
        Some(Token::Continue) => {
            let span = p.peek_span();
            p.advance();
            p.expect(Token::Semi, "';'")?;
            Ok(Stmt::Continue(span))
        }
        Some(Token::Return) => {
            let start = p.peek_span();
            p.advance();
            let value = if p.check(&Token::Semi) {
                None
            } else {
                Some(parse_expr(p)?)
            };
            let end = p.expect(Token::Semi, "';'")?;
            Ok(Stmt::Return {
                value,
                span: start.merge(&end),
            })
        }
        _ => {
            if let Some(target) = try_parse_lval(p) {
                let eq_span = p.peek_span();
                p.advance(); // '='
                let value = parse_expr(p)?;
                let end = p.expect(Token::Semi, "';'")?;
                let span = target.span.merge(&eq_span).merge(&end);
                return Ok(Stmt::Assign {
                    target,
                    value,
                    span,
                });
            }
            let expr = parse_expr(p)?;
            p.expect(Token::Semi, "';'")?;
            Ok(Stmt::ExprStmt(expr))
        }
    }
}

fn parse_if(p: &mut Parser) -> ParseResult<Stmt> {
    let start = p.expect(Token::If, "'if'")?;
    p.expect(Token::LParen, "'('")?;
    let cond = parse_expr(p)?;
    p.expect(Token::RParen, "')'")?;
    let then_branch = Box::new(parse_stmt(p)?);
    let (else_branch, end) = if p.eat(&Token::Else) {
        let else_stmt = parse_stmt(p)?;
        let span = stmt_span(&else_stmt);
        (Some(Box::new(else_stmt)), span)
    } else {
        (None, stmt_span(&then_branch))
    };
    Ok(Stmt::If {
        cond,
        then_branch,
        else_branch,
        span: start.merge(&end),
    })
}

fn parse_while(p: &mut Parser) -> ParseResult<Stmt> {
    let start = p.expect(Token::While, "'while'")?;
    p.expect(Token::LParen, "'('")?;
    let cond = parse_expr(p)?;
    p.expect(Token::RParen, "')'")?;
    let body = parse_stmt(p)?;
    let span = start.merge(&stmt_span(&body));
    Ok(Stmt::While {
        cond,
        body: Box::new(body),
        span,
    })
}

fn stmt_span(stmt: &Stmt) -> crate::span::Span {
    match stmt {
        Stmt::Assign { span, .. }
        | Stmt::If { span, .. }
        | Stmt::While { span, .. }
        | Stmt::Return { span, .. } => *span,
        Stmt::Break(span) | Stmt::Continue(span) => *span,
        Stmt::Block(block) => block.span,
        Stmt::ExprStmt(e) => e.span(),
        Stmt::Null => crate::span::Span::empty(),
    }
}
