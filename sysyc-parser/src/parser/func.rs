use super::decl::{parse_base_type, parse_const_decl, parse_def_tail, parse_var_decl_rest};
use super::expr::parse_expr;
use super::stmt::parse_block;
use super::Parser;
use crate::ast::{FuncDef, FuncParam, Item};
use crate::error::ParseResult;
use crate::token::Token;

/// Top-level item: a `const`/`var` decl or a function definition. Both start
/// with a base type, so a function def is told apart from a variable decl by
/// looking past the name for `(`.
pub(super) fn parse_item(p: &mut Parser) -> ParseResult<Item> {
    if p.check(&Token::Const) {
        return Ok(Item::Decl(parse_const_decl(p)?));
    }
    let base_ty = parse_base_type(p)?;
    let (name, name_span) = p.expect_ident("identifier")?;
    if p.check(&Token::LParen) {
        Ok(Item::FuncDef(parse_func_def_rest(p, base_ty, name, name_span)?))
    } else {
        let def = parse_def_tail(p, name, name_span)?;
        Ok(Item::Decl(parse_var_decl_rest(p, base_ty, def)?))
    }
}

fn parse_func_def_rest(
    p: &mut Parser,
    ret_ty: crate::ast::BaseType,
    name: String,
    start: crate::span::Span,
) -> ParseResult<FuncDef> {
    p.expect(Token::LParen, "'('")?;
    let mut params = Vec::new();
    if !p.check(&Token::RParen) {
        params.push(parse_param(p)?);
        while p.eat(&Token::Comma) {
            params.push(parse_param(p)?);
        }
    }
    p.expect(Token::RParen, "')'")?;
    let body = parse_block(p)?;
    let span = start.merge(&body.span);
    Ok(FuncDef {
        ret_ty,
        name,
        params,
        body,
        span,
    })
}

fn parse_param(p: &mut Parser) -> ParseResult<FuncParam> {
    parse_base_type(p)?; // every SysY param is `int`; the base type carries no extra info here
    let (name, mut span) = p.expect_ident("identifier")?;
    let mut is_array = false;
    let mut shape = Vec::new();
    if p.eat(&Token::LBracket) {
        is_array = true;
        let end = p.expect(Token::RBracket, "']'")?;
        span = span.merge(&end);
        while p.eat(&Token::LBracket) {
            shape.push(parse_expr(p)?);
            let end = p.expect(Token::RBracket, "']'")?;
            span = span.merge(&end);
        }
    }
    Ok(FuncParam {
        name,
        is_array,
        shape,
        span,
    })
}
