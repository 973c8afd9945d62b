use super::expr::parse_expr;
use super::Parser;
use crate::ast::{BaseType, Decl, DeclKind, Def, Expr, Init};
use crate::error::ParseResult;
use crate::token::Token;

pub(super) fn parse_base_type(p: &mut Parser) -> ParseResult<BaseType> {
    if p.eat(&Token::Int) {
        Ok(BaseType::Int)
    } else if p.eat(&Token::Void) {
        Ok(BaseType::Void)
    } else {
        Err(p.unexpected("'int' or 'void'"))
    }
}

/// `const` decl: `const` BType Def (',' Def)* ';'. A `const` definition always
/// carries an initialiser (enforced during lowering, not by the grammar here).
pub(super) fn parse_const_decl(p: &mut Parser) -> ParseResult<Decl> {
    let start = p.expect(Token::Const, "'const'")?;
    let base_ty = parse_base_type(p)?;
    let mut defs = vec![parse_def(p)?];
    while p.eat(&Token::Comma) {
        defs.push(parse_def(p)?);
    }
    let end = p.expect(Token::Semi, "';'")?;
    Ok(Decl {
        kind: DeclKind::Const,
        base_ty,
        defs,
        span: start.merge(&end),
    })
}

/// Continuation of a `var` decl after `base_ty first_name` has already been
/// consumed by the caller (needed because the caller must look ahead past the
/// identifier to decide between a function definition and a variable decl).
pub(super) fn parse_var_decl_rest(
    p: &mut Parser,
    base_ty: BaseType,
    first: Def,
) -> ParseResult<Decl> {
    let mut defs = vec![first];
    while p.eat(&Token::Comma) {
        defs.push(parse_def(p)?);
    }
    let end = p.expect(Token::Semi, "';'")?;
    let span = defs[0].span.merge(&end);
    Ok(Decl {
        kind: DeclKind::Var,
        base_ty,
        defs,
        span,
    })
}

/// A local (block-scoped) decl: `const ...;` or `int ...;`.
pub(super) fn parse_local_decl(p: &mut Parser) -> ParseResult<Decl> {
    if p.check(&Token::Const) {
        return parse_const_decl(p);
    }
    let base_ty = parse_base_type(p)?;
    let def = parse_def(p)?;
    parse_var_decl_rest(p, base_ty, def)
}

fn parse_def(p: &mut Parser) -> ParseResult<Def> {
    let (name, span) = p.expect_ident("identifier")?;
    parse_def_tail(p, name, span)
}

/// Shared tail of a `Def` once `name` has already been consumed by the
/// caller — used for top-level `var` decls, where the parser must look past
/// the identifier before knowing whether it is a function or a variable.
pub(super) fn parse_def_tail(
    p: &mut Parser,
    name: String,
    mut span: crate::span::Span,
) -> ParseResult<Def> {
    let shape = parse_shape(p, &mut span)?;
    let init = if p.eat(&Token::Assign) {
        let init = parse_init(p)?;
        span = span.merge(&init_span(&init));
        Some(init)
    } else {
        None
    };
    Ok(Def {
        name,
        shape,
        init,
        span,
    })
}

fn parse_shape(p: &mut Parser, span: &mut crate::span::Span) -> ParseResult<Vec<Expr>> {
    let mut shape = Vec::new();
    while p.eat(&Token::LBracket) {
        shape.push(parse_expr(p)?);
        let end = p.expect(Token::RBracket, "']'")?;
        *span = span.merge(&end);
    }
    Ok(shape)
}

fn parse_init(p: &mut Parser) -> ParseResult<Init> {
    if p.eat(&Token::LBrace) {
        let mut items = Vec::new();
        if !p.check(&Token::RBrace) {
            items.push(parse_init(p)?);
            while p.eat(&Token::Comma) {
                items.push(parse_init(p)?);
            }
        }
        p.expect(Token::RBrace, "'}'")?;
        Ok(Init::List(items))
    } else {
        Ok(Init::Expr(parse_expr(p)?))
    }
}

fn init_span(init: &Init) -> crate::span::Span {
    match init {
        Init::Expr(e) => e.span(),
        Init::List(_) => crate::span::Span::empty(),
    }
}
