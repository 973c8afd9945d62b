use super::Parser;
use crate::ast::{BinOp, Expr, LVal, UnaryOp};
use crate::error::ParseResult;
use crate::token::{Precedence, Token};

impl Precedence {
    /// The next-tighter precedence level, used for left-associative climbing.
    /// `Multiplicative` is the tightest binary level, so it maps to itself;
    /// the climbing loop terminates naturally once no operator matches it.
    fn tighter(self) -> Precedence {
        match self {
            Precedence::Lowest => Precedence::LogicalOr,
            Precedence::LogicalOr => Precedence::LogicalAnd,
            Precedence::LogicalAnd => Precedence::Equality,
            Precedence::Equality => Precedence::Relational,
            Precedence::Relational => Precedence::Additive,
            Precedence::Additive => Precedence::Multiplicative,
            Precedence::Multiplicative => Precedence::Multiplicative,
        }
    }
}

fn token_to_binop(token: &Token) -> BinOp {
    match token {
        Token::OrOr => BinOp::Or,
        Token::AndAnd => BinOp::And,
        Token::EqEq => BinOp::Eq,
        Token::Ne => BinOp::Ne,
        Token::Lt => BinOp::Lt,
        Token::Gt => BinOp::Gt,
        Token::Le => BinOp::Le,
        Token::Ge => BinOp::Ge,
        Token::Plus => BinOp::Add,
        Token::Minus => BinOp::Sub,
        Token::Star => BinOp::Mul,
        Token::Slash => BinOp::Div,
        Token::Percent => BinOp::Mod,
        _ => unreachable!("token_to_binop called on non-operator token"),
    }
}

/// Parse a full expression (the `||`-rooted production in SysY's grammar).
pub(super) fn parse_expr(p: &mut Parser) -> ParseResult<Expr> {
    parse_binary(p, Precedence::LogicalOr)
}

fn parse_binary(p: &mut Parser, min_prec: Precedence) -> ParseResult<Expr> {
    let mut lhs = parse_unary(p)?;
    loop {
        let Some(prec) = p.peek().and_then(Token::infix_precedence) else {
            break;
        };
        if prec < min_prec {
            break;
        }
        let op_span = p.peek_span();
        let op_token = p.advance().unwrap().token;
        let op = token_to_binop(&op_token);
        let rhs = parse_binary(p, prec.tighter())?;
        let span = lhs.span().merge(&op_span).merge(&rhs.span());
        lhs = Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span,
        };
    }
    Ok(lhs)
}

fn parse_unary(p: &mut Parser) -> ParseResult<Expr> {
    let start = p.peek_span();
    let op = match p.peek() {
        Some(Token::Plus) => Some(UnaryOp::Plus),
        Some(Token::Minus) => Some(UnaryOp::Neg),
        Some(Token::Not) => Some(UnaryOp::Not),
        _ => None,
    };
    if let Some(op) = op {
        p.advance();
        let operand = parse_unary(p)?;
        let span = start.merge(&operand.span());
        return Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            span,
        });
    }
    parse_primary(p)
}

fn parse_primary(p: &mut Parser) -> ParseResult<Expr> {
    match p.peek() {
        Some(Token::LParen) => {
            p.advance();
            let inner = parse_expr(p)?;
            p.expect(Token::RParen, "')'")?;
            Ok(inner)
        }
        Some(Token::IntConst(v)) => {
            let v = *v;
            p.advance();
            Ok(Expr::Number(v))
        }
        Some(Token::Ident(_)) => {
            let save = p.pos;
            let (name, span) = p.expect_ident("identifier")?;
            if p.check(&Token::LParen) {
                p.advance();
                let mut args = Vec::new();
                if !p.check(&Token::RParen) {
                    args.push(parse_expr(p)?);
                    while p.eat(&Token::Comma) {
                        args.push(parse_expr(p)?);
                    }
                }
                let end = p.expect(Token::RParen, "')'")?;
                return Ok(Expr::Call {
                    callee: name,
                    args,
                    span: span.merge(&end),
                });
            }
            p.pos = save;
            Ok(Expr::LVal(parse_lval(p)?))
        }
        _ => Err(p.unexpected("an expression")),
    }
}

/// Parse an lvalue: `ident ('[' expr ']')*`.
pub(super) fn parse_lval(p: &mut Parser) -> ParseResult<LVal> {
    let (name, mut span) = p.expect_ident("identifier")?;
    let mut indices = Vec::new();
    while p.eat(&Token::LBracket) {
        indices.push(parse_expr(p)?);
        let end = p.expect(Token::RBracket, "']'")?;
        span = span.merge(&end);
    }
    Ok(LVal {
        name,
        indices,
        span,
    })
}

/// Try to parse an lvalue; restores the cursor on failure. Used by statement
/// parsing to distinguish `lval = expr;` from a bare expression statement
/// without committing to a choice before seeing the `=`.
pub(super) fn try_parse_lval(p: &mut Parser) -> Option<LVal> {
    if !matches!(p.peek(), Some(Token::Ident(_))) {
        return None;
    }
    let save = p.pos;
    match parse_lval(p) {
        Ok(lval) if p.check(&Token::Assign) => Some(lval),
        _ => {
            p.pos = save;
            None
        }
    }
}
