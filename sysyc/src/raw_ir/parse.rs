//! A parser for the textual form `printer.rs` emits, back into a `Program`.
//!
//! This only has to round-trip *our own* output (`spec.md` §8's round-trip
//! property), not arbitrary hand-written Koopa text, so the grammar handled
//! here is exactly the subset `printer.rs` produces: no comments, one
//! instruction per line, globals before a blank line before functions.

use std::collections::HashMap;

use super::function::{BasicBlockData, FunctionData};
use super::program::Program;
use super::types::Type;
use super::value::{BinOp, ValueData, ValueId, ValueKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrParseError(pub String);

impl std::fmt::Display for IrParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ir parse error: {}", self.0)
    }
}
impl std::error::Error for IrParseError {}

type PResult<T> = Result<T, IrParseError>;

fn err(msg: impl Into<String>) -> IrParseError {
    IrParseError(msg.into())
}

/// Per-function name -> value id scope, separate from the program-wide
/// global scope (`@name` resolves in globals first, then falls back to the
/// enclosing function's parameters, mirroring normal lexical scoping).
struct Scope<'a> {
    prog: &'a mut Program,
    globals: &'a HashMap<String, ValueId>,
    locals: HashMap<String, ValueId>,
    blocks: HashMap<String, u32>,
}

impl<'a> Scope<'a> {
    fn resolve(&self, tok: &str) -> PResult<ValueId> {
        if let Ok(n) = tok.parse::<i32>() {
            return Ok(self
                .prog
                .new_value(ValueData::unnamed(ValueKind::Integer(n), Type::Int32)));
        }
        let name = tok.trim_start_matches(['%', '@']);
        self.locals
            .get(name)
            .or_else(|| self.globals.get(name))
            .copied()
            .ok_or_else(|| err(format!("undefined reference '{tok}'")))
    }

    fn block_id(&self, label: &str) -> PResult<u32> {
        self.blocks
            .get(label)
            .copied()
            .ok_or_else(|| err(format!("undefined label '{label}'")))
    }
}

pub fn parse_program(text: &str) -> PResult<Program> {
    let mut prog = Program::new();
    let mut globals: HashMap<String, ValueId> = HashMap::new();
    let lines: Vec<&str> = text.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() {
            i += 1;
            continue;
        }
        if let Some(rest) = line.strip_prefix("global ") {
            let (name, id) = parse_global(&mut prog, rest)?;
            globals.insert(name, id);
            prog.globals.push(id);
            i += 1;
        } else if line.starts_with("decl ") || line.starts_with("fun ") {
            i = parse_function(&mut prog, &globals, &lines, i)?;
        } else {
            return Err(err(format!("unexpected top-level line: {line}")));
        }
    }
    Ok(prog)
}

fn parse_type(s: &str) -> PResult<Type> {
    let s = s.trim();
    if s == "i32" {
        return Ok(Type::Int32);
    }
    if s == "unit" {
        return Ok(Type::Unit);
    }
    if let Some(rest) = s.strip_prefix('*') {
        return Ok(Type::Pointer(Box::new(parse_type(rest)?)));
    }
    if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        let comma = inner.rfind(',').ok_or_else(|| err(format!("bad array type '{s}'")))?;
        let elem = parse_type(&inner[..comma])?;
        let n: usize = inner[comma + 1..]
            .trim()
            .parse()
            .map_err(|_| err(format!("bad array length in '{s}'")))?;
        return Ok(Type::Array(Box::new(elem), n));
    }
    Err(err(format!("unrecognised type '{s}'")))
}

fn parse_global(prog: &mut Program, rest: &str) -> PResult<(String, ValueId)> {
    // `@name = alloc <ty>, <init>`
    let rest = rest.trim_start_matches('@');
    let (name, rest) = rest
        .split_once(" = alloc ")
        .ok_or_else(|| err("malformed global"))?;
    let (ty_text, init_text) = rest
        .split_once(',')
        .ok_or_else(|| err("global missing initializer"))?;
    let ty = parse_type(ty_text)?;
    let init = parse_initializer(prog, init_text.trim(), &ty)?;
    let id = prog.new_value(ValueData::named(
        ValueKind::GlobalAlloc(init),
        Type::Pointer(Box::new(ty)),
        name,
    ));
    Ok((name.to_string(), id))
}

fn parse_initializer(prog: &mut Program, text: &str, ty: &Type) -> PResult<ValueId> {
    let text = text.trim();
    if text == "zeroinit" {
        return Ok(prog.new_value(ValueData::unnamed(ValueKind::ZeroInit, ty.clone())));
    }
    if let Some(inner) = text.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
        let elem_ty = ty.array_elem().cloned().unwrap_or(Type::Int32);
        let mut elems = Vec::new();
        for part in split_top_level(inner) {
            elems.push(parse_initializer(prog, part.trim(), &elem_ty)?);
        }
        return Ok(prog.new_value(ValueData::unnamed(ValueKind::Aggregate(elems), ty.clone())));
    }
    let n: i32 = text.parse().map_err(|_| err(format!("bad initializer '{text}'")))?;
    Ok(prog.new_value(ValueData::unnamed(ValueKind::Integer(n), Type::Int32)))
}

/// Split a braced initializer's interior on top-level commas only (commas
/// inside nested `{...}` don't count).
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (idx, ch) in s.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&s[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if start < s.len() {
        parts.push(&s[start..]);
    }
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}

fn parse_function(
    prog: &mut Program,
    globals: &HashMap<String, ValueId>,
    lines: &[&str],
    start: usize,
) -> PResult<usize> {
    let header = lines[start].trim();
    let is_decl = header.starts_with("decl ");
    let rest = header
        .strip_prefix(if is_decl { "decl @" } else { "fun @" })
        .unwrap();
    let (name, rest) = rest.split_once('(').ok_or_else(|| err("missing '('"))?;
    let (params_text, after) = rest.split_once(')').ok_or_else(|| err("missing ')'"))?;
    let ret_ty = after
        .trim()
        .strip_prefix(':')
        .map(|t| parse_type(t.trim_end_matches('{').trim()))
        .transpose()?
        .unwrap_or(Type::Unit);

    if is_decl {
        // `decl @name(<param-tys>)` lists bare types only, no `@name: ty`
        // parameter bindings (`spec.md` §4.2) — there is no body to bind
        // them to.
        let param_tys = split_top_level(params_text)
            .into_iter()
            .map(|t| parse_type(t.trim()))
            .collect::<PResult<Vec<_>>>()?;
        let data = FunctionData {
            name: name.to_string(),
            param_tys,
            param_values: Vec::new(),
            ret_ty,
            blocks: Vec::new(),
        };
        prog.new_function(data);
        return Ok(start + 1);
    }

    let mut locals = HashMap::new();
    let mut param_tys = Vec::new();
    let mut param_values = Vec::new();
    for p in split_top_level(params_text) {
        let (pname, pty) = p.split_once(':').ok_or_else(|| err("bad parameter"))?;
        let pname = pname.trim().trim_start_matches('@').to_string();
        let pty = parse_type(pty.trim())?;
        let id = prog.new_value(ValueData::named(
            ValueKind::FuncArgRef(param_values.len() as u32),
            pty.clone(),
            pname.clone(),
        ));
        locals.insert(pname, id);
        param_tys.push(pty);
        param_values.push(id);
    }

    // Pre-scan block labels so forward branches resolve.
    let mut i = start + 1;
    let mut blocks: HashMap<String, u32> = HashMap::new();
    let mut block_order = Vec::new();
    while i < lines.len() && lines[i].trim() != "}" {
        let line = lines[i].trim();
        if let Some(label) = line.strip_suffix(':') {
            let id = prog.new_block(label.to_string());
            blocks.insert(label.to_string(), id);
            block_order.push(id);
        }
        i += 1;
    }
    let end = i;

    {
        let mut scope = Scope {
            prog,
            globals,
            locals,
            blocks,
        };
        let mut current: Option<u32> = None;
        for line in &lines[start + 1..end] {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(label) = line.strip_suffix(':') {
                current = Some(scope.block_id(label)?);
                continue;
            }
            let block = current.ok_or_else(|| err("instruction before any label"))?;
            parse_instruction(&mut scope, block, line)?;
        }
    }

    let data = FunctionData {
        name: name.to_string(),
        param_tys,
        param_values,
        ret_ty,
        blocks: block_order,
    };
    prog.new_function(data);
    Ok(end + 1)
}

fn parse_instruction(scope: &mut Scope, block: u32, line: &str) -> PResult<()> {
    if let Some(rest) = line.strip_prefix("store ") {
        let (val, dst) = rest.split_once(',').ok_or_else(|| err("bad store"))?;
        let value = scope.resolve(val.trim())?;
        let dest = scope.resolve(dst.trim())?;
        let id = scope
            .prog
            .new_value(ValueData::unnamed(ValueKind::Store { value, dest }, Type::Unit));
        scope.prog.push_inst(block, id);
        return Ok(());
    }
    if let Some(rest) = line.strip_prefix("br ") {
        let mut parts = rest.splitn(3, ',');
        let cond = scope.resolve(parts.next().ok_or_else(|| err("bad br"))?.trim())?;
        let then_bb = scope.block_id(parts.next().ok_or_else(|| err("bad br"))?.trim())?;
        let else_bb = scope.block_id(parts.next().ok_or_else(|| err("bad br"))?.trim())?;
        let id = scope.prog.new_value(ValueData::unnamed(
            ValueKind::Branch {
                cond,
                then_bb,
                else_bb,
            },
            Type::Unit,
        ));
        scope.prog.push_inst(block, id);
        return Ok(());
    }
    if let Some(rest) = line.strip_prefix("jump ") {
        let target = scope.block_id(rest.trim())?;
        let id = scope
            .prog
            .new_value(ValueData::unnamed(ValueKind::Jump(target), Type::Unit));
        scope.prog.push_inst(block, id);
        return Ok(());
    }
    if line == "ret" || line.starts_with("ret ") {
        let v = line.strip_prefix("ret").unwrap().trim();
        let value = if v.is_empty() {
            None
        } else {
            Some(scope.resolve(v)?)
        };
        let id = scope
            .prog
            .new_value(ValueData::unnamed(ValueKind::Return(value), Type::Unit));
        scope.prog.push_inst(block, id);
        return Ok(());
    }
    if line.starts_with("call ") {
        let id = parse_call(scope, line.strip_prefix("call ").unwrap(), None)?;
        scope.prog.push_inst(block, id);
        return Ok(());
    }

    let (lhs, rhs) = line.split_once(" = ").ok_or_else(|| err(format!("bad instruction '{line}'")))?;
    let dest_name = lhs.trim().trim_start_matches('%').to_string();
    let id = if rhs.starts_with("call ") {
        parse_call(scope, rhs.strip_prefix("call ").unwrap(), Some(dest_name.clone()))?
    } else if let Some(rest) = rhs.strip_prefix("alloc ") {
        let ty = parse_type(rest.trim())?;
        scope.prog.new_value(ValueData::named(
            ValueKind::Alloc,
            Type::Pointer(Box::new(ty)),
            dest_name.clone(),
        ))
    } else if let Some(rest) = rhs.strip_prefix("load ") {
        let src = scope.resolve(rest.trim())?;
        let ty = scope
            .prog
            .value(src)
            .ty
            .pointee()
            .cloned()
            .unwrap_or(Type::Int32);
        scope
            .prog
            .new_value(ValueData::named(ValueKind::Load(src), ty, dest_name.clone()))
    } else if let Some(rest) = rhs.strip_prefix("getelemptr ") {
        let (src_t, idx_t) = rest.split_once(',').ok_or_else(|| err("bad getelemptr"))?;
        let src = scope.resolve(src_t.trim())?;
        let index = scope.resolve(idx_t.trim())?;
        let ty = scope
            .prog
            .value(src)
            .ty
            .pointee()
            .and_then(|t| t.array_elem())
            .cloned()
            .map(|t| Type::Pointer(Box::new(t)))
            .unwrap_or(Type::Pointer(Box::new(Type::Int32)));
        scope
            .prog
            .new_value(ValueData::named(ValueKind::GetElemPtr { src, index }, ty, dest_name.clone()))
    } else if let Some(rest) = rhs.strip_prefix("getptr ") {
        let (src_t, idx_t) = rest.split_once(',').ok_or_else(|| err("bad getptr"))?;
        let src = scope.resolve(src_t.trim())?;
        let index = scope.resolve(idx_t.trim())?;
        let ty = scope.prog.value(src).ty.clone();
        scope
            .prog
            .new_value(ValueData::named(ValueKind::GetPtr { src, index }, ty, dest_name.clone()))
    } else {
        parse_binary(scope, rhs.trim(), dest_name.clone())?
    };
    scope.prog.push_inst(block, id);
    Ok(())
}

fn parse_binary(scope: &mut Scope, rhs: &str, dest_name: String) -> PResult<ValueId> {
    let (op_text, operands) = rhs.split_once(' ').ok_or_else(|| err(format!("bad binary op '{rhs}'")))?;
    let op = BinOp::from_mnemonic(op_text).ok_or_else(|| err(format!("unknown op '{op_text}'")))?;
    let (l, r) = operands.split_once(',').ok_or_else(|| err("bad binary operands"))?;
    let lhs = scope.resolve(l.trim())?;
    let rhs = scope.resolve(r.trim())?;
    Ok(scope
        .prog
        .new_value(ValueData::named(ValueKind::Binary { op, lhs, rhs }, Type::Int32, dest_name)))
}

fn parse_call(scope: &mut Scope, rest: &str, dest_name: Option<String>) -> PResult<ValueId> {
    let rest = rest.trim().trim_start_matches('@');
    let (callee, rest) = rest.split_once('(').ok_or_else(|| err("bad call"))?;
    let args_text = rest.trim_end_matches(')');
    let mut args = Vec::new();
    for a in split_top_level(args_text) {
        args.push(scope.resolve(a.trim())?);
    }
    let callee_fn = scope.prog.function_by_name(callee);
    let ret_ty = callee_fn.map(|f| f.ret_ty.clone()).unwrap_or(Type::Int32);
    let kind = ValueKind::Call {
        callee: callee.to_string(),
        args,
    };
    Ok(match dest_name {
        Some(name) => scope.prog.new_value(ValueData::named(kind, ret_ty, name)),
        None => scope.prog.new_value(ValueData::unnamed(kind, Type::Unit)),
    })
}
