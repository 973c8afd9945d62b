//! Per-function stack frame sizing (`spec.md` §4.4). Walked once per
//! function by the RISC-V emitter before any instruction is lowered, so
//! every later memory reference can be resolved to a fixed `sp`-relative
//! offset in one pass.

use std::collections::HashMap;

use crate::raw_ir::{FunctionData, Program, Type, ValueId, ValueKind};

/// Stack alignment RISC-V's calling convention requires.
const ALIGN: u32 = 16;

/// The S/R/A sizing for one function, plus the offset each of its
/// instruction values is assigned within the local area.
#[derive(Debug, Clone)]
pub struct FramePlan {
    /// Total frame size, a multiple of 16, `>= S + R + A`.
    pub frame_size: u32,
    /// Outgoing-argument area size; local slots are offset by this much so
    /// they sit above the scratch space a call this function makes needs.
    pub arg_area: u32,
    /// Whether this function contains any `call`, and so must save/restore
    /// `ra` across it.
    pub has_call: bool,
    /// `sp`-relative byte offset of every instruction value that owns a
    /// frame slot (everything with a non-`Unit` type; `Alloc` reserves the
    /// size of what it allocates rather than a pointer-sized cell).
    slots: HashMap<ValueId, u32>,
}

impl FramePlan {
    pub fn offset(&self, id: ValueId) -> u32 {
        self.slots
            .get(&id)
            .copied()
            .unwrap_or_else(|| panic!("value {id} was never assigned a frame slot"))
    }
}

/// Size in bytes an `alloc`'d value's *contents* occupy: the full array, not
/// a pointer to it (`spec.md` §4.4: "for `alloc <ty>`, reserve
/// `4 × Π(array-dimensions of ty)` bytes").
fn alloc_payload_size(ty: &Type) -> u32 {
    match ty {
        Type::Pointer(inner) => inner.size_bytes() as u32,
        other => other.size_bytes() as u32,
    }
}

pub fn plan_function(prog: &Program, func: &FunctionData) -> FramePlan {
    let mut slots = HashMap::new();
    let mut cursor = 0u32;
    let mut has_call = false;
    let mut max_outgoing = 0i64;

    for &block in &func.blocks {
        for &inst in &prog.block(block).insts {
            let data = prog.value(inst);
            let size = match &data.kind {
                ValueKind::Alloc => alloc_payload_size(&data.ty),
                _ if matches!(data.ty, Type::Unit) => 0,
                _ => data.ty.size_bytes() as u32,
            };
            if size > 0 {
                slots.insert(inst, cursor);
                cursor += size;
            }
            if let ValueKind::Call { args, .. } = &data.kind {
                has_call = true;
                max_outgoing = max_outgoing.max(args.len() as i64 - 8);
            }
        }
    }

    let s = cursor;
    let r = if has_call { 4 } else { 0 };
    let a = (4 * max_outgoing.max(0)) as u32;
    let frame_size = (s + r + a).div_ceil(ALIGN) * ALIGN;

    log::debug!(
        "frame plan for @{}: S={s} R={r} A={a} F={frame_size}",
        func.name
    );

    // Local slots sit above the outgoing-argument area: a nested call writes
    // its arguments at offsets `0..A(sp)`, so this function's own locals
    // start right after that, at `A`.
    let slots = slots.into_iter().map(|(id, off)| (id, off + a)).collect();

    FramePlan {
        frame_size,
        arg_area: a,
        has_call,
        slots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::compile;

    fn plan_of(src: &str, func_name: &str) -> FramePlan {
        let unit = sysyc_parser::parse(src).unwrap();
        let prog = compile(&unit).unwrap();
        let func = prog.function_by_name(func_name).unwrap();
        plan_function(&prog, func)
    }

    #[test]
    fn frame_size_is_aligned_and_covers_locals() {
        let plan = plan_of("int main(){ int a=1; int b=2; return a+b; }", "main");
        assert_eq!(plan.frame_size % 16, 0);
        assert!(!plan.has_call);
        assert_eq!(plan.arg_area, 0);
    }

    #[test]
    fn a_call_reserves_the_return_address_slot() {
        let plan = plan_of("int f(){return 1;} int main(){ return f(); }", "main");
        assert!(plan.has_call);
    }

    #[test]
    fn more_than_eight_args_grows_the_outgoing_area() {
        let plan = plan_of(
            "int f(int a,int b,int c,int d,int e,int g,int h,int i,int j){return a;} \
             int main(){ return f(1,2,3,4,5,6,7,8,9); }",
            "main",
        );
        assert_eq!(plan.arg_area, 4);
    }

    #[test]
    fn array_alloc_reserves_its_full_extent() {
        let plan = plan_of("int main(){ int a[4]; return a[0]; }", "main");
        // a's alloc (16 bytes) plus the load result and the getelemptr
        // pointer temp, comfortably more than one scalar slot's worth.
        assert!(plan.frame_size >= 16);
    }
}
