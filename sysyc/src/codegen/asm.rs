//! `sp`-relative load/store/address helpers with 12-bit immediate overflow
//! handling (`spec.md` §4.5, "Immediate handling"): `lw`/`sw`/`addi` all
//! encode a signed 12-bit offset, so any frame bigger than 2047 bytes needs
//! its offset materialised through a scratch register first.

use std::fmt::Write;

/// The largest offset `addi`/`lw`/`sw` can encode directly.
const IMM12_MAX: i64 = 2047;

/// `lw <reg>, <off>(sp)`, or the three-instruction `li`/`add`/`lw` expansion
/// when `off` doesn't fit a 12-bit immediate. `scratch` must differ from
/// `reg` only when `off` is out of range; pass the same register when `off`
/// is known small to avoid burning an extra name.
pub fn load_word(out: &mut String, reg: &str, off: u32, scratch: &str) {
    if (off as i64) <= IMM12_MAX {
        writeln!(out, "  lw {reg}, {off}(sp)").unwrap();
    } else {
        writeln!(out, "  li {scratch}, {off}").unwrap();
        writeln!(out, "  add {scratch}, sp, {scratch}").unwrap();
        writeln!(out, "  lw {reg}, 0({scratch})").unwrap();
    }
}

/// `sw <reg>, <off>(sp)`, or the overflow expansion.
pub fn store_word(out: &mut String, reg: &str, off: u32, scratch: &str) {
    if (off as i64) <= IMM12_MAX {
        writeln!(out, "  sw {reg}, {off}(sp)").unwrap();
    } else {
        writeln!(out, "  li {scratch}, {off}").unwrap();
        writeln!(out, "  add {scratch}, sp, {scratch}").unwrap();
        writeln!(out, "  sw {reg}, 0({scratch})").unwrap();
    }
}

/// Materialise the address `sp + off` into `reg` (`addi`, or `li`/`add` on
/// overflow) — used to take the address of a local `alloc`, never to read
/// through it.
pub fn addr_of(out: &mut String, reg: &str, off: u32) {
    if (off as i64) <= IMM12_MAX {
        writeln!(out, "  addi {reg}, sp, {off}").unwrap();
    } else {
        writeln!(out, "  li {reg}, {off}").unwrap();
        writeln!(out, "  add {reg}, sp, {reg}").unwrap();
    }
}

/// `addi sp, sp, <delta>` (`delta` may be negative, for the prologue), or
/// the `li`/`add` expansion when it overflows the immediate range.
pub fn adjust_sp(out: &mut String, delta: i64, scratch: &str) {
    if delta.unsigned_abs() as i64 <= IMM12_MAX {
        writeln!(out, "  addi sp, sp, {delta}").unwrap();
    } else {
        writeln!(out, "  li {scratch}, {delta}").unwrap();
        writeln!(out, "  add sp, sp, {scratch}").unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_offset_uses_direct_encoding() {
        let mut out = String::new();
        load_word(&mut out, "t0", 16, "t0");
        assert_eq!(out, "  lw t0, 16(sp)\n");
    }

    #[test]
    fn large_offset_materialises_through_scratch() {
        let mut out = String::new();
        load_word(&mut out, "t0", 4096, "t1");
        assert_eq!(out, "  li t1, 4096\n  add t1, sp, t1\n  lw t0, 0(t1)\n");
    }

    #[test]
    fn adjust_sp_handles_negative_prologue_delta() {
        let mut out = String::new();
        adjust_sp(&mut out, -16, "t0");
        assert_eq!(out, "  addi sp, sp, -16\n");
    }
}
