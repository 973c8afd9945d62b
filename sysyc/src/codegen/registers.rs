//! Scratch-register round robin (`spec.md` §4.5, "Register usage"): `t0..t6`
//! then `a0..a7`, a tiny counter reset before every top-level IR instruction.
//! No value stays live in a register across instructions — every def writes
//! back to its frame slot and every use reloads from it — so a fresh cycle
//! of this counter is all any single instruction's expansion ever needs.

const SCRATCH: &[&str] = &[
    "t0", "t1", "t2", "t3", "t4", "t5", "t6", "a0", "a1", "a2", "a3", "a4", "a5", "a6", "a7",
];

#[derive(Debug, Default)]
pub struct RegBank {
    next: usize,
}

impl RegBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the cycle; call once per top-level instruction lowered.
    pub fn reset(&mut self) {
        self.next = 0;
    }

    pub fn next(&mut self) -> &'static str {
        let r = SCRATCH[self.next % SCRATCH.len()];
        self.next += 1;
        r
    }
}

/// The register an integer function argument occupies per the RISC-V
/// integer calling convention, for parameter indices `0..8`.
pub fn arg_reg(index: u32) -> &'static str {
    SCRATCH[7 + index as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_scratch_then_argument_registers() {
        let mut bank = RegBank::new();
        assert_eq!(bank.next(), "t0");
        assert_eq!(bank.next(), "t1");
        for _ in 0..5 {
            bank.next();
        }
        assert_eq!(bank.next(), "a0");
    }

    #[test]
    fn reset_restarts_the_cycle() {
        let mut bank = RegBank::new();
        bank.next();
        bank.next();
        bank.reset();
        assert_eq!(bank.next(), "t0");
    }

    #[test]
    fn arg_reg_maps_zero_to_a0() {
        assert_eq!(arg_reg(0), "a0");
        assert_eq!(arg_reg(7), "a7");
    }
}
