//! Accumulator arithmetic and logic, 8-bit and 16-bit increments, the 16-bit adds, and the 1-byte flag/rotate ops.

use super::{fetch_immediate, read_operand, write_operand, AluOp, Instruction, Operand, Scratch, Step};
use crate::alu::{self, Shift};
use crate::memory::Memory;
use crate::registers::{Register16, Registers};

pub(super) fn step<M: Memory>(ins: Instruction, cycle: u8, s: &mut Scratch, regs: &mut Registers, mem: &mut M) -> Step {
    match ins {
        Instruction::ALU(op, o) => {
            let last = 1 + o.size() + u8::from(o.is_memory());
            if cycle > last {
                return Step::Overrun;
            }
            fetch_immediate(cycle, o.size(), s, regs, mem);
            if cycle < last {
                return Step::Continue;
            }
            let v = read_operand(o, s, regs, mem);
            accumulate(op, v, regs);
            Step::Retire
        }
        Instruction::INC(o) => inc_dec(o, false, cycle, s, regs, mem),
        Instruction::DEC(o) => inc_dec(o, true, cycle, s, regs, mem),
        Instruction::INC16(rr) => match cycle {
            1 => Step::Continue,
            2 => {
                regs.set16(rr, regs.get16(rr).wrapping_add(1));
                Step::Retire
            }
            _ => Step::Overrun,
        },
        Instruction::DEC16(rr) => match cycle {
            1 => Step::Continue,
            2 => {
                regs.set16(rr, regs.get16(rr).wrapping_sub(1));
                Step::Retire
            }
            _ => Step::Overrun,
        },
        Instruction::ADD16(rr) => match cycle {
            1 => Step::Continue,
            2 => {
                let r = alu::add16(regs.hl(), regs.get16(rr));
                regs.set16(Register16::HL, r.value);
                regs.f.n = false;
                regs.f.h = r.half_carry;
                regs.f.c = r.carry;
                Step::Retire
            }
            _ => Step::Overrun,
        },
        Instruction::ADD_SP_r8 => match cycle {
            1 => Step::Continue,
            2 => {
                fetch_immediate(cycle, 1, s, regs, mem);
                Step::Continue
            }
            3 => Step::Continue,
            4 => {
                let r = alu::add_sp_offset(regs.sp, s.lo);
                regs.sp = r.value;
                regs.f.set(false, false, r.half_carry, r.carry);
                Step::Retire
            }
            _ => Step::Overrun,
        },
        _ if cycle != 1 => Step::Overrun,
        Instruction::DAA => {
            let (a, carry) = alu::daa(regs.a, regs.f.n, regs.f.h, regs.f.c);
            regs.a = a;
            regs.f.z = a == 0;
            regs.f.h = false;
            regs.f.c = carry;
            Step::Retire
        }
        Instruction::CPL => {
            regs.a = !regs.a;
            regs.f.n = true;
            regs.f.h = true;
            Step::Retire
        }
        Instruction::SCF => {
            regs.f.n = false;
            regs.f.h = false;
            regs.f.c = true;
            Step::Retire
        }
        Instruction::CCF => {
            regs.f.n = false;
            regs.f.h = false;
            regs.f.c = !regs.f.c;
            Step::Retire
        }
        Instruction::ROTATE_A(op) => {
            rotate_a(op, regs);
            Step::Retire
        }
        _ => Step::Overrun,
    }
}

/// Applies one of the 8 accumulator operations to A and v, storing the result (except for CP) and all four flags.
pub(crate) fn accumulate(op: AluOp, v: u8, regs: &mut Registers) {
    let a = regs.a;
    let (result, n, h, c) = match op {
        AluOp::ADD => {
            let r = alu::add8(a, v);
            (r.value, false, r.half_carry, r.carry)
        }
        AluOp::ADC => {
            let r = alu::adc8(a, v, regs.f.c);
            (r.value, false, r.half_carry, r.carry)
        }
        AluOp::SUB | AluOp::CP => {
            let r = alu::sub8(a, v);
            (r.value, true, r.half_carry, r.carry)
        }
        AluOp::SBC => {
            let r = alu::sbc8(a, v, regs.f.c);
            (r.value, true, r.half_carry, r.carry)
        }
        AluOp::AND => (a & v, false, true, false),
        AluOp::XOR => (a ^ v, false, false, false),
        AluOp::OR => (a | v, false, false, false),
    };

    if op != AluOp::CP {
        regs.a = result;
    }
    regs.f.set(result == 0, n, h, c);
}

/// RLCA/RRCA/RLA/RRA. Unlike their CB-prefixed counterparts these always clear Z.
fn rotate_a(op: Shift, regs: &mut Registers) {
    let (v, carry) = alu::shift(op, regs.a, regs.f.c);
    regs.a = v;
    regs.f.set(false, false, false, carry);
}

/// INC/DEC on a register finishes in the opcode fetch cycle. On (HL) it reads on cycle 2 and writes back on cycle 3.
fn inc_dec<M: Memory>(o: Operand, dec: bool, cycle: u8, s: &mut Scratch, regs: &mut Registers, mem: &mut M) -> Step {
    let last = if o.is_memory() { 3 } else { 1 };
    if cycle > last {
        return Step::Overrun;
    }
    if cycle == 2 {
        s.value = read_operand(o, s, regs, mem);
        return Step::Continue;
    }
    if cycle < last {
        return Step::Continue;
    }

    let v = if o.is_memory() { s.value } else { read_operand(o, s, regs, mem) };
    let r = if dec { alu::dec8(v) } else { alu::inc8(v) };
    write_operand(o, r.value, s, regs, mem);
    regs.f.z = r.value == 0;
    regs.f.n = dec;
    regs.f.h = r.half_carry;
    Step::Retire
}

#[cfg(test)]
mod tests {
    use super::accumulate;
    use crate::instruction::AluOp;
    use crate::registers::Registers;

    #[test]
    fn and_stores_the_conjunction() {
        let mut regs = Registers::new();
        regs.a = 0b1100_1100;
        accumulate(AluOp::AND, 0b1010_1010, &mut regs);
        assert_eq!(regs.a, 0b1000_1000);
        assert!(regs.f.h);
        assert!(!regs.f.z && !regs.f.n && !regs.f.c);
    }

    #[test]
    fn cp_leaves_a_alone() {
        let mut regs = Registers::new();
        regs.a = 0x10;
        accumulate(AluOp::CP, 0x10, &mut regs);
        assert_eq!(regs.a, 0x10);
        assert!(regs.f.z && regs.f.n);
        accumulate(AluOp::CP, 0x20, &mut regs);
        assert!(regs.f.c);
        assert!(!regs.f.z);
    }

    #[test]
    fn sbc_borrows_carry() {
        let mut regs = Registers::new();
        regs.a = 0x00;
        regs.f.c = true;
        accumulate(AluOp::SBC, 0x00, &mut regs);
        assert_eq!(regs.a, 0xFF);
        assert!(regs.f.c && regs.f.h && regs.f.n);
    }

    #[test]
    fn xor_a_zeroes() {
        let mut regs = Registers::new();
        regs.a = 0x5A;
        regs.f.c = true;
        accumulate(AluOp::XOR, 0x5A, &mut regs);
        assert_eq!(regs.a, 0);
        assert!(regs.f.z);
        assert!(!regs.f.c);
    }
}
