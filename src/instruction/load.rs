//! 8-bit and 16-bit loads.

use super::{fetch_immediate, read_operand, write_operand, Instruction, Operand, Scratch, Step};
use crate::alu;
use crate::memory::Memory;
use crate::registers::{Register16, Registers};

pub(super) fn step<M: Memory>(ins: Instruction, cycle: u8, s: &mut Scratch, regs: &mut Registers, mem: &mut M) -> Step {
    match ins {
        Instruction::LD(dst, src) => ld(dst, src, cycle, s, regs, mem),
        Instruction::LD16(rr) => match cycle {
            1 => Step::Continue,
            2 => {
                fetch_immediate(cycle, 2, s, regs, mem);
                Step::Continue
            }
            3 => {
                fetch_immediate(cycle, 2, s, regs, mem);
                regs.set16(rr, s.word());
                Step::Retire
            }
            _ => Step::Overrun,
        },
        Instruction::LD_a16_SP => match cycle {
            1 => Step::Continue,
            2 | 3 => {
                fetch_immediate(cycle, 2, s, regs, mem);
                Step::Continue
            }
            4 => {
                mem.write(s.word(), regs.sp as u8);
                Step::Continue
            }
            5 => {
                mem.write(s.word().wrapping_add(1), (regs.sp >> 8) as u8);
                Step::Retire
            }
            _ => Step::Overrun,
        },
        Instruction::LD_SP_HL => match cycle {
            1 => Step::Continue,
            2 => {
                regs.sp = regs.hl();
                Step::Retire
            }
            _ => Step::Overrun,
        },
        Instruction::LD_HL_SP_r8 => match cycle {
            1 => Step::Continue,
            2 => {
                fetch_immediate(cycle, 1, s, regs, mem);
                Step::Continue
            }
            3 => {
                let r = alu::add_sp_offset(regs.sp, s.lo);
                regs.set16(Register16::HL, r.value);
                regs.f.set(false, false, r.half_carry, r.carry);
                Step::Retire
            }
            _ => Step::Overrun,
        },
        _ => Step::Overrun,
    }
}

/// Every 8-bit LD follows the same shape: fetch any immediate bytes, then on the final cycle read the source and write
/// the destination. At most one of the two operands is a memory operand, so the final cycle does at most one access.
fn ld<M: Memory>(dst: Operand, src: Operand, cycle: u8, s: &mut Scratch, regs: &mut Registers, mem: &mut M) -> Step {
    let imm = dst.size() + src.size();
    let last = 1 + imm + u8::from(dst.is_memory()) + u8::from(src.is_memory());
    if cycle > last {
        return Step::Overrun;
    }

    fetch_immediate(cycle, imm, s, regs, mem);
    if cycle < last {
        return Step::Continue;
    }

    let v = read_operand(src, s, regs, mem);
    write_operand(dst, v, s, regs, mem);
    Step::Retire
}
