//! PUSH and POP. The stack grows downward: a push decrements SP before each byte is written (high byte first), a pop
//! reads the low byte first and increments SP after each read.

use super::{pop_byte, push_cycle, Instruction, Scratch, Step};
use crate::memory::Memory;
use crate::registers::Registers;

pub(super) fn step<M: Memory>(ins: Instruction, cycle: u8, s: &mut Scratch, regs: &mut Registers, mem: &mut M) -> Step {
    match (ins, cycle) {
        (Instruction::PUSH(_), 1) | (Instruction::POP(_), 1) => Step::Continue,
        (Instruction::PUSH(rr), 2..=4) => {
            if push_cycle(cycle - 2, regs.get16(rr), regs, mem) {
                Step::Retire
            } else {
                Step::Continue
            }
        }
        (Instruction::POP(_), 2) => {
            s.lo = pop_byte(regs, mem);
            Step::Continue
        }
        (Instruction::POP(rr), 3) => {
            s.hi = pop_byte(regs, mem);
            regs.set16(rr, s.word());
            Step::Retire
        }
        _ => Step::Overrun,
    }
}
