//! Jumps, calls, returns, restarts, and the instructions that change the CPU's run state (HALT/STOP/DI/EI).

use super::{fetch_immediate, pop_byte, push_cycle, Instruction, Scratch, Step};
use crate::memory::Memory;
use crate::registers::Registers;
use log::{debug, trace};

pub(super) fn step<M: Memory>(ins: Instruction, cycle: u8, s: &mut Scratch, regs: &mut Registers, mem: &mut M) -> Step {
    use Instruction::*;

    match (ins, cycle) {
        (NOP, 1) => Step::Retire,
        (HALT, 1) => {
            debug!("HALT at {:04X}", regs.pc.wrapping_sub(1));
            regs.halted = true;
            Step::Retire
        }
        (STOP, 1) => {
            // STOP is followed by a padding byte that is skipped over.
            regs.pc = regs.pc.wrapping_add(1);
            debug!("STOP at {:04X}", regs.pc.wrapping_sub(2));
            regs.halted = true;
            Step::Retire
        }
        (DI, 1) => {
            if regs.ime || regs.ime_pending {
                debug!("interrupts disabled");
            }
            regs.ime = false;
            regs.ime_pending = false;
            Step::Retire
        }
        (EI, 1) => {
            if !regs.ime {
                debug!("interrupts enabled after next instruction");
                regs.ime_pending = true;
            }
            Step::Retire
        }
        (JP_HL, 1) => {
            regs.pc = regs.hl();
            Step::Retire
        }

        (JP(_), 1) | (JR(_), 1) | (CALL(_), 1) | (RET(_), 1) | (RETI, 1) | (RST(_), 1) => Step::Continue,

        (JP(_), 2) => {
            fetch_immediate(cycle, 2, s, regs, mem);
            Step::Continue
        }
        (JP(cc), 3) => {
            fetch_immediate(cycle, 2, s, regs, mem);
            if regs.check(cc) {
                Step::Continue
            } else {
                Step::Retire
            }
        }
        (JP(_), 4) => {
            regs.pc = s.word();
            Step::Retire
        }

        (JR(cc), 2) => {
            fetch_immediate(cycle, 1, s, regs, mem);
            if regs.check(cc) {
                Step::Continue
            } else {
                Step::Retire
            }
        }
        (JR(_), 3) => {
            let target = regs.pc.wrapping_add(i16::from(s.lo as i8) as u16);
            trace!("JR {:+} from {:04X} to {:04X}", s.lo as i8, regs.pc, target);
            regs.pc = target;
            Step::Retire
        }

        (CALL(_), 2) => {
            fetch_immediate(cycle, 2, s, regs, mem);
            Step::Continue
        }
        (CALL(cc), 3) => {
            fetch_immediate(cycle, 2, s, regs, mem);
            if regs.check(cc) {
                Step::Continue
            } else {
                Step::Retire
            }
        }
        (CALL(_), 4..=6) => {
            if push_cycle(cycle - 4, regs.pc, regs, mem) {
                regs.pc = s.word();
                Step::Retire
            } else {
                Step::Continue
            }
        }

        (RST(_), 2..=3) => {
            push_cycle(cycle - 2, regs.pc, regs, mem);
            Step::Continue
        }
        (RST(vec), 4) => {
            push_cycle(cycle - 2, regs.pc, regs, mem);
            regs.pc = u16::from(vec);
            Step::Retire
        }

        (RET(Some(cc)), 2) => {
            if regs.check(Some(cc)) {
                Step::Continue
            } else {
                Step::Retire
            }
        }
        (RET(_), _) | (RETI, _) if cycle <= 4 + u8::from(is_conditional_ret(ins)) => {
            // A conditional RET spends cycle 2 evaluating its condition, which pushes the rest of the sequence back.
            match cycle - u8::from(is_conditional_ret(ins)) {
                2 => {
                    s.lo = pop_byte(regs, mem);
                    Step::Continue
                }
                3 => {
                    s.hi = pop_byte(regs, mem);
                    Step::Continue
                }
                _ => {
                    regs.pc = s.word();
                    if ins == RETI {
                        debug!("RETI to {:04X}, interrupts enabled", regs.pc);
                        regs.ime = true;
                        regs.ime_pending = false;
                    }
                    Step::Retire
                }
            }
        }

        _ => Step::Overrun,
    }
}

/// True if the instruction is a conditional RET.
fn is_conditional_ret(ins: Instruction) -> bool {
    match ins {
        Instruction::RET(Some(_)) => true,
        _ => false,
    }
}
