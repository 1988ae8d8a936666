//! The driver. Owns the register file and advances the CPU one M-cycle per `tick`: fetching opcode bytes, resolving
//! them against the dispatch tables, and stepping the resulting instruction until it retires.
//!
//! Interrupts are not detected here. Whatever owns the interrupt controller checks IME and pending requests whenever the
//! CPU is idle (between instructions), and calls `service_interrupt` to have the core run the dispatch sequence.

use crate::dispatch::{self, DispatchTables};
use crate::error::{Error, Result, Violation};
use crate::instruction::{Opcode, Scratch};
use crate::memory::Memory;
use crate::registers::{Model, Registers};
use crate::CB_PREFIX;
use log::{debug, error, trace};

/// The 5 interrupt sources, highest priority first. Discriminants are each source's bit in the IF ($FF0F) and IE
/// ($FFFF) registers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Interrupt {
    VBlank = 0b0_0001,
    Stat = 0b0_0010,
    Timer = 0b0_0100,
    Serial = 0b0_1000,
    Joypad = 0b1_0000,
}

impl Interrupt {
    pub const ALL: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::Stat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    /// Determines the appropriate memory location to jump to when processing an interrupt.
    pub fn handler_addr(self) -> u16 {
        match self {
            Interrupt::VBlank => 0x40,
            Interrupt::Stat => 0x48,
            Interrupt::Timer => 0x50,
            Interrupt::Serial => 0x58,
            Interrupt::Joypad => 0x60,
        }
    }

    /// This interrupt's bit in IF/IE.
    pub fn mask(self) -> u8 {
        self as u8
    }

    /// Picks the interrupt to service from a set of IF/IE bits, usually `if & ie`. Lower bits win when several are
    /// pending. Bits 5-7 are ignored.
    pub fn highest_priority(bits: u8) -> Option<Interrupt> {
        Interrupt::ALL.iter().cloned().find(|i| bits & i.mask() != 0)
    }
}

#[derive(Clone, Copy, Debug)]
enum State {
    /// Between instructions. The next tick fetches an opcode.
    Idle,
    /// The $CB prefix has been fetched; the next tick fetches the real opcode from the prefixed table.
    Prefixed,
    /// `cycle` is the last cycle the instruction was stepped with.
    Executing {
        opcode: &'static Opcode,
        cycle: u8,
        scratch: Scratch,
    },
    Servicing {
        interrupt: Interrupt,
        cycle: u8,
    },
    /// An unsupported opcode was executed (or the core was misdriven). Only a reset gets us out of here.
    Locked(Error),
}

pub struct Cpu {
    pub regs: Registers,
    state: State,
    tables: &'static DispatchTables,
}

impl Cpu {
    pub fn new(model: Model) -> Cpu {
        Cpu {
            regs: Registers::power_on(model),
            state: State::Idle,
            tables: dispatch::tables(),
        }
    }

    /// Puts the CPU back in the state the bootrom of the given model leaves it in, abandoning any instruction in flight.
    /// This is also the only way out of a lockup.
    pub fn reset(&mut self, model: Model) {
        debug!("reset ({:?})", model);
        self.regs = Registers::power_on(model);
        self.state = State::Idle;
    }

    /// True when no instruction, prefix fetch, or interrupt dispatch is in progress.
    pub fn is_idle(&self) -> bool {
        match self.state {
            State::Idle => true,
            _ => false,
        }
    }

    pub fn is_locked(&self) -> bool {
        match self.state {
            State::Locked(_) => true,
            _ => false,
        }
    }

    /// The instruction currently executing and the last cycle it completed, if any.
    pub fn in_flight(&self) -> Option<(&'static Opcode, u8)> {
        match self.state {
            State::Executing { opcode, cycle, .. } => Some((opcode, cycle)),
            _ => None,
        }
    }

    /// Leaves halted mode. Used by the interrupt controller when an interrupt is requested while IME is off, which
    /// resumes execution without dispatching to the handler.
    pub fn wake(&mut self) {
        if self.regs.halted {
            debug!("woke from HALT at {:04X}", self.regs.pc);
        }
        self.regs.halted = false;
    }

    /// Begins the interrupt dispatch sequence: IME is cleared, the CPU leaves halted mode, and the next 5 ticks push PC
    /// and jump to the interrupt's handler. Can only be requested between instructions, and not while another dispatch
    /// is still running.
    pub fn service_interrupt(&mut self, interrupt: Interrupt) -> Result<()> {
        let (opcode, prefixed, cycle) = match self.state {
            State::Idle => {
                debug!("servicing {:?} interrupt, return address {:04X}", interrupt, self.regs.pc);
                self.regs.ime = false;
                self.regs.ime_pending = false;
                self.regs.halted = false;
                self.state = State::Servicing { interrupt, cycle: 0 };
                return Ok(());
            }
            State::Locked(err) => return Err(err),
            State::Prefixed => (CB_PREFIX, false, 1),
            State::Executing { opcode, cycle, .. } => (opcode.code, opcode.prefixed, cycle),
            State::Servicing { interrupt: active, cycle } => {
                return Err(Error::InterruptInProgress {
                    requested: interrupt,
                    active,
                    cycle,
                })
            }
        };

        Err(Error::ProtocolViolation {
            opcode,
            prefixed,
            cycle,
            violation: Violation::MidInstruction,
        })
    }

    /// Advances the CPU by a single M-cycle.
    pub fn tick<M: Memory>(&mut self, mem: &mut M) -> Result<()> {
        match self.state {
            State::Idle => {
                // EI takes effect as the instruction following it begins, so it's only visible to interrupt checks
                // once that instruction has finished.
                if self.regs.ime_pending {
                    self.regs.ime = true;
                    self.regs.ime_pending = false;
                }
                if self.regs.halted {
                    return Ok(());
                }

                let pc = self.regs.fetch_pc();
                let code = mem.read(pc);
                if code == CB_PREFIX {
                    self.state = State::Prefixed;
                    return Ok(());
                }
                let opcode = self.tables.plain(code);
                trace!("{:04X}: {}", pc, opcode.instruction);
                self.step(opcode, 1, Scratch::new(), mem)
            }
            State::Prefixed => {
                let pc = self.regs.fetch_pc();
                let opcode = self.tables.prefixed(mem.read(pc));
                trace!("{:04X}: {}", pc.wrapping_sub(1), opcode.instruction);
                self.step(opcode, 1, Scratch::new(), mem)
            }
            State::Executing { opcode, cycle, scratch } => self.step(opcode, cycle + 1, scratch, mem),
            State::Servicing { interrupt, cycle } => {
                let cycle = cycle + 1;
                match cycle {
                    1 | 2 => {}
                    3 => {
                        self.regs.sp = self.regs.sp.wrapping_sub(1);
                        mem.write(self.regs.sp, (self.regs.pc >> 8) as u8);
                    }
                    4 => {
                        self.regs.sp = self.regs.sp.wrapping_sub(1);
                        mem.write(self.regs.sp, self.regs.pc as u8);
                    }
                    _ => {
                        self.regs.pc = interrupt.handler_addr();
                        self.state = State::Idle;
                        return Ok(());
                    }
                }
                self.state = State::Servicing { interrupt, cycle };
                Ok(())
            }
            State::Locked(err) => Err(err),
        }
    }

    /// Ticks until the current instruction (or interrupt dispatch) completes, or runs a full instruction if the CPU is
    /// idle. Returns the number of M-cycles consumed. While halted, this consumes exactly one cycle.
    pub fn run_instruction<M: Memory>(&mut self, mem: &mut M) -> Result<u32> {
        let mut cycles = 0;
        loop {
            self.tick(mem)?;
            cycles += 1;
            if self.is_idle() {
                return Ok(cycles);
            }
        }
    }

    fn step<M: Memory>(&mut self, opcode: &'static Opcode, cycle: u8, mut scratch: Scratch, mem: &mut M) -> Result<()> {
        match opcode.step(cycle, &mut scratch, &mut self.regs, mem) {
            Ok(true) => {
                self.state = State::Idle;
                Ok(())
            }
            Ok(false) => {
                self.state = State::Executing { opcode, cycle, scratch };
                Ok(())
            }
            Err(err) => {
                error!("CPU locked: {} [{}]", err, self.regs);
                self.state = State::Locked(err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Ram;

    #[test]
    fn prefix_fetch_is_its_own_cycle() {
        let mut cpu = Cpu::new(Model::DMGABC);
        let mut mem = Ram::with_program(0x0100, &[0xCB, 0x37]);
        cpu.tick(&mut mem).unwrap();
        assert!(!cpu.is_idle());
        assert!(cpu.in_flight().is_none());
        cpu.tick(&mut mem).unwrap();
        assert!(cpu.is_idle());
        assert_eq!(cpu.regs.pc, 0x0102);
    }

    #[test]
    fn in_flight_reports_progress() {
        let mut cpu = Cpu::new(Model::DMGABC);
        let mut mem = Ram::with_program(0x0100, &[0xC3, 0x00, 0x02]);
        cpu.tick(&mut mem).unwrap();
        let (opcode, cycle) = cpu.in_flight().unwrap();
        assert_eq!(opcode.code, 0xC3);
        assert_eq!(cycle, 1);
        assert_eq!(cpu.run_instruction(&mut mem).unwrap(), 3);
        assert_eq!(cpu.regs.pc, 0x0200);
    }
}
