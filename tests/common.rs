#![allow(dead_code)]

use lr35902_core::{Cpu, Memory, Model, Ram};

/// Where test programs are loaded. Matches the PC the bootrom hands over at.
pub const ORIGIN: u16 = 0x0100;

/// A CPU in post-bootrom state with the given program loaded at $0100. SP points at the top of work RAM so pushes
/// don't land anywhere near the program.
pub fn setup(program: &[u8]) -> (Cpu, Ram) {
    let mut cpu = Cpu::new(Model::DMGABC);
    cpu.regs.sp = 0xDFFE;
    (cpu, Ram::with_program(ORIGIN, program))
}

/// Runs a single instruction to completion, returning the M-cycles it took.
pub fn step(cpu: &mut Cpu, mem: &mut Ram) -> u32 {
    cpu.run_instruction(mem).unwrap()
}

/// A Memory that logs every access, so tests can assert on which bus operations happened on which cycle.
pub struct RecordingMemory {
    pub ram: Ram,
    pub log: Vec<Access>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Access {
    Read(u16),
    Write(u16, u8),
}

impl RecordingMemory {
    pub fn new(ram: Ram) -> RecordingMemory {
        RecordingMemory { ram, log: Vec::new() }
    }

    /// Returns the accesses logged since the last call.
    pub fn take(&mut self) -> Vec<Access> {
        std::mem::replace(&mut self.log, Vec::new())
    }
}

impl Memory for RecordingMemory {
    fn read(&mut self, addr: u16) -> u8 {
        self.log.push(Access::Read(addr));
        self.ram.read(addr)
    }

    fn write(&mut self, addr: u16, v: u8) {
        self.log.push(Access::Write(addr, v));
        self.ram.write(addr, v)
    }
}
