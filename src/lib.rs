//! A cycle-stepped instruction core for the Sharp LR35902, the CPU at the heart of every Gameboy.
//! The core owns the register file and the instruction set. Everything else (memory map, PPU, timer, interrupt
//! controller) lives on the other side of the `Memory` trait or drives the core through the `Cpu` entrypoints.
//!
//! The core is advanced one M-cycle at a time with `Cpu::tick`. Each instruction is an `Opcode` object that is stepped
//! once per M-cycle and performs at most one memory access per step, so peripherals clocked alongside the CPU observe
//! reads and writes on the exact cycle they happen on hardware.

pub mod alu;
pub mod cpu;
pub mod disasm;
pub mod dispatch;
pub mod error;
pub mod instruction;
pub mod memory;
pub mod registers;

pub use cpu::{Cpu, Interrupt};
pub use dispatch::{tables, DispatchTables};
pub use error::{Error, Result, Violation};
pub use disasm::{disassemble, Disassembly};
pub use instruction::{AluOp, Instruction, Opcode, Operand, Scratch, Timing};
pub use memory::{Memory, Ram};
pub use registers::{Condition, Flags, Model, Register, Register16, Registers};

/// The byte that selects the CB-prefixed instruction space.
pub const CB_PREFIX: u8 = 0xCB;
