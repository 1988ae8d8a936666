//! The LR35902 instruction set, modelled as one `Opcode` object per opcode byte. Each opcode is a small state machine
//! that is stepped once per M-cycle by the driver in `cpu`. A step performs exactly the work the hardware does in that
//! M-cycle: at most one memory read or write, plus whatever register updates land on that cycle.
//!
//! Cycle 1 of every instruction is the M-cycle in which its opcode byte is fetched. The driver performs that fetch, so
//! cycle 1 never touches memory. For CB-prefixed instructions cycle 1 is the fetch of the second opcode byte; the
//! fetch of the $CB prefix itself is an extra M-cycle owned by the driver.
//!
//! Opcode objects are shared and immutable. Anything an instruction needs to remember between its cycles (fetched
//! operand bytes, a value read from memory) lives in a `Scratch` value that the driver creates when the instruction
//! starts and threads through every subsequent step.

mod arith;
mod control;
mod load;
mod prefixed;
mod stack;

use crate::alu::Shift;
use crate::error::{Error, Result, Violation};
use crate::memory::Memory;
use crate::registers::{Condition, Register, Register16, Registers};
use std::fmt;

/// The instructions of the LR35902. Like the CPU itself, many instructions do the same thing on different operands,
/// so a single variant covers e.g. every 8-bit LD. Immediate operands don't carry values here: they're fetched from
/// memory while the instruction executes.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Instruction {
    NOP,
    STOP,
    HALT,
    DI,
    EI,
    DAA,
    CPL,
    SCF,
    CCF,
    LD(Operand, Operand),
    LD16(Register16),
    LD_a16_SP,
    LD_SP_HL,
    LD_HL_SP_r8,
    ADD_SP_r8,
    PUSH(Register16),
    POP(Register16),
    ALU(AluOp, Operand),
    INC(Operand),
    DEC(Operand),
    INC16(Register16),
    DEC16(Register16),
    ADD16(Register16),
    ROTATE_A(Shift),
    JP(Option<Condition>),
    JP_HL,
    JR(Option<Condition>),
    CALL(Option<Condition>),
    RET(Option<Condition>),
    RETI,
    RST(u8),
    SHIFT(Shift, Operand),
    BIT(u8, Operand),
    RES(u8, Operand),
    SET(u8, Operand),
    Invalid,
}

/// The 8 accumulator operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[rustfmt::skip]
pub enum AluOp { ADD, ADC, SUB, SBC, AND, XOR, OR, CP }

/// Where an 8-bit instruction gets its value from / puts its result.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operand {
    Register(Register),   // Get/set an 8-bit register.
    Immediate,            // An 8-bit value following the opcode.
    Address(Register16),  // Value at memory address specified by 16-bit register.
    AddressInc,           // Memory address pointed to by HL. Increment HL after use.
    AddressDec,           // Memory address pointed to by HL. Decrement HL after use.
    ImmediateAddress,     // 16-bit value following the opcode, interpreted as memory address.
    ImmediateAddressHigh, // 8-bit value following the opcode, interpreted as offset from $FF00.
    AddressHigh,          // C register interpreted as offset from $FF00.
}

/// Documented duration of an instruction in M-cycles. Only conditional branches have different min/max durations: min
/// is the branch-not-taken path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timing {
    pub min: u8,
    pub max: u8,
}

/// An entry in one of the dispatch tables.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Opcode {
    pub code: u8,
    pub prefixed: bool,
    pub instruction: Instruction,
}

/// Per-invocation working state of an instruction. Stepping cycle 1 wipes it, so whatever was left over from a previous
/// invocation never leaks into the next one. The opcode objects themselves hold no state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Scratch {
    cycle: u8,
    retired: bool,
    pub(crate) lo: u8,
    pub(crate) hi: u8,
    pub(crate) value: u8,
}

/// What a single step of an instruction amounted to.
pub(crate) enum Step {
    Continue,
    Retire,
    Overrun,
}

impl Scratch {
    pub fn new() -> Scratch {
        Default::default()
    }

    /// The last cycle that was successfully stepped with this scratch, 0 if none.
    pub fn cycle(&self) -> u8 {
        self.cycle
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    /// The 16-bit immediate operand fetched into lo/hi.
    pub(crate) fn word(&self) -> u16 {
        u16::from(self.hi) << 8 | u16::from(self.lo)
    }
}

impl Opcode {
    pub fn new(code: u8, prefixed: bool, instruction: Instruction) -> Opcode {
        Opcode {
            code,
            prefixed,
            instruction,
        }
    }

    pub fn mnemonic(&self) -> String {
        self.instruction.to_string()
    }

    /// Encoded size of the instruction in bytes, including the $CB prefix and any immediate operand.
    pub fn length(&self) -> u8 {
        self.instruction.length()
    }

    /// Documented M-cycle cost, including the fetch of the $CB prefix.
    pub fn timing(&self) -> Timing {
        self.instruction.timing()
    }

    /// The highest cycle number this opcode's step accepts.
    pub fn last_cycle(&self) -> u8 {
        self.timing().max - u8::from(self.instruction.is_prefixed())
    }

    /// Runs a single M-cycle of this instruction. Returns Ok(true) on the cycle that completes the instruction, by which
    /// point every register and flag update has been applied.
    /// `cycle` starts at 1, which reinitialises the scratch, and must increase by exactly one on every call until
    /// retirement. Cycle 1 is only accepted on a fresh or retired scratch.
    pub fn step<M: Memory>(&self, cycle: u8, scratch: &mut Scratch, regs: &mut Registers, mem: &mut M) -> Result<bool> {
        let last = self.last_cycle();
        let violation = if cycle == 0 {
            Some(Violation::CycleZero)
        } else if cycle > last {
            Some(Violation::BeyondLastCycle { last })
        } else if cycle == 1 {
            // A scratch that has stepped but not retired belongs to an instruction still in flight.
            if scratch.cycle != 0 && !scratch.retired {
                Some(Violation::OutOfSequence {
                    expected: scratch.cycle.wrapping_add(1),
                })
            } else {
                None
            }
        } else if scratch.retired {
            Some(Violation::AfterRetirement)
        } else if cycle != scratch.cycle.wrapping_add(1) {
            Some(Violation::OutOfSequence {
                expected: scratch.cycle.wrapping_add(1),
            })
        } else {
            None
        };
        if let Some(violation) = violation {
            return Err(self.violation(cycle, violation));
        }

        if cycle == 1 {
            *scratch = Scratch::new();
        }

        use Instruction::*;
        let step = match self.instruction {
            LD(..) | LD16(_) | LD_a16_SP | LD_SP_HL | LD_HL_SP_r8 => load::step(self.instruction, cycle, scratch, regs, mem),
            ALU(..) | INC(_) | DEC(_) | INC16(_) | DEC16(_) | ADD16(_) | ADD_SP_r8 | DAA | CPL | SCF | CCF | ROTATE_A(_) => {
                arith::step(self.instruction, cycle, scratch, regs, mem)
            }
            PUSH(_) | POP(_) => stack::step(self.instruction, cycle, scratch, regs, mem),
            NOP | STOP | HALT | DI | EI | JP(_) | JP_HL | JR(_) | CALL(_) | RET(_) | RETI | RST(_) => {
                control::step(self.instruction, cycle, scratch, regs, mem)
            }
            SHIFT(..) | BIT(..) | RES(..) | SET(..) => prefixed::step(self.instruction, cycle, scratch, regs, mem),
            Invalid => {
                // The hardware locks up on these. We refuse to touch anything and let the driver decide what to do.
                scratch.retired = true;
                return Err(Error::UnsupportedOpcode {
                    opcode: self.code,
                    prefixed: self.prefixed,
                });
            }
        };

        match step {
            Step::Continue => {
                scratch.cycle = cycle;
                Ok(false)
            }
            Step::Retire => {
                scratch.cycle = cycle;
                scratch.retired = true;
                Ok(true)
            }
            Step::Overrun => Err(self.violation(cycle, Violation::BeyondLastCycle { last })),
        }
    }

    fn violation(&self, cycle: u8, violation: Violation) -> Error {
        Error::ProtocolViolation {
            opcode: self.code,
            prefixed: self.prefixed,
            cycle,
            violation,
        }
    }
}

impl Instruction {
    /// True for the instructions that live in the CB-prefixed opcode space.
    pub fn is_prefixed(&self) -> bool {
        match self {
            Instruction::SHIFT(..) | Instruction::BIT(..) | Instruction::RES(..) | Instruction::SET(..) => true,
            _ => false,
        }
    }

    /// Returns how many bytes of memory this instruction is encoded in.
    pub fn length(&self) -> u8 {
        use Instruction::*;
        1 + match self {
            LD(dst, src) => dst.size() + src.size(),
            ALU(_, o) => o.size(),
            LD16(_) | LD_a16_SP | JP(_) | CALL(_) => 2,
            LD_HL_SP_r8 | ADD_SP_r8 | JR(_) | STOP => 1,
            SHIFT(..) | BIT(..) | RES(..) | SET(..) => 1,
            _ => 0,
        }
    }

    /// The documented number of M-cycles this instruction takes.
    pub fn timing(&self) -> Timing {
        use Instruction::*;
        let (min, max) = match *self {
            NOP | STOP | HALT | DI | EI | DAA | CPL | SCF | CCF | ROTATE_A(_) | JP_HL | Invalid => (1, 1),
            LD(dst, src) => {
                let n = 1 + dst.size() + src.size() + u8::from(dst.is_memory()) + u8::from(src.is_memory());
                (n, n)
            }
            ALU(_, o) => {
                let n = 1 + o.size() + u8::from(o.is_memory());
                (n, n)
            }
            INC(o) | DEC(o) => {
                let n = if o.is_memory() { 3 } else { 1 };
                (n, n)
            }
            INC16(_) | DEC16(_) | ADD16(_) | LD_SP_HL => (2, 2),
            LD16(_) | POP(_) | LD_HL_SP_r8 => (3, 3),
            PUSH(_) | ADD_SP_r8 | RETI | RST(_) => (4, 4),
            LD_a16_SP => (5, 5),
            JP(None) => (4, 4),
            JP(Some(_)) => (3, 4),
            JR(None) => (3, 3),
            JR(Some(_)) => (2, 3),
            CALL(None) => (6, 6),
            CALL(Some(_)) => (3, 6),
            RET(None) => (4, 4),
            RET(Some(_)) => (2, 5),
            SHIFT(_, o) | RES(_, o) | SET(_, o) => {
                let n = if o.is_memory() { 4 } else { 2 };
                (n, n)
            }
            BIT(_, o) => {
                let n = if o.is_memory() { 3 } else { 2 };
                (n, n)
            }
        };
        Timing { min, max }
    }

    /// Renders the instruction, substituting the immediate operand (if known) for its placeholder.
    pub(crate) fn render(&self, f: &mut fmt::Formatter, imm: Option<u16>) -> fmt::Result {
        use Instruction::*;
        match *self {
            NOP => write!(f, "nop"),
            STOP => write!(f, "stop"),
            HALT => write!(f, "halt"),
            DI => write!(f, "di"),
            EI => write!(f, "ei"),
            DAA => write!(f, "daa"),
            CPL => write!(f, "cpl"),
            SCF => write!(f, "scf"),
            CCF => write!(f, "ccf"),
            LD(dst, src) => {
                write!(f, "ld ")?;
                dst.render(f, imm)?;
                write!(f, ", ")?;
                src.render(f, imm)
            }
            LD16(rr) => match imm {
                Some(v) => write!(f, "ld {}, ${:04x}", rr, v),
                None => write!(f, "ld {}, d16", rr),
            },
            LD_a16_SP => {
                write!(f, "ld [")?;
                a16(f, imm)?;
                write!(f, "], sp")
            }
            LD_SP_HL => write!(f, "ld sp, hl"),
            LD_HL_SP_r8 => {
                write!(f, "ld hl, sp")?;
                match imm {
                    Some(_) => r8(f, imm),
                    None => write!(f, "+r8"),
                }
            }
            ADD_SP_r8 => {
                write!(f, "add sp, ")?;
                r8(f, imm)
            }
            PUSH(rr) => write!(f, "push {}", rr),
            POP(rr) => write!(f, "pop {}", rr),
            ALU(op, o) => {
                match op {
                    AluOp::ADD => write!(f, "add a, ")?,
                    AluOp::ADC => write!(f, "adc a, ")?,
                    AluOp::SUB => write!(f, "sub a, ")?,
                    AluOp::SBC => write!(f, "sbc a, ")?,
                    AluOp::AND => write!(f, "and ")?,
                    AluOp::XOR => write!(f, "xor ")?,
                    AluOp::OR => write!(f, "or ")?,
                    AluOp::CP => write!(f, "cp ")?,
                }
                o.render(f, imm)
            }
            INC(o) => {
                write!(f, "inc ")?;
                o.render(f, imm)
            }
            DEC(o) => {
                write!(f, "dec ")?;
                o.render(f, imm)
            }
            INC16(rr) => write!(f, "inc {}", rr),
            DEC16(rr) => write!(f, "dec {}", rr),
            ADD16(rr) => write!(f, "add hl, {}", rr),
            ROTATE_A(op) => match op {
                Shift::RLC => write!(f, "rlca"),
                Shift::RRC => write!(f, "rrca"),
                Shift::RL => write!(f, "rla"),
                Shift::RR => write!(f, "rra"),
                _ => write!(f, "{} a", shift_name(op)),
            },
            JP(cc) => {
                write!(f, "jp ")?;
                if let Some(cc) = cc {
                    write!(f, "{}, ", cc)?;
                }
                a16(f, imm)
            }
            JP_HL => write!(f, "jp hl"),
            JR(cc) => {
                write!(f, "jr ")?;
                if let Some(cc) = cc {
                    write!(f, "{}, ", cc)?;
                }
                r8(f, imm)
            }
            CALL(cc) => {
                write!(f, "call ")?;
                if let Some(cc) = cc {
                    write!(f, "{}, ", cc)?;
                }
                a16(f, imm)
            }
            RET(None) => write!(f, "ret"),
            RET(Some(cc)) => write!(f, "ret {}", cc),
            RETI => write!(f, "reti"),
            RST(vec) => write!(f, "rst ${:02x}", vec),
            SHIFT(op, o) => {
                write!(f, "{} ", shift_name(op))?;
                o.render(f, imm)
            }
            BIT(b, o) => {
                write!(f, "bit {}, ", b)?;
                o.render(f, imm)
            }
            RES(b, o) => {
                write!(f, "res {}, ", b)?;
                o.render(f, imm)
            }
            SET(b, o) => {
                write!(f, "set {}, ", b)?;
                o.render(f, imm)
            }
            Invalid => write!(f, "invalid"),
        }
    }
}

fn r8(f: &mut fmt::Formatter, imm: Option<u16>) -> fmt::Result {
    match imm {
        Some(v) => write!(f, "{:+}", v as u8 as i8),
        None => write!(f, "r8"),
    }
}

fn a16(f: &mut fmt::Formatter, imm: Option<u16>) -> fmt::Result {
    match imm {
        Some(v) => write!(f, "${:04x}", v),
        None => write!(f, "a16"),
    }
}

fn shift_name(op: Shift) -> &'static str {
    match op {
        Shift::RLC => "rlc",
        Shift::RRC => "rrc",
        Shift::RL => "rl",
        Shift::RR => "rr",
        Shift::SLA => "sla",
        Shift::SRA => "sra",
        Shift::SWAP => "swap",
        Shift::SRL => "srl",
    }
}

impl Operand {
    /// Returns how many immediate bytes this operand is encoded in, between 0 and 2.
    pub fn size(self) -> u8 {
        match self {
            Operand::Immediate | Operand::ImmediateAddressHigh => 1,
            Operand::ImmediateAddress => 2,
            _ => 0,
        }
    }

    /// True if reading or writing this operand goes out on the memory bus.
    pub fn is_memory(self) -> bool {
        match self {
            Operand::Register(_) | Operand::Immediate => false,
            _ => true,
        }
    }

    /// Resolves the memory address of this operand, applying the HL post increment/decrement.
    fn address(self, scratch: &Scratch, regs: &mut Registers) -> u16 {
        match self {
            Operand::Address(rr) => regs.get16(rr),
            Operand::AddressInc => {
                let hl = regs.hl();
                regs.set16(Register16::HL, hl.wrapping_add(1));
                hl
            }
            Operand::AddressDec => {
                let hl = regs.hl();
                regs.set16(Register16::HL, hl.wrapping_sub(1));
                hl
            }
            Operand::ImmediateAddress => scratch.word(),
            Operand::ImmediateAddressHigh => 0xFF00 | u16::from(scratch.lo),
            Operand::AddressHigh => 0xFF00 | u16::from(regs.c),
            Operand::Register(_) | Operand::Immediate => unreachable!("{:?} has no address", self),
        }
    }

    fn render(self, f: &mut fmt::Formatter, imm: Option<u16>) -> fmt::Result {
        match (self, imm) {
            (Operand::Register(r), _) => write!(f, "{}", r),
            (Operand::Immediate, Some(v)) => write!(f, "${:02x}", v),
            (Operand::Immediate, None) => write!(f, "d8"),
            (Operand::Address(rr), _) => write!(f, "[{}]", rr),
            (Operand::AddressInc, _) => write!(f, "[hl+]"),
            (Operand::AddressDec, _) => write!(f, "[hl-]"),
            (Operand::ImmediateAddress, Some(v)) => write!(f, "[${:04x}]", v),
            (Operand::ImmediateAddress, None) => write!(f, "[a16]"),
            (Operand::ImmediateAddressHigh, Some(v)) => write!(f, "[$ff00+${:02x}]", v),
            (Operand::ImmediateAddressHigh, None) => write!(f, "[$ff00+a8]"),
            (Operand::AddressHigh, _) => write!(f, "[$ff00+c]"),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.render(f, None)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.render(f, None)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.prefixed {
            write!(f, "$cb ${:02x} {}", self.code, self.instruction)
        } else {
            write!(f, "${:02x} {}", self.code, self.instruction)
        }
    }
}

/// Fetches the immediate operand bytes that follow the opcode. The low byte arrives on cycle 2, the high byte (if there
/// is one) on cycle 3. Does nothing on any other cycle.
fn fetch_immediate<M: Memory>(cycle: u8, len: u8, scratch: &mut Scratch, regs: &mut Registers, mem: &mut M) {
    if cycle < 2 || cycle > 1 + len {
        return;
    }
    let v = mem.read(regs.fetch_pc());
    if cycle == 2 {
        scratch.lo = v;
    } else {
        scratch.hi = v;
    }
}

/// Resolves an 8-bit operand into a concrete value. Memory operands perform their bus read here.
fn read_operand<M: Memory>(o: Operand, scratch: &Scratch, regs: &mut Registers, mem: &mut M) -> u8 {
    match o {
        Operand::Register(r) => regs.get(r),
        Operand::Immediate => scratch.lo,
        _ => {
            let addr = o.address(scratch, regs);
            mem.read(addr)
        }
    }
}

/// Saves an 8-bit value into an operand destination. Memory operands perform their bus write here.
fn write_operand<M: Memory>(o: Operand, v: u8, scratch: &Scratch, regs: &mut Registers, mem: &mut M) {
    match o {
        Operand::Register(r) => regs.set(r, v),
        Operand::Immediate => unreachable!("attempted to write to immediate operand"),
        _ => {
            let addr = o.address(scratch, regs);
            mem.write(addr, v)
        }
    }
}

/// The three M-cycles of pushing a 16-bit value: an internal decrement of SP, then the high byte, then the low byte.
/// `n` is 0, 1, or 2 for those three cycles. Returns true once the low byte has been written.
fn push_cycle<M: Memory>(n: u8, v: u16, regs: &mut Registers, mem: &mut M) -> bool {
    match n {
        0 => {
            regs.sp = regs.sp.wrapping_sub(1);
            false
        }
        1 => {
            mem.write(regs.sp, (v >> 8) as u8);
            regs.sp = regs.sp.wrapping_sub(1);
            false
        }
        _ => {
            mem.write(regs.sp, v as u8);
            true
        }
    }
}

/// Pops one byte off the stack.
fn pop_byte<M: Memory>(regs: &mut Registers, mem: &mut M) -> u8 {
    let v = mem.read(regs.sp);
    regs.sp = regs.sp.wrapping_add(1);
    v
}
