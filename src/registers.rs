//! The LR35902 register file. There are 8 8-bit registers (one of which, F, holds the ALU flags) that can also be viewed
//! in pairs as 16-bit registers, plus the 16-bit stack pointer and program counter. Two single bit latches round things
//! out: IME (the interrupt master enable) and the halted flag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// There were a few iterations of the Gameboy hardware, and each bootrom leaves the registers in a slightly different
/// state when it hands over control to the cartridge at $0100. If we're skipping the bootrom, the desired Model must be
/// chosen so the registers look like the real bootrom ran.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Model {
    DMG0,
    DMGABC,
    MGB,
}

/// The register file. Instructions mutate this directly; the interrupt service routine and debuggers go through the
/// same fields.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Registers {
    pub a: u8,
    pub f: Flags,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,

    pub ime: bool,
    pub ime_pending: bool, // EI takes effect after the following instruction.
    pub halted: bool,
}

/// CPU flags contained in the "F" register:
/// Z: Zero flag, N: subtract flag, H: half carry flag, C: carry flag
/// The lower nibble of F does not exist in hardware, it always reads back as zero.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Flags {
    pub z: bool, // Bit 7
    pub n: bool, // Bit 6
    pub h: bool, // Bit 5
    pub c: bool, // Bit 4
}

/// The 7 8-bit registers that instructions can name directly. F is only ever touched as a side effect, or as the low
/// half of AF.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[rustfmt::skip]
pub enum Register { A, B, C, D, E, H, L }

/// The 16-bit registers. AF/BC/DE/HL are pairs of 8-bit registers, SP and PC are real 16-bit registers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[rustfmt::skip]
pub enum Register16 { AF, BC, DE, HL, SP, PC }

/// The 4 conditions available to branching instructions (CALL/JP/JR/RET).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Condition {
    NZ, // CPU flag Z is clear
    Z,  // CPU flag Z is set
    NC, // CPU flag C is clear
    C,  // CPU flag C is set
}

impl Registers {
    pub fn new() -> Registers {
        Default::default()
    }

    /// The register state immediately after the bootrom of the given model has handed over to the cartridge.
    pub fn power_on(model: Model) -> Registers {
        let (af, bc, de, hl) = match model {
            Model::DMG0 => (0x0100, 0xFF13, 0x00C1, 0x8403),
            Model::DMGABC => (0x01B0, 0x0013, 0x00D8, 0x014D),
            Model::MGB => (0xFFB0, 0x0013, 0x00D8, 0x014D),
        };

        let mut regs = Registers::new();
        regs.set16(Register16::AF, af);
        regs.set16(Register16::BC, bc);
        regs.set16(Register16::DE, de);
        regs.set16(Register16::HL, hl);
        regs.sp = 0xFFFE;
        regs.pc = 0x0100;
        regs
    }

    /// Returns the current value of an 8-bit register.
    pub fn get(&self, r: Register) -> u8 {
        match r {
            Register::A => self.a,
            Register::B => self.b,
            Register::C => self.c,
            Register::D => self.d,
            Register::E => self.e,
            Register::H => self.h,
            Register::L => self.l,
        }
    }

    /// Sets a new value for an 8-bit register. The other half of the pair is untouched.
    pub fn set(&mut self, r: Register, v: u8) {
        match r {
            Register::A => self.a = v,
            Register::B => self.b = v,
            Register::C => self.c = v,
            Register::D => self.d = v,
            Register::E => self.e = v,
            Register::H => self.h = v,
            Register::L => self.l = v,
        }
    }

    /// Returns the current value of a 16-bit register.
    pub fn get16(&self, rr: Register16) -> u16 {
        let (hi, lo) = match rr {
            Register16::AF => (self.a, self.f.pack()),
            Register16::BC => (self.b, self.c),
            Register16::DE => (self.d, self.e),
            Register16::HL => (self.h, self.l),
            Register16::SP => return self.sp,
            Register16::PC => return self.pc,
        };

        u16::from(hi) << 8 | u16::from(lo)
    }

    /// Sets a new value for a 16-bit register. Writes to AF drop the low nibble of F.
    pub fn set16(&mut self, rr: Register16, v: u16) {
        let (hi, lo) = match rr {
            Register16::AF => {
                self.a = (v >> 8) as u8;
                self.f.unpack(v as u8);
                return;
            }
            Register16::BC => (&mut self.b, &mut self.c),
            Register16::DE => (&mut self.d, &mut self.e),
            Register16::HL => (&mut self.h, &mut self.l),
            Register16::SP => {
                self.sp = v;
                return;
            }
            Register16::PC => {
                self.pc = v;
                return;
            }
        };

        *hi = (v >> 8) as u8;
        *lo = v as u8;
    }

    pub fn af(&self) -> u16 {
        self.get16(Register16::AF)
    }

    pub fn bc(&self) -> u16 {
        self.get16(Register16::BC)
    }

    pub fn de(&self) -> u16 {
        self.get16(Register16::DE)
    }

    pub fn hl(&self) -> u16 {
        self.get16(Register16::HL)
    }

    /// Reads the byte at PC and bumps PC. Used by instructions fetching their immediate operands.
    pub(crate) fn fetch_pc(&mut self) -> u16 {
        let pc = self.pc;
        self.pc = pc.wrapping_add(1);
        pc
    }

    /// Checks if current state of CPU flags satisfies a particular Condition. Unconditional branches pass None.
    pub fn check(&self, cc: Option<Condition>) -> bool {
        match cc {
            None => true,
            Some(Condition::NZ) => !self.f.z,
            Some(Condition::Z) => self.f.z,
            Some(Condition::NC) => !self.f.c,
            Some(Condition::C) => self.f.c,
        }
    }
}

impl Flags {
    /// Converts the CPU flags into an 8-bit value.
    pub fn pack(self) -> u8 {
        (if self.z { 0b1000_0000 } else { 0 })
            | if self.n { 0b0100_0000 } else { 0 }
            | if self.h { 0b0010_0000 } else { 0 }
            | if self.c { 0b0001_0000 } else { 0 }
    }

    /// Converts an 8-bit value into CPU flags. The low nibble is discarded.
    pub fn unpack(&mut self, v: u8) {
        self.z = v & 0b1000_0000 > 0;
        self.n = v & 0b0100_0000 > 0;
        self.h = v & 0b0010_0000 > 0;
        self.c = v & 0b0001_0000 > 0;
    }

    /// Sets all four flags at once.
    pub(crate) fn set(&mut self, z: bool, n: bool, h: bool, c: bool) {
        self.z = z;
        self.n = n;
        self.h = h;
        self.c = c;
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "AF={:04X} BC={:04X} DE={:04X} HL={:04X} SP={:04X} PC={:04X} IME={} HALT={}",
            self.af(),
            self.bc(),
            self.de(),
            self.hl(),
            self.sp,
            self.pc,
            u8::from(self.ime),
            u8::from(self.halted),
        )
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Register::A => write!(f, "a"),
            Register::B => write!(f, "b"),
            Register::C => write!(f, "c"),
            Register::D => write!(f, "d"),
            Register::E => write!(f, "e"),
            Register::H => write!(f, "h"),
            Register::L => write!(f, "l"),
        }
    }
}

impl fmt::Display for Register16 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Register16::AF => write!(f, "af"),
            Register16::BC => write!(f, "bc"),
            Register16::DE => write!(f, "de"),
            Register16::HL => write!(f, "hl"),
            Register16::SP => write!(f, "sp"),
            Register16::PC => write!(f, "pc"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Condition::NZ => write!(f, "nz"),
            Condition::Z => write!(f, "z"),
            Condition::NC => write!(f, "nc"),
            Condition::C => write!(f, "c"),
        }
    }
}
