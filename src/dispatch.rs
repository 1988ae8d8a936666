//! The two 256-entry dispatch tables, one for the plain opcode space and one for the CB-prefixed space. They're built once
//! on first use and shared for the life of the process; everything in them is immutable.

use crate::alu::Shift;
use crate::instruction::{AluOp, Instruction, Opcode, Operand};
use crate::registers::{Condition, Register, Register16};
use lazy_static::lazy_static;
use log::debug;

lazy_static! {
    static ref TABLES: DispatchTables = DispatchTables::build();
}

/// The shared dispatch tables.
pub fn tables() -> &'static DispatchTables {
    &TABLES
}

pub struct DispatchTables {
    plain: [Opcode; 256],
    prefixed: [Opcode; 256],
}

impl DispatchTables {
    /// Decodes every opcode in both spaces. Slots for the 11 opcodes with no defined behaviour (and the $CB prefix
    /// itself, which the driver handles before ever consulting the plain table) hold Instruction::Invalid.
    pub fn build() -> DispatchTables {
        let mut plain = [Opcode::new(0, false, Instruction::Invalid); 256];
        let mut prefixed = [Opcode::new(0, true, Instruction::Invalid); 256];
        for code in 0..=255u8 {
            plain[code as usize] = Opcode::new(code, false, decode(code));
            prefixed[code as usize] = Opcode::new(code, true, decode_prefixed(code));
        }
        debug!("built dispatch tables");
        DispatchTables { plain, prefixed }
    }

    pub fn plain(&self, code: u8) -> &Opcode {
        &self.plain[code as usize]
    }

    pub fn prefixed(&self, code: u8) -> &Opcode {
        &self.prefixed[code as usize]
    }

    pub fn resolve(&self, code: u8, prefixed: bool) -> &Opcode {
        if prefixed {
            self.prefixed(code)
        } else {
            self.plain(code)
        }
    }

    /// Iterates over every entry of both tables, plain space first.
    pub fn iter(&self) -> impl Iterator<Item = &Opcode> {
        self.plain.iter().chain(self.prefixed.iter())
    }
}

/// The 8-bit operand encoded in a 3 bit field. 6 is (HL).
fn r(idx: u8) -> Operand {
    match idx & 7 {
        0 => Operand::Register(Register::B),
        1 => Operand::Register(Register::C),
        2 => Operand::Register(Register::D),
        3 => Operand::Register(Register::E),
        4 => Operand::Register(Register::H),
        5 => Operand::Register(Register::L),
        6 => Operand::Address(Register16::HL),
        _ => Operand::Register(Register::A),
    }
}

/// The 16-bit register encoded in a 2 bit field. `af` selects the PUSH/POP flavour where 3 is AF rather than SP.
fn rp(idx: u8, af: bool) -> Register16 {
    match idx & 3 {
        0 => Register16::BC,
        1 => Register16::DE,
        2 => Register16::HL,
        _ if af => Register16::AF,
        _ => Register16::SP,
    }
}

fn cc(idx: u8) -> Condition {
    match idx & 3 {
        0 => Condition::NZ,
        1 => Condition::Z,
        2 => Condition::NC,
        _ => Condition::C,
    }
}

fn alu_op(idx: u8) -> AluOp {
    match idx & 7 {
        0 => AluOp::ADD,
        1 => AluOp::ADC,
        2 => AluOp::SUB,
        3 => AluOp::SBC,
        4 => AluOp::AND,
        5 => AluOp::XOR,
        6 => AluOp::OR,
        _ => AluOp::CP,
    }
}

fn shift_op(idx: u8) -> Shift {
    match idx & 7 {
        0 => Shift::RLC,
        1 => Shift::RRC,
        2 => Shift::RL,
        3 => Shift::RR,
        4 => Shift::SLA,
        5 => Shift::SRA,
        6 => Shift::SWAP,
        _ => Shift::SRL,
    }
}

fn decode(code: u8) -> Instruction {
    use Instruction::*;
    use Operand::{Address, AddressDec, AddressHigh, AddressInc, Immediate, ImmediateAddress, ImmediateAddressHigh};

    let a = Operand::Register(Register::A);
    let y = (code >> 3) & 7;
    let z = code & 7;
    let p = (code >> 4) & 3;

    match code {
        /* NOP        */ 0x00 => NOP,
        /* LD rr,d16  */ 0x01 | 0x11 | 0x21 | 0x31 => LD16(rp(p, false)),
        /* LD (BC),A  */ 0x02 => LD(Address(Register16::BC), a),
        /* LD (DE),A  */ 0x12 => LD(Address(Register16::DE), a),
        /* LD (HL+),A */ 0x22 => LD(AddressInc, a),
        /* LD (HL-),A */ 0x32 => LD(AddressDec, a),
        /* INC rr     */ 0x03 | 0x13 | 0x23 | 0x33 => INC16(rp(p, false)),
        /* INC r      */ 0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => INC(r(y)),
        /* DEC r      */ 0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => DEC(r(y)),
        /* LD r,d8    */ 0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => LD(r(y), Immediate),
        /* RLCA       */ 0x07 => ROTATE_A(Shift::RLC),
        /* RRCA       */ 0x0F => ROTATE_A(Shift::RRC),
        /* RLA        */ 0x17 => ROTATE_A(Shift::RL),
        /* RRA        */ 0x1F => ROTATE_A(Shift::RR),
        /* LD (a16),SP*/ 0x08 => LD_a16_SP,
        /* ADD HL,rr  */ 0x09 | 0x19 | 0x29 | 0x39 => ADD16(rp(p, false)),
        /* LD A,(BC)  */ 0x0A => LD(a, Address(Register16::BC)),
        /* LD A,(DE)  */ 0x1A => LD(a, Address(Register16::DE)),
        /* LD A,(HL+) */ 0x2A => LD(a, AddressInc),
        /* LD A,(HL-) */ 0x3A => LD(a, AddressDec),
        /* DEC rr     */ 0x0B | 0x1B | 0x2B | 0x3B => DEC16(rp(p, false)),
        /* STOP       */ 0x10 => STOP,
        /* JR r8      */ 0x18 => JR(None),
        /* JR cc,r8   */ 0x20 | 0x28 | 0x30 | 0x38 => JR(Some(cc(y))),
        /* DAA        */ 0x27 => DAA,
        /* CPL        */ 0x2F => CPL,
        /* SCF        */ 0x37 => SCF,
        /* CCF        */ 0x3F => CCF,

        /* HALT       */ 0x76 => HALT,
        /* LD r,r     */ 0x40..=0x7F => LD(r(y), r(z)),
        /* ALU A,r    */ 0x80..=0xBF => ALU(alu_op(y), r(z)),

        /* RET cc     */ 0xC0 | 0xC8 | 0xD0 | 0xD8 => RET(Some(cc(y))),
        /* POP rr     */ 0xC1 | 0xD1 | 0xE1 | 0xF1 => POP(rp(p, true)),
        /* JP cc,a16  */ 0xC2 | 0xCA | 0xD2 | 0xDA => JP(Some(cc(y))),
        /* JP a16     */ 0xC3 => JP(None),
        /* CALL cc    */ 0xC4 | 0xCC | 0xD4 | 0xDC => CALL(Some(cc(y))),
        /* PUSH rr    */ 0xC5 | 0xD5 | 0xE5 | 0xF5 => PUSH(rp(p, true)),
        /* ALU A,d8   */ 0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => ALU(alu_op(y), Immediate),
        /* RST        */ 0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => RST(y * 8),
        /* RET        */ 0xC9 => RET(None),
        /* CALL a16   */ 0xCD => CALL(None),
        /* RETI       */ 0xD9 => RETI,
        /* LDH (a8),A */ 0xE0 => LD(ImmediateAddressHigh, a),
        /* LDH A,(a8) */ 0xF0 => LD(a, ImmediateAddressHigh),
        /* LD (C),A   */ 0xE2 => LD(AddressHigh, a),
        /* LD A,(C)   */ 0xF2 => LD(a, AddressHigh),
        /* ADD SP,r8  */ 0xE8 => ADD_SP_r8,
        /* JP HL      */ 0xE9 => JP_HL,
        /* LD (a16),A */ 0xEA => LD(ImmediateAddress, a),
        /* LD A,(a16) */ 0xFA => LD(a, ImmediateAddress),
        /* DI         */ 0xF3 => DI,
        /* EI         */ 0xFB => EI,
        /* LD HL,SP+r8*/ 0xF8 => LD_HL_SP_r8,
        /* LD SP,HL   */ 0xF9 => LD_SP_HL,

        // $CB, plus $D3 $DB $DD $E3 $E4 $EB $EC $ED $F4 $FC $FD.
        _ => Invalid,
    }
}

fn decode_prefixed(code: u8) -> Instruction {
    let y = (code >> 3) & 7;
    let o = r(code);
    match code >> 6 {
        0 => Instruction::SHIFT(shift_op(y), o),
        1 => Instruction::BIT(y, o),
        2 => Instruction::RES(y, o),
        _ => Instruction::SET(y, o),
    }
}
