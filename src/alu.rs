//! Arithmetic and bit helpers shared by the instruction state machines. Everything in here is a pure function: operands
//! in, result and flags out. The instructions decide which of the returned flags they actually store into F.

/// The result of an arithmetic operation, along with the two carry flags the LR35902 tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AluResult<T> {
    pub value: T,
    /// Carry out of bit 3 (8-bit) or bit 11 (16-bit). Borrow from bit 4 / bit 12 for subtraction.
    pub half_carry: bool,
    /// Carry out of bit 7 (8-bit) or bit 15 (16-bit). Borrow for subtraction.
    pub carry: bool,
}

/// The eight shift/rotate operations. The first four are also available on A as 1-byte unprefixed opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shift {
    RLC,
    RRC,
    RL,
    RR,
    SLA,
    SRA,
    SWAP,
    SRL,
}

pub fn add8(a: u8, b: u8) -> AluResult<u8> {
    adc8(a, b, false)
}

pub fn adc8(a: u8, b: u8, carry: bool) -> AluResult<u8> {
    let carry = u16::from(carry);
    let wide = u16::from(a) + u16::from(b) + carry;
    AluResult {
        value: wide as u8,
        half_carry: u16::from(a & 0xF) + u16::from(b & 0xF) + carry > 0xF,
        carry: wide > 0xFF,
    }
}

pub fn sub8(a: u8, b: u8) -> AluResult<u8> {
    sbc8(a, b, false)
}

pub fn sbc8(a: u8, b: u8, carry: bool) -> AluResult<u8> {
    let borrow = u16::from(carry);
    AluResult {
        value: a.wrapping_sub(b).wrapping_sub(borrow as u8),
        half_carry: u16::from(a & 0xF) < u16::from(b & 0xF) + borrow,
        carry: u16::from(a) < u16::from(b) + borrow,
    }
}

pub fn add16(a: u16, b: u16) -> AluResult<u16> {
    let (value, carry) = a.overflowing_add(b);
    AluResult {
        value,
        half_carry: (a & 0xFFF) + (b & 0xFFF) > 0xFFF,
        carry,
    }
}

/// SP plus a signed 8-bit offset, as used by ADD SP,e and LD HL,SP+e. The flags are computed as an unsigned 8-bit
/// addition of the offset byte to the low byte of SP, regardless of the offset's sign.
pub fn add_sp_offset(sp: u16, offset: u8) -> AluResult<u16> {
    let low = add8(sp as u8, offset);
    AluResult {
        value: sp.wrapping_add(i16::from(offset as i8) as u16),
        half_carry: low.half_carry,
        carry: low.carry,
    }
}

/// INC r / INC (HL). Carry is never affected by 8-bit increments, so only the half carry is meaningful.
pub fn inc8(v: u8) -> AluResult<u8> {
    add8(v, 1)
}

/// DEC r / DEC (HL). Only the half borrow is meaningful.
pub fn dec8(v: u8) -> AluResult<u8> {
    sub8(v, 1)
}

/// Decimal adjust after an addition or subtraction of two BCD values. Returns the adjusted value and the new carry.
pub fn daa(a: u8, subtract: bool, half_carry: bool, carry: bool) -> (u8, bool) {
    let mut adjust = 0;
    let mut carry_out = carry;

    if subtract {
        if carry {
            adjust |= 0x60;
        }
        if half_carry {
            adjust |= 0x06;
        }
        return (a.wrapping_sub(adjust), carry_out);
    }

    if carry || a > 0x99 {
        adjust |= 0x60;
        carry_out = true;
    }
    if half_carry || a & 0xF > 0x9 {
        adjust |= 0x06;
    }
    (a.wrapping_add(adjust), carry_out)
}

/// Applies one of the shift/rotate operations to a value. Returns the new value and the bit shifted out (which becomes
/// the new carry flag). SWAP never shifts anything out.
pub fn shift(op: Shift, v: u8, carry: bool) -> (u8, bool) {
    match op {
        Shift::RLC => (v.rotate_left(1), v & 0x80 != 0),
        Shift::RRC => (v.rotate_right(1), v & 0x01 != 0),
        Shift::RL => (v << 1 | u8::from(carry), v & 0x80 != 0),
        Shift::RR => (v >> 1 | u8::from(carry) << 7, v & 0x01 != 0),
        Shift::SLA => (v << 1, v & 0x80 != 0),
        Shift::SRA => (v >> 1 | v & 0x80, v & 0x01 != 0),
        Shift::SWAP => (v.rotate_left(4), false),
        Shift::SRL => (v >> 1, v & 0x01 != 0),
    }
}
