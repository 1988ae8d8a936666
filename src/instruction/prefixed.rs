//! The CB-prefixed bit operations. Cycle 1 here is the fetch of the second opcode byte, so register forms finish right
//! away. (HL) forms read on cycle 2 and, except for BIT, write the result back on cycle 3.

use super::{read_operand, write_operand, Instruction, Scratch, Step};
use crate::alu;
use crate::memory::Memory;
use crate::registers::Registers;

pub(super) fn step<M: Memory>(ins: Instruction, cycle: u8, s: &mut Scratch, regs: &mut Registers, mem: &mut M) -> Step {
    let o = match ins {
        Instruction::SHIFT(_, o) | Instruction::BIT(_, o) | Instruction::RES(_, o) | Instruction::SET(_, o) => o,
        _ => return Step::Overrun,
    };
    let writes_back = match ins {
        Instruction::BIT(..) => false,
        _ => true,
    };
    let last = match (o.is_memory(), writes_back) {
        (false, _) => 1,
        (true, false) => 2,
        (true, true) => 3,
    };

    if cycle > last {
        return Step::Overrun;
    }
    if o.is_memory() && cycle == 1 {
        return Step::Continue;
    }
    if o.is_memory() && cycle == 2 {
        s.value = read_operand(o, s, regs, mem);
        if writes_back {
            return Step::Continue;
        }
    }

    let v = if o.is_memory() { s.value } else { read_operand(o, s, regs, mem) };
    match ins {
        Instruction::SHIFT(op, _) => {
            let (result, carry) = alu::shift(op, v, regs.f.c);
            regs.f.set(result == 0, false, false, carry);
            write_operand(o, result, s, regs, mem);
        }
        Instruction::BIT(b, _) => {
            regs.f.z = v & (1 << b) == 0;
            regs.f.n = false;
            regs.f.h = true;
        }
        Instruction::RES(b, _) => write_operand(o, v & !(1 << b), s, regs, mem),
        Instruction::SET(b, _) => write_operand(o, v | (1 << b), s, regs, mem),
        _ => unreachable!(),
    }
    Step::Retire
}

#[cfg(test)]
mod tests {
    use crate::alu::Shift;
    use crate::instruction::{Instruction, Opcode, Operand, Scratch};
    use crate::memory::{Memory, Ram};
    use crate::registers::{Register, Register16, Registers};

    #[test]
    fn swap_hl_reads_then_writes() {
        let mut regs = Registers::new();
        let mut mem = Ram::new();
        regs.set16(Register16::HL, 0xC000);
        mem.write(0xC000, 0xF0);

        let op = Opcode::new(0x36, true, Instruction::SHIFT(Shift::SWAP, Operand::Address(Register16::HL)));
        let mut s = Scratch::new();
        assert!(!op.step(1, &mut s, &mut regs, &mut mem).unwrap());
        assert!(!op.step(2, &mut s, &mut regs, &mut mem).unwrap());
        assert_eq!(mem.read(0xC000), 0xF0);
        assert!(op.step(3, &mut s, &mut regs, &mut mem).unwrap());
        assert_eq!(mem.read(0xC000), 0x0F);
        assert!(!regs.f.z);
    }

    #[test]
    fn bit_preserves_carry() {
        let mut regs = Registers::new();
        let mut mem = Ram::new();
        regs.f.c = true;
        regs.b = 0x80;
        let op = Opcode::new(0x78, true, Instruction::BIT(7, Operand::Register(Register::B)));
        assert!(op.step(1, &mut Scratch::new(), &mut regs, &mut mem).unwrap());
        assert!(!regs.f.z);
        assert!(regs.f.h);
        assert!(regs.f.c);
    }

    #[test]
    fn res_and_set_leave_flags() {
        let mut regs = Registers::new();
        let mut mem = Ram::new();
        regs.f.unpack(0xF0);
        regs.a = 0xFF;
        let op = Opcode::new(0x87, true, Instruction::RES(0, Operand::Register(Register::A)));
        op.step(1, &mut Scratch::new(), &mut regs, &mut mem).unwrap();
        assert_eq!(regs.a, 0xFE);
        let op = Opcode::new(0xC7, true, Instruction::SET(0, Operand::Register(Register::A)));
        op.step(1, &mut Scratch::new(), &mut regs, &mut mem).unwrap();
        assert_eq!(regs.a, 0xFF);
        assert_eq!(regs.f.pack(), 0xF0);
    }
}
