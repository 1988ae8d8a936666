use lr35902_core::alu::{adc8, add8, sbc8, sub8};
use lr35902_core::{AluOp, Instruction, Model, Operand, Ram, Register};

mod common;

#[test]
fn add_flag_laws() {
    for a in 0..=255u8 {
        for b in 0..=255u8 {
            let r = add8(a, b);
            assert_eq!(r.value, a.wrapping_add(b));
            assert_eq!(r.half_carry, (a ^ b ^ r.value) & 0x10 != 0);
            assert_eq!(r.carry, u16::from(a) + u16::from(b) > 0xFF);
        }
    }
}

#[test]
fn adc_flag_laws() {
    for &carry in &[false, true] {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let r = adc8(a, b, carry);
                let c = u16::from(carry);
                assert_eq!(u16::from(r.value), (u16::from(a) + u16::from(b) + c) & 0xFF);
                assert_eq!(r.half_carry, u16::from(a & 0xF) + u16::from(b & 0xF) + c > 0xF);
                assert_eq!(r.carry, u16::from(a) + u16::from(b) + c > 0xFF);
            }
        }
    }
}

#[test]
fn sub_flag_laws() {
    for a in 0..=255u8 {
        for b in 0..=255u8 {
            let r = sub8(a, b);
            assert_eq!(r.value, a.wrapping_sub(b));
            assert_eq!(r.half_carry, a & 0xF < b & 0xF);
            assert_eq!(r.carry, a < b);
        }
    }
}

// The borrow is folded into both comparisons. Comparing against b alone misses 0x10 - 0x0F - 1 style half borrows and
// the a == b case with an incoming borrow.
#[test]
fn sbc_flag_laws_include_incoming_borrow() {
    for &carry in &[false, true] {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let r = sbc8(a, b, carry);
                let c = i16::from(carry);
                assert_eq!(r.value, a.wrapping_sub(b).wrapping_sub(c as u8));
                assert_eq!(r.half_carry, i16::from(a & 0xF) - i16::from(b & 0xF) - c < 0);
                assert_eq!(r.carry, i16::from(a) - i16::from(b) - c < 0);
            }
        }
    }

    let r = sbc8(0x10, 0x10, true);
    assert_eq!(r.value, 0xFF);
    assert!(r.half_carry);
    assert!(r.carry);
}

// AND d8 stores A & d8, not the immediate operand, and always sets H.
#[test]
fn and_immediate_stores_conjunction_not_operand() {
    let (mut cpu, mut mem) = common::setup(&[0xE6, 0x0F]);
    cpu.regs.a = 0x3C;
    assert_eq!(common::step(&mut cpu, &mut mem), 2);
    assert_eq!(cpu.regs.a, 0x0C);
    assert!(cpu.regs.f.h);
    assert!(!cpu.regs.f.z && !cpu.regs.f.n && !cpu.regs.f.c);
}

#[test]
fn cp_only_touches_flags() {
    for a in (0..=255u8).step_by(7) {
        for b in (0..=255u8).step_by(5) {
            let (mut cpu, mut mem) = common::setup(&[0xFE, b]);
            cpu.regs.a = a;
            common::step(&mut cpu, &mut mem);
            let expected = sub8(a, b);
            assert_eq!(cpu.regs.a, a);
            assert_eq!(cpu.regs.f.z, expected.value == 0);
            assert!(cpu.regs.f.n);
            assert_eq!(cpu.regs.f.h, expected.half_carry);
            assert_eq!(cpu.regs.f.c, expected.carry);
        }
    }
}

#[test]
fn alu_register_forms_match_helpers() {
    let ops = [AluOp::ADD, AluOp::ADC, AluOp::SUB, AluOp::SBC];
    for (i, op) in ops.iter().enumerate() {
        // ADD/ADC/SUB/SBC A,B are $80/$88/$90/$98.
        let code = 0x80 + (i as u8) * 8;
        assert_eq!(
            lr35902_core::tables().plain(code).instruction,
            Instruction::ALU(*op, Operand::Register(Register::B))
        );

        for &(a, b, carry) in &[(0x0F, 0x01, true), (0xFF, 0x01, false), (0x00, 0x01, true), (0x80, 0x80, false)] {
            let mut cpu = lr35902_core::Cpu::new(Model::DMGABC);
            let mut mem = Ram::with_program(0x0100, &[code]);
            cpu.regs.a = a;
            cpu.regs.b = b;
            cpu.regs.f.c = carry;
            cpu.run_instruction(&mut mem).unwrap();

            let expected = match op {
                AluOp::ADD => add8(a, b),
                AluOp::ADC => adc8(a, b, carry),
                AluOp::SUB => sub8(a, b),
                _ => sbc8(a, b, carry),
            };
            assert_eq!(cpu.regs.a, expected.value, "{:?} {:02x} {:02x}", op, a, b);
            assert_eq!(cpu.regs.f.h, expected.half_carry);
            assert_eq!(cpu.regs.f.c, expected.carry);
            assert_eq!(cpu.regs.f.z, expected.value == 0);
            assert_eq!(cpu.regs.f.n, i >= 2);
        }
    }
}

#[test]
fn daa_corrects_every_bcd_sum() {
    for x in 0..100u8 {
        for y in 0..100u8 {
            let bcd = |v: u8| (v / 10) << 4 | (v % 10);
            // ADD A,B ; DAA
            let (mut cpu, mut mem) = common::setup(&[0x80, 0x27]);
            cpu.regs.a = bcd(x);
            cpu.regs.b = bcd(y);
            common::step(&mut cpu, &mut mem);
            common::step(&mut cpu, &mut mem);
            let sum = x + y;
            assert_eq!(cpu.regs.a, bcd(sum % 100), "{} + {}", x, y);
            assert_eq!(cpu.regs.f.c, sum >= 100);
            assert_eq!(cpu.regs.f.z, sum % 100 == 0);
        }
    }
}
