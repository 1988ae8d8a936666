use lr35902_core::{Model, Register, Register16, Registers};
use proptest::prelude::*;

mod common;

const PAIRS: [(Register, Register, Register16); 3] = [
    (Register::B, Register::C, Register16::BC),
    (Register::D, Register::E, Register16::DE),
    (Register::H, Register::L, Register16::HL),
];

#[test]
fn byte_independence_exhaustive() {
    let mut regs = Registers::new();
    for (hi, lo, _) in PAIRS.iter() {
        for v in 0..=255u8 {
            regs.set(*hi, 0xA5);
            regs.set(*lo, v);
            assert_eq!(regs.get(*hi), 0xA5);
            regs.set(*hi, v);
            assert_eq!(regs.get(*lo), v);
        }
    }
}

proptest! {
    #[test]
    fn pair_views_agree(hi in any::<u8>(), lo in any::<u8>(), pair in 0usize..3) {
        let (rh, rl, rr) = PAIRS[pair];
        let mut regs = Registers::new();
        regs.set(rh, hi);
        regs.set(rl, lo);
        prop_assert_eq!(regs.get16(rr), u16::from(hi) << 8 | u16::from(lo));

        regs.set16(rr, !regs.get16(rr));
        prop_assert_eq!(regs.get(rh), !hi);
        prop_assert_eq!(regs.get(rl), !lo);
    }

    #[test]
    fn af_low_nibble_never_sticks(v in any::<u16>()) {
        let mut regs = Registers::new();
        regs.set16(Register16::AF, v);
        prop_assert_eq!(regs.af(), v & 0xFFF0);
        prop_assert_eq!(regs.a, (v >> 8) as u8);
    }

    #[test]
    fn push_pop_round_trips_through_any_pair(v in any::<u16>(), sp in 0xC002u16..0xDFFE) {
        // PUSH BC ; POP DE
        let (mut cpu, mut mem) = common::setup(&[0xC5, 0xD1]);
        cpu.regs.sp = sp;
        cpu.regs.set16(Register16::BC, v);
        prop_assert_eq!(common::step(&mut cpu, &mut mem), 4);
        prop_assert_eq!(cpu.regs.sp, sp.wrapping_sub(2));
        prop_assert_eq!(common::step(&mut cpu, &mut mem), 3);
        prop_assert_eq!(cpu.regs.de(), v);
        prop_assert_eq!(cpu.regs.sp, sp);
    }
}

#[test]
fn register_dump_json_round_trip() {
    let mut regs = Registers::power_on(Model::MGB);
    regs.ime = true;
    regs.halted = true;

    let json = serde_json::to_string(&regs).unwrap();
    let back: Registers = serde_json::from_str(&json).unwrap();
    assert_eq!(back, regs);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["a"], 0xFF);
    assert_eq!(value["pc"], 0x0100);
    assert_eq!(value["f"]["z"], true);
}

#[test]
fn model_is_config_friendly() {
    let model: Model = serde_json::from_str("\"DMG0\"").unwrap();
    assert_eq!(model, Model::DMG0);
    assert_eq!(Registers::power_on(model).bc(), 0xFF13);
}

#[test]
fn cold_boot_is_all_zero() {
    let regs = Registers::default();
    assert_eq!(regs.af(), 0);
    assert_eq!(regs.pc, 0);
    assert_eq!(regs.sp, 0);
    assert!(!regs.ime);
}
