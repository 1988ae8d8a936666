#[macro_use]
extern crate bencher;

use bencher::Bencher;
use lr35902_core::{disassemble, Cpu, DispatchTables, Model, Ram};

fn nop_sled(bench: &mut Bencher) {
    let mut cpu = Cpu::new(Model::DMGABC);
    let mut mem = Ram::new();

    bench.iter(|| {
        cpu.regs.pc = 0;
        for _ in 0..1000 {
            cpu.tick(&mut mem).unwrap();
        }
    });
}

fn counting_loop(bench: &mut Bencher) {
    // LD B,0 ; loop: INC A ; ADD A,(HL) ; DEC B ; JR NZ,loop ; HALT
    let mut mem = Ram::with_program(0x0100, &[0x06, 0x00, 0x3C, 0x86, 0x05, 0x20, 0xFB, 0x76]);
    let mut cpu = Cpu::new(Model::DMGABC);

    bench.iter(|| {
        cpu.reset(Model::DMGABC);
        while !cpu.regs.halted {
            cpu.run_instruction(&mut mem).unwrap();
        }
    });
}

fn build_tables(bench: &mut Bencher) {
    bench.iter(DispatchTables::build);
}

fn disassemble_all(bench: &mut Bencher) {
    bench.iter(|| {
        for code in 0..=255u8 {
            let bytes = [code, 0x34, 0x12];
            let mut i = 0;
            bencher::black_box(disassemble(|| {
                let b = bytes[i];
                i += 1;
                b
            }));
        }
    });
}

benchmark_group!(benches, nop_sled, counting_loop, build_tables, disassemble_all);
benchmark_main!(benches);
