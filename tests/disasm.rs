use lr35902_core::disasm::disassemble_at;
use lr35902_core::{disassemble, tables, Instruction};

#[test]
fn listing() {
    let program = [
        0x31, 0xFE, 0xFF, // ld sp, $fffe
        0xAF, // xor a
        0x21, 0xFF, 0x9F, // ld hl, $9fff
        0x32, // ld [hl-], a
        0xCB, 0x7C, // bit 7, h
        0x20, 0xFB, // jr nz, -5
        0xE2, // ld [$ff00+c], a
        0xCD, 0x95, 0x00, // call $0095
        0xC8, // ret z
        0xD3, // invalid
    ];

    let mut addr = 0u16;
    let mut lines = Vec::new();
    while (addr as usize) < program.len() {
        let d = disassemble_at(&program, addr);
        addr += d.bytes.len() as u16;
        lines.push(d.to_string());
    }

    assert_eq!(
        lines,
        vec![
            "ld sp, $fffe",
            "xor a",
            "ld hl, $9fff",
            "ld [hl-], a",
            "bit 7, h",
            "jr nz, -5",
            "ld [$ff00+c], a",
            "call $0095",
            "ret z",
            "invalid",
        ]
    );
}

#[test]
fn byte_counts_match_opcode_lengths() {
    for code in 0..=255u8 {
        let op = tables().plain(code);
        if op.instruction == Instruction::Invalid {
            continue;
        }
        let bytes = [code, 0x01, 0x02];
        let mut i = 0;
        let d = disassemble(|| {
            let b = bytes[i];
            i += 1;
            b
        });
        assert_eq!(d.bytes.len() as u8, op.length(), "{}", op);
        assert_eq!(d.instruction, op.instruction);
    }
}
