//! Instruction disassembly, for debuggers and trace logs.

use crate::dispatch::tables;
use crate::instruction::Instruction;
use crate::CB_PREFIX;
use std::fmt;

/// A single decoded instruction along with the raw bytes it was encoded in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Disassembly {
    pub bytes: Vec<u8>,
    pub instruction: Instruction,
    /// The immediate operand, if the instruction has one. Little endian bytes have already been combined.
    pub operand: Option<u16>,
}

/// Decodes the next instruction, pulling as many bytes as it needs from `fetch`.
pub fn disassemble<F: FnMut() -> u8>(mut fetch: F) -> Disassembly {
    let mut bytes = vec![fetch()];
    let opcode = if bytes[0] == CB_PREFIX {
        bytes.push(fetch());
        tables().prefixed(bytes[1])
    } else {
        tables().plain(bytes[0])
    };

    let instruction = opcode.instruction;
    let operand = match instruction.length() as usize - bytes.len() {
        0 => None,
        1 => {
            let lo = fetch();
            bytes.push(lo);
            Some(u16::from(lo))
        }
        _ => {
            let lo = fetch();
            let hi = fetch();
            bytes.push(lo);
            bytes.push(hi);
            Some(u16::from(hi) << 8 | u16::from(lo))
        }
    };

    Disassembly {
        bytes,
        instruction,
        operand,
    }
}

/// Disassembles the instruction at addr, reading from a memory slice. Reads past the end of the slice yield zero.
pub fn disassemble_at(mem: &[u8], addr: u16) -> Disassembly {
    let mut addr = addr;
    disassemble(|| {
        let v = mem.get(addr as usize).copied().unwrap_or(0);
        addr = addr.wrapping_add(1);
        v
    })
}

impl fmt::Display for Disassembly {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // STOP's second byte is padding rather than an operand.
        match self.instruction {
            Instruction::STOP => write!(f, "stop"),
            _ => self.instruction.render(f, self.operand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dis(bytes: &[u8]) -> String {
        disassemble_at(bytes, 0).to_string()
    }

    #[test]
    fn operands_are_substituted() {
        assert_eq!(dis(&[0x3E, 0x42]), "ld a, $42");
        assert_eq!(dis(&[0xC3, 0x50, 0x01]), "jp $0150");
        assert_eq!(dis(&[0xE0, 0x40]), "ld [$ff00+$40], a");
        assert_eq!(dis(&[0x20, 0xFE]), "jr nz, -2");
        assert_eq!(dis(&[0xF8, 0x05]), "ld hl, sp+5");
        assert_eq!(dis(&[0x08, 0x00, 0xC0]), "ld [$c000], sp");
        assert_eq!(dis(&[0x01, 0x34, 0x12]), "ld bc, $1234");
    }

    #[test]
    fn prefixed_and_invalid() {
        let d = disassemble_at(&[0xCB, 0x11], 0);
        assert_eq!(d.bytes, vec![0xCB, 0x11]);
        assert_eq!(d.to_string(), "rl c");
        assert_eq!(dis(&[0xD3]), "invalid");
    }

    #[test]
    fn stop_consumes_padding() {
        let d = disassemble_at(&[0x10, 0x00, 0x3C], 0);
        assert_eq!(d.bytes.len(), 2);
        assert_eq!(d.to_string(), "stop");
    }
}
