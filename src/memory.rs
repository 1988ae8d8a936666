//! The memory contract the core executes against. The real Gameboy memory map (cartridge banking, VRAM, OAM, IO
//! registers, echo RAM) lives behind this trait and is not the core's concern.

use byteorder::{ByteOrder, LittleEndian};

/// The 16-bit address bus. Reads take `&mut self` because reading IO registers on real hardware can have side effects.
pub trait Memory {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, v: u8);

    /// Reads a little-endian 16-bit value from addr and addr+1. Note that this performs two bus accesses, so instructions
    /// never use it mid-cycle; it's here for debuggers and collaborators.
    fn read16(&mut self, addr: u16) -> u16 {
        let bytes = [self.read(addr), self.read(addr.wrapping_add(1))];
        LittleEndian::read_u16(&bytes)
    }

    /// Writes a little-endian 16-bit value to addr and addr+1.
    fn write16(&mut self, addr: u16, v: u16) {
        let mut bytes = [0; 2];
        LittleEndian::write_u16(&mut bytes, v);
        self.write(addr, bytes[0]);
        self.write(addr.wrapping_add(1), bytes[1]);
    }
}

impl<T: Memory + ?Sized> Memory for &mut T {
    fn read(&mut self, addr: u16) -> u8 {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u16, v: u8) {
        (**self).write(addr, v)
    }
}

/// A flat 64KiB address space with no mapping at all. Handy for tests, benches, and running bare instruction streams.
pub struct Ram {
    data: Box<[u8]>,
}

impl Ram {
    pub fn new() -> Ram {
        Ram {
            data: vec![0; 0x10000].into_boxed_slice(),
        }
    }

    /// Creates a Ram with the given bytes copied in at addr.
    pub fn with_program(addr: u16, program: &[u8]) -> Ram {
        let mut ram = Ram::new();
        ram.load(addr, program);
        ram
    }

    /// Copies bytes into memory starting at addr, wrapping around the top of the address space.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let mut addr = addr;
        for b in bytes {
            self.data[addr as usize] = *b;
            addr = addr.wrapping_add(1);
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Default for Ram {
    fn default() -> Ram {
        Ram::new()
    }
}

impl Memory for Ram {
    fn read(&mut self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    fn write(&mut self, addr: u16, v: u8) {
        self.data[addr as usize] = v;
    }
}
