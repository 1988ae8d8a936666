//! Errors surfaced by the core. Either a program tried to execute an opcode that has no defined behaviour, or the driver
//! broke the cycle-stepping contract. The first is caused by emulated program data, the rest are always a bug in
//! whatever is driving the core.

use crate::cpu::Interrupt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unsupported opcode {}", opcode_name(.opcode, .prefixed))]
    UnsupportedOpcode { opcode: u8, prefixed: bool },

    #[error("{} stepped with cycle {cycle}: {violation}", opcode_name(.opcode, .prefixed))]
    ProtocolViolation {
        opcode: u8,
        prefixed: bool,
        cycle: u8,
        violation: Violation,
    },

    #[error("{requested:?} interrupt requested during cycle {cycle} of {active:?} interrupt dispatch")]
    InterruptInProgress {
        requested: Interrupt,
        active: Interrupt,
        cycle: u8,
    },
}

/// The ways the cycle-stepping contract can be broken.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Violation {
    #[error("cycles are numbered from 1")]
    CycleZero,
    #[error("expected cycle {expected}")]
    OutOfSequence { expected: u8 },
    #[error("instruction already retired")]
    AfterRetirement,
    #[error("instruction only has {last} cycles")]
    BeyondLastCycle { last: u8 },
    #[error("interrupt service requested while an instruction is in flight")]
    MidInstruction,
}

impl Error {
    /// Protocol violations mean the driver itself is broken, and register/memory state can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::UnsupportedOpcode { .. } => false,
            Error::ProtocolViolation { .. } | Error::InterruptInProgress { .. } => true,
        }
    }

    /// The opcode byte the error relates to. Interrupt dispatch has none.
    pub fn opcode(&self) -> Option<u8> {
        match *self {
            Error::UnsupportedOpcode { opcode, .. } => Some(opcode),
            Error::ProtocolViolation { opcode, .. } => Some(opcode),
            Error::InterruptInProgress { .. } => None,
        }
    }
}

fn opcode_name(opcode: &u8, prefixed: &bool) -> String {
    if *prefixed {
        format!("$cb ${:02x}", opcode)
    } else {
        format!("${:02x}", opcode)
    }
}
