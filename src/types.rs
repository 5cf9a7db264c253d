use std::path::PathBuf;

use crate::Opcode;

/// CHIP-8 programs are loaded at this address by convention.
pub const ROM_START_ADDRESS: u16 = 0x200;
pub const MEMORY_SIZE: usize = 4096;

/// No instruction pattern matched an opcode.
///
/// Carries no payload, the caller already holds the opcode it tried to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown opcode")]
    UnknownOpcode,
}

/// Error types that can occur while disassembling a program image
#[derive(Debug, thiserror::Error)]
pub enum DisasmError {
    #[error("program image has an odd length, trailing byte {byte:#04x} at {address:#06x}")]
    TruncatedImage { address: u16, byte: u8 },

    #[error("program image is too large ({size} bytes), max size is {max_size} bytes")]
    ImageTooLarge { size: usize, max_size: usize },

    #[error("failed to write disassembly")]
    Io(#[from] std::io::Error),
}

/// Error types that can occur while reading a ROM from disk
#[derive(Debug, thiserror::Error)]
pub enum RomError {
    #[error("failed to read ROM file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error types that can occur while fetching and dispatching instructions
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("Memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: u16 },

    #[error("Unknown opcode: {:#06X}", .opcode.raw())]
    UnknownOpcode { opcode: Opcode },
}
