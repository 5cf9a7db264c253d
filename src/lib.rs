mod disasm;
mod instruction;
mod machine;
mod nibble;
mod opcode;
pub mod rom;
mod types;

pub use disasm::*;
pub use instruction::*;
pub use machine::*;
pub use nibble::*;
pub use opcode::*;
pub use types::*;
