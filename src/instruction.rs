use std::fmt;

use crate::{DecodeError, Opcode, u4, u12};

/// CHIP-8 instructions.
///
/// The fields (x, y, n, kk, nnn) correspond to the operands encoded in the opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0 - Clear the display.
    ClearDisplay,
    /// 00EE - Return from a subroutine.
    Return,

    /// 1nnn - Jump to location nnn.
    Jump { nnn: u12 },
    /// Bnnn - Jump to location nnn + V0.
    JumpWithOffset { nnn: u12 },
    /// 2nnn - Call subroutine at nnn.
    Call { nnn: u12 },

    /// 3xkk - Skip next instruction if Vx == kk.
    SkipRegEqualImm { x: u4, kk: u8 },
    /// 4xkk - Skip next instruction if Vx != kk.
    SkipRegNotEqualImm { x: u4, kk: u8 },
    /// 5xyN - Skip next instruction if Vx == Vy.
    SkipRegEqualReg { x: u4, y: u4, n: u4 },
    /// 9xyN - Skip next instruction if Vx != Vy.
    SkipRegNotEqualReg { x: u4, y: u4, n: u4 },

    /// 6xkk - Set Vx = kk.
    SetRegImm { x: u4, kk: u8 },
    /// 7xkk - Set Vx = Vx + kk.
    AddRegImm { x: u4, kk: u8 },
    /// Annn - Set I = nnn.
    SetIndexImm { nnn: u12 },
    /// Fx1E - Set I = I + Vx.
    AddIndexReg { x: u4 },

    /// 8xyN - ALU operations
    Alu { x: u4, y: u4, op: AluOp },
    /// Cxkk - Set Vx = random byte AND kk.
    Random { x: u4, kk: u8 },
    /// Dxyn - Display n-byte sprite at (Vx, Vy).
    Draw { x: u4, y: u4, n: u4 },

    /// Ex9E - Skip next instruction if key with the value of Vx is pressed.
    SkipIfPressed { x: u4 },
    /// ExA1 - Skip next instruction if key with the value of Vx is not pressed.
    SkipIfNotPressed { x: u4 },
    /// Fx0A - Wait for a key press, store the value of the key in Vx.
    WaitForKey { x: u4 },

    /// Fx07 - Set Vx = delay timer value.
    ReadDelayTimer { x: u4 },
    /// Fx15 - Set delay timer = Vx.
    SetDelayTimer { x: u4 },
    /// Fx18 - Set sound timer = Vx.
    SetSoundTimer { x: u4 },

    /// Fx29 - Set I = location of sprite for digit Vx.
    FontChar { x: u4 },
    /// Fx33 - Store BCD representation of Vx in memory locations I, I+1, and I+2.
    Bcd { x: u4 },

    /// Fx55 - Store registers V0 through Vx in memory starting at location I.
    StoreRegs { x: u4 },
    /// Fx65 - Read registers V0 through Vx from memory starting at location I.
    LoadRegs { x: u4 },
}

/// ALU operations for the 8xyN instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    /// 8xy0 - Vx = Vy
    Set,
    /// 8xy1 - Vx = Vx OR Vy
    Or,
    /// 8xy2 - Vx = Vx AND Vy
    And,
    /// 8xy3 - Vx = Vx XOR Vy
    Xor,
    /// 8xy4 - Vx = Vx + Vy
    Add,
    /// 8xy5 - Vx = Vx - Vy
    Sub,
    /// 8xy6 - Vx = Vx SHR 1
    ShiftRight,
    /// 8xy7 - Vx = Vy - Vx
    SubReverse,
    /// 8xyE - Vx = Vx SHL 1
    ShiftLeft,
}

impl AluOp {
    fn from_nibble(n: u4) -> Result<Self, DecodeError> {
        Ok(match n.get() {
            0x0 => AluOp::Set,
            0x1 => AluOp::Or,
            0x2 => AluOp::And,
            0x3 => AluOp::Xor,
            0x4 => AluOp::Add,
            0x5 => AluOp::Sub,
            0x6 => AluOp::ShiftRight,
            0x7 => AluOp::SubReverse,
            0xE => AluOp::ShiftLeft,
            _ => return Err(DecodeError::UnknownOpcode),
        })
    }

    fn nibble(self) -> u16 {
        match self {
            AluOp::Set => 0x0,
            AluOp::Or => 0x1,
            AluOp::And => 0x2,
            AluOp::Xor => 0x3,
            AluOp::Add => 0x4,
            AluOp::Sub => 0x5,
            AluOp::ShiftRight => 0x6,
            AluOp::SubReverse => 0x7,
            AluOp::ShiftLeft => 0xE,
        }
    }

    fn mnemonic(self) -> &'static str {
        match self {
            AluOp::Set => "MOV",
            AluOp::Or => "OR",
            AluOp::And => "AND",
            AluOp::Xor => "XOR",
            AluOp::Add => "ADD.",
            AluOp::Sub => "SUB.",
            AluOp::ShiftRight => "SHR.",
            AluOp::SubReverse => "SUBB.",
            AluOp::ShiftLeft => "SHL.",
        }
    }
}

impl Instruction {
    /// Decode an opcode into an `Instruction`.
    ///
    /// Dispatches on the top nibble first. The `0x0`, `0xE` and `0xF` groups are
    /// disambiguated by the low byte and the `0x8` group by the low nibble.
    pub fn decode(opcode: Opcode) -> Result<Self, DecodeError> {
        let [top, x, y, n] = opcode.nibbles();
        let kk = opcode.kk();
        let nnn = opcode.nnn();

        let instruction = match top.get() {
            0x0 => match kk {
                0xE0 => Instruction::ClearDisplay,
                0xEE => Instruction::Return,
                _ => return Err(DecodeError::UnknownOpcode),
            },
            0x1 => Instruction::Jump { nnn },
            0x2 => Instruction::Call { nnn },
            0x3 => Instruction::SkipRegEqualImm { x, kk },
            0x4 => Instruction::SkipRegNotEqualImm { x, kk },
            0x5 => Instruction::SkipRegEqualReg { x, y, n },
            0x6 => Instruction::SetRegImm { x, kk },
            0x7 => Instruction::AddRegImm { x, kk },
            0x8 => Instruction::Alu {
                x,
                y,
                op: AluOp::from_nibble(n)?,
            },
            0x9 => Instruction::SkipRegNotEqualReg { x, y, n },
            0xA => Instruction::SetIndexImm { nnn },
            0xB => Instruction::JumpWithOffset { nnn },
            0xC => Instruction::Random { x, kk },
            0xD => Instruction::Draw { x, y, n },
            0xE => match kk {
                0x9E => Instruction::SkipIfPressed { x },
                0xA1 => Instruction::SkipIfNotPressed { x },
                _ => return Err(DecodeError::UnknownOpcode),
            },
            0xF => match kk {
                0x07 => Instruction::ReadDelayTimer { x },
                0x0A => Instruction::WaitForKey { x },
                0x15 => Instruction::SetDelayTimer { x },
                0x18 => Instruction::SetSoundTimer { x },
                0x1E => Instruction::AddIndexReg { x },
                0x29 => Instruction::FontChar { x },
                0x33 => Instruction::Bcd { x },
                0x55 => Instruction::StoreRegs { x },
                0x65 => Instruction::LoadRegs { x },
                _ => return Err(DecodeError::UnknownOpcode),
            },
            _ => return Err(DecodeError::UnknownOpcode),
        };

        Ok(instruction)
    }

    /// Encode the instruction back into the opcode it was decoded from.
    pub fn encode(&self) -> Opcode {
        let xyn = |top: u16, x: u4, y: u4, n: u16| {
            top << 12 | u16::from(x) << 8 | u16::from(y) << 4 | n
        };
        let xkk = |top: u16, x: u4, kk: u8| top << 12 | u16::from(x) << 8 | kk as u16;
        let fx = |x: u4, kk: u16| 0xF000 | u16::from(x) << 8 | kk;

        let raw = match *self {
            Instruction::ClearDisplay => 0x00E0,
            Instruction::Return => 0x00EE,
            Instruction::Jump { nnn } => 0x1000 | u16::from(nnn),
            Instruction::Call { nnn } => 0x2000 | u16::from(nnn),
            Instruction::SkipRegEqualImm { x, kk } => xkk(0x3, x, kk),
            Instruction::SkipRegNotEqualImm { x, kk } => xkk(0x4, x, kk),
            Instruction::SkipRegEqualReg { x, y, n } => xyn(0x5, x, y, n.into()),
            Instruction::SetRegImm { x, kk } => xkk(0x6, x, kk),
            Instruction::AddRegImm { x, kk } => xkk(0x7, x, kk),
            Instruction::Alu { x, y, op } => xyn(0x8, x, y, op.nibble()),
            Instruction::SkipRegNotEqualReg { x, y, n } => xyn(0x9, x, y, n.into()),
            Instruction::SetIndexImm { nnn } => 0xA000 | u16::from(nnn),
            Instruction::JumpWithOffset { nnn } => 0xB000 | u16::from(nnn),
            Instruction::Random { x, kk } => xkk(0xC, x, kk),
            Instruction::Draw { x, y, n } => xyn(0xD, x, y, n.into()),
            Instruction::SkipIfPressed { x } => 0xE09E | u16::from(x) << 8,
            Instruction::SkipIfNotPressed { x } => 0xE0A1 | u16::from(x) << 8,
            Instruction::ReadDelayTimer { x } => fx(x, 0x07),
            Instruction::WaitForKey { x } => fx(x, 0x0A),
            Instruction::SetDelayTimer { x } => fx(x, 0x15),
            Instruction::SetSoundTimer { x } => fx(x, 0x18),
            Instruction::AddIndexReg { x } => fx(x, 0x1E),
            Instruction::FontChar { x } => fx(x, 0x29),
            Instruction::Bcd { x } => fx(x, 0x33),
            Instruction::StoreRegs { x } => fx(x, 0x55),
            Instruction::LoadRegs { x } => fx(x, 0x65),
        };

        Opcode::new(raw)
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::ClearDisplay => "CLS",
            Instruction::Return => "RTS",
            Instruction::Jump { .. } | Instruction::JumpWithOffset { .. } => "JUMP",
            Instruction::Call { .. } => "CALL",
            Instruction::SkipRegEqualImm { .. } | Instruction::SkipRegEqualReg { .. } => {
                "SKIP.EQ"
            }
            Instruction::SkipRegNotEqualImm { .. } | Instruction::SkipRegNotEqualReg { .. } => {
                "SKIP.NE"
            }
            Instruction::SetRegImm { .. } | Instruction::SetIndexImm { .. } => "MVI",
            Instruction::AddRegImm { .. } => "ADI",
            Instruction::AddIndexReg { .. } => "ADD",
            Instruction::Alu { op, .. } => op.mnemonic(),
            Instruction::Random { .. } => "RND",
            Instruction::Draw { .. } => "SPRITE.",
            Instruction::SkipIfPressed { .. } => "SKIP.KEY",
            Instruction::SkipIfNotPressed { .. } => "SKIP.NOKEY",
            Instruction::WaitForKey { .. } => "WAITKEY",
            Instruction::ReadDelayTimer { .. }
            | Instruction::SetDelayTimer { .. }
            | Instruction::SetSoundTimer { .. } => "MOV",
            Instruction::FontChar { .. } => "SPRITECHAR",
            Instruction::Bcd { .. } => "MOVBCD",
            Instruction::StoreRegs { .. } | Instruction::LoadRegs { .. } => "MOVM",
        }
    }

    /// The operand string, empty for instructions that take none.
    pub fn operands(&self) -> String {
        match *self {
            Instruction::ClearDisplay | Instruction::Return => String::new(),
            Instruction::Jump { nnn } | Instruction::Call { nnn } => format!("${nnn:03X}"),
            Instruction::JumpWithOffset { nnn } => format!("${nnn:03X}(V0)"),
            Instruction::SetIndexImm { nnn } => format!("I,#${nnn:03X}"),
            Instruction::SkipRegEqualImm { x, kk }
            | Instruction::SkipRegNotEqualImm { x, kk }
            | Instruction::SetRegImm { x, kk }
            | Instruction::AddRegImm { x, kk }
            | Instruction::Random { x, kk } => format!("V{x:X},#${kk:02X}"),
            Instruction::SkipRegEqualReg { x, y, .. }
            | Instruction::SkipRegNotEqualReg { x, y, .. } => format!("V{x:X},V{y:X}"),
            Instruction::Alu { x, op, .. }
                if matches!(op, AluOp::ShiftRight | AluOp::ShiftLeft) =>
            {
                format!("V{x:X}")
            }
            Instruction::Alu { x, y, .. } => format!("V{x:X},V{y:X}"),
            Instruction::Draw { x, y, n } => format!("V{x:X},V{y:X},#${n:X}"),
            Instruction::SkipIfPressed { x }
            | Instruction::SkipIfNotPressed { x }
            | Instruction::WaitForKey { x }
            | Instruction::FontChar { x }
            | Instruction::Bcd { x } => format!("V{x:X}"),
            Instruction::ReadDelayTimer { x } => format!("V{x:X},DELAY"),
            Instruction::SetDelayTimer { x } => format!("DELAY,V{x:X}"),
            Instruction::SetSoundTimer { x } => format!("SOUND,V{x:X}"),
            Instruction::AddIndexReg { x } => format!("I,V{x:X}"),
            Instruction::StoreRegs { x } => format!("(I),V0-V{x:X}"),
            Instruction::LoadRegs { x } => format!("V0-V{x:X},(I)"),
        }
    }
}

impl TryFrom<Opcode> for Instruction {
    type Error = DecodeError;

    fn try_from(opcode: Opcode) -> Result<Self, Self::Error> {
        Instruction::decode(opcode)
    }
}

impl fmt::Display for Instruction {
    /// Mnemonic left-justified in 10 columns, then a space and the operands if any.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<10}", self.mnemonic())?;

        let operands = self.operands();
        if !operands.is_empty() {
            write!(f, " {operands}")?;
        }

        Ok(())
    }
}
