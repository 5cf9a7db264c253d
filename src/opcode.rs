use std::fmt;

use crate::{u4, u12};

/// A raw 16-bit CHIP-8 instruction word.
///
/// Field accessors follow the usual CHIP-8 naming: `x` (bits 11-8), `y` (bits 7-4),
/// `n` (bits 3-0), `kk` (low byte) and `nnn` (bits 11-0).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Opcode(u16);

impl Opcode {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Builds an opcode from two bytes in program order (high byte first).
    pub const fn from_bytes(high: u8, low: u8) -> Self {
        Self(u16::from_be_bytes([high, low]))
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    pub const fn high_byte(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn low_byte(self) -> u8 {
        self.0 as u8
    }

    /// The four nibbles, most significant first.
    pub const fn nibbles(self) -> [u4; 4] {
        [
            u4::from_low_bits((self.0 >> 12) as u8),
            u4::from_low_bits((self.0 >> 8) as u8),
            u4::from_low_bits((self.0 >> 4) as u8),
            u4::from_low_bits(self.0 as u8),
        ]
    }

    pub const fn x(self) -> u4 {
        self.nibbles()[1]
    }

    pub const fn y(self) -> u4 {
        self.nibbles()[2]
    }

    pub const fn n(self) -> u4 {
        self.nibbles()[3]
    }

    pub const fn kk(self) -> u8 {
        self.low_byte()
    }

    pub const fn nnn(self) -> u12 {
        u12::from_low_bits(self.0)
    }
}

impl From<u16> for Opcode {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<[u8; 2]> for Opcode {
    fn from(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }
}

impl From<Opcode> for u16 {
    fn from(opcode: Opcode) -> u16 {
        opcode.0
    }
}

impl fmt::UpperHex for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_compose_big_endian() {
        let op = Opcode::from_bytes(0x12, 0x8A);
        assert_eq!(op.raw(), 0x128A);
        assert_eq!(op.high_byte(), 0x12);
        assert_eq!(op.low_byte(), 0x8A);
        assert_eq!(op.to_be_bytes(), [0x12, 0x8A]);
        assert_eq!(Opcode::from([0x12, 0x8A]), op);
    }

    #[test]
    fn nibble_fields() {
        let op = Opcode::new(0xD2A9);
        let [top, x, y, n] = op.nibbles();
        assert_eq!(top.get(), 0xD);
        assert_eq!(x, op.x());
        assert_eq!(y, op.y());
        assert_eq!(n, op.n());
        assert_eq!((x.get(), y.get(), n.get()), (0x2, 0xA, 0x9));
        assert_eq!(op.kk(), 0xA9);
        assert_eq!(op.nnn().get(), 0x2A9);
    }

    #[test]
    fn extremes() {
        let op = Opcode::new(0xFFFF);
        assert!(op.nibbles().iter().all(|n| n.get() == 0xF));
        assert_eq!(op.nnn().get(), 0xFFF);

        let op = Opcode::new(0x0000);
        assert!(op.nibbles().iter().all(|n| n.get() == 0));
    }
}
