use std::fmt;
use std::io::Write;

use crate::{DecodeError, DisasmError, Instruction, Opcode, ROM_START_ADDRESS};

const ADDRESS_SPACE: usize = u16::MAX as usize + 1;

/// How lines for words that fail to decode are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownStyle {
    /// Address and raw bytes followed by the marker, like a decoded line.
    #[default]
    Addressed,
    /// The marker alone.
    Bare,
}

/// What to do with the last byte of an odd-length program image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrailingBytePolicy {
    /// Drop it with a warning.
    #[default]
    Truncate,
    /// Fail with `DisasmError::TruncatedImage` before producing any output.
    Reject,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisasmOptions {
    /// Virtual address of the first byte of the image.
    pub load_address: u16,
    pub unknown_style: UnknownStyle,
    pub trailing_byte: TrailingBytePolicy,
}

impl Default for DisasmOptions {
    fn default() -> Self {
        Self {
            load_address: ROM_START_ADDRESS,
            unknown_style: UnknownStyle::default(),
            trailing_byte: TrailingBytePolicy::default(),
        }
    }
}

/// A single disassembled word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line {
    pub address: u16,
    pub bytes: [u8; 2],
    pub body: Result<Instruction, DecodeError>,
    unknown_style: UnknownStyle,
}

impl Line {
    pub fn opcode(&self) -> Opcode {
        Opcode::from(self.bytes)
    }

    pub fn is_unknown(&self) -> bool {
        self.body.is_err()
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [b0, b1] = self.bytes;

        match (&self.body, self.unknown_style) {
            (Ok(instruction), _) => {
                write!(f, "{:04x} {b0:02x} {b1:02x} {instruction}", self.address)
            }
            (Err(e), UnknownStyle::Addressed) => {
                write!(f, "{:04x} {b0:02x} {b1:02x} {e}", self.address)
            }
            (Err(e), UnknownStyle::Bare) => write!(f, "{e}"),
        }
    }
}

/// Linear-sweep disassembler over a CHIP-8 program image.
#[derive(Clone, Copy, Debug, Default)]
pub struct Disassembler {
    options: DisasmOptions,
}

impl Disassembler {
    pub fn new(options: DisasmOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DisasmOptions {
        &self.options
    }

    /// Lazily decode `image` two bytes at a time.
    ///
    /// Fails if the image runs past the end of the 16-bit address space. Ignores
    /// the trailing byte policy: an odd trailing byte is never yielded.
    pub fn iter<'a>(&self, image: &'a [u8]) -> Result<Lines<'a>, DisasmError> {
        self.check_size(image)?;

        Ok(Lines {
            windows: image.chunks_exact(2),
            address: self.options.load_address,
            unknown_style: self.options.unknown_style,
        })
    }

    /// Decode the whole image into lines.
    pub fn lines(&self, image: &[u8]) -> Result<Vec<Line>, DisasmError> {
        let lines = self.iter(image)?;
        self.check_length(image)?;
        let lines: Vec<Line> = lines.collect();

        log::debug!(
            "disassembled {} words, {} unknown",
            lines.len(),
            lines.iter().filter(|l| l.is_unknown()).count()
        );

        Ok(lines)
    }

    /// Stream the disassembly to `writer`, one `\n`-terminated line per word.
    ///
    /// Returns the number of bytes written. A failed write stops the pass.
    pub fn write_to<W: Write>(&self, image: &[u8], mut writer: W) -> Result<usize, DisasmError> {
        let lines = self.iter(image)?;
        self.check_length(image)?;

        let mut written = 0;
        for line in lines {
            let text = format!("{line}\n");
            writer.write_all(text.as_bytes())?;
            written += text.len();
        }
        writer.flush()?;

        Ok(written)
    }

    /// Disassemble the whole image into a single string.
    pub fn disassemble(&self, image: &[u8]) -> Result<String, DisasmError> {
        let mut out = String::new();
        for line in self.lines(image)? {
            out.push_str(&line.to_string());
            out.push('\n');
        }

        Ok(out)
    }

    fn check_size(&self, image: &[u8]) -> Result<(), DisasmError> {
        let max_size = ADDRESS_SPACE - self.options.load_address as usize;
        if image.len() > max_size {
            return Err(DisasmError::ImageTooLarge {
                size: image.len(),
                max_size,
            });
        }

        Ok(())
    }

    /// Applies the trailing byte policy. Assumes `check_size` passed.
    fn check_length(&self, image: &[u8]) -> Result<(), DisasmError> {
        let Some(&byte) = image.chunks_exact(2).remainder().first() else {
            return Ok(());
        };
        let address = (self.options.load_address as usize + image.len() - 1) as u16;

        match self.options.trailing_byte {
            TrailingBytePolicy::Truncate => {
                log::warn!("dropping trailing byte {byte:#04x} at {address:#06x}");
                Ok(())
            }
            TrailingBytePolicy::Reject => Err(DisasmError::TruncatedImage { address, byte }),
        }
    }
}

/// Iterator returned by [`Disassembler::iter`].
pub struct Lines<'a> {
    windows: std::slice::ChunksExact<'a, u8>,
    address: u16,
    unknown_style: UnknownStyle,
}

impl Iterator for Lines<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Self::Item> {
        let window = self.windows.next()?;
        let bytes = [window[0], window[1]];

        let line = Line {
            address: self.address,
            bytes,
            body: Instruction::decode(Opcode::from(bytes)),
            unknown_style: self.unknown_style,
        };
        self.address = self.address.wrapping_add(2);

        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.windows.size_hint()
    }
}

impl ExactSizeIterator for Lines<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(bytes: [u8; 2]) -> String {
        let line = Disassembler::default().iter(&bytes).unwrap().next().unwrap();
        line.to_string()[11..].to_string()
    }

    #[test]
    fn single_words() {
        assert_eq!(body([0x00, 0xE0]), "CLS       ");
        assert_eq!(body([0x12, 0x8A]), "JUMP       $28A");
        assert_eq!(body([0x62, 0x08]), "MVI        V2,#$08");
        assert_eq!(body([0xA2, 0x20]), "MVI        I,#$220");
        assert_eq!(body([0xD2, 0x29]), "SPRITE.    V2,V2,#$9");
        assert_eq!(body([0xF7, 0x55]), "MOVM       (I),V0-V7");
    }

    #[test]
    fn addresses_and_bytes_are_lowercase() {
        let out = Disassembler::default()
            .disassemble(&[0x12, 0x8A, 0xAB, 0xCD])
            .unwrap();
        assert_eq!(out, "0200 12 8a JUMP       $28A\n0202 ab cd MVI        I,#$BCD\n");
    }

    #[test]
    fn unknown_word_does_not_stop_the_sweep() {
        let image = [0x00, 0xE0, 0x00, 0x01, 0x12, 0x00];
        let lines = Disassembler::default().lines(&image).unwrap();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].is_unknown());
        assert_eq!(lines[1].opcode(), Opcode::new(0x0001));
        assert_eq!(lines[1].to_string(), "0202 00 01 unknown opcode");
        assert_eq!(lines[2].to_string(), "0204 12 00 JUMP       $200");
    }

    #[test]
    fn bare_unknown_style() {
        let disasm = Disassembler::new(DisasmOptions {
            unknown_style: UnknownStyle::Bare,
            ..Default::default()
        });
        let out = disasm.disassemble(&[0xF0, 0x00, 0x00, 0xEE]).unwrap();
        assert_eq!(out, "unknown opcode\n0202 00 ee RTS       \n");
    }

    #[test]
    fn odd_trailing_byte_truncated_by_default() {
        let lines = Disassembler::default().lines(&[0x00, 0xE0, 0x12]).unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn odd_trailing_byte_rejected() {
        let disasm = Disassembler::new(DisasmOptions {
            trailing_byte: TrailingBytePolicy::Reject,
            ..Default::default()
        });

        let err = disasm.lines(&[0x00, 0xE0, 0x12]).unwrap_err();
        assert!(matches!(
            err,
            DisasmError::TruncatedImage {
                address: 0x202,
                byte: 0x12
            }
        ));

        let mut out = Vec::new();
        assert!(disasm.write_to(&[0x12], &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn custom_load_address() {
        let disasm = Disassembler::new(DisasmOptions {
            load_address: 0x600,
            ..Default::default()
        });
        let lines = disasm.lines(&[0x00, 0xE0, 0x00, 0xEE]).unwrap();
        assert_eq!(lines[0].address, 0x600);
        assert_eq!(lines[1].address, 0x602);
    }

    #[test]
    fn addresses_stop_at_end_of_address_space() {
        let disasm = Disassembler::default();

        let lines = disasm.lines(&vec![0; 0x10000 - 0x200]).unwrap();
        assert_eq!(lines.last().unwrap().address, 0xFFFE);
        assert!(lines.windows(2).all(|w| w[0].address < w[1].address));

        for image in [vec![0; 0x10000 - 0x200 + 1], vec![0; 0x10000]] {
            let err = disasm.lines(&image).unwrap_err();
            assert!(matches!(
                err,
                DisasmError::ImageTooLarge { size, max_size: 0xFE00 } if size == image.len()
            ));
        }

        let mut out = Vec::new();
        assert!(disasm.write_to(&vec![0; 0x10000], &mut out).is_err());
        assert!(out.is_empty());
        assert!(disasm.iter(&vec![0; 0x10000]).is_err());
    }

    #[test]
    fn trailing_byte_at_top_of_address_space() {
        let disasm = Disassembler::new(DisasmOptions {
            load_address: 0xFFFC,
            trailing_byte: TrailingBytePolicy::Reject,
            ..Default::default()
        });

        let err = disasm.lines(&[0x00, 0xE0, 0x12]).unwrap_err();
        assert!(matches!(
            err,
            DisasmError::TruncatedImage {
                address: 0xFFFE,
                byte: 0x12
            }
        ));
    }

    #[test]
    fn empty_image() {
        assert_eq!(Disassembler::default().disassemble(&[]).unwrap(), "");
    }

    #[test]
    fn write_to_matches_disassemble() {
        let image = [0x60, 0x01, 0xFF, 0xFF, 0xF1, 0x65, 0xC0];
        let disasm = Disassembler::default();

        let mut out = Vec::new();
        let written = disasm.write_to(&image, &mut out).unwrap();

        assert_eq!(written, out.len());
        assert_eq!(String::from_utf8(out).unwrap(), disasm.disassemble(&image).unwrap());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_surface() {
        let err = Disassembler::default()
            .write_to(&[0x00, 0xE0], FailingWriter)
            .unwrap_err();
        assert!(matches!(err, DisasmError::Io(_)));
    }
}
