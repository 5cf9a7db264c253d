use crate::{Instruction, MEMORY_SIZE, MachineError, Opcode, ROM_START_ADDRESS};

/// The result of dispatching a fetched opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Instruction(Instruction),
    /// Sentinel for words that match no instruction pattern.
    Unknown(Opcode),
}

impl Operation {
    pub fn dispatch(opcode: Opcode) -> Self {
        match Instruction::decode(opcode) {
            Ok(instruction) => Operation::Instruction(instruction),
            Err(_) => Operation::Unknown(opcode),
        }
    }
}

/// Execution stage for dispatched operations.
pub trait Execute {
    fn execute(&mut self, instruction: Instruction) -> Result<(), MachineError>;

    fn unknown(&mut self, opcode: Opcode) -> Result<(), MachineError> {
        Err(MachineError::UnknownOpcode { opcode })
    }
}

/// Memory and program counter, enough to drive fetch and dispatch.
pub struct Machine {
    memory: [u8; MEMORY_SIZE],
    pc: u16,
}

impl Default for Machine {
    fn default() -> Self {
        Self {
            memory: [0; MEMORY_SIZE],
            pc: ROM_START_ADDRESS,
        }
    }
}

impl Machine {
    pub fn load(&mut self, rom: &[u8]) -> Result<(), MachineError> {
        let start = ROM_START_ADDRESS as usize;
        let rom_end = start + rom.len();
        if rom_end > MEMORY_SIZE {
            return Err(MachineError::RomTooLarge {
                size: rom.len(),
                max_size: MEMORY_SIZE - start,
            });
        }

        self.memory[start..rom_end].copy_from_slice(rom);
        self.pc = ROM_START_ADDRESS;

        Ok(())
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn fetch(&self) -> Result<Opcode, MachineError> {
        let high = self.mem_get(self.pc)?;
        let low = self.mem_get(self.pc.wrapping_add(1))?;

        Ok(Opcode::from_bytes(high, low))
    }

    /// Fetch the opcode at pc, advance pc past it and hand the dispatched
    /// operation to `engine`.
    pub fn step<E: Execute>(&mut self, engine: &mut E) -> Result<Operation, MachineError> {
        let opcode = self.fetch()?;
        self.pc = self.pc.wrapping_add(2);

        let operation = Operation::dispatch(opcode);
        match operation {
            Operation::Instruction(instruction) => engine.execute(instruction)?,
            Operation::Unknown(opcode) => engine.unknown(opcode)?,
        }

        Ok(operation)
    }

    fn mem_get(&self, address: u16) -> Result<u8, MachineError> {
        self.memory
            .get(address as usize)
            .copied()
            .ok_or(MachineError::MemoryOutOfBounds { address })
    }
}

/// Records every dispatched operation without executing it.
#[derive(Debug, Default)]
pub struct Trace {
    pub operations: Vec<Operation>,
}

impl Execute for Trace {
    fn execute(&mut self, instruction: Instruction) -> Result<(), MachineError> {
        log::trace!("{:04X} {instruction}", instruction.encode());
        self.operations.push(Operation::Instruction(instruction));
        Ok(())
    }

    fn unknown(&mut self, opcode: Opcode) -> Result<(), MachineError> {
        log::trace!("{opcode:04X} unknown opcode");
        self.operations.push(Operation::Unknown(opcode));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::u12;

    fn machine(rom: &[u8]) -> Machine {
        let mut m = Machine::default();
        m.load(rom).unwrap();
        m
    }

    #[test]
    fn dispatch_unknown_resolves_to_sentinel() {
        for raw in [0x0000, 0x800F, 0xE000, 0xF000] {
            assert_eq!(
                Operation::dispatch(Opcode::new(raw)),
                Operation::Unknown(Opcode::new(raw))
            );
        }
        assert_eq!(
            Operation::dispatch(Opcode::new(0x1234)),
            Operation::Instruction(Instruction::Jump { nnn: u12::from_low_bits(0x234) })
        );
    }

    #[test]
    fn step_hands_operations_to_engine() {
        let mut m = machine(&[0x00, 0xE0, 0x00, 0x01]);
        let mut trace = Trace::default();

        m.step(&mut trace).unwrap();
        m.step(&mut trace).unwrap();

        assert_eq!(m.pc(), 0x204);
        assert_eq!(
            trace.operations,
            vec![
                Operation::Instruction(Instruction::ClearDisplay),
                Operation::Unknown(Opcode::new(0x0001)),
            ]
        );
    }

    struct Strict;

    impl Execute for Strict {
        fn execute(&mut self, _: Instruction) -> Result<(), MachineError> {
            Ok(())
        }
    }

    #[test]
    fn default_unknown_handler_fails() {
        let mut m = machine(&[0xF0, 0x00]);
        assert_eq!(
            m.step(&mut Strict),
            Err(MachineError::UnknownOpcode {
                opcode: Opcode::new(0xF000)
            })
        );
    }

    #[test]
    fn rom_too_large() {
        let mut m = Machine::default();
        let rom = vec![0; MEMORY_SIZE - ROM_START_ADDRESS as usize + 1];
        assert_eq!(
            m.load(&rom),
            Err(MachineError::RomTooLarge {
                size: rom.len(),
                max_size: 3584
            })
        );
    }

    #[test]
    fn fetch_past_end_of_memory() {
        let mut m = machine(&vec![0x12; MEMORY_SIZE - ROM_START_ADDRESS as usize]);
        let mut trace = Trace::default();

        while m.pc() < MEMORY_SIZE as u16 {
            m.step(&mut trace).unwrap();
        }

        assert_eq!(trace.operations.len(), 1792);
        assert_eq!(
            m.fetch(),
            Err(MachineError::MemoryOutOfBounds { address: 0x1000 })
        );
        assert_eq!(
            m.step(&mut trace),
            Err(MachineError::MemoryOutOfBounds { address: 0x1000 })
        );
    }
}
