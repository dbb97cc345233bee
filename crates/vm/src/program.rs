use crate::opcodes::Opcode;
use bytes::Bytes;
use rustc_hash::FxHashSet;

/// Bytecode together with its valid jump destinations.
///
/// The destinations are indexed once, when the program is loaded, by walking the instruction
/// stream and skipping over `PUSH` immediates so a `0x5b` byte inside pushed data is never
/// mistaken for a `JUMPDEST`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub bytecode: Bytes,
    jump_destinations: FxHashSet<usize>,
}

impl Program {
    pub fn new(bytecode: Bytes) -> Self {
        let jump_destinations = index_jump_destinations(&bytecode);
        Self {
            bytecode,
            jump_destinations,
        }
    }

    pub fn len(&self) -> usize {
        self.bytecode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytecode.is_empty()
    }

    pub fn is_valid_jump_destination(&self, target: usize) -> bool {
        self.jump_destinations.contains(&target)
    }

    /// Valid destinations in ascending order.
    pub fn jump_destinations(&self) -> Vec<usize> {
        let mut destinations: Vec<usize> = self.jump_destinations.iter().copied().collect();
        destinations.sort_unstable();
        destinations
    }
}

impl From<Bytes> for Program {
    fn from(bytecode: Bytes) -> Self {
        Self::new(bytecode)
    }
}

fn index_jump_destinations(bytecode: &[u8]) -> FxHashSet<usize> {
    let mut destinations = FxHashSet::default();
    let mut pc = 0;

    while let Some(&byte) = bytecode.get(pc) {
        let opcode = Opcode::from(byte);
        if opcode == Opcode::JUMPDEST {
            destinations.insert(pc);
        }
        pc = pc
            .saturating_add(opcode.immediate_size())
            .saturating_add(1);
    }

    destinations
}
