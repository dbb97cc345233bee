use crate::{
    calldata::CalldataView,
    constants::STACK_LIMIT,
    db::staged::StagedStorage,
    errors::{ExceptionalHalt, InternalError, VMError},
    memory::Memory,
    opcodes::Opcode,
    program::Program,
};
use bytes::Bytes;
use ethereum_types::U256;
use std::fmt;

/// Bounded word stack.
///
/// Grows downwards: `values[offset]` is the top and `offset == STACK_LIMIT` means empty. Indexes
/// taken by [`Stack::peek`], [`Stack::dup`] and [`Stack::swap`] count from the top, starting
/// at 0.
#[derive(Clone, PartialEq, Eq)]
pub struct Stack {
    pub values: Box<[U256; STACK_LIMIT]>,
    pub offset: usize,
}

impl Default for Stack {
    fn default() -> Self {
        Self {
            values: Box::new([U256::zero(); STACK_LIMIT]),
            offset: STACK_LIMIT,
        }
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.values.get(self.offset..).unwrap_or_default())
            .finish()
    }
}

impl Stack {
    /// Pops `N` words, top first.
    pub fn pop<const N: usize>(&mut self) -> Result<&[U256; N], VMError> {
        let next_offset = self
            .offset
            .checked_add(N)
            .ok_or(ExceptionalHalt::StackUnderflow)?;
        let values = self
            .values
            .get(self.offset..next_offset)
            .ok_or(ExceptionalHalt::StackUnderflow)?;
        let values: &[U256; N] = values
            .try_into()
            .map_err(|_| InternalError::StackSlice)?;
        self.offset = next_offset;

        Ok(values)
    }

    pub fn pop1(&mut self) -> Result<U256, VMError> {
        Ok(self.pop::<1>()?[0])
    }

    pub fn push(&mut self, value: U256) -> Result<(), VMError> {
        let next_offset = self
            .offset
            .checked_sub(1)
            .ok_or(ExceptionalHalt::StackOverflow)?;
        let slot = self
            .values
            .get_mut(next_offset)
            .ok_or(ExceptionalHalt::StackOverflow)?;
        *slot = value;
        self.offset = next_offset;

        Ok(())
    }

    /// Returns the word `index` positions below the top.
    pub fn peek(&self, index: usize) -> Result<U256, VMError> {
        let position = self
            .offset
            .checked_add(index)
            .ok_or(ExceptionalHalt::StackUnderflow)?;
        self.values
            .get(position)
            .copied()
            .ok_or(ExceptionalHalt::StackUnderflow.into())
    }

    /// Pushes a copy of the word `index` positions below the top. `dup(0)` is `DUP1`.
    pub fn dup(&mut self, index: usize) -> Result<(), VMError> {
        let value = self.peek(index)?;
        self.push(value)
    }

    /// Exchanges the top with the word `index` positions below it. `swap(1)` is `SWAP1`.
    pub fn swap(&mut self, index: usize) -> Result<(), VMError> {
        let position = self
            .offset
            .checked_add(index)
            .ok_or(ExceptionalHalt::StackUnderflow)?;
        if position >= STACK_LIMIT {
            return Err(ExceptionalHalt::StackUnderflow.into());
        }
        self.values.swap(self.offset, position);

        Ok(())
    }

    pub fn len(&self) -> usize {
        STACK_LIMIT.saturating_sub(self.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.offset == STACK_LIMIT
    }
}

/// Everything a single call operates on.
///
/// Created fresh for every call and dropped once it halts. Stack and memory are owned; the
/// program and the persistent store are borrowed, with writes to the latter staged until the
/// call commits.
#[derive(Debug)]
pub struct ExecutionContext<'a> {
    pub stack: Stack,
    pub memory: Memory,
    pub calldata: CalldataView,
    pub program: &'a Program,
    pub storage: StagedStorage<'a>,
    /// Value sent along with the call.
    pub value: U256,
    /// Index of the next byte to decode.
    pub pc: usize,
    /// Return data, set by `RETURN`, `REVERT` or a native handler.
    pub output: Bytes,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        program: &'a Program,
        storage: StagedStorage<'a>,
        calldata: Bytes,
        value: U256,
        memory_limit: usize,
    ) -> Self {
        Self {
            stack: Stack::default(),
            memory: Memory::new(memory_limit),
            calldata: CalldataView::new(calldata),
            program,
            storage,
            value,
            pc: 0,
            output: Bytes::new(),
        }
    }

    /// Decodes the opcode at `pc` and moves past it. Running off the end of the code is `STOP`.
    #[inline]
    pub fn next_opcode(&mut self) -> Opcode {
        let opcode = self
            .program
            .bytecode
            .get(self.pc)
            .copied()
            .map(Opcode::from)
            .unwrap_or(Opcode::STOP);
        self.pc = self.pc.wrapping_add(1);
        opcode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_pop_is_lifo() {
        let mut stack = Stack::default();
        stack.push(U256::from(1)).unwrap();
        stack.push(U256::from(2)).unwrap();

        assert_eq!(stack.len(), 2);
        assert_eq!(*stack.pop::<2>().unwrap(), [U256::from(2), U256::from(1)]);
        assert!(stack.is_empty());
    }

    #[test]
    fn pop_from_empty_stack_underflows() {
        let mut stack = Stack::default();
        assert_eq!(
            stack.pop1(),
            Err(VMError::ExceptionalHalt(ExceptionalHalt::StackUnderflow))
        );

        stack.push(U256::one()).unwrap();
        assert!(stack.pop::<2>().is_err());
        // A failed pop leaves the stack untouched.
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn push_on_full_stack_overflows() {
        let mut stack = Stack::default();
        for i in 0..STACK_LIMIT {
            stack.push(U256::from(i)).unwrap();
        }
        assert_eq!(
            stack.push(U256::zero()),
            Err(VMError::ExceptionalHalt(ExceptionalHalt::StackOverflow))
        );
        assert_eq!(
            stack.dup(0),
            Err(VMError::ExceptionalHalt(ExceptionalHalt::StackOverflow))
        );
        assert_eq!(stack.len(), STACK_LIMIT);
    }

    #[test]
    fn peek_dup_and_swap_count_from_the_top() {
        let mut stack = Stack::default();
        for i in 1..=3u64 {
            stack.push(U256::from(i)).unwrap();
        }
        // [3, 2, 1] top first
        assert_eq!(stack.peek(0).unwrap(), U256::from(3));
        assert_eq!(stack.peek(2).unwrap(), U256::from(1));
        assert!(stack.peek(3).is_err());

        stack.dup(2).unwrap();
        assert_eq!(stack.peek(0).unwrap(), U256::from(1));
        assert_eq!(stack.len(), 4);

        // [1, 3, 2, 1] -> [2, 3, 1, 1]
        stack.swap(2).unwrap();
        assert_eq!(stack.peek(0).unwrap(), U256::from(2));
        assert_eq!(stack.peek(2).unwrap(), U256::from(1));
        assert!(stack.swap(4).is_err());
    }
}
