use crate::{
    constants::{DEFAULT_MEMORY_LIMIT, WORD_SIZE_IN_BYTES_USIZE},
    errors::{ExceptionalHalt, VMError},
    utils::u256_from_big_endian,
};
use bytes::Bytes;
use ethereum_types::U256;
use std::fmt;

/// Byte addressable scratch memory, scoped to one call.
///
/// Starts empty and expands in whole words whenever an access reaches past its end; newly
/// exposed bytes are zero. Accesses are never rejected for being out of range, only for
/// exceeding the host bound set by `limit`.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    buffer: Vec<u8>,
    limit: usize,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_LIMIT)
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Memory(0x{})", hex::encode(&self.buffer))
    }
}

impl From<Memory> for Bytes {
    fn from(memory: Memory) -> Self {
        memory.buffer.into()
    }
}

impl Memory {
    pub fn new(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            limit,
        }
    }

    /// Current size in bytes, always a multiple of the word size.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Expands memory so that `[offset, offset + size)` is addressable.
    fn resize(&mut self, offset: usize, size: usize) -> Result<(), VMError> {
        let new_size = calculate_memory_size(offset, size)?;
        if new_size > self.limit {
            return Err(ExceptionalHalt::OutOfBounds.into());
        }
        if new_size > self.buffer.len() {
            self.buffer.resize(new_size, 0);
        }
        Ok(())
    }

    fn range(&self, offset: usize, size: usize) -> Result<&[u8], VMError> {
        let end = offset
            .checked_add(size)
            .ok_or(ExceptionalHalt::OutOfBounds)?;
        self.buffer
            .get(offset..end)
            .ok_or(ExceptionalHalt::OutOfBounds.into())
    }

    fn range_mut(&mut self, offset: usize, size: usize) -> Result<&mut [u8], VMError> {
        let end = offset
            .checked_add(size)
            .ok_or(ExceptionalHalt::OutOfBounds)?;
        self.buffer
            .get_mut(offset..end)
            .ok_or(ExceptionalHalt::OutOfBounds.into())
    }

    /// Returns `size` bytes starting at `offset`, expanding memory first if needed.
    pub fn load_range(&mut self, offset: usize, size: usize) -> Result<Bytes, VMError> {
        if size == 0 {
            return Ok(Bytes::new());
        }
        self.resize(offset, size)?;
        Ok(Bytes::copy_from_slice(self.range(offset, size)?))
    }

    pub fn load_word(&mut self, offset: usize) -> Result<U256, VMError> {
        self.resize(offset, WORD_SIZE_IN_BYTES_USIZE)?;
        Ok(u256_from_big_endian(
            self.range(offset, WORD_SIZE_IN_BYTES_USIZE)?,
        ))
    }

    /// Writes `data` at `offset`, expanding memory as needed.
    pub fn store_data(&mut self, offset: usize, data: &[u8]) -> Result<(), VMError> {
        if data.is_empty() {
            return Ok(());
        }
        self.resize(offset, data.len())?;
        self.range_mut(offset, data.len())?.copy_from_slice(data);
        Ok(())
    }

    pub fn store_word(&mut self, offset: usize, word: U256) -> Result<(), VMError> {
        self.store_data(offset, &word.to_big_endian())
    }

    /// Copies `size` bytes of `source`, starting at `src_offset`, to `dst_offset`. Bytes past
    /// the end of `source` are written as zeroes.
    ///
    /// The expansion is checked against the limit before anything is copied, so `size` never
    /// drives an allocation larger than the memory bound.
    pub fn copy_padded(
        &mut self,
        dst_offset: usize,
        source: &[u8],
        src_offset: usize,
        size: usize,
    ) -> Result<(), VMError> {
        if size == 0 {
            return Ok(());
        }
        self.resize(dst_offset, size)?;

        let available = source.get(src_offset..).unwrap_or_default();
        let copy_len = available.len().min(size);
        let (copied, padding) = self
            .range_mut(dst_offset, size)?
            .split_at_mut_checked(copy_len)
            .ok_or(ExceptionalHalt::OutOfBounds)?;
        copied.copy_from_slice(available.get(..copy_len).unwrap_or_default());
        padding.fill(0);
        Ok(())
    }
}

/// Size memory must have, in bytes, for `[offset, offset + size)` to be addressable.
///
/// A zero sized access never expands memory.
pub fn calculate_memory_size(offset: usize, size: usize) -> Result<usize, VMError> {
    if size == 0 {
        return Ok(0);
    }

    offset
        .checked_add(size)
        .and_then(|end| end.checked_next_multiple_of(WORD_SIZE_IN_BYTES_USIZE))
        .ok_or(ExceptionalHalt::OutOfBounds.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_grows_in_words() {
        let mut memory = Memory::default();
        assert!(memory.is_empty());

        memory.store_data(33, &[0xff]).unwrap();
        assert_eq!(memory.len(), 64);
        assert_eq!(
            memory.load_range(32, 3).unwrap(),
            Bytes::from_static(&[0, 0xff, 0])
        );
    }

    #[test]
    fn reads_past_the_end_return_zeroes() {
        let mut memory = Memory::default();
        assert_eq!(memory.load_word(0x80).unwrap(), U256::zero());
        assert_eq!(memory.len(), 0xa0);
    }

    #[test]
    fn copy_padded_zero_fills_over_existing_data() {
        let mut memory = Memory::default();
        memory.store_word(0, U256::MAX).unwrap();

        memory.copy_padded(1, &[0xaa, 0xbb, 0xcc], 1, 4).unwrap();
        assert_eq!(
            memory.load_range(0, 6).unwrap(),
            Bytes::from_static(&[0xff, 0xbb, 0xcc, 0, 0, 0xff])
        );

        memory.copy_padded(0, &[0xaa], usize::MAX, 2).unwrap();
        assert_eq!(
            memory.load_range(0, 3).unwrap(),
            Bytes::from_static(&[0, 0, 0xcc])
        );
    }

    #[test]
    fn copy_padded_checks_the_bound_before_copying() {
        let mut memory = Memory::new(64);
        assert_eq!(
            memory.copy_padded(0, &[1], 0, usize::MAX),
            Err(ExceptionalHalt::OutOfBounds.into())
        );
        assert_eq!(
            memory.copy_padded(0, &[1], 0, 1 << 40),
            Err(ExceptionalHalt::OutOfBounds.into())
        );
        assert!(memory.is_empty());
    }

    #[test]
    fn zero_sized_access_does_not_expand() {
        let mut memory = Memory::default();
        assert_eq!(memory.load_range(usize::MAX, 0).unwrap(), Bytes::new());
        memory.store_data(4096, &[]).unwrap();
        assert!(memory.is_empty());
    }

    #[test]
    fn word_round_trip_is_big_endian() {
        let mut memory = Memory::default();
        memory.store_word(0, U256::from(0x80)).unwrap();
        let bytes = memory.load_range(0, 32).unwrap();
        assert_eq!(bytes.last(), Some(&0x80));
        assert_eq!(memory.load_word(0).unwrap(), U256::from(0x80));
    }

    #[test]
    fn expansion_past_the_limit_fails() {
        let mut memory = Memory::new(64);
        assert!(memory.store_word(32, U256::one()).is_ok());
        assert_eq!(
            memory.store_word(33, U256::one()),
            Err(VMError::ExceptionalHalt(ExceptionalHalt::OutOfBounds))
        );
        assert_eq!(
            memory.load_word(usize::MAX),
            Err(VMError::ExceptionalHalt(ExceptionalHalt::OutOfBounds))
        );
    }
}
