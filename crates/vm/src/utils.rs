use crate::errors::{ExceptionalHalt, VMError};
use ethereum_types::U256;

/// Converts a word used as a memory offset or size, failing if it does not fit a `usize`.
pub fn u256_to_usize(val: U256) -> Result<usize, VMError> {
    usize::try_from(val).map_err(|_| ExceptionalHalt::OutOfBounds.into())
}

/// Converts a `(size, offset)` pair. A zero size touches nothing, so its offset is ignored.
pub fn size_offset_to_usize(size: U256, offset: U256) -> Result<(usize, usize), VMError> {
    if size.is_zero() {
        return Ok((0, 0));
    }
    Ok((u256_to_usize(size)?, u256_to_usize(offset)?))
}

/// Big-endian 32 byte encoding of a word.
pub fn u256_to_big_endian(value: U256) -> [u8; 32] {
    value.to_big_endian()
}

/// Interprets up to 32 big-endian bytes as a word.
pub fn u256_from_big_endian(bytes: &[u8]) -> U256 {
    U256::from_big_endian(bytes)
}

/// Copies `len` bytes of `source` starting at `offset`, zero-filling whatever lies past its end.
pub fn padded_slice(source: &[u8], offset: usize, len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    if let Some(available) = source.get(offset..) {
        let copy_len = available.len().min(len);
        if let (Some(dst), Some(src)) = (data.get_mut(..copy_len), available.get(..copy_len)) {
            dst.copy_from_slice(src);
        }
    }
    data
}
