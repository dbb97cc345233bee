//! Native implementation of the counter contract's entry points.
//!
//! Runs the same checks, in the same order, as the compiled runtime: value, selector presence,
//! selector match and argument length. Handlers work on the call's [`ExecutionContext`], so their
//! storage writes go through the same staging overlay as the interpreter's `SSTORE`.

use crate::{
    call_frame::ExecutionContext,
    constants::{COUNTER_SLOT, READ_SELECTOR, SELECTOR_SIZE, WRITE_CALLDATA_SIZE, WRITE_SELECTOR},
    errors::{DispatchError, VMError},
    utils::u256_to_big_endian,
};
use bytes::{BufMut, Bytes, BytesMut};
use ethereum_types::U256;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    Write,
    Read,
}

/// Selector table, checked in order. Anything that does not match reverts.
pub const ENTRY_POINTS: [(u32, EntryPoint); 2] = [
    (WRITE_SELECTOR, EntryPoint::Write),
    (READ_SELECTOR, EntryPoint::Read),
];

pub struct Dispatcher;

impl Dispatcher {
    /// Resolves the entry point a call targets, or the reason it must revert.
    pub fn route(context: &ExecutionContext<'_>) -> Result<EntryPoint, DispatchError> {
        if !context.value.is_zero() {
            return Err(DispatchError::ValueTransfer);
        }

        let selector = context
            .calldata
            .selector()
            .ok_or(DispatchError::CalldataTooShort {
                expected: SELECTOR_SIZE,
                actual: context.calldata.size(),
            })?;

        ENTRY_POINTS
            .iter()
            .find(|(candidate, _)| *candidate == selector)
            .map(|(_, entry_point)| *entry_point)
            .ok_or(DispatchError::UnknownSelector(selector))
    }

    /// Routes the call and runs the matched handler.
    pub fn dispatch(context: &mut ExecutionContext<'_>) -> Result<(), VMError> {
        let entry_point = Self::route(context)?;
        trace!(?entry_point, "Dispatching call");

        match entry_point {
            EntryPoint::Write => Self::write(context),
            EntryPoint::Read => Self::read(context),
        }
    }

    fn write(context: &mut ExecutionContext<'_>) -> Result<(), VMError> {
        let size = context.calldata.size();
        if size < WRITE_CALLDATA_SIZE {
            return Err(DispatchError::CalldataTooShort {
                expected: WRITE_CALLDATA_SIZE,
                actual: size,
            }
            .into());
        }

        let value = context.calldata.load_word(SELECTOR_SIZE);
        context.storage.set(COUNTER_SLOT, value);
        Ok(())
    }

    fn read(context: &mut ExecutionContext<'_>) -> Result<(), VMError> {
        let value = context.storage.get(COUNTER_SLOT)?;
        context.output = Bytes::copy_from_slice(&u256_to_big_endian(value));
        Ok(())
    }
}

/// Calldata for the write entry point: selector followed by the big-endian argument.
pub fn encode_write(value: U256) -> Bytes {
    let mut calldata = BytesMut::with_capacity(WRITE_CALLDATA_SIZE);
    calldata.put_u32(WRITE_SELECTOR);
    calldata.put_slice(&u256_to_big_endian(value));
    calldata.freeze()
}

/// Calldata for the read entry point.
pub fn encode_read() -> Bytes {
    Bytes::copy_from_slice(&READ_SELECTOR.to_be_bytes())
}
