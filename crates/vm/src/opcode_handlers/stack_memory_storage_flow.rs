//! # Control flow, memory and storage operations
//!
//! Includes the following opcodes:
//!   - `POP`
//!   - `MLOAD`
//!   - `MSTORE`
//!   - `MSTORE8`
//!   - `SLOAD`
//!   - `SSTORE`
//!   - `JUMP`
//!   - `JUMPI`
//!   - `PC`
//!   - `MSIZE`
//!   - `JUMPDEST`

use std::slice;

use crate::{
    errors::{ExceptionalHalt, OpcodeResult, VMError},
    opcode_handlers::OpcodeHandler,
    utils::u256_to_usize,
    vm::VM,
};
use ethereum_types::U256;
use tracing::trace;

/// Implementation for the `POP` opcode.
pub struct OpPopHandler;
impl OpcodeHandler for OpPopHandler {
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        vm.context.stack.pop1()?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `MLOAD` opcode.
pub struct OpMLoadHandler;
impl OpcodeHandler for OpMLoadHandler {
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let offset = u256_to_usize(vm.context.stack.pop1()?)?;
        let value = vm.context.memory.load_word(offset)?;
        vm.context.stack.push(value)?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `MSTORE` opcode.
pub struct OpMStoreHandler;
impl OpcodeHandler for OpMStoreHandler {
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [offset, value] = *vm.context.stack.pop()?;
        let offset = u256_to_usize(offset)?;
        vm.context.memory.store_word(offset, value)?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `MSTORE8` opcode.
pub struct OpMStore8Handler;
impl OpcodeHandler for OpMStore8Handler {
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [offset, value] = *vm.context.stack.pop()?;
        let offset = u256_to_usize(offset)?;
        let value = value.byte(0);
        vm.context
            .memory
            .store_data(offset, slice::from_ref(&value))?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `SLOAD` opcode.
pub struct OpSLoadHandler;
impl OpcodeHandler for OpSLoadHandler {
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let key = vm.context.stack.pop1()?;
        let value = vm.context.storage.get(key)?;
        vm.context.stack.push(value)?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `SSTORE` opcode. The write is staged until the call succeeds.
pub struct OpSStoreHandler;
impl OpcodeHandler for OpSStoreHandler {
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [key, value] = *vm.context.stack.pop()?;
        trace!(%key, %value, "Staged storage write");
        vm.context.storage.set(key, value);

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `JUMPDEST` opcode.
pub struct OpJumpDestHandler;
impl OpcodeHandler for OpJumpDestHandler {
    fn eval(_vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `JUMP` opcode.
pub struct OpJumpHandler;
impl OpcodeHandler for OpJumpHandler {
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let target = vm.context.stack.pop1()?;
        jump(vm, target)?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `JUMPI` opcode.
pub struct OpJumpIHandler;
impl OpcodeHandler for OpJumpIHandler {
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [target, condition] = *vm.context.stack.pop()?;
        if !condition.is_zero() {
            jump(vm, target)?;
        }

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `PC` opcode.
pub struct OpPcHandler;
impl OpcodeHandler for OpPcHandler {
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        // Note: Since the PC has been preincremented, subtracting 1 from it to get the operation's
        //   offset will never cause an underflow condition.
        vm.context
            .stack
            .push(U256::from(vm.context.pc.wrapping_sub(1)))?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `MSIZE` opcode.
pub struct OpMSizeHandler;
impl OpcodeHandler for OpMSizeHandler {
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        vm.context.stack.push(U256::from(vm.context.memory.len()))?;

        Ok(OpcodeResult::Continue)
    }
}

/// Moves the pc to `target`, which must be an indexed jump destination.
fn jump(vm: &mut VM<'_>, target: U256) -> Result<(), VMError> {
    let target = usize::try_from(target).unwrap_or(usize::MAX);
    if !vm.context.program.is_valid_jump_destination(target) {
        return Err(ExceptionalHalt::InvalidJumpTarget.into());
    }

    // Skip the JUMPDEST instruction itself.
    vm.context.pc = target.wrapping_add(1);
    Ok(())
}
