//! # System operations
//!
//! Includes the following opcodes:
//!   - `RETURN`
//!   - `REVERT`

use crate::{
    errors::{OpcodeResult, VMError},
    opcode_handlers::OpcodeHandler,
    utils::size_offset_to_usize,
    vm::VM,
};

/// Implementation for the `RETURN` opcode.
pub struct OpReturnHandler;
impl OpcodeHandler for OpReturnHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [offset, len] = *vm.context.stack.pop()?;
        let (len, offset) = size_offset_to_usize(len, offset)?;

        if len != 0 {
            vm.context.output = vm.context.memory.load_range(offset, len)?;
        }

        Ok(OpcodeResult::Halt)
    }
}

/// Implementation for the `REVERT` opcode.
pub struct OpRevertHandler;
impl OpcodeHandler for OpRevertHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [offset, len] = *vm.context.stack.pop()?;
        let (len, offset) = size_offset_to_usize(len, offset)?;

        if len != 0 {
            vm.context.output = vm.context.memory.load_range(offset, len)?;
        }

        Err(VMError::RevertOpcode)
    }
}
