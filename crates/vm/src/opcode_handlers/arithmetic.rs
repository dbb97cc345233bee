//! # Arithmetic operations
//!
//! Includes the following opcodes:
//!   - `ADD`
//!   - `MUL`
//!   - `SUB`
//!
//! All of them wrap modulo 2^256.

use crate::{
    errors::{OpcodeResult, VMError},
    opcode_handlers::OpcodeHandler,
    vm::VM,
};

/// Implementation for the `ADD` opcode.
pub struct OpAddHandler;
impl OpcodeHandler for OpAddHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [augend, addend] = *vm.context.stack.pop()?;
        vm.context.stack.push(augend.overflowing_add(addend).0)?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `MUL` opcode.
pub struct OpMulHandler;
impl OpcodeHandler for OpMulHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [multiplicand, multiplier] = *vm.context.stack.pop()?;
        vm.context
            .stack
            .push(multiplicand.overflowing_mul(multiplier).0)?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `SUB` opcode.
pub struct OpSubHandler;
impl OpcodeHandler for OpSubHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [minuend, subtrahend] = *vm.context.stack.pop()?;
        vm.context
            .stack
            .push(minuend.overflowing_sub(subtrahend).0)?;

        Ok(OpcodeResult::Continue)
    }
}
