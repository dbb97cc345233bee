//! # Bitwise and comparison operations
//!
//! Includes the following opcodes:
//!   - `LT`
//!   - `GT`
//!   - `SLT`
//!   - `SGT`
//!   - `EQ`
//!   - `ISZERO`
//!   - `AND`
//!   - `OR`
//!   - `XOR`
//!   - `NOT`
//!   - `SHL`
//!   - `SHR`

use crate::{
    errors::{OpcodeResult, VMError},
    opcode_handlers::OpcodeHandler,
    vm::VM,
};
use ethereum_types::U256;

/// Implementation for the `LT` opcode.
pub struct OpLtHandler;
impl OpcodeHandler for OpLtHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [lhs, rhs] = *vm.context.stack.pop()?;
        vm.context.stack.push(bool_to_word(lhs < rhs))?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `GT` opcode.
pub struct OpGtHandler;
impl OpcodeHandler for OpGtHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [lhs, rhs] = *vm.context.stack.pop()?;
        vm.context.stack.push(bool_to_word(lhs > rhs))?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `SLT` opcode.
pub struct OpSLtHandler;
impl OpcodeHandler for OpSLtHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [lhs, rhs] = *vm.context.stack.pop()?;
        let lhs_sign = lhs.bit(255);
        let rhs_sign = rhs.bit(255);

        vm.context.stack.push(match (lhs_sign, rhs_sign) {
            (false, true) => U256::zero(),
            (true, false) => U256::one(),
            _ => bool_to_word(lhs < rhs),
        })?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `SGT` opcode.
pub struct OpSGtHandler;
impl OpcodeHandler for OpSGtHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [lhs, rhs] = *vm.context.stack.pop()?;
        let lhs_sign = lhs.bit(255);
        let rhs_sign = rhs.bit(255);

        vm.context.stack.push(match (lhs_sign, rhs_sign) {
            (false, true) => U256::one(),
            (true, false) => U256::zero(),
            _ => bool_to_word(lhs > rhs),
        })?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `EQ` opcode.
pub struct OpEqHandler;
impl OpcodeHandler for OpEqHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [lhs, rhs] = *vm.context.stack.pop()?;
        vm.context.stack.push(bool_to_word(lhs == rhs))?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `ISZERO` opcode.
pub struct OpIsZeroHandler;
impl OpcodeHandler for OpIsZeroHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let value = vm.context.stack.pop1()?;
        vm.context.stack.push(bool_to_word(value.is_zero()))?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `AND` opcode.
pub struct OpAndHandler;
impl OpcodeHandler for OpAndHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [lhs, rhs] = *vm.context.stack.pop()?;
        vm.context.stack.push(lhs & rhs)?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `OR` opcode.
pub struct OpOrHandler;
impl OpcodeHandler for OpOrHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [lhs, rhs] = *vm.context.stack.pop()?;
        vm.context.stack.push(lhs | rhs)?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `XOR` opcode.
pub struct OpXorHandler;
impl OpcodeHandler for OpXorHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [lhs, rhs] = *vm.context.stack.pop()?;
        vm.context.stack.push(lhs ^ rhs)?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `NOT` opcode.
pub struct OpNotHandler;
impl OpcodeHandler for OpNotHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let value = vm.context.stack.pop1()?;
        vm.context.stack.push(!value)?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `SHL` opcode.
pub struct OpShlHandler;
impl OpcodeHandler for OpShlHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [shift, value] = *vm.context.stack.pop()?;
        vm.context.stack.push(match shift_amount(shift) {
            Some(shift) => value << shift,
            None => U256::zero(),
        })?;

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `SHR` opcode.
pub struct OpShrHandler;
impl OpcodeHandler for OpShrHandler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        let [shift, value] = *vm.context.stack.pop()?;
        vm.context.stack.push(match shift_amount(shift) {
            Some(shift) => value >> shift,
            None => U256::zero(),
        })?;

        Ok(OpcodeResult::Continue)
    }
}

fn bool_to_word(value: bool) -> U256 {
    U256::from(u64::from(value))
}

/// Shifts of 256 bits or more clear the whole word.
fn shift_amount(shift: U256) -> Option<usize> {
    if shift < U256::from(256) {
        usize::try_from(shift).ok()
    } else {
        None
    }
}
