//! # Push operations
//!
//! Includes the opcodes `PUSH0` to `PUSH32`.

use crate::{
    errors::{OpcodeResult, VMError},
    opcode_handlers::OpcodeHandler,
    utils::{padded_slice, u256_from_big_endian},
    vm::VM,
};
use ethereum_types::U256;

/// Implementation for the `PUSHn` opcodes with `N` immediate bytes.
///
/// An immediate cut short by the end of the code is zero padded on the right, as if the code
/// continued with zeroes.
pub struct OpPushHandler<const N: usize>;
impl<const N: usize> OpcodeHandler for OpPushHandler<N> {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        // The pc already points past the opcode, at the first immediate byte.
        let pc = vm.context.pc;
        let immediate = padded_slice(&vm.context.program.bytecode, pc, N);
        vm.context.stack.push(u256_from_big_endian(&immediate))?;
        vm.context.pc = pc.wrapping_add(N);

        Ok(OpcodeResult::Continue)
    }
}

/// Implementation for the `PUSH0` opcode.
pub struct OpPush0Handler;
impl OpcodeHandler for OpPush0Handler {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        vm.context.stack.push(U256::zero())?;

        Ok(OpcodeResult::Continue)
    }
}
