//! # Exchange operations
//!
//! Includes the opcodes `SWAP1` to `SWAP16`.

use crate::{
    errors::{OpcodeResult, VMError},
    opcode_handlers::OpcodeHandler,
    vm::VM,
};

/// Implementation for the `SWAPn` opcodes: exchanges the top with the word `N` positions below.
pub struct OpSwapHandler<const N: usize>;
impl<const N: usize> OpcodeHandler for OpSwapHandler<N> {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        vm.context.stack.swap(N)?;

        Ok(OpcodeResult::Continue)
    }
}
