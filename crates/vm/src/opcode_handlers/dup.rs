//! # Duplication operations
//!
//! Includes the opcodes `DUP1` to `DUP16`.

use crate::{
    errors::{OpcodeResult, VMError},
    opcode_handlers::OpcodeHandler,
    vm::VM,
};

/// Implementation for the `DUPn` opcodes. `N` is the depth of the copied word, `0` being the top.
pub struct OpDupHandler<const N: usize>;
impl<const N: usize> OpcodeHandler for OpDupHandler<N> {
    #[inline(always)]
    fn eval(vm: &mut VM<'_>) -> Result<OpcodeResult, VMError> {
        vm.context.stack.dup(N)?;

        Ok(OpcodeResult::Continue)
    }
}
