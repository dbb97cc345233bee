use crate::{
    backends::Backend,
    call_frame::ExecutionContext,
    db::{PersistentStorage, staged::StagedStorage},
    dispatcher::Dispatcher,
    environment::VMConfig,
    errors::{ExecutionReport, OpcodeResult, TxResult, VMError},
    opcodes::{OPCODE_TABLE, Opcode},
    program::Program,
};
use bytes::Bytes;
use ethereum_types::U256;
use tracing::{debug, trace};

/// Runs a single call to completion.
///
/// The VM owns the call's [`ExecutionContext`] and decides, once the call halts, whether its
/// staged storage writes are committed to the durable store or dropped.
#[derive(Debug)]
pub struct VM<'a> {
    pub context: ExecutionContext<'a>,
    pub config: VMConfig,
}

impl<'a> VM<'a> {
    pub fn new(
        program: &'a Program,
        store: &'a mut dyn PersistentStorage,
        calldata: Bytes,
        value: U256,
        config: VMConfig,
    ) -> Self {
        let storage = StagedStorage::new(store);
        Self {
            context: ExecutionContext::new(program, storage, calldata, value, config.memory_limit),
            config,
        }
    }

    /// Executes the call with the configured backend.
    ///
    /// Reverts are reported through [`TxResult::Revert`]; only internal and database errors are
    /// returned as `Err`, and in both cases nothing is written to the store.
    pub fn execute(&mut self) -> Result<ExecutionReport, VMError> {
        debug!(
            backend = %self.config.backend,
            calldata = %hex::encode(self.context.calldata.as_bytes()),
            value = %self.context.value,
            "Executing call"
        );

        let outcome = match self.config.backend {
            Backend::Bytecode => self.run_execution(),
            Backend::Native => Dispatcher::dispatch(&mut self.context),
        };

        self.finalize_execution(outcome)
    }

    /// Main execution loop. Returns once the program halts successfully or fails.
    pub fn run_execution(&mut self) -> Result<(), VMError> {
        loop {
            let opcode = self.context.next_opcode();
            trace!(
                pc = self.context.pc.wrapping_sub(1),
                ?opcode,
                stack = self.context.stack.len(),
                "Executing opcode"
            );

            match self.execute_opcode(opcode)? {
                OpcodeResult::Continue => continue,
                OpcodeResult::Halt => return Ok(()),
            }
        }
    }

    // Every opcode discriminant fits in a u8, so the table index is always in range.
    #[inline(always)]
    #[allow(clippy::indexing_slicing)]
    fn execute_opcode(&mut self, opcode: Opcode) -> Result<OpcodeResult, VMError> {
        OPCODE_TABLE[usize::from(opcode)].call(self)
    }

    fn finalize_execution(
        &mut self,
        outcome: Result<(), VMError>,
    ) -> Result<ExecutionReport, VMError> {
        let error = match outcome {
            Ok(()) => {
                let storage_updates = self.context.storage.commit()?;
                debug!(
                    output = %hex::encode(&self.context.output),
                    slots = storage_updates.len(),
                    "Call succeeded"
                );
                return Ok(ExecutionReport {
                    result: TxResult::Success,
                    output: std::mem::take(&mut self.context.output),
                    storage_updates,
                });
            }
            Err(error) => error,
        };

        self.context.storage.discard();
        if error.is_internal() {
            return Err(error);
        }

        // Only an explicit REVERT hands data back to the caller.
        let output = if error.is_revert_opcode() {
            std::mem::take(&mut self.context.output)
        } else {
            Bytes::new()
        };
        debug!(%error, output = %hex::encode(&output), "Call reverted");

        Ok(ExecutionReport {
            result: TxResult::Revert(error),
            output,
            storage_updates: Default::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::InMemoryStorage,
        errors::{DatabaseError, ExceptionalHalt, StorageUpdates},
    };
    use hex_literal::hex;

    fn run(code: &[u8], store: &mut InMemoryStorage) -> ExecutionReport {
        let program = Program::new(Bytes::copy_from_slice(code));
        let mut vm = VM::new(
            &program,
            store,
            Bytes::new(),
            U256::zero(),
            VMConfig::default(),
        );
        vm.execute().unwrap()
    }

    #[test]
    fn return_copies_memory_range() {
        // PUSH1 0x2a PUSH0 MSTORE PUSH1 0x20 PUSH0 RETURN
        let report = run(&hex!("602a5f5260205ff3"), &mut InMemoryStorage::new());
        assert!(report.is_success());
        assert_eq!(report.output.len(), 32);
        assert_eq!(report.output.last(), Some(&0x2a));
    }

    #[test]
    fn running_off_the_end_stops() {
        let report = run(&hex!("6001"), &mut InMemoryStorage::new());
        assert!(report.is_success());
        assert!(report.output.is_empty());
    }

    #[test]
    fn wrapping_arithmetic() {
        // 0 - 1 wraps to MAX, MAX + 2 wraps to 1
        let report = run(&hex!("60015f03600201 5f52 60205ff3"), &mut InMemoryStorage::new());
        assert!(report.is_success());
        assert_eq!(U256::from_big_endian(&report.output), U256::one());
    }

    #[test]
    fn successful_call_commits_storage() {
        let mut store = InMemoryStorage::new();
        // PUSH1 7 PUSH0 SSTORE STOP
        let report = run(&hex!("60075f5500"), &mut store);
        assert_eq!(
            report.storage_updates,
            StorageUpdates::from([(U256::zero(), U256::from(7))])
        );
        assert_eq!(store.get_storage_value(U256::zero()), Ok(U256::from(7)));
    }

    #[test]
    fn revert_discards_storage_and_keeps_its_data() {
        let mut store = InMemoryStorage::new();
        // PUSH1 7 PUSH0 SSTORE PUSH1 0xff PUSH0 MSTORE8 PUSH1 1 PUSH0 REVERT
        let report = run(&hex!("60075f5560ff5f5360015ffd"), &mut store);
        assert_eq!(report.result, TxResult::Revert(VMError::RevertOpcode));
        assert_eq!(report.output, Bytes::from_static(&[0xff]));
        assert!(report.storage_updates.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn jump_into_push_data_fails() {
        let mut store = InMemoryStorage::new();
        // PUSH1 7 PUSH0 SSTORE PUSH1 0x08 JUMP, with 0x5b at offset 8 hidden in PUSH1 data
        let report = run(&hex!("60075f55600856605b"), &mut store);
        assert_eq!(
            report.error(),
            Some(&VMError::ExceptionalHalt(ExceptionalHalt::InvalidJumpTarget))
        );
        assert!(report.output.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn jumpi_follows_nonzero_conditions_only() {
        // PUSH1 1 PUSH1 0x07 JUMPI INVALID INVALID JUMPDEST PUSH0 PUSH1 0x0d JUMPI STOP JUMPDEST INVALID
        let report = run(
            &hex!("6001600757fefe5b5f600d57005bfe"),
            &mut InMemoryStorage::new(),
        );
        assert!(report.is_success());
    }

    #[test]
    fn undefined_opcode_reverts_with_empty_output() {
        let report = run(&hex!("0c"), &mut InMemoryStorage::new());
        assert_eq!(
            report.error(),
            Some(&VMError::ExceptionalHalt(ExceptionalHalt::InvalidOpcode))
        );
    }

    #[test]
    fn stack_underflow_reverts() {
        let report = run(&hex!("01"), &mut InMemoryStorage::new());
        assert_eq!(
            report.error(),
            Some(&VMError::ExceptionalHalt(ExceptionalHalt::StackUnderflow))
        );
    }

    #[test]
    fn memory_limit_is_enforced() {
        let program = Program::new(Bytes::copy_from_slice(&hex!("60016101005200")));
        let mut store = InMemoryStorage::new();
        let config = VMConfig {
            memory_limit: 64,
            ..VMConfig::default()
        };
        let mut vm = VM::new(&program, &mut store, Bytes::new(), U256::zero(), config);
        let report = vm.execute().unwrap();
        assert_eq!(
            report.error(),
            Some(&VMError::ExceptionalHalt(ExceptionalHalt::OutOfBounds))
        );
    }

    /// A store whose backend cannot be reached.
    struct UnreachableStorage;

    impl PersistentStorage for UnreachableStorage {
        fn get_storage_value(&self, _key: U256) -> Result<U256, DatabaseError> {
            Err(DatabaseError::Custom("store unreachable".to_string()))
        }

        fn apply_storage_updates(&mut self, _updates: &StorageUpdates) -> Result<(), DatabaseError> {
            Err(DatabaseError::Custom("store unreachable".to_string()))
        }
    }

    #[test]
    fn storage_backend_failures_abort_the_call() {
        let expected = Err(VMError::Database(DatabaseError::Custom(
            "store unreachable".to_string(),
        )));
        // PUSH0 SLOAD STOP fails on the read, PUSH1 7 PUSH0 SSTORE STOP on the commit.
        for code in [&hex!("5f5400")[..], &hex!("60075f5500")[..]] {
            let program = Program::new(Bytes::copy_from_slice(code));
            let mut store = UnreachableStorage;
            let mut vm = VM::new(
                &program,
                &mut store,
                Bytes::new(),
                U256::zero(),
                VMConfig::default(),
            );
            assert_eq!(vm.execute(), expected);
        }
    }
}
