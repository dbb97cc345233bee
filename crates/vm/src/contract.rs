use crate::{
    backends::Backend,
    constants::COUNTER_INIT_CODE,
    db::{InMemoryStorage, PersistentStorage},
    environment::VMConfig,
    errors::{DeploymentError, ExecutionReport, TxResult, VMError},
    program::Program,
    vm::VM,
};
use bytes::Bytes;
use ethereum_types::U256;
use tracing::info;

/// A deployed program together with the storage it owns.
///
/// Calls borrow the storage mutably for their whole duration, so two calls against the same
/// contract can never overlap.
#[derive(Debug, Clone)]
pub struct Contract<S: PersistentStorage = InMemoryStorage> {
    runtime: Program,
    storage: S,
    config: VMConfig,
}

impl Contract {
    /// Deploys the counter contract on a fresh in-memory store.
    pub fn deploy_counter(config: VMConfig) -> Result<Self, DeploymentError> {
        Self::deploy(
            Bytes::from_static(&COUNTER_INIT_CODE),
            U256::zero(),
            InMemoryStorage::new(),
            config,
        )
    }
}

impl<S: PersistentStorage> Contract<S> {
    /// Runs `init_code` as a constructor and installs the bytes it returns as the runtime.
    ///
    /// The constructor is always interpreted, whatever backend `config` selects for later
    /// calls. Its storage writes are committed like those of any successful call.
    pub fn deploy(
        init_code: Bytes,
        value: U256,
        mut storage: S,
        config: VMConfig,
    ) -> Result<Self, DeploymentError> {
        let init_program = Program::new(init_code);
        let report = VM::new(
            &init_program,
            &mut storage,
            Bytes::new(),
            value,
            config.with_backend(Backend::Bytecode),
        )
        .execute()?;

        if let TxResult::Revert(error) = report.result {
            return Err(DeploymentError::Reverted(error));
        }
        if report.output.is_empty() {
            return Err(DeploymentError::EmptyRuntime);
        }

        let runtime = Program::new(report.output);
        info!(
            runtime_size = runtime.len(),
            jump_destinations = runtime.jump_destinations().len(),
            backend = %config.backend,
            "Deployed contract"
        );

        Ok(Self {
            runtime,
            storage,
            config,
        })
    }

    /// Executes one call against the installed runtime.
    pub fn call(&mut self, calldata: Bytes, value: U256) -> Result<ExecutionReport, VMError> {
        let report = VM::new(
            &self.runtime,
            &mut self.storage,
            calldata,
            value,
            self.config,
        )
        .execute()?;

        if !report.storage_updates.is_empty() {
            info!(slots = report.storage_updates.len(), "Committed call");
        }
        Ok(report)
    }

    pub fn runtime(&self) -> &Program {
        &self.runtime
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> VMConfig {
        self.config
    }

    /// Hands back the store, e.g. to redeploy on top of it.
    pub fn into_storage(self) -> S {
        self.storage
    }
}
