use bytes::Bytes;
use ethereum_types::U256;
use serde::Serialize;
use std::collections::BTreeMap;

/// Storage writes performed by a call, keyed by slot.
pub type StorageUpdates = BTreeMap<U256, U256>;

/// Errors that can happen while running a call.
///
/// Everything except [`VMError::Internal`] and [`VMError::Database`] reverts the call and is
/// reported inside [`TxResult::Revert`]; those two abort execution and are returned as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum VMError {
    /// Errors that break execution in the middle of a program.
    #[error("Exceptional Halt: {0}")]
    ExceptionalHalt(#[from] ExceptionalHalt),
    /// Preconditions checked by the native dispatcher before any handler runs.
    #[error("Dispatch Error: {0}")]
    Dispatch(#[from] DispatchError),
    /// The program executed `REVERT`. The return data is whatever memory range it selected.
    #[error("Revert Opcode")]
    RevertOpcode,
    #[error("Internal Error: {0}")]
    Internal(#[from] InternalError),
    #[error("Database Error: {0}")]
    Database(#[from] DatabaseError),
}

impl VMError {
    /// These errors are unexpected and indicate critical issues.
    /// They should not cause a call to revert silently but instead fail loudly, propagating
    /// the error.
    pub fn is_internal(&self) -> bool {
        matches!(self, VMError::Internal(_) | VMError::Database(_))
    }

    pub fn is_revert_opcode(&self) -> bool {
        matches!(self, VMError::RevertOpcode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum ExceptionalHalt {
    #[error("Stack Underflow")]
    StackUnderflow,
    #[error("Stack Overflow")]
    StackOverflow,
    #[error("Invalid Jump Target")]
    InvalidJumpTarget,
    /// Raised by the designated `INVALID` opcode and by every byte that does not decode.
    #[error("Invalid Opcode")]
    InvalidOpcode,
    /// Memory access past the host's memory bound, or with an offset that does not fit a `usize`.
    #[error("Memory Access Out Of Bounds")]
    OutOfBounds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum DispatchError {
    #[error("Value transfer to a non payable entry point")]
    ValueTransfer,
    #[error("Calldata too short: expected at least {expected} bytes, got {actual}")]
    CalldataTooShort { expected: usize, actual: usize },
    #[error("Unknown selector 0x{0:08x}")]
    UnknownSelector(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum InternalError {
    #[error("Stack slice has unexpected size")]
    StackSlice,
}

/// Failure reported by a [`PersistentStorage`](crate::db::PersistentStorage) backend.
///
/// [`InMemoryStorage`](crate::db::InMemoryStorage) never fails; this is for stores backed by
/// something external, which report their failures as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum DatabaseError {
    #[error("{0}")]
    Custom(String),
}

/// Errors raised while installing a program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeploymentError {
    #[error("Constructor reverted: {0}")]
    Reverted(VMError),
    #[error("Constructor returned an empty runtime")]
    EmptyRuntime,
    #[error(transparent)]
    VM(#[from] VMError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeResult {
    Continue,
    Halt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TxResult {
    Success,
    Revert(VMError),
}

impl TxResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TxResult::Success)
    }
}

/// Outcome of one call.
///
/// At the call boundary only `(is_success(), output)` is observable; the revert reason is kept
/// for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub result: TxResult,
    pub output: Bytes,
    /// Slot writes applied to the durable store. Always empty for reverted calls.
    pub storage_updates: StorageUpdates,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    /// Revert reason, if any.
    pub fn error(&self) -> Option<&VMError> {
        match &self.result {
            TxResult::Success => None,
            TxResult::Revert(error) => Some(error),
        }
    }
}
