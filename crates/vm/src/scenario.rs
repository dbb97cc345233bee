//! JSON described call sequences.
//!
//! ```json
//! {
//!   "backend": "native",
//!   "calls": [
//!     { "calldata": "0xcdfead2e000000000000000000000000000000000000000000000000000000000000002a" },
//!     { "calldata": "0xe026c017", "expect": { "success": true, "output": "0x00...2a" } }
//!   ],
//!   "post_storage": { "0x0": "42" }
//! }
//! ```
//!
//! `init_code` defaults to the counter contract and `backend` to whatever the runner was given.

use crate::{
    backends::Backend,
    constants::COUNTER_INIT_CODE,
    contract::Contract,
    db::{InMemoryStorage, PersistentStorage},
    deserialize::{
        deserialize_hex_bytes, deserialize_optional_hex_bytes, deserialize_u256_str,
        deserialize_u256_valued_hashmap,
    },
    environment::VMConfig,
    errors::{DeploymentError, ExecutionReport, VMError},
};
use bytes::Bytes;
use ethereum_types::U256;
use serde::Deserialize;
use std::{collections::HashMap, fmt, str::FromStr};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct Scenario {
    #[serde(deserialize_with = "deserialize_optional_hex_bytes")]
    pub init_code: Option<Bytes>,
    pub backend: Option<Backend>,
    pub calls: Vec<ScenarioCall>,
    /// Durable storage expected once every call has run. Slots not listed are not checked.
    #[serde(deserialize_with = "deserialize_u256_valued_hashmap")]
    pub post_storage: HashMap<U256, U256>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct ScenarioCall {
    #[serde(default, deserialize_with = "deserialize_hex_bytes")]
    pub calldata: Bytes,
    #[serde(default, deserialize_with = "deserialize_u256_str")]
    pub value: U256,
    #[serde(default)]
    pub expect: Option<Expectation>,
}

/// What the caller should observe: success flag and return data.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub success: bool,
    #[serde(default, deserialize_with = "deserialize_hex_bytes")]
    pub output: Bytes,
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(success: {}, output: 0x{})",
            self.success,
            hex::encode(&self.output)
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Deployment failed: {0}")]
    Deployment(#[from] DeploymentError),
    #[error("Call {call} aborted: {error}")]
    Aborted { call: usize, error: VMError },
    #[error("Call {call}: expected {expected}, got {actual}")]
    Mismatch {
        call: usize,
        expected: Expectation,
        actual: Expectation,
    },
    #[error("Slot {slot}: expected {expected}, found {actual}")]
    StorageMismatch {
        slot: U256,
        expected: U256,
        actual: U256,
    },
    #[error("Storage read failed: {0}")]
    Storage(String),
}

impl FromStr for Scenario {
    type Err = ScenarioError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Scenario {
    /// Deploys the scenario's contract and runs every call in order, checking expectations as
    /// it goes. `config.backend` is overridden by the scenario's own backend, if any.
    pub fn run(&self, config: VMConfig) -> Result<Vec<ExecutionReport>, ScenarioError> {
        let config = match self.backend {
            Some(backend) => config.with_backend(backend),
            None => config,
        };
        let init_code = self
            .init_code
            .clone()
            .unwrap_or_else(|| Bytes::from_static(&COUNTER_INIT_CODE));
        let mut contract =
            Contract::deploy(init_code, U256::zero(), InMemoryStorage::new(), config)?;

        let mut reports = Vec::with_capacity(self.calls.len());
        for (call, scenario_call) in self.calls.iter().enumerate() {
            let report = contract
                .call(scenario_call.calldata.clone(), scenario_call.value)
                .map_err(|error| ScenarioError::Aborted { call, error })?;
            debug!(call, success = report.is_success(), "Scenario call finished");

            if let Some(expected) = &scenario_call.expect {
                let actual = Expectation {
                    success: report.is_success(),
                    output: report.output.clone(),
                };
                if *expected != actual {
                    return Err(ScenarioError::Mismatch {
                        call,
                        expected: expected.clone(),
                        actual,
                    });
                }
            }
            reports.push(report);
        }

        for (slot, expected) in &self.post_storage {
            let actual = contract
                .storage()
                .get_storage_value(*slot)
                .map_err(|err| ScenarioError::Storage(err.to_string()))?;
            if actual != *expected {
                return Err(ScenarioError::StorageMismatch {
                    slot: *slot,
                    expected: *expected,
                    actual,
                });
            }
        }

        Ok(reports)
    }
}
