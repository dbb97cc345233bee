use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Strategy used to run calls against an installed contract.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Interprets the installed runtime bytecode.
    #[default]
    Bytecode,
    /// Runs the entry point table of the counter contract directly against the store.
    Native,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid backend: {0}, expected `bytecode` or `native`")]
pub struct InvalidBackend(pub String);

impl FromStr for Backend {
    type Err = InvalidBackend;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bytecode" => Ok(Backend::Bytecode),
            "native" => Ok(Backend::Native),
            _ => Err(InvalidBackend(s.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Bytecode => write!(f, "bytecode"),
            Backend::Native => write!(f, "native"),
        }
    }
}
