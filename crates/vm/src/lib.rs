//! # tally-vm
//!
//! A minimal stack machine able to deploy and run a single persistent counter contract.
//!
//! ## Overview
//!
//! A call runs inside a fresh [`call_frame::ExecutionContext`] that owns its stack and memory and
//! borrows the contract's durable store through a staging overlay. Writes made during the call
//! are applied to the store only if it halts successfully; any failure drops them.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         Contract                          │
//! │  ┌─────────────┐   ┌────────────────────────────────────┐ │
//! │  │   Program   │   │                 VM                 │ │
//! │  │ + jumpdests │──▶│  ExecutionContext                  │ │
//! │  └─────────────┘   │  Stack · Memory · Calldata · pc    │ │
//! │                    │  interpreter | native dispatcher   │ │
//! │                    └─────────────────┬──────────────────┘ │
//! │                                      │ StagedStorage       │
//! │                                      ▼                     │
//! │                         PersistentStorage (durable)        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`contract`] | Deployment and the call entry point |
//! | [`vm`] | Execution loop, commit and rollback |
//! | [`call_frame`] | Stack and per-call execution context |
//! | [`memory`] | Word-expanding scratch memory |
//! | [`calldata`] | Zero-padded calldata view |
//! | [`db`] | Durable store trait and the staging overlay |
//! | [`program`] | Bytecode with its jump destination index |
//! | [`opcodes`] | Opcode enum and handler table |
//! | [`opcode_handlers`] | Opcode execution logic by category |
//! | [`dispatcher`] | Native entry point table of the counter |
//! | [`backends`] | Bytecode or native execution |
//! | [`asm`] | Assembler and disassembler |
//! | [`scenario`] | JSON call sequences |
//! | [`errors`] | VMError, ExceptionalHalt, etc. |
//!
//! ## Quick Start
//!
//! ```
//! use tally_vm::{U256, VMConfig, contract::Contract, dispatcher};
//!
//! let mut counter = Contract::deploy_counter(VMConfig::default())?;
//!
//! let report = counter.call(dispatcher::encode_write(U256::from(42)), U256::zero())?;
//! assert!(report.is_success());
//!
//! let report = counter.call(dispatcher::encode_read(), U256::zero())?;
//! assert_eq!(U256::from_big_endian(&report.output), U256::from(42));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod asm;
pub mod backends;
pub mod call_frame;
pub mod calldata;
pub mod constants;
pub mod contract;
pub mod db;
pub mod deserialize;
pub mod dispatcher;
pub mod environment;
pub mod errors;
pub mod memory;
pub mod opcode_handlers;
pub mod opcodes;
pub mod program;
pub mod scenario;
pub mod utils;
pub mod vm;
pub use environment::*;
pub use ethereum_types::U256;
