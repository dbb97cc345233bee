use bytes::Bytes;
use hex_literal::hex;
use tally_vm::{
    U256, VMConfig,
    asm::assemble,
    backends::Backend,
    constants::{COUNTER_INIT_CODE, COUNTER_SLOT},
    contract::Contract,
    db::{InMemoryStorage, PersistentStorage},
    dispatcher::{encode_read, encode_write},
    errors::{DispatchError, ExceptionalHalt, ExecutionReport, StorageUpdates, VMError},
};

const BACKENDS: [Backend; 2] = [Backend::Bytecode, Backend::Native];

fn deploy(backend: Backend) -> Contract {
    Contract::deploy_counter(VMConfig::default().with_backend(backend)).unwrap()
}

fn read(contract: &mut Contract) -> ExecutionReport {
    contract.call(encode_read(), U256::zero()).unwrap()
}

fn write(contract: &mut Contract, value: U256) -> ExecutionReport {
    contract.call(encode_write(value), U256::zero()).unwrap()
}

fn assert_reverted_silently(report: &ExecutionReport) {
    assert!(!report.is_success(), "expected a revert, got {report:?}");
    assert!(report.output.is_empty());
    assert!(report.storage_updates.is_empty());
}

#[test]
fn fresh_counter_reads_zero() {
    for backend in BACKENDS {
        let mut contract = deploy(backend);
        let report = read(&mut contract);
        assert!(report.is_success());
        assert_eq!(report.output.as_ref(), [0u8; 32]);
    }
}

#[test]
fn write_then_read_round_trips() {
    let values = [
        U256::zero(),
        U256::one(),
        U256::from(42),
        U256::from(u64::MAX) + 1,
        U256::MAX,
    ];

    for backend in BACKENDS {
        let mut contract = deploy(backend);
        for value in values {
            let report = write(&mut contract, value);
            assert!(report.is_success());
            assert!(report.output.is_empty());

            let report = read(&mut contract);
            assert!(report.is_success());
            assert_eq!(report.output.len(), 32);
            assert_eq!(U256::from_big_endian(&report.output), value);
        }
    }
}

#[test]
fn reads_are_idempotent() {
    for backend in BACKENDS {
        let mut contract = deploy(backend);
        write(&mut contract, U256::from(7));

        let first = read(&mut contract);
        let second = read(&mut contract);
        assert_eq!(first, second);
        assert!(first.storage_updates.is_empty());
    }
}

#[test]
fn write_reports_its_storage_update() {
    for backend in BACKENDS {
        let mut contract = deploy(backend);
        let report = write(&mut contract, U256::from(42));
        assert_eq!(
            report.storage_updates,
            StorageUpdates::from([(COUNTER_SLOT, U256::from(42))])
        );
        assert_eq!(
            contract.storage().get_storage_value(COUNTER_SLOT),
            Ok(U256::from(42))
        );
    }
}

#[test]
fn scenario_a() {
    for backend in BACKENDS {
        let mut contract = deploy(backend);
        let calldata = Bytes::from_static(&hex!(
            "cdfead2e000000000000000000000000000000000000000000000000000000000000002a"
        ));

        let report = contract.call(calldata, U256::zero()).unwrap();
        assert!(report.is_success());
        assert!(report.output.is_empty());

        let report = contract
            .call(Bytes::from_static(&hex!("e026c017")), U256::zero())
            .unwrap();
        assert!(report.is_success());
        assert_eq!(
            report.output.as_ref(),
            hex!("000000000000000000000000000000000000000000000000000000000000002a")
        );
    }
}

#[test]
fn scenario_c_unknown_selector() {
    for backend in BACKENDS {
        let mut contract = deploy(backend);
        let report = contract
            .call(Bytes::from_static(&hex!("12345678")), U256::zero())
            .unwrap();
        assert_reverted_silently(&report);
    }

    let mut contract = deploy(Backend::Native);
    let report = contract
        .call(Bytes::from_static(&hex!("12345678")), U256::zero())
        .unwrap();
    assert_eq!(
        report.error(),
        Some(&VMError::Dispatch(DispatchError::UnknownSelector(
            0x12345678
        )))
    );
}

#[test]
fn value_transfers_always_revert() {
    let calldatas = [
        Bytes::new(),
        encode_read(),
        encode_write(U256::from(3)),
        Bytes::from_static(&hex!("deadbeef")),
    ];

    for backend in BACKENDS {
        let mut contract = deploy(backend);
        for calldata in &calldatas {
            for value in [U256::one(), U256::MAX] {
                let report = contract.call(calldata.clone(), value).unwrap();
                assert_reverted_silently(&report);
            }
        }
        assert!(contract.storage().is_empty());
    }
}

#[test]
fn calldata_without_selector_reverts() {
    for backend in BACKENDS {
        let mut contract = deploy(backend);
        for len in 0..4 {
            let calldata = encode_read().slice(..len);
            assert_reverted_silently(&contract.call(calldata, U256::zero()).unwrap());
        }
    }
}

#[test]
fn write_without_full_argument_reverts() {
    for backend in BACKENDS {
        let mut contract = deploy(backend);
        write(&mut contract, U256::from(5));

        let full = encode_write(U256::from(6));
        for len in 4..full.len() {
            let report = contract.call(full.slice(..len), U256::zero()).unwrap();
            assert_reverted_silently(&report);
        }

        let report = read(&mut contract);
        assert_eq!(U256::from_big_endian(&report.output), U256::from(5));
    }
}

#[test]
fn bytecode_failures_carry_their_reason() {
    let mut contract = deploy(Backend::Bytecode);
    // The compiled runtime rejects everything with `REVERT(0, 0)`.
    let report = contract.call(encode_read(), U256::one()).unwrap();
    assert_eq!(report.error(), Some(&VMError::RevertOpcode));

    let mut contract = deploy(Backend::Native);
    let report = contract.call(encode_read(), U256::one()).unwrap();
    assert_eq!(
        report.error(),
        Some(&VMError::Dispatch(DispatchError::ValueTransfer))
    );
}

/// Deploys a constructor that returns `runtime` verbatim on top of `storage`.
fn deploy_runtime(runtime: &str, storage: InMemoryStorage) -> Contract {
    let runtime = assemble(runtime).unwrap();
    let len = runtime.len();
    // CODECOPY the runtime, which starts right after this 11 byte prefix, and RETURN it.
    let mut init_code = assemble(&format!(
        "PUSH1 {len} PUSH1 11 PUSH0 CODECOPY PUSH1 {len} PUSH0 RETURN INVALID"
    ))
    .unwrap()
    .to_vec();
    assert_eq!(init_code.len(), 11);
    init_code.extend_from_slice(&runtime);

    let contract = Contract::deploy(
        init_code.into(),
        U256::zero(),
        storage,
        VMConfig::default(),
    )
    .unwrap();
    assert_eq!(contract.runtime().bytecode, runtime);
    contract
}

fn storage_with_counter(value: u64) -> InMemoryStorage {
    let mut storage = InMemoryStorage::new();
    storage
        .apply_storage_updates(&StorageUpdates::from([(COUNTER_SLOT, U256::from(value))]))
        .unwrap();
    storage
}

#[test]
fn staged_writes_are_rolled_back_on_failure() {
    let failing_tails = [
        ("PUSH0 PUSH0 REVERT", VMError::RevertOpcode),
        (
            "INVALID",
            VMError::ExceptionalHalt(ExceptionalHalt::InvalidOpcode),
        ),
        (
            "PUSH1 0x03 JUMP",
            VMError::ExceptionalHalt(ExceptionalHalt::InvalidJumpTarget),
        ),
        (
            "POP POP",
            VMError::ExceptionalHalt(ExceptionalHalt::StackUnderflow),
        ),
    ];

    for (tail, expected) in failing_tails {
        // Stage 99 in the counter slot, skip the INVALID only if the write is visible, then fail.
        let mut contract = deploy_runtime(
            &format!(
                "PUSH1 99 PUSH0 SSTORE PUSH0 SLOAD PUSH1 99 EQ PUSH1 13 JUMPI INVALID JUMPDEST {tail}"
            ),
            storage_with_counter(5),
        );
        let report = contract.call(Bytes::new(), U256::zero()).unwrap();

        assert_eq!(report.error(), Some(&expected), "tail `{tail}`");
        assert!(report.storage_updates.is_empty());
        assert_eq!(
            contract.storage().get_storage_value(COUNTER_SLOT),
            Ok(U256::from(5))
        );
    }
}

#[test]
fn staged_write_is_visible_and_committed() {
    let mut contract = deploy_runtime(
        "PUSH1 99 PUSH0 SSTORE PUSH0 SLOAD PUSH0 MSTORE PUSH1 32 PUSH0 RETURN",
        storage_with_counter(5),
    );
    let report = contract.call(Bytes::new(), U256::zero()).unwrap();

    assert!(report.is_success());
    assert_eq!(U256::from_big_endian(&report.output), U256::from(99));
    assert_eq!(
        contract.storage().get_storage_value(COUNTER_SLOT),
        Ok(U256::from(99))
    );
}

#[test]
fn stack_overflow_rolls_back() {
    // Stage a write, then push forever.
    let mut contract = deploy_runtime(
        "PUSH1 1 PUSH0 SSTORE JUMPDEST PUSH0 PUSH1 4 JUMP",
        storage_with_counter(5),
    );
    let report = contract.call(Bytes::new(), U256::zero()).unwrap();

    assert_eq!(
        report.error(),
        Some(&VMError::ExceptionalHalt(ExceptionalHalt::StackOverflow))
    );
    assert_eq!(
        contract.storage().get_storage_value(COUNTER_SLOT),
        Ok(U256::from(5))
    );
}

#[test]
fn revert_returns_the_selected_memory_range() {
    let mut contract = deploy_runtime(
        "PUSH2 0xbeef PUSH0 MSTORE PUSH1 2 PUSH1 30 REVERT",
        InMemoryStorage::new(),
    );
    let report = contract.call(Bytes::new(), U256::zero()).unwrap();
    assert_eq!(report.error(), Some(&VMError::RevertOpcode));
    assert_eq!(report.output.as_ref(), hex!("beef"));
}

#[test]
fn storage_survives_redeployment_on_the_same_store() {
    let mut contract = deploy(Backend::Bytecode);
    write(&mut contract, U256::from(77));

    let storage = contract.into_storage();
    let mut contract = Contract::deploy(
        Bytes::from_static(&COUNTER_INIT_CODE),
        U256::zero(),
        storage,
        VMConfig::default(),
    )
    .unwrap();
    let report = read(&mut contract);
    assert_eq!(U256::from_big_endian(&report.output), U256::from(77));
}
