use std::{fs, path::Path};
use tally_vm::{VMConfig, backends::Backend, scenario::Scenario};

const TEST_FOLDER: &str = "tests/vectors";

/// Runs every vector against both backends. A vector that pins its own backend runs once per
/// backend anyway, which is harmless.
fn test_runner(path: &Path) -> datatest_stable::Result<()> {
    let scenario: Scenario = fs::read_to_string(path)?.parse()?;

    for backend in [Backend::Bytecode, Backend::Native] {
        scenario
            .run(VMConfig::default().with_backend(backend))
            .map_err(|err| format!("{} with {backend} backend: {err}", path.display()))?;
    }

    Ok(())
}

datatest_stable::harness!(test_runner, TEST_FOLDER, r"^.*\.json$");
