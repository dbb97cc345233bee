use std::{fs, path::PathBuf, str::FromStr};

use bytes::Bytes;
use clap::{ArgAction, Parser as ClapParser, Subcommand as ClapSubcommand};
use eyre::{WrapErr, bail};
use tally_vm::{
    U256, VMConfig,
    asm::{assemble, disassemble_to_string},
    backends::Backend,
    constants::{COUNTER_INIT_CODE, DEFAULT_MEMORY_LIMIT},
    contract::Contract,
    db::InMemoryStorage,
    deserialize::{parse_hex_bytes, parse_u256_str},
    dispatcher::{encode_read, encode_write},
    errors::ExecutionReport,
    scenario::Scenario,
};
use tracing::{Level, info};

pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

#[allow(clippy::upper_case_acronyms)]
#[derive(ClapParser)]
#[command(name = "tally", author, version = VERSION_STRING, about = "Counter contract VM", long_about = None)]
pub struct CLI {
    #[clap(flatten)]
    pub opts: Options,
    #[command(subcommand)]
    pub command: Subcommand,
}

#[derive(ClapParser)]
pub struct Options {
    #[arg(
        long = "backend",
        global = true,
        default_value_t = Backend::Bytecode,
        value_name = "BACKEND",
        env = "TALLY_BACKEND",
        help = "How calls are executed: `bytecode` interprets the runtime, `native` runs the counter's entry points directly."
    )]
    pub backend: Backend,
    #[arg(
        long = "memory-limit",
        global = true,
        default_value_t = DEFAULT_MEMORY_LIMIT,
        value_name = "BYTES",
        env = "TALLY_MEMORY_LIMIT"
    )]
    pub memory_limit: usize,
    #[arg(long = "log.level", global = true, default_value_t = Level::INFO, value_name = "LOG_LEVEL")]
    pub log_level: Level,
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = ArgAction::SetTrue,
        help = "Trace every executed opcode. Overrides --log.level."
    )]
    pub verbose: bool,
}

impl Options {
    pub fn vm_config(&self) -> VMConfig {
        VMConfig {
            memory_limit: self.memory_limit,
            backend: self.backend,
        }
    }

    pub fn effective_log_level(&self) -> Level {
        if self.verbose {
            Level::TRACE
        } else {
            self.log_level
        }
    }
}

/// One call given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    Write(U256),
    Read,
    Raw(Bytes),
}

impl FromStr for CallArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "read" {
            return Ok(CallArg::Read);
        }
        if let Some(value) = s.strip_prefix("write:") {
            return parse_u256_str(value).map(CallArg::Write);
        }
        if s.starts_with("0x") {
            return parse_hex_bytes(s).map(CallArg::Raw);
        }
        Err(format!(
            "unrecognized call `{s}`, expected `read`, `write:<value>` or 0x-prefixed calldata"
        ))
    }
}

impl CallArg {
    pub fn calldata(&self) -> Bytes {
        match self {
            CallArg::Write(value) => encode_write(*value),
            CallArg::Read => encode_read(),
            CallArg::Raw(calldata) => calldata.clone(),
        }
    }
}

#[derive(ClapSubcommand)]
pub enum Subcommand {
    #[clap(name = "deploy", about = "Run a constructor and print the runtime it installs")]
    Deploy {
        #[arg(
            long = "init-code",
            value_name = "HEX",
            value_parser = parse_hex_bytes,
            help = "Constructor bytecode. Defaults to the counter contract."
        )]
        init_code: Option<Bytes>,
    },
    #[clap(
        name = "call",
        about = "Deploy the counter and run calls against it in order"
    )]
    Call {
        #[arg(
            required = true,
            value_name = "CALL",
            help = "`read`, `write:<value>` or raw 0x-prefixed calldata"
        )]
        calls: Vec<CallArg>,
        #[arg(long = "value", default_value = "0", value_parser = parse_u256_str, help = "Value attached to every call")]
        value: U256,
    },
    #[clap(name = "run", about = "Run a JSON scenario")]
    Run {
        #[arg(value_name = "SCENARIO_FILE")]
        path: PathBuf,
    },
    #[clap(name = "disasm", about = "Print the listing of some bytecode")]
    Disasm {
        #[arg(
            value_name = "HEX",
            value_parser = parse_hex_bytes,
            help = "Bytecode to decode. Defaults to the counter's init code."
        )]
        bytecode: Option<Bytes>,
    },
    #[clap(name = "asm", about = "Assemble a mnemonic source file into hex")]
    Asm {
        #[arg(value_name = "SOURCE_FILE")]
        path: PathBuf,
    },
}

impl Subcommand {
    pub fn run(self, opts: &Options) -> eyre::Result<()> {
        let config = opts.vm_config();
        match self {
            Subcommand::Deploy { init_code } => {
                let init_code =
                    init_code.unwrap_or_else(|| Bytes::from_static(&COUNTER_INIT_CODE));
                let contract =
                    Contract::deploy(init_code, U256::zero(), InMemoryStorage::new(), config)?;
                let runtime = contract.runtime();
                println!("runtime: 0x{}", hex::encode(&runtime.bytecode));
                println!("jump destinations: {:?}", runtime.jump_destinations());
                println!("{}", disassemble_to_string(&runtime.bytecode));
            }
            Subcommand::Call { calls, value } => {
                let mut contract = Contract::deploy_counter(config)?;
                for call in calls {
                    let report = contract.call(call.calldata(), value)?;
                    print_report(&call, &report);
                }
            }
            Subcommand::Run { path } => {
                let contents = fs::read_to_string(&path)
                    .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
                let scenario: Scenario = contents.parse()?;
                let reports = scenario.run(config)?;
                info!(calls = reports.len(), path = %path.display(), "Scenario passed");
                for report in reports {
                    println!("{}", format_report(&report));
                }
            }
            Subcommand::Disasm { bytecode } => {
                let bytecode = bytecode.unwrap_or_else(|| Bytes::from_static(&COUNTER_INIT_CODE));
                println!("{}", disassemble_to_string(&bytecode));
            }
            Subcommand::Asm { path } => {
                let source = fs::read_to_string(&path)
                    .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
                let bytecode = assemble(&source)?;
                if bytecode.is_empty() {
                    bail!("{} assembles to no bytecode", path.display());
                }
                println!("0x{}", hex::encode(&bytecode));
            }
        }
        Ok(())
    }
}

fn format_report(report: &ExecutionReport) -> String {
    match report.error() {
        None => format!("success output=0x{}", hex::encode(&report.output)),
        Some(error) => format!(
            "revert ({error}) output=0x{}",
            hex::encode(&report.output)
        ),
    }
}

fn print_report(call: &CallArg, report: &ExecutionReport) {
    match (call, report.is_success()) {
        (CallArg::Read, true) => {
            println!("read -> {}", U256::from_big_endian(&report.output));
        }
        (CallArg::Write(value), true) => println!("write {value} -> ok"),
        _ => println!("{}", format_report(report)),
    }
}
