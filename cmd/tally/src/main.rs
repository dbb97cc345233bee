use clap::Parser;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber, filter::Directive};

use crate::cli::CLI;

mod cli;

fn init_tracing(log_level: Level) -> eyre::Result<()> {
    let log_filter = EnvFilter::builder()
        .with_default_directive(Directive::from(log_level))
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> eyre::Result<()> {
    let CLI { opts, command } = CLI::parse();

    init_tracing(opts.effective_log_level())?;

    command.run(&opts)
}
