//! Controller binary issuing pause and resume commands to the local connection pooler.

use std::path::PathBuf;

use ::config::shared::ControllerConfig;
use clap::{Parser, Subcommand};
use pooler::admin::ControlCommand;
use telemetry::tracing::init_tracing;
use tracing::error;

use crate::config::load_controller_config;
use crate::core::run_command;

mod config;
mod core;

#[derive(Parser)]
#[command(name = "controller", about = "Pause and resume the local connection pooler")]
struct Args {
    /// Directory holding `base.yaml` and the per-environment overrides
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Stop the pooler from forwarding new queries, retrying while it starts up
    Pause,
    /// Let the pooler forward queries again
    Resume,
}

impl From<Command> for ControlCommand {
    fn from(command: Command) -> Self {
        match command {
            Command::Pause => ControlCommand::Pause,
            Command::Resume => ControlCommand::Resume,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_controller_config(args.config_dir.as_deref())?;
    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(config, args.command.into()))
}

async fn async_main(config: ControllerConfig, command: ControlCommand) -> anyhow::Result<()> {
    if let Err(err) = run_command(config, command).await {
        error!("{err}");
        return Err(err);
    }

    Ok(())
}
