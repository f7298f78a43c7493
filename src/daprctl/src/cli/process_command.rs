use super::commands::{Cli, Command};
use super::handlers;
use crate::config::ConfigLoader;
use crate::logging::setup_logging;
use anyhow::Result;
use clap::Parser;
use daprctl_common::workdir::DAPRCTL_WORK_DIR;
use daprctl_common::{error_message, warning_message, Colorize};
use std::process::ExitCode;

/// Process the command line. Any failure is printed and turned into exit code 1.
pub fn process_command() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("command failed: {e:?}");
            error_message!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Use the --config flag, if provided, when loading the configuration
    let config = ConfigLoader::load(cli.config.as_deref())?;

    if let Err(e) = setup_logging(&config, &DAPRCTL_WORK_DIR) {
        warning_message!("Logging disabled: {e:#}");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    match cli.command {
        Command::List { output } => runtime.block_on(handlers::list(&config, output)),
        Command::Subscribe(args) => runtime.block_on(handlers::subscribe(args, &config)),
    }
}
