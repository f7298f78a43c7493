use crate::config::Config;
use anyhow::{Context, Result};
use daprctl_common::workdir::DaprctlWorkDir;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, time::SystemTime},
    prelude::*,
    EnvFilter,
};

/// Installs the global subscriber writing to the working directory's log file.
/// `RUST_LOG` overrides `config.log_level`.
pub fn setup_logging(config: &Config, workdir: &DaprctlWorkDir) -> Result<()> {
    workdir.init()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;

    let file_appender =
        RollingFileAppender::new(Rotation::NEVER, &workdir.path, workdir.log_file_name());

    let file_layer = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_timer(SystemTime)
        .with_writer(file_appender);

    let subscriber = tracing_subscriber::registry().with(filter).with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    tracing::info!("Logging system initialized. Writing to {:?}", workdir.log_file);

    Ok(())
}
