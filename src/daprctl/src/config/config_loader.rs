use anyhow::{Context, Result};
use config::{Config as RConfig, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::constants::{
    CONFIG_ENV_PREFIX, LISTEN_HOST, LOG_LEVEL, METADATA_HOST, METADATA_TIMEOUT_MS, SIDECAR_BINARY,
};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Executable name of the sidecar, without any platform suffix.
    pub sidecar_binary: String,
    pub metadata_host: String,
    pub metadata_timeout_ms: u64,
    /// Host the subscription endpoint binds its ephemeral port on.
    pub listen_host: String,
    pub log_level: String,
}

impl Config {
    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(RConfig::builder()
            .set_default("sidecar_binary", SIDECAR_BINARY)?
            .set_default("metadata_host", METADATA_HOST)?
            .set_default("metadata_timeout_ms", METADATA_TIMEOUT_MS)?
            .set_default("listen_host", LISTEN_HOST)?
            .set_default("log_level", LOG_LEVEL)?)
    }

    /// Defaults, then the TOML file at `path` (if given), then `DAPRCTL_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut builder = Self::builder()?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(Environment::with_prefix(CONFIG_ENV_PREFIX).try_parsing(true));

        builder
            .build()
            .context("failed to build configuration")?
            .try_deserialize()
            .context("failed to parse config file")
    }
}
