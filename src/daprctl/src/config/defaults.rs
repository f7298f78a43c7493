use crate::config::Config;
use crate::constants::{LISTEN_HOST, LOG_LEVEL, METADATA_HOST, METADATA_TIMEOUT_MS, SIDECAR_BINARY};

impl Default for Config {
    fn default() -> Self {
        Self {
            sidecar_binary: SIDECAR_BINARY.to_string(),
            metadata_host: METADATA_HOST.to_string(),
            metadata_timeout_ms: METADATA_TIMEOUT_MS,
            listen_host: LISTEN_HOST.to_string(),
            log_level: LOG_LEVEL.to_string(),
        }
    }
}
