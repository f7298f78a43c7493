pub const SIDECAR_BINARY: &str = "daprd";

pub const DEFAULT_DAPR_HTTP_PORT: u16 = 3500;
pub const DEFAULT_DAPR_GRPC_PORT: u16 = 50001;
pub const DEFAULT_APP_PORT: u16 = 0;

pub const METADATA_ENDPOINT: &str = "/v1.0/metadata";
pub const METADATA_HOST: &str = "127.0.0.1";
pub const METADATA_TIMEOUT_MS: u64 = 2000;

pub const SUBSCRIBE_ENDPOINT: &str = "/dapr/subscribe";
pub const EVENTS_ENDPOINT: &str = "/events";
pub const LISTEN_HOST: &str = "127.0.0.1";

pub const LOG_LEVEL: &str = "info";
pub const CONFIG_ENV_PREFIX: &str = "DAPRCTL";

/// Command lines are truncated to this many characters in table output.
pub const COMMAND_DISPLAY_WIDTH: usize = 20;
pub const CREATED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M.%S";

pub mod flags {
    pub const APP_ID: &str = "--app-id";
    pub const DAPR_HTTP_PORT: &str = "--dapr-http-port";
    pub const DAPR_GRPC_PORT: &str = "--dapr-grpc-port";
    pub const APP_PORT: &str = "--app-port";
    pub const ENABLE_METRICS: &str = "--enable-metrics";
    pub const UNIX_DOMAIN_SOCKET: &str = "--unix-domain-socket";
}

pub mod extended {
    pub const APP_COMMAND: &str = "appCommand";
    pub const CLI_PID: &str = "cliPID";
}

/// Socket file a sidecar (or app) exposes inside a `--unix-domain-socket` directory.
pub fn socket_file_name(app_id: &str, protocol: &str) -> String {
    format!("dapr-{}-{}.socket", app_id, protocol)
}
