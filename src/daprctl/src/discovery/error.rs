use thiserror::Error;

/// Failures that abort a whole scan.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("process table is not available on this platform")]
    UnsupportedPlatform,

    #[error("failed to read the process table: {0}")]
    ProcessTable(String),
}

/// Why a sidecar's metadata could not be fetched. Never fatal to a scan.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("metadata request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to connect to socket {path}: {source}")]
    Socket {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("metadata request over socket failed: {0}")]
    Http(#[from] hyper::Error),

    #[error("failed to build metadata request: {0}")]
    InvalidRequest(#[from] hyper::http::Error),

    #[error("sidecar answered with status {0}")]
    Status(u16),

    #[error("malformed metadata body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("socket transport is not supported on this platform")]
    UnsupportedTransport,
}
