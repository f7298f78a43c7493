use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubscribeError {
    #[error("failed to allocate a local port: {0}")]
    PortAllocation(#[source] io::Error),

    #[error("failed to bind socket {path}: {source}")]
    SocketBind {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("unix domain sockets are not supported on this platform")]
    UnsupportedPlatform,

    #[error("invalid routing rules: {0}")]
    Routes(#[source] serde_json::Error),

    #[error("invalid metadata: {0}")]
    Metadata(String),

    #[error("subscription listener failed: {0}")]
    Listener(#[source] io::Error),

    #[error("subscription listener task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
