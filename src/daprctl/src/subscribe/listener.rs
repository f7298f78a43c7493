use crate::subscribe::error::SubscribeError;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tracing::debug;

/// Where the subscription endpoint can be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundAddress {
    Tcp(SocketAddr),
    Unix(PathBuf),
}

impl BoundAddress {
    pub fn port(&self) -> Option<u16> {
        match self {
            BoundAddress::Tcp(addr) => Some(addr.port()),
            BoundAddress::Unix(_) => None,
        }
    }
}

impl fmt::Display for BoundAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundAddress::Tcp(addr) => write!(f, "http://{}", addr),
            BoundAddress::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

pub(super) enum EndpointListener {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(tokio::net::UnixListener, PathBuf),
}

impl EndpointListener {
    /// Binds an OS assigned port on `host`.
    pub async fn allocate_port(host: &str) -> Result<Self, SubscribeError> {
        let listener = TcpListener::bind((host, 0))
            .await
            .map_err(SubscribeError::PortAllocation)?;
        Ok(Self::Tcp(listener))
    }

    #[cfg(unix)]
    pub fn bind_socket(path: &Path) -> Result<Self, SubscribeError> {
        use std::os::unix::fs::FileTypeExt;

        // a socket left behind by an earlier run would make bind fail
        if let Ok(metadata) = std::fs::symlink_metadata(path) {
            if metadata.file_type().is_socket() {
                if let Err(e) = std::fs::remove_file(path) {
                    debug!("failed to remove stale socket {:?}: {}", path, e);
                }
            }
        }

        let listener =
            tokio::net::UnixListener::bind(path).map_err(|source| SubscribeError::SocketBind {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self::Unix(listener, path.to_path_buf()))
    }

    #[cfg(not(unix))]
    pub fn bind_socket(_path: &Path) -> Result<Self, SubscribeError> {
        Err(SubscribeError::UnsupportedPlatform)
    }

    pub fn local_addr(&self) -> Result<BoundAddress, SubscribeError> {
        match self {
            EndpointListener::Tcp(listener) => listener
                .local_addr()
                .map(BoundAddress::Tcp)
                .map_err(SubscribeError::Listener),
            #[cfg(unix)]
            EndpointListener::Unix(_, path) => Ok(BoundAddress::Unix(path.clone())),
        }
    }
}
