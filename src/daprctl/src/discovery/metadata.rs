use crate::config::Config;
use crate::constants::{extended, socket_file_name, METADATA_ENDPOINT};
use crate::discovery::error::MetadataError;
use async_trait::async_trait;
use mockall::automock;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Where a sidecar's management API can be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataTarget {
    pub app_id: String,
    pub http_port: u16,
    /// Directory given with `--unix-domain-socket`; when set the request goes over the socket.
    pub socket_dir: Option<PathBuf>,
}

impl MetadataTarget {
    pub fn socket_path(&self) -> Option<PathBuf> {
        self.socket_dir
            .as_ref()
            .map(|dir| dir.join(socket_file_name(&self.app_id, "http")))
    }
}

/// The parts of the sidecar metadata the CLI cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidecarMetadata {
    pub app_command: Option<String>,
    pub cli_pid: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    #[serde(default)]
    extended: HashMap<String, serde_json::Value>,
}

impl From<MetadataResponse> for SidecarMetadata {
    fn from(response: MetadataResponse) -> Self {
        let text = |key: &str| match response.extended.get(key) {
            Some(serde_json::Value::String(value)) => Some(value.clone()),
            Some(serde_json::Value::Number(value)) => Some(value.to_string()),
            _ => None,
        };

        Self {
            app_command: text(extended::APP_COMMAND),
            cli_pid: text(extended::CLI_PID).and_then(|pid| pid.trim().parse().ok()),
        }
    }
}

pub fn parse_metadata(body: &[u8]) -> Result<SidecarMetadata, MetadataError> {
    let response: MetadataResponse = serde_json::from_slice(body)?;
    Ok(response.into())
}

/// Outcome of a best-effort metadata lookup.
#[derive(Debug)]
pub enum MetadataLookup {
    Fetched(SidecarMetadata),
    Unavailable(MetadataError),
}

impl MetadataLookup {
    pub fn is_fetched(&self) -> bool {
        matches!(self, MetadataLookup::Fetched(_))
    }
}

impl From<Result<SidecarMetadata, MetadataError>> for MetadataLookup {
    fn from(result: Result<SidecarMetadata, MetadataError>) -> Self {
        match result {
            Ok(metadata) => MetadataLookup::Fetched(metadata),
            Err(error) => MetadataLookup::Unavailable(error),
        }
    }
}

#[automock]
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Never fails: problems come back as [`MetadataLookup::Unavailable`].
    async fn fetch(&self, target: &MetadataTarget) -> MetadataLookup;
}

/// Reads `/v1.0/metadata` from a running sidecar.
pub struct HttpMetadataClient {
    client: reqwest::Client,
    host: String,
    timeout: Duration,
}

impl HttpMetadataClient {
    pub fn new(config: &Config) -> Result<Self, MetadataError> {
        let timeout = config.metadata_timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            host: config.metadata_host.clone(),
            timeout,
        })
    }

    pub fn metadata_url(&self, http_port: u16) -> String {
        format!("http://{}:{}{}", self.host, http_port, METADATA_ENDPOINT)
    }

    async fn fetch_over_tcp(&self, http_port: u16) -> Result<SidecarMetadata, MetadataError> {
        let response = self.client.get(self.metadata_url(http_port)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status(status.as_u16()));
        }

        parse_metadata(&response.bytes().await?)
    }

    #[cfg(unix)]
    async fn fetch_over_socket(&self, socket_path: &Path) -> Result<SidecarMetadata, MetadataError> {
        use bytes::Bytes;
        use http_body_util::{BodyExt, Empty};
        use hyper::{header, Method, Request};
        use hyper_util::rt::TokioIo;
        use tokio::net::UnixStream;

        let stream = UnixStream::connect(socket_path)
            .await
            .map_err(|source| MetadataError::Socket {
                path: socket_path.display().to_string(),
                source,
            })?;

        let (mut sender, connection) =
            hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                debug!("metadata socket connection closed with error: {}", e);
            }
        });

        let request = Request::builder()
            .method(Method::GET)
            .uri(METADATA_ENDPOINT)
            .header(header::HOST, "localhost")
            .body(Empty::<Bytes>::new())?;

        let response = sender.send_request(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status(status.as_u16()));
        }

        let body = response.into_body().collect().await?.to_bytes();
        parse_metadata(&body)
    }

    #[cfg(not(unix))]
    async fn fetch_over_socket(&self, _socket_path: &Path) -> Result<SidecarMetadata, MetadataError> {
        Err(MetadataError::UnsupportedTransport)
    }
}

#[async_trait]
impl MetadataSource for HttpMetadataClient {
    #[tracing::instrument(skip(self), fields(app_id = %target.app_id))]
    async fn fetch(&self, target: &MetadataTarget) -> MetadataLookup {
        let request = async {
            match target.socket_path() {
                Some(path) => self.fetch_over_socket(&path).await,
                None => self.fetch_over_tcp(target.http_port).await,
            }
        };

        let lookup: MetadataLookup = match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result.into(),
            Err(_) => MetadataLookup::Unavailable(MetadataError::Timeout(self.timeout)),
        };

        if let MetadataLookup::Unavailable(error) = &lookup {
            debug!("metadata unavailable: {}", error);
        }
        lookup
    }
}
