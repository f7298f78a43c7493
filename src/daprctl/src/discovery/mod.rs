//! Finding running sidecars on this host.
//!
//! The process table is read once per scan. Every `daprd` process with a readable command line
//! and an `--app-id` becomes a [`DiscoveryRecord`], enriched with whatever the sidecar's own
//! metadata endpoint is willing to tell us.

pub mod arguments;
pub mod error;
pub mod metadata;
pub mod process;
pub mod record;
mod scanner;

pub use arguments::SidecarArgs;
pub use error::{DiscoveryError, MetadataError};
pub use metadata::{
    HttpMetadataClient, MetadataLookup, MetadataSource, MetadataTarget, SidecarMetadata,
};
pub use process::{CommandLine, ProcessEntry, ProcessSource, SysinfoProcessSource};
pub use record::{assemble_record, DiscoveryRecord};
pub use scanner::Discovery;

use crate::config::Config;

/// Scans the live process table using the configured sidecar name and metadata timeout.
pub async fn list(config: &Config) -> anyhow::Result<Vec<DiscoveryRecord>> {
    let discovery = Discovery::from_config(config)?;
    Ok(discovery.discover().await?)
}
