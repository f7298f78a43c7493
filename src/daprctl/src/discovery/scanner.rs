use crate::config::Config;
use crate::discovery::arguments::SidecarArgs;
use crate::discovery::error::{DiscoveryError, MetadataError};
use crate::discovery::metadata::{HttpMetadataClient, MetadataSource, MetadataTarget};
use crate::discovery::process::{
    is_sidecar_executable, CommandLine, ProcessEntry, ProcessSource, SysinfoProcessSource,
};
use crate::discovery::record::{assemble_record, metadata_target, DiscoveryRecord};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tracing::{debug, info};

/// Finds running sidecars and correlates each with its app and supervising CLI.
pub struct Discovery<P, M> {
    processes: P,
    metadata: M,
    sidecar_binary: String,
}

impl Discovery<SysinfoProcessSource, HttpMetadataClient> {
    pub fn from_config(config: &Config) -> Result<Self, MetadataError> {
        Ok(Self::new(
            SysinfoProcessSource::new(),
            HttpMetadataClient::new(config)?,
            config.sidecar_binary.clone(),
        ))
    }
}

struct Candidate {
    process: ProcessEntry,
    command_line: CommandLine,
    args: SidecarArgs,
    target: MetadataTarget,
}

impl<P: ProcessSource, M: MetadataSource> Discovery<P, M> {
    pub fn new(processes: P, metadata: M, sidecar_binary: impl Into<String>) -> Self {
        Self {
            processes,
            metadata,
            sidecar_binary: sidecar_binary.into(),
        }
    }

    pub async fn discover(&self) -> Result<Vec<DiscoveryRecord>, DiscoveryError> {
        self.discover_at(Utc::now()).await
    }

    /// Runs a scan, computing ages relative to `now`.
    #[tracing::instrument(skip(self))]
    pub async fn discover_at(&self, now: DateTime<Utc>) -> Result<Vec<DiscoveryRecord>, DiscoveryError> {
        let candidates: Vec<Candidate> = self
            .processes
            .list()?
            .into_iter()
            .filter(|process| is_sidecar_executable(&process.executable, &self.sidecar_binary))
            .filter_map(|process| self.candidate(process))
            .collect();

        // join_all keeps input order, so records line up with the process table
        let lookups = join_all(
            candidates
                .iter()
                .map(|candidate| self.metadata.fetch(&candidate.target)),
        )
        .await;

        let records: Vec<DiscoveryRecord> = candidates
            .iter()
            .zip(lookups.iter())
            .filter_map(|(candidate, lookup)| {
                assemble_record(
                    &candidate.process,
                    &candidate.command_line,
                    &candidate.args,
                    lookup,
                    now,
                )
            })
            .collect();

        info!("discovered {} sidecar instance(s)", records.len());
        Ok(records)
    }

    fn candidate(&self, process: ProcessEntry) -> Option<Candidate> {
        let Some(command_line) = self.processes.command_line(process.pid) else {
            debug!(pid = process.pid, "skipping sidecar: command line unavailable");
            return None;
        };

        if command_line.arguments().is_empty() {
            debug!(pid = process.pid, "skipping sidecar: no arguments");
            return None;
        }

        let args = SidecarArgs::parse(command_line.arguments());
        let Some(target) = metadata_target(&args) else {
            debug!(pid = process.pid, "skipping sidecar: no app id");
            return None;
        };

        Some(Candidate {
            process,
            command_line,
            args,
            target,
        })
    }
}
