use crate::constants::{
    flags, CREATED_TIME_FORMAT, DEFAULT_APP_PORT, DEFAULT_DAPR_GRPC_PORT, DEFAULT_DAPR_HTTP_PORT,
};
use crate::discovery::arguments::SidecarArgs;
use crate::discovery::metadata::{MetadataLookup, MetadataTarget};
use crate::discovery::process::{CommandLine, ProcessEntry};
use crate::utils::format_age;
use chrono::{DateTime, Local, Utc};
use serde::{Serialize, Serializer};
use std::path::PathBuf;

/// A running sidecar as seen by one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRecord {
    pub app_id: String,
    pub http_port: u16,
    pub grpc_port: u16,
    pub app_port: u16,
    pub metrics_enabled: bool,
    #[serde(rename = "command")]
    pub launch_command: String,
    pub age: String,
    #[serde(rename = "created", serialize_with = "serialize_created")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "cliPid")]
    pub supervisor_pid: u32,
    #[serde(rename = "daprdPid")]
    pub sidecar_pid: u32,
}

impl DiscoveryRecord {
    /// Creation time in the local zone, as shown to operators.
    pub fn created_display(&self) -> String {
        self.created_at
            .with_timezone(&Local)
            .format(CREATED_TIME_FORMAT)
            .to_string()
    }
}

fn serialize_created<S: Serializer>(
    created_at: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(
        &created_at
            .with_timezone(&Local)
            .format(CREATED_TIME_FORMAT)
            .to_string(),
    )
}

/// Management API location for the sidecar described by `args`, or `None` if it has no app id.
pub fn metadata_target(args: &SidecarArgs) -> Option<MetadataTarget> {
    let app_id = args.get_or_empty(flags::APP_ID);
    if app_id.is_empty() {
        return None;
    }

    Some(MetadataTarget {
        app_id: app_id.to_string(),
        http_port: args.port_or(flags::DAPR_HTTP_PORT, DEFAULT_DAPR_HTTP_PORT),
        socket_dir: args
            .get(flags::UNIX_DOMAIN_SOCKET)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from),
    })
}

/// Merges everything known about one process into a record. Instances without an app id
/// yield `None`; every other gap is filled with a default.
pub fn assemble_record(
    process: &ProcessEntry,
    command_line: &CommandLine,
    args: &SidecarArgs,
    metadata: &MetadataLookup,
    now: DateTime<Utc>,
) -> Option<DiscoveryRecord> {
    let app_id = args.get_or_empty(flags::APP_ID);
    if app_id.is_empty() {
        return None;
    }

    let (launch_command, supervisor_pid) = match metadata {
        MetadataLookup::Fetched(metadata) => (
            metadata.app_command.clone().unwrap_or_default(),
            metadata.cli_pid.unwrap_or(0),
        ),
        MetadataLookup::Unavailable(_) => (String::new(), 0),
    };

    Some(DiscoveryRecord {
        app_id: app_id.to_string(),
        http_port: args.port_or(flags::DAPR_HTTP_PORT, DEFAULT_DAPR_HTTP_PORT),
        grpc_port: args.port_or(flags::DAPR_GRPC_PORT, DEFAULT_DAPR_GRPC_PORT),
        app_port: args.port_or(flags::APP_PORT, DEFAULT_APP_PORT),
        metrics_enabled: args.bool_or(flags::ENABLE_METRICS, true),
        launch_command,
        age: format_age(&command_line.started_at, &now),
        created_at: command_line.started_at,
        supervisor_pid,
        sidecar_pid: process.pid,
    })
}
