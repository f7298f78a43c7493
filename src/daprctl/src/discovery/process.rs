use crate::discovery::error::DiscoveryError;
use chrono::{DateTime, TimeZone, Utc};
use mockall::automock;
use std::sync::Mutex;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::{debug, trace};

/// One row of the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub executable: String,
}

/// Invocation details of a single process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Whitespace separated tokens, binary name first.
    pub tokens: Vec<String>,
    pub started_at: DateTime<Utc>,
}

impl CommandLine {
    pub fn new<S: AsRef<str>>(command_line: S, started_at: DateTime<Utc>) -> Self {
        Self {
            tokens: command_line
                .as_ref()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            started_at,
        }
    }

    /// Everything after the binary name.
    pub fn arguments(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or_default()
    }
}

#[automock]
pub trait ProcessSource {
    /// Reads the live process table, in ascending PID order.
    fn list(&self) -> Result<Vec<ProcessEntry>, DiscoveryError>;

    /// Command line and creation time of `pid`, if they can still be read.
    fn command_line(&self, pid: u32) -> Option<CommandLine>;
}

/// True for `daprd`, `DAPRD`, `daprd.exe` and so on.
pub fn is_sidecar_executable(executable: &str, binary: &str) -> bool {
    let executable = executable.to_lowercase();
    let binary = binary.to_lowercase();
    executable == binary || executable.strip_suffix(".exe") == Some(binary.as_str())
}

/// [`ProcessSource`] backed by `sysinfo`. Each call to `list` takes a fresh snapshot which the
/// following `command_line` lookups read from.
pub struct SysinfoProcessSource {
    system: Mutex<System>,
}

impl SysinfoProcessSource {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }

    // Linux reports every thread as a task of its process; one entry per process is wanted
    fn refresh_kind() -> ProcessRefreshKind {
        ProcessRefreshKind::everything().without_tasks()
    }
}

impl Default for SysinfoProcessSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSource for SysinfoProcessSource {
    #[tracing::instrument(skip(self))]
    fn list(&self) -> Result<Vec<ProcessEntry>, DiscoveryError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(DiscoveryError::UnsupportedPlatform);
        }

        let mut system = self
            .system
            .lock()
            .map_err(|e| DiscoveryError::ProcessTable(e.to_string()))?;

        system.refresh_processes_specifics(ProcessesToUpdate::All, true, Self::refresh_kind());

        let mut entries: Vec<ProcessEntry> = system
            .processes()
            .iter()
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, process)| ProcessEntry {
                pid: pid.as_u32(),
                executable: process.name().to_string_lossy().to_string(),
            })
            .collect();
        entries.sort_by_key(|entry| entry.pid);

        debug!("read {} processes from the process table", entries.len());
        Ok(entries)
    }

    fn command_line(&self, pid: u32) -> Option<CommandLine> {
        let system = self.system.lock().ok()?;
        let process = system.process(Pid::from_u32(pid))?;

        let command_line = process
            .cmd()
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        if command_line.trim().is_empty() {
            trace!(pid, "command line is not readable");
            return None;
        }

        let started_at = Utc.timestamp_opt(process.start_time() as i64, 0).single()?;
        Some(CommandLine::new(command_line, started_at))
    }
}
