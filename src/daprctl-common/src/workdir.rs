use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const WORK_DIR_NAME: &str = "daprctl";
const LOG_FILE: &str = "daprctl.log";

pub static DAPRCTL_WORK_DIR: LazyLock<DaprctlWorkDir> =
    LazyLock::new(|| DaprctlWorkDir::under(std::env::temp_dir()));

/// Scratch directory holding the daprctl log file.
#[derive(Debug, Clone)]
pub struct DaprctlWorkDir {
    pub path: PathBuf,
    pub log_file: PathBuf,
}

impl DaprctlWorkDir {
    pub fn under(base: impl AsRef<Path>) -> Self {
        let path = base.as_ref().join(WORK_DIR_NAME);
        Self {
            log_file: path.join(LOG_FILE),
            path,
        }
    }

    pub fn log_file_name(&self) -> &'static str {
        LOG_FILE
    }

    pub fn init(&self) -> Result<()> {
        std::fs::create_dir_all(&self.path)
            .with_context(|| format!("failed to create working directory {:?}", self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workdir_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let workdir = DaprctlWorkDir::under(tmp.path());

        assert_eq!(workdir.path, tmp.path().join("daprctl"));
        assert_eq!(workdir.log_file, tmp.path().join("daprctl").join("daprctl.log"));
    }

    #[test]
    fn test_init_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let workdir = DaprctlWorkDir::under(tmp.path());

        workdir.init().unwrap();
        assert!(workdir.path.is_dir());
        // idempotent
        workdir.init().unwrap();
    }
}
