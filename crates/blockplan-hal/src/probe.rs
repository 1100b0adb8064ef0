//! Mount-state probe.
//!
//! The planner refuses to emit actions for a mounted device, so the probe is
//! the one place the core reads live system state. A read failure must reach
//! the caller; guessing "not mounted" on a device the running system depends
//! on risks data loss.

use crate::{HalError, HalResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Source of the current mount table as raw newline-delimited text.
pub trait MountProbe: Send + Sync {
    fn mount_table(&self) -> HalResult<String>;
}

/// Reads the kernel mount table, `/proc/mounts` by default.
#[derive(Debug, Clone)]
pub struct ProcMounts {
    path: PathBuf,
}

impl ProcMounts {
    pub fn new() -> Self {
        Self::at(Path::new("/proc/mounts"))
    }

    pub fn at(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl Default for ProcMounts {
    fn default() -> Self {
        Self::new()
    }
}

impl MountProbe for ProcMounts {
    fn mount_table(&self) -> HalResult<String> {
        fs::read_to_string(&self.path).map_err(|source| HalError::MountTableUnreadable {
            path: self.path.clone(),
            source,
        })
    }
}

/// In-memory mount table for tests and dry-runs.
#[derive(Debug, Clone, Default)]
pub struct StaticMountTable {
    table: String,
}

impl StaticMountTable {
    /// A table with no entries: every device reads as unmounted.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// Convenience constructor from `(source, mountpoint)` pairs.
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let table = entries
            .iter()
            .map(|(source, target)| format!("{source} {target} ext4 rw,relatime 0 0\n"))
            .collect();
        Self { table }
    }
}

impl MountProbe for StaticMountTable {
    fn mount_table(&self) -> HalResult<String> {
        Ok(self.table.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn proc_mounts_reads_file_contents() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "/dev/vda1 / ext4 rw 0 0").unwrap();
        let probe = ProcMounts::at(file.path());
        let table = probe.mount_table().unwrap();
        assert!(table.contains("/dev/vda1"));
    }

    #[test]
    fn proc_mounts_missing_file_is_an_error() {
        let probe = ProcMounts::at(Path::new("/nonexistent/mounts"));
        let err = probe.mount_table().unwrap_err();
        assert!(matches!(err, HalError::MountTableUnreadable { .. }));
    }

    #[test]
    fn static_table_round_trips_entries() {
        let probe = StaticMountTable::with_entries(&[("/dev/sda1", "/boot")]);
        let table = probe.mount_table().unwrap();
        assert!(table.starts_with("/dev/sda1 /boot"));
    }
}
