//! Block-device size lookup via sysfs.

use crate::{HalError, HalResult};
use std::fs;
use std::path::{Path, PathBuf};

pub fn device_basename(path: &Path) -> HalResult<String> {
    let name = path
        .file_name()
        .ok_or_else(|| HalError::InvalidDevicePath(path.to_path_buf()))?
        .to_string_lossy()
        .to_string();
    Ok(name)
}

/// Resolves the total size in bytes of a block device.
///
/// Injected into the planning core so its logic is testable without a real
/// device present.
pub trait SizeResolver: Send + Sync {
    fn device_size_bytes(&self, devpath: &Path) -> HalResult<u64>;
}

/// Reads `<root>/<dev>/size` (block count) and
/// `<root>/<dev>/queue/logical_block_size`, default root `/sys/block`.
#[derive(Debug, Clone)]
pub struct SysfsSizeResolver {
    root: PathBuf,
}

impl SysfsSizeResolver {
    pub fn new() -> Self {
        Self::rooted_at(Path::new("/sys/block"))
    }

    pub fn rooted_at(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn read_u64(&self, devpath: &Path, file: PathBuf) -> HalResult<u64> {
        let text = fs::read_to_string(&file).map_err(|err| {
            HalError::DeviceMetadataUnavailable {
                device: devpath.to_path_buf(),
                reason: format!("{}: {err}", file.display()),
            }
        })?;
        text.trim()
            .parse()
            .map_err(|err| HalError::Parse(format!("{}: {err}", file.display())))
    }
}

impl Default for SysfsSizeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SizeResolver for SysfsSizeResolver {
    fn device_size_bytes(&self, devpath: &Path) -> HalResult<u64> {
        let name = device_basename(devpath)?;
        let sysdir = self.root.join(&name);
        let nr_blocks = self.read_u64(devpath, sysdir.join("size"))?;
        let block_size = self.read_u64(devpath, sysdir.join("queue/logical_block_size"))?;
        let size = nr_blocks.saturating_mul(block_size);
        log::debug!("{}: {nr_blocks} blocks x {block_size} = {size} bytes", devpath.display());
        Ok(size)
    }
}

/// Fixed-size resolver for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedSize(pub u64);

impl SizeResolver for FixedSize {
    fn device_size_bytes(&self, _devpath: &Path) -> HalResult<u64> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_device(root: &Path, name: &str, blocks: &str, block_size: &str) {
        let dir = root.join(name);
        fs::create_dir_all(dir.join("queue")).unwrap();
        fs::write(dir.join("size"), blocks).unwrap();
        fs::write(dir.join("queue/logical_block_size"), block_size).unwrap();
    }

    #[test]
    fn resolves_block_count_times_block_size() {
        let tmp = tempdir().unwrap();
        write_device(tmp.path(), "sda", "2048\n", "512\n");
        let resolver = SysfsSizeResolver::rooted_at(tmp.path());
        let size = resolver.device_size_bytes(Path::new("/dev/sda")).unwrap();
        assert_eq!(size, 2048 * 512);
    }

    #[test]
    fn honours_non_512_logical_blocks() {
        let tmp = tempdir().unwrap();
        write_device(tmp.path(), "nvme0n1", "1024\n", "4096\n");
        let resolver = SysfsSizeResolver::rooted_at(tmp.path());
        let size = resolver
            .device_size_bytes(Path::new("/dev/nvme0n1"))
            .unwrap();
        assert_eq!(size, 1024 * 4096);
    }

    #[test]
    fn missing_sysfs_entry_reports_metadata_unavailable() {
        let tmp = tempdir().unwrap();
        let resolver = SysfsSizeResolver::rooted_at(tmp.path());
        let err = resolver
            .device_size_bytes(Path::new("/dev/sdz"))
            .unwrap_err();
        assert!(matches!(
            err,
            HalError::DeviceMetadataUnavailable { .. }
        ));
    }

    #[test]
    fn device_basename_extracts_filename() {
        assert_eq!(
            device_basename(Path::new("/dev/sda")).unwrap(),
            "sda".to_string()
        );
    }
}
