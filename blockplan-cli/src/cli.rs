//! CLI argument parsing for blockplan.

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "blockplan")]
#[command(about = "Plan a disk layout and print the declarative storage actions")]
#[command(long_about = "Plan a disk layout and print the declarative storage actions.\n\n\
    Builds an in-memory partition plan for one block device and renders it as\n\
    the {\"storage\": [...]} action list consumed by the applier. The device\n\
    itself is never touched.")]
pub struct Cli {
    /// Target disk device (e.g., /dev/sda)
    #[arg(long)]
    pub device: String,

    /// Device serial, as reported by discovery
    #[arg(long, default_value = "")]
    pub serial: String,

    /// Device model, as reported by discovery
    #[arg(long, default_value = "")]
    pub model: String,

    /// Partition table type
    #[arg(long, default_value = "gpt")]
    pub ptable: String,

    /// Device size; read from sysfs when omitted (accepts bytes, MiB, GiB)
    #[arg(long)]
    pub size: Option<String>,

    /// Partition to add: NUM:SIZE:FSTYPE[:MOUNTPOINT[:FLAG]] (repeatable)
    #[arg(long = "part")]
    pub parts: Vec<String>,

    /// Mount table consulted for the mounted-device safety guard
    #[arg(long, default_value = "/proc/mounts")]
    pub mounts_file: PathBuf,

    /// Print the filesystem table view instead of the JSON plan
    #[arg(long)]
    pub fs_table: bool,
}

/// One `--part` request, parsed from its colon-separated form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartSpec {
    pub number: u64,
    pub size: u64,
    pub fstype: Option<String>,
    pub mountpoint: Option<String>,
    pub flag: Option<String>,
}

pub fn parse_part_spec(spec: &str) -> Result<PartSpec> {
    let mut fields = spec.splitn(5, ':');
    let number = fields
        .next()
        .ok_or_else(|| anyhow!("empty partition spec"))?
        .parse()
        .with_context(|| format!("bad partition number in {spec:?}"))?;
    let size = fields
        .next()
        .ok_or_else(|| anyhow!("missing size in partition spec {spec:?}"))?;
    let size = parse_size(size)?;
    let fstype = fields.next().filter(|s| !s.is_empty()).map(str::to_string);
    let mountpoint = fields.next().filter(|s| !s.is_empty()).map(str::to_string);
    let flag = fields.next().filter(|s| !s.is_empty()).map(str::to_string);
    Ok(PartSpec {
        number,
        size,
        fstype,
        mountpoint,
        flag,
    })
}

/// Parses size strings like "8192", "1024MiB" or "2GiB" into bytes.
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim();
    if let Some(mib) = s.strip_suffix("MiB") {
        let mib: u64 = mib
            .parse()
            .map_err(|e| anyhow!("Invalid MiB format: {} ({})", s, e))?;
        return mib
            .checked_mul(1 << 20)
            .ok_or_else(|| anyhow!("Size overflow for MiB: {}", s));
    }
    if let Some(gib) = s.strip_suffix("GiB") {
        let gib: u64 = gib
            .parse()
            .map_err(|e| anyhow!("Invalid GiB format: {} ({})", s, e))?;
        return gib
            .checked_mul(1 << 30)
            .ok_or_else(|| anyhow!("Size overflow for GiB: {}", s));
    }
    if let Ok(bytes) = s.parse::<u64>() {
        return Ok(bytes);
    }
    bail!("Size must be bytes, like 1024MiB, or like 2GiB, got: {}", s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_size_accepts_bytes_and_suffixes() {
        assert_eq!(parse_size("4096").unwrap(), 4096);
        assert_eq!(parse_size("1024MiB").unwrap(), 1 << 30);
        assert_eq!(parse_size("2GiB").unwrap(), 2 << 30);
        assert!(parse_size("2GB").is_err());
    }

    #[test]
    fn parse_part_spec_full_form() {
        let spec = parse_part_spec("1:8GiB:ext4:/:bios_grub").unwrap();
        assert_eq!(spec.number, 1);
        assert_eq!(spec.size, 8 << 30);
        assert_eq!(spec.fstype.as_deref(), Some("ext4"));
        assert_eq!(spec.mountpoint.as_deref(), Some("/"));
        assert_eq!(spec.flag.as_deref(), Some("bios_grub"));
    }

    #[test]
    fn parse_part_spec_minimal_form() {
        let spec = parse_part_spec("2:2GiB:swap").unwrap();
        assert_eq!(spec.number, 2);
        assert_eq!(spec.fstype.as_deref(), Some("swap"));
        assert_eq!(spec.mountpoint, None);
        assert_eq!(spec.flag, None);
    }

    #[test]
    fn parse_part_spec_rejects_garbage() {
        assert!(parse_part_spec("one:2GiB:ext4").is_err());
        assert!(parse_part_spec("1:huge:ext4").is_err());
    }
}
