//! Parsing helpers for `/proc/mounts` (and similar mount-table files).
//!
//! Each line is `<source> <mount point> <fstype> <options> <dump> <pass>`,
//! with spaces in paths encoded as octal escapes.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub source: String,
    pub mount_point: PathBuf,
}

pub fn parse_mounts(content: &str) -> Vec<MountEntry> {
    content
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let source = fields.next()?;
            let mount_point = fields.next()?;
            Some(MountEntry {
                source: unescape_mount_path(source),
                mount_point: PathBuf::from(unescape_mount_path(mount_point)),
            })
        })
        .collect()
}

/// Mount sources that begin with `dev_prefix`.
///
/// Matching is a plain string-prefix test on the source path, so a whole-disk
/// prefix like `/dev/sda` also catches `/dev/sda1`, `/dev/sda2`, ...
pub fn sources_with_prefix(content: &str, dev_prefix: &str) -> Vec<String> {
    let mut sources: Vec<String> = parse_mounts(content)
        .into_iter()
        .filter(|entry| entry.source.starts_with(dev_prefix))
        .map(|entry| entry.source)
        .collect();
    sources.sort();
    sources.dedup();
    sources
}

fn unescape_mount_path(raw: &str) -> String {
    raw.replace("\\040", " ")
        .replace("\\011", "\t")
        .replace("\\012", "\n")
        .replace("\\134", "\\")
}
