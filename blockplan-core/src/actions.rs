//! Declarative storage actions.
//!
//! Each action is an immutable record describing one provisioning step, with
//! string ids as the cross-reference mechanism: a partition references its
//! disk, a format its partition, a mount its format. Ids are pure functions
//! of the device basename and partition number, so identical planner input
//! serializes to an identical plan on every run.

use crate::errors::PlanError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Partition flags accepted by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionFlag {
    Boot,
    Lvm,
    Raid,
    BiosGrub,
}

impl FromStr for PartitionFlag {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boot" => Ok(Self::Boot),
            "lvm" => Ok(Self::Lvm),
            "raid" => Ok(Self::Raid),
            "bios_grub" => Ok(Self::BiosGrub),
            other => Err(PlanError::InvalidFlag(other.to_string())),
        }
    }
}

impl fmt::Display for PartitionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Boot => "boot",
            Self::Lvm => "lvm",
            Self::Raid => "raid",
            Self::BiosGrub => "bios_grub",
        };
        f.write_str(s)
    }
}

/// Applies filesystem-type aliases; the applier's partitioning tool knows
/// swap only under its versioned name.
pub fn normalize_fstype(fstype: &str) -> String {
    match fstype {
        "swap" => "linux-swap(v1)".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskAction {
    pub id: String,
    pub model: String,
    pub serial: String,
    pub ptable: String,
    #[serde(skip)]
    basename: String,
}

impl DiskAction {
    pub fn new(basename: &str, model: &str, serial: &str, ptable: &str) -> Self {
        Self {
            id: format!("disk-{basename}"),
            model: model.to_string(),
            serial: serial.to_string(),
            ptable: ptable.to_string(),
            basename: basename.to_string(),
        }
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionAction {
    pub id: String,
    pub number: u64,
    pub offset: u64,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<PartitionFlag>,
    /// Id of the owning disk action.
    pub device: String,
    #[serde(skip)]
    basename: String,
}

impl PartitionAction {
    pub fn new(
        disk: &DiskAction,
        number: u64,
        offset: u64,
        size: u64,
        flag: Option<PartitionFlag>,
    ) -> Self {
        Self {
            id: format!("partition-{}-{number}", disk.basename()),
            number,
            offset,
            size,
            flag,
            device: disk.id.clone(),
            basename: disk.basename().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatAction {
    pub id: String,
    pub fstype: String,
    /// Id of the partition action this format applies to.
    pub volume: String,
}

impl FormatAction {
    pub fn new(partition: &PartitionAction, fstype: &str) -> Self {
        Self {
            id: format!("format-{}-{}", partition.basename, partition.number),
            fstype: fstype.to_string(),
            volume: partition.id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountAction {
    pub id: String,
    pub path: String,
    /// Id of the format action whose filesystem gets mounted.
    pub device: String,
}

impl MountAction {
    pub fn new(format: &FormatAction, mountpoint: &str) -> Self {
        Self {
            id: format!("mount-{}", format.id.trim_start_matches("format-")),
            path: mountpoint.to_string(),
            device: format.id.clone(),
        }
    }
}

/// One entry of the rendered action list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    Disk(DiskAction),
    Partition(PartitionAction),
    Format(FormatAction),
    Mount(MountAction),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chain() -> (DiskAction, PartitionAction, FormatAction, MountAction) {
        let disk = DiskAction::new("sda", "QEMU SSD DISK", "QM_TARGET_01", "gpt");
        let part = PartitionAction::new(&disk, 1, 1 << 20, 8 << 30, Some(PartitionFlag::BiosGrub));
        let fs = FormatAction::new(&part, "ext4");
        let mount = MountAction::new(&fs, "/");
        (disk, part, fs, mount)
    }

    #[test]
    fn ids_link_the_dependency_chain() {
        let (disk, part, fs, mount) = sample_chain();
        assert_eq!(disk.id, "disk-sda");
        assert_eq!(part.device, disk.id);
        assert_eq!(fs.volume, part.id);
        assert_eq!(mount.device, fs.id);
    }

    #[test]
    fn serialized_field_names_are_stable() {
        let (disk, part, fs, mount) = sample_chain();
        let json = serde_json::to_value(Action::Disk(disk)).unwrap();
        assert_eq!(json["type"], "disk");
        assert_eq!(json["ptable"], "gpt");
        assert_eq!(json["serial"], "QM_TARGET_01");

        let json = serde_json::to_value(Action::Partition(part)).unwrap();
        assert_eq!(json["type"], "partition");
        assert_eq!(json["number"], 1);
        assert_eq!(json["offset"], 1u64 << 20);
        assert_eq!(json["flag"], "bios_grub");
        assert_eq!(json["device"], "disk-sda");

        let json = serde_json::to_value(Action::Format(fs)).unwrap();
        assert_eq!(json["type"], "format");
        assert_eq!(json["fstype"], "ext4");
        assert_eq!(json["volume"], "partition-sda-1");

        let json = serde_json::to_value(Action::Mount(mount)).unwrap();
        assert_eq!(json["type"], "mount");
        assert_eq!(json["path"], "/");
        assert_eq!(json["device"], "format-sda-1");
    }

    #[test]
    fn flag_is_omitted_when_absent() {
        let disk = DiskAction::new("sdb", "m", "s", "gpt");
        let part = PartitionAction::new(&disk, 2, 0, 1024, None);
        let json = serde_json::to_value(Action::Partition(part)).unwrap();
        assert!(json.get("flag").is_none());
    }

    #[test]
    fn flag_parsing_matches_allow_list() {
        assert_eq!("boot".parse::<PartitionFlag>().unwrap(), PartitionFlag::Boot);
        assert_eq!(
            "bios_grub".parse::<PartitionFlag>().unwrap(),
            PartitionFlag::BiosGrub
        );
        let err = "esp".parse::<PartitionFlag>().unwrap_err();
        assert!(matches!(err, PlanError::InvalidFlag(f) if f == "esp"));
    }

    #[test]
    fn swap_is_aliased_to_versioned_name() {
        assert_eq!(normalize_fstype("swap"), "linux-swap(v1)");
        assert_eq!(normalize_fstype("ext4"), "ext4");
    }
}
