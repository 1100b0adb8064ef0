//! The partition planner: in-memory authority for one device's layout.

use crate::actions::{
    normalize_fstype, Action, DiskAction, FormatAction, MountAction, PartitionAction,
    PartitionFlag,
};
use crate::disk::Disk;
use crate::errors::PlanError;
use crate::sizes;
use blockplan_hal::procfs::mounts::sources_with_prefix;
use blockplan_hal::sysfs::block::device_basename;
use blockplan_hal::{MountProbe, SizeResolver};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Selects the partition to delete. Exactly one selector per call, so no
/// precedence rule between the forms is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionSelector<'a> {
    /// The partition recorded under this number.
    Number(u64),
    /// The partition whose `[offset, offset + size)` byte range contains
    /// this address. With more than one candidate (offsets are placement
    /// hints, not final layout), the lowest partition number wins.
    Sector(u64),
    /// The partition whose filesystem is assigned this mountpoint.
    Mountpoint(&'a str),
}

/// One row of the filesystem reporting view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEntry {
    /// Falls back to the fstype string when no mountpoint was assigned;
    /// display-only behavior.
    pub mountpoint: String,
    pub size: u64,
    pub fstype: String,
    pub devpath: String,
}

/// Owns one `Disk` plus the filesystem and mountpoint assignment tables.
///
/// All operations are synchronous and non-atomic across calls; a caller
/// sharing one planner between threads must serialize access itself.
/// Planners for different devices are fully independent.
pub struct PartitionPlanner {
    disk: Disk,
    base_action: DiskAction,
    /// Keyed by synthesized partition devpath (`devpath` + partnum).
    filesystems: BTreeMap<String, FormatAction>,
    /// Same key as `filesystems`; value is the target mountpoint.
    mounts: BTreeMap<String, String>,
    probe: Arc<dyn MountProbe>,
}

impl PartitionPlanner {
    pub fn new(
        devpath: &str,
        serial: &str,
        model: &str,
        ptable: &str,
        size: Option<u64>,
        resolver: &dyn SizeResolver,
        probe: Arc<dyn MountProbe>,
    ) -> Result<Self, PlanError> {
        let basename = device_basename(Path::new(devpath))?;
        let disk = Disk::new(devpath, serial, model, ptable, size, resolver);
        let base_action = DiskAction::new(&basename, model, serial, ptable);
        Ok(Self {
            disk,
            base_action,
            filesystems: BTreeMap::new(),
            mounts: BTreeMap::new(),
            probe,
        })
    }

    pub fn devpath(&self) -> &str {
        self.disk.devpath()
    }

    pub fn size(&self) -> u64 {
        self.disk.size()
    }

    /// Read-only view of the recorded partitions in ascending number order.
    pub fn partitions(&self) -> &BTreeMap<u64, PartitionAction> {
        self.disk.partitions()
    }

    /// Recomputed on every call so it always reflects the latest partition
    /// set.
    pub fn usedspace(&self) -> u64 {
        let used = sizes::used_bytes(self.disk.partitions().values());
        log::debug!("{} usedspace: {used}", self.disk.devpath());
        used
    }

    pub fn freespace(&self) -> u64 {
        let free = sizes::free_bytes(self.disk.size(), self.usedspace());
        log::debug!("{} freespace: {free}", self.disk.devpath());
        free
    }

    pub fn available(&self) -> bool {
        self.freespace() > 0
    }

    /// Number of partitions recorded so far; callers use this to pick the
    /// next partition number.
    pub fn lastpartnumber(&self) -> u64 {
        self.disk.partitions().len() as u64
    }

    /// Synthesized device path of one partition, e.g. `/dev/sda` + 1.
    pub fn partpath(&self, partnum: u64) -> String {
        format!("{}{partnum}", self.disk.devpath())
    }

    /// Records a new partition, plus a format entry when `fstype` is given
    /// and a mountpoint entry when `mountpoint` is given.
    ///
    /// Validation happens before any table is touched, so a failed call
    /// leaves the planner exactly as it was.
    pub fn add_partition(
        &mut self,
        partnum: u64,
        size: u64,
        fstype: Option<&str>,
        mountpoint: Option<&str>,
        flag: Option<&str>,
    ) -> Result<(), PlanError> {
        log::debug!(
            "add_partition: partnum:{partnum} size:{size} fstype:{fstype:?} \
             mountpoint:{mountpoint:?} flag:{flag:?}"
        );

        let offset = if self.disk.partitions().is_empty() {
            sizes::FIRST_PARTITION_OFFSET
        } else {
            0
        };

        // The alignment reservation counts against the partition's budget;
        // otherwise a first partition sized exactly to free space would push
        // the used sum past the disk size.
        let available = self.freespace().saturating_sub(offset);
        if size > available {
            return Err(PlanError::InsufficientSpace {
                requested: size,
                available,
            });
        }

        let flag = flag.map(PartitionFlag::from_str).transpose()?;

        let fstype = fstype
            .filter(|s| !s.is_empty())
            .map(normalize_fstype);
        if fstype.is_none() {
            if let Some(mp) = mountpoint {
                return Err(PlanError::MountWithoutFilesystem(mp.to_string()));
            }
        }

        log::debug!("requested start: {offset} length: {size}");

        let part_action = PartitionAction::new(&self.base_action, partnum, offset, size, flag);
        let partpath = self.partpath(partnum);

        // Re-adding a number replaces the partition; stale filesystem and
        // mountpoint entries must not survive the replacement.
        self.filesystems.remove(&partpath);
        self.mounts.remove(&partpath);
        self.disk.partitions_mut().insert(partnum, part_action.clone());

        if let Some(fstype) = fstype {
            log::debug!("Adding filesystem on {partpath}");
            let fs_action = FormatAction::new(&part_action, &fstype);
            self.filesystems.insert(partpath.clone(), fs_action);

            if let Some(mountpoint) = mountpoint {
                self.mounts.insert(partpath, mountpoint.to_string());
            }
        }

        Ok(())
    }

    /// Removes the selected partition together with its filesystem and
    /// mountpoint entries. Resolution happens first, so either all three
    /// tables change or none does. Returns the removed partition number.
    pub fn delete_partition(&mut self, selector: PartitionSelector<'_>) -> Result<u64, PlanError> {
        let partnum = self
            .resolve_selector(selector)
            .ok_or_else(|| PlanError::NoMatchingPartition(format!("{selector:?}")))?;

        let partpath = self.partpath(partnum);
        self.disk.partitions_mut().remove(&partnum);
        self.filesystems.remove(&partpath);
        self.mounts.remove(&partpath);
        Ok(partnum)
    }

    fn resolve_selector(&self, selector: PartitionSelector<'_>) -> Option<u64> {
        match selector {
            PartitionSelector::Number(partnum) => self
                .disk
                .partitions()
                .contains_key(&partnum)
                .then_some(partnum),
            PartitionSelector::Sector(addr) => self
                .disk
                .partitions()
                .values()
                .find(|part| addr >= part.offset && addr < part.offset + part.size)
                .map(|part| part.number),
            PartitionSelector::Mountpoint(mountpoint) => self
                .mounts
                .iter()
                .find(|(_, target)| target.as_str() == mountpoint)
                .and_then(|(partpath, _)| {
                    self.disk
                        .partitions()
                        .keys()
                        .find(|&&num| self.partpath(num) == *partpath)
                        .copied()
                }),
        }
    }

    /// True when any live mount entry's source is prefixed by this disk's
    /// device path. A probe read failure propagates; assuming "not mounted"
    /// on a device the running system may depend on is how data gets lost.
    pub fn is_mounted(&self) -> Result<bool, PlanError> {
        let table = self.probe.mount_table()?;
        let matches = sources_with_prefix(&table, self.disk.devpath());
        if !matches.is_empty() {
            log::debug!("Device is mounted: {matches:?}");
            return Ok(true);
        }
        Ok(false)
    }

    /// Renders the current state as an ordered action list.
    ///
    /// The disk action always comes first; then, per partition in ascending
    /// number order: the partition action, its format action when one was
    /// recorded, and a freshly built mount action when a mountpoint was
    /// assigned. A mounted device yields an empty list — it is never
    /// replanned.
    pub fn get_actions(&self) -> Result<Vec<Action>, PlanError> {
        if self.is_mounted()? {
            log::debug!("Emitting no actions, device is mounted");
            return Ok(Vec::new());
        }

        let mut actions = vec![Action::Disk(self.base_action.clone())];
        for (partnum, part) in self.disk.partitions() {
            let partpath = self.partpath(*partnum);
            actions.push(Action::Partition(part.clone()));

            if let Some(fs_action) = self.filesystems.get(&partpath) {
                actions.push(Action::Format(fs_action.clone()));

                if let Some(mountpoint) = self.mounts.get(&partpath) {
                    actions.push(Action::Mount(MountAction::new(fs_action, mountpoint)));
                }
            }
        }
        Ok(actions)
    }

    /// Reporting view over the assigned filesystems, in partition order.
    pub fn get_fs_table(&self) -> Vec<FsEntry> {
        let mut table = Vec::new();
        for (partnum, part) in self.disk.partitions() {
            let partpath = self.partpath(*partnum);
            if let Some(fs) = self.filesystems.get(&partpath) {
                let mountpoint = self
                    .mounts
                    .get(&partpath)
                    .cloned()
                    .unwrap_or_else(|| fs.fstype.clone());
                table.push(FsEntry {
                    mountpoint,
                    size: part.size,
                    fstype: fs.fstype.clone(),
                    devpath: partpath,
                });
            }
        }
        table
    }

    /// Discards all pending partitioning for this disk. The live device is
    /// not touched.
    pub fn reset(&mut self) {
        self.disk.reset();
        self.filesystems.clear();
        self.mounts.clear();
    }
}
