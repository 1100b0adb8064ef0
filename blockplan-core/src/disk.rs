//! One physical or virtual block device and its recorded partitions.

use crate::actions::PartitionAction;
use blockplan_hal::SizeResolver;
use std::collections::BTreeMap;
use std::path::Path;

/// Device identity plus the ordered partition map.
///
/// The `BTreeMap` key is the partition number, which keeps iteration in
/// ascending numeric order; the rendered action list depends on that.
#[derive(Debug, Clone)]
pub struct Disk {
    devpath: String,
    serial: String,
    model: String,
    ptable: String,
    size: u64,
    partitions: BTreeMap<u64, PartitionAction>,
}

impl Disk {
    /// Builds a disk, resolving the size through `resolver` when the caller
    /// does not supply one.
    ///
    /// A resolver failure is recovered locally: the size becomes 0, which
    /// reads as "no space available" to every later query. Callers that need
    /// to distinguish "unknown" from "full" must check the descriptor before
    /// constructing the disk.
    pub fn new(
        devpath: &str,
        serial: &str,
        model: &str,
        ptable: &str,
        size: Option<u64>,
        resolver: &dyn SizeResolver,
    ) -> Self {
        let size = match size {
            Some(bytes) => bytes,
            None => match resolver.device_size_bytes(Path::new(devpath)) {
                Ok(bytes) => bytes,
                Err(err) => {
                    log::warn!("disk at devpath:{devpath} not present ({err}); size set to 0");
                    0
                }
            },
        };

        Self {
            devpath: devpath.to_string(),
            serial: serial.to_string(),
            model: model.to_string(),
            ptable: ptable.to_string(),
            size,
            partitions: BTreeMap::new(),
        }
    }

    pub fn devpath(&self) -> &str {
        &self.devpath
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn ptable(&self) -> &str {
        &self.ptable
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Read-only view; the owning planner is the only writer.
    pub fn partitions(&self) -> &BTreeMap<u64, PartitionAction> {
        &self.partitions
    }

    pub(crate) fn partitions_mut(&mut self) -> &mut BTreeMap<u64, PartitionAction> {
        &mut self.partitions
    }

    /// Drops all recorded partitions; identity and size are untouched.
    pub fn reset(&mut self) {
        self.partitions.clear();
    }
}
