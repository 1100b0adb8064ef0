//! blockplan core library.
//!
//! In-memory authority for a block device's intended partition layout. A
//! `PartitionPlanner` accumulates requested partitions, enforces space and
//! flag invariants, and renders the result as an ordered list of declarative
//! actions for an external applier. Nothing in this crate touches the device.

pub mod actions;
pub mod disk;
pub mod errors;
pub mod logging;
pub mod plan;
pub mod planner;
pub mod registry;
pub mod sizes;

pub use actions::{Action, DiskAction, FormatAction, MountAction, PartitionAction, PartitionFlag};
pub use disk::Disk;
pub use errors::PlanError;
pub use plan::{render_storage, StoragePlan};
pub use planner::{FsEntry, PartitionPlanner, PartitionSelector};
pub use registry::{CacheDevice, CacheMode, DeviceRegistry};
