//! blockplan host abstraction layer.
//!
//! The planning core must never read live system state directly; everything
//! it needs from the host goes through the narrow interfaces defined here so
//! tests can substitute fakes (`StaticMountTable`, `FixedSize`).

pub mod error;
pub mod probe;
pub mod procfs;
pub mod sysfs;

pub use error::{HalError, HalResult};
pub use probe::{MountProbe, ProcMounts, StaticMountTable};
pub use sysfs::block::{FixedSize, SizeResolver, SysfsSizeResolver};
