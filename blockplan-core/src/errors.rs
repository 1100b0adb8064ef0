use blockplan_hal::HalError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Not enough space (requested: {requested} free: {available})")]
    InsufficientSpace { requested: u64, available: u64 },

    #[error("Flag: {0} is not valid")]
    InvalidFlag(String),

    #[error("Mountpoint {0} requires a filesystem type")]
    MountWithoutFilesystem(String),

    #[error("No partition matches selector: {0}")]
    NoMatchingPartition(String),

    #[error(transparent)]
    Hal(#[from] HalError),
}
