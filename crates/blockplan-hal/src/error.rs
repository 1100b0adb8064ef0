use std::path::PathBuf;
use thiserror::Error;

pub type HalResult<T> = std::result::Result<T, HalError>;

#[derive(Error, Debug)]
pub enum HalError {
    #[error("Device metadata unavailable for {device}: {reason}")]
    DeviceMetadataUnavailable { device: PathBuf, reason: String },

    #[error("Invalid device path: {0}")]
    InvalidDevicePath(PathBuf),

    #[error("Mount table unreadable at {path}: {source}")]
    MountTableUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}
