//! Error types shared by the volume driver and its front ends.
//!
//! Every fatal condition of a mount or unmount call surfaces as one
//! [`NetshareError`] variant. The transport layer converts these into the
//! host runtime's error representation; nothing here is retried internally.

use thiserror::Error;

/// Result alias used across the workspace.
pub type NetshareResult<T> = Result<T, NetshareError>;

#[derive(Debug, Error)]
pub enum NetshareError {
    /// Configuration problem (unknown backend, unusable option).
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to create or remove a mountpoint directory.
    #[error("storage error: {0}")]
    Storage(String),

    /// The external mount binary could not be started or exited with failure.
    #[error("spawn error: {0}")]
    Spawn(String),

    /// The liveness probe right after spawn found the mount process gone.
    #[error("process is dead for {0}")]
    ProcessDead(String),

    /// The external unmount command failed. Bookkeeping is left intact.
    #[error("unmount error: {0}")]
    Unmount(String),

    /// Operation not valid for the volume's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// No record for the named volume.
    #[error("not found: {0}")]
    NotFound(String),

    /// Known backend kind that is not compiled into this build.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl From<serde_json::Error> for NetshareError {
    fn from(err: serde_json::Error) -> Self {
        NetshareError::Config(format!("invalid JSON: {}", err))
    }
}
