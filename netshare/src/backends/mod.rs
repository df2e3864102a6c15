//! Backend drivers: one per network filesystem.
//!
//! A backend turns an abstract `(name, source, options)` tuple into an
//! invocation of the filesystem's external mount utility. The shared
//! orchestration (locking, refcounts, mountpoint directories) lives in
//! [`crate::driver::VolumeDriver`]; backends never touch the mount table.

mod config;
mod factory;
mod nfs;
mod options;
mod seaweedfs;
mod source;

use std::path::Path;
use std::process::Command;

use netshare_shared::constants::defaults;
use netshare_shared::errors::{NetshareError, NetshareResult};
use netshare_shared::protocol::VolumeOptions;

use crate::registry::BackendKind;
use crate::util;

pub use config::BackendConfig;
pub use factory::{
    BackendFactoryFn, BackendRegistration, available_backends, create_backend, is_registered,
};
pub use nfs::NfsBackend;
pub use options::merge_options;
pub use seaweedfs::SeaweedfsBackend;
pub use source::{ParsedSource, parse_source};

/// Backend-specific half of a volume driver.
pub trait Backend: Send + Sync {
    /// Which registry kind this backend implements.
    fn kind(&self) -> BackendKind;

    /// Physically mount `source` at `dest`.
    ///
    /// `options` are the per-volume options recorded in the mount table; the
    /// backend merges them over its own configured defaults. `dest` already
    /// exists when this is called.
    fn mount_volume(
        &self,
        name: &str,
        source: &str,
        dest: &Path,
        options: &VolumeOptions,
    ) -> NetshareResult<()>;

    /// Physically unmount `dest`.
    fn unmount_volume(&self, name: &str, dest: &Path) -> NetshareResult<()> {
        let _ = name;
        unmount_path(dest)
    }
}

/// Run the system `umount` against `dest`.
pub fn unmount_path(dest: &Path) -> NetshareResult<()> {
    util::run(Command::new(defaults::UMOUNT_BINARY).arg(dest)).map_err(|e| match e {
        NetshareError::Spawn(msg) => NetshareError::Unmount(msg),
        other => other,
    })
}

/// Split a comma-separated option string into flag tokens, dropping empties.
pub(crate) fn split_flags(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
