//! Shared orchestration for every backend.
//!
//! Mount and Unmount are serialized by one driver-wide lock that is held for
//! the whole call, including the external mount/unmount command. That makes
//! "exactly one physical mount per volume" hold by construction, at the cost
//! of unrelated volumes queuing behind each other.
//!
//! Per-volume lifecycle as seen through the mount table:
//! ```text
//! Unmounted → (Mounting) → Mounted(1) → Mounted(k±1) … → (Unmounting) → Unmounted
//! ```
//! The bracketed states exist only while the lock is held.

use std::fs::DirBuilder;
use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Component, Path, PathBuf};

use netshare_shared::constants::{SCOPE_LOCAL, option_keys};
use netshare_shared::errors::{NetshareError, NetshareResult};
use netshare_shared::protocol::{
    Capabilities, CreateRequest, MountRequest, MountResponse, RemoveRequest, UnmountRequest,
    VolumeInfo,
};
use parking_lot::Mutex;

use crate::backends::Backend;
use crate::mounts::MountManager;

pub struct VolumeDriver {
    root: PathBuf,
    mounts: MountManager,
    backend: Box<dyn Backend>,
    lock: Mutex<()>,
}

impl VolumeDriver {
    /// Create a driver mounting volumes under `root`.
    ///
    /// `mounts` is shared: clones of it observe the same table.
    pub fn new(root: impl Into<PathBuf>, mounts: MountManager, backend: Box<dyn Backend>) -> Self {
        Self {
            root: root.into(),
            mounts,
            backend,
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mounts(&self) -> &MountManager {
        &self.mounts
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Mountpoint for a volume: `{root}/{name}`.
    ///
    /// Leading `/` and `.` components are dropped, so `/buckets/data` lands
    /// at `{root}/buckets/data`. Names that would resolve to the root itself
    /// or climb out of it with `..` are rejected.
    pub fn mountpoint(&self, name: &str) -> NetshareResult<PathBuf> {
        let mut hostdir = self.root.clone();
        let mut depth = 0usize;

        for component in Path::new(name).components() {
            match component {
                Component::Normal(part) => {
                    hostdir.push(part);
                    depth += 1;
                }
                Component::RootDir | Component::CurDir => {}
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(NetshareError::Config(format!(
                        "volume name {:?} must not contain '..'",
                        name
                    )));
                }
            }
        }

        if depth == 0 {
            return Err(NetshareError::Config(format!(
                "volume name {:?} does not name a directory below {}",
                name,
                self.root.display()
            )));
        }
        Ok(hostdir)
    }

    /// Mount a volume, reusing the physical mount if one is active.
    pub fn mount(&self, req: &MountRequest) -> NetshareResult<MountResponse> {
        tracing::debug!("Entering Mount: {:?}", req);
        let _guard = self.lock.lock();

        let name = req.name.as_str();
        let hostdir = self.mountpoint(name)?;
        let response = MountResponse {
            mountpoint: hostdir.display().to_string(),
        };

        if self.mounts.has_mount(name) && self.mounts.count(name) > 0 {
            tracing::info!(
                backend = %self.backend.kind(),
                "Using existing volume mount: {}",
                hostdir.display()
            );
            self.mounts.increment(name)?;
            return Ok(response);
        }

        let options = self.mounts.get_options(name);
        let source = options
            .get(option_keys::SHARE)
            .cloned()
            .unwrap_or_else(|| name.to_string());

        tracing::info!(
            backend = %self.backend.kind(),
            "Mounting volume {} on {}",
            source,
            hostdir.display()
        );
        create_dest(&hostdir)?;

        // The directory is left in place if the mount fails.
        self.backend.mount_volume(name, &source, &hostdir, &options)?;
        self.mounts.add(name, &hostdir);

        Ok(response)
    }

    /// Release one consumer; physically unmount when it was the last one.
    ///
    /// An unknown volume is still unmounted on a best-effort basis. If the
    /// unmount command fails, refcount and directory stay as they were so the
    /// call can be retried.
    pub fn unmount(&self, req: &UnmountRequest) -> NetshareResult<()> {
        tracing::debug!("Entering Unmount: {:?}", req);
        let _guard = self.lock.lock();

        let name = req.name.as_str();
        let hostdir = self.mountpoint(name)?;
        let count = self.mounts.count(name);

        if count > 1 {
            tracing::info!(
                volume = %name,
                refcount = count,
                "Skipping unmount - in use by other consumers"
            );
            self.mounts.decrement(name)?;
            return Ok(());
        }

        tracing::info!("Unmounting volume name {} from {}", name, hostdir.display());
        self.backend.unmount_volume(name, &hostdir)?;

        if count == 1 {
            self.mounts.decrement(name)?;
        }
        self.mounts.delete_if_not_managed(name);

        match std::fs::remove_dir_all(&hostdir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NetshareError::Storage(format!(
                "Failed to remove mountpoint {}: {}",
                hostdir.display(),
                e
            ))),
        }
    }

    /// Pre-provision a managed volume with static options.
    pub fn create(&self, req: &CreateRequest) -> NetshareResult<()> {
        tracing::debug!("Entering Create: {:?}", req);
        let _guard = self.lock.lock();

        let hostdir = self.mountpoint(&req.name)?;
        create_dest(&hostdir)?;
        self.mounts.create(&req.name, hostdir, req.options.clone())
    }

    /// Forget an idle volume and remove its (empty) mountpoint.
    pub fn remove(&self, req: &RemoveRequest) -> NetshareResult<()> {
        tracing::debug!("Entering Remove: {:?}", req);
        let _guard = self.lock.lock();

        let hostdir = self.mountpoint(&req.name)?;
        self.mounts.delete(&req.name)?;

        if hostdir.exists()
            && let Err(e) = std::fs::remove_dir(&hostdir)
        {
            tracing::warn!(
                volume = %req.name,
                "Leaving mountpoint {} in place: {}",
                hostdir.display(),
                e
            );
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> NetshareResult<VolumeInfo> {
        self.mounts
            .volume(name)
            .ok_or_else(|| NetshareError::NotFound(format!("volume {}", name)))
    }

    pub fn list(&self) -> Vec<VolumeInfo> {
        self.mounts.volumes()
    }

    pub fn path(&self, name: &str) -> NetshareResult<MountResponse> {
        Ok(MountResponse {
            mountpoint: self.mountpoint(name)?.display().to_string(),
        })
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            scope: SCOPE_LOCAL.to_string(),
        }
    }
}

/// Create the mountpoint directory if needed.
fn create_dest(dest: &Path) -> NetshareResult<()> {
    match std::fs::metadata(dest) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => {
            return Err(NetshareError::Storage(format!(
                "{} already exists and is not a directory",
                dest.display()
            )));
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(NetshareError::Storage(format!(
                "Failed to stat mount point {}: {}",
                dest.display(),
                e
            )));
        }
    }

    DirBuilder::new()
        .recursive(true)
        .mode(0o755)
        .create(dest)
        .map_err(|e| {
            NetshareError::Storage(format!(
                "Failed to create mount point {}: {}",
                dest.display(),
                e
            ))
        })
}
