//! Thread-safe mount table implementation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use netshare_shared::errors::{NetshareError, NetshareResult};
use netshare_shared::protocol::{VolumeInfo, VolumeOptions};
use parking_lot::RwLock;

/// One volume's bookkeeping.
#[derive(Debug, Clone)]
struct MountRecord {
    hostdir: PathBuf,
    refcount: u32,
    options: VolumeOptions,
    /// Pre-provisioned through `create`; survives `delete_if_not_managed`.
    managed: bool,
}

impl MountRecord {
    fn to_info(&self, name: &str) -> VolumeInfo {
        let mountpoint = if self.refcount > 0 {
            self.hostdir.display().to_string()
        } else {
            String::new()
        };
        VolumeInfo {
            name: name.to_string(),
            mountpoint,
            refcount: self.refcount,
            options: self.options.clone(),
        }
    }
}

/// Thread-safe table of mounted volumes.
///
/// Cloning yields another handle onto the same table. A volume driver owns
/// one handle and mutates the table only while holding its own driver lock;
/// the table's lock makes every single operation atomic on its own.
///
/// A volume absent from the table is equivalent to a refcount of zero.
#[derive(Clone, Debug, Default)]
pub struct MountManager {
    inner: Arc<RwLock<HashMap<String, MountRecord>>>,
}

impl MountManager {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a record exists for `name`, whatever its refcount.
    pub fn has_mount(&self, name: &str) -> bool {
        self.inner.read().contains_key(name)
    }

    /// Current refcount, 0 if absent.
    pub fn count(&self, name: &str) -> u32 {
        self.inner.read().get(name).map_or(0, |r| r.refcount)
    }

    /// True if the volume is physically mounted (refcount > 0).
    pub fn is_active(&self, name: &str) -> bool {
        self.count(name) > 0
    }

    /// Register a new physical mount at refcount 1.
    ///
    /// A managed record sitting at refcount 0 is activated in place so its
    /// options are kept. An already active record is left untouched.
    pub fn add(&self, name: &str, hostdir: impl Into<PathBuf>) {
        let hostdir = hostdir.into();
        let mut table = self.inner.write();

        match table.get_mut(name) {
            Some(record) if record.refcount > 0 => {
                tracing::debug!(
                    volume = %name,
                    refcount = record.refcount,
                    "Mount already registered, ignoring add"
                );
            }
            Some(record) => {
                tracing::debug!(
                    volume = %name,
                    hostdir = %hostdir.display(),
                    "Activating managed volume"
                );
                record.hostdir = hostdir;
                record.refcount = 1;
            }
            None => {
                tracing::debug!(
                    volume = %name,
                    hostdir = %hostdir.display(),
                    "Registering mount"
                );
                table.insert(
                    name.to_string(),
                    MountRecord {
                        hostdir,
                        refcount: 1,
                        options: VolumeOptions::new(),
                        managed: false,
                    },
                );
            }
        }
    }

    /// Pre-provision a managed volume with static options.
    ///
    /// Replaces the options of an existing idle record. Fails if the volume
    /// is currently mounted, since options are fixed while in use.
    pub fn create(
        &self,
        name: &str,
        hostdir: impl Into<PathBuf>,
        options: VolumeOptions,
    ) -> NetshareResult<()> {
        let mut table = self.inner.write();

        if let Some(record) = table.get(name)
            && record.refcount > 0
        {
            return Err(NetshareError::InvalidState(format!(
                "volume {} is mounted, options cannot change while in use",
                name
            )));
        }

        tracing::debug!(volume = %name, options = ?options, "Creating managed volume");
        table.insert(
            name.to_string(),
            MountRecord {
                hostdir: hostdir.into(),
                refcount: 0,
                options,
                managed: true,
            },
        );
        Ok(())
    }

    /// Add one consumer. Returns the new refcount.
    pub fn increment(&self, name: &str) -> NetshareResult<u32> {
        let mut table = self.inner.write();
        let record = table
            .get_mut(name)
            .ok_or_else(|| NetshareError::NotFound(format!("volume {}", name)))?;

        record.refcount += 1;
        tracing::trace!(volume = %name, refcount = record.refcount, "Incremented refcount");
        Ok(record.refcount)
    }

    /// Drop one consumer. Returns the new refcount.
    ///
    /// Decrementing at zero is a caller bug and fails instead of clamping.
    pub fn decrement(&self, name: &str) -> NetshareResult<u32> {
        let mut table = self.inner.write();
        let record = table
            .get_mut(name)
            .ok_or_else(|| NetshareError::NotFound(format!("volume {}", name)))?;

        record.refcount = record.refcount.checked_sub(1).ok_or_else(|| {
            NetshareError::InvalidState(format!("refcount underflow for volume {}", name))
        })?;
        tracing::trace!(volume = %name, refcount = record.refcount, "Decremented refcount");
        Ok(record.refcount)
    }

    /// Remove the record if idle and not managed. Returns whether it was removed.
    pub fn delete_if_not_managed(&self, name: &str) -> bool {
        let mut table = self.inner.write();

        let removable = matches!(table.get(name), Some(r) if r.refcount == 0 && !r.managed);
        if removable {
            tracing::debug!(volume = %name, "Removing mount record");
            table.remove(name);
        }
        removable
    }

    /// Remove an idle record, managed or not.
    pub fn delete(&self, name: &str) -> NetshareResult<()> {
        let mut table = self.inner.write();

        let refcount = table
            .get(name)
            .map(|r| r.refcount)
            .ok_or_else(|| NetshareError::NotFound(format!("volume {}", name)))?;
        if refcount > 0 {
            return Err(NetshareError::InvalidState(format!(
                "volume {} is currently in use ({} consumers)",
                name, refcount
            )));
        }

        tracing::debug!(volume = %name, "Deleting volume record");
        table.remove(name);
        Ok(())
    }

    /// Recorded options, empty if none.
    pub fn get_options(&self, name: &str) -> VolumeOptions {
        self.inner
            .read()
            .get(name)
            .map(|r| r.options.clone())
            .unwrap_or_default()
    }

    pub fn get_option(&self, name: &str, key: &str) -> Option<String> {
        self.inner
            .read()
            .get(name)
            .and_then(|r| r.options.get(key).cloned())
    }

    pub fn has_option(&self, name: &str, key: &str) -> bool {
        self.inner
            .read()
            .get(name)
            .is_some_and(|r| r.options.contains_key(key))
    }

    pub fn hostdir(&self, name: &str) -> Option<PathBuf> {
        self.inner.read().get(name).map(|r| r.hostdir.clone())
    }

    /// Snapshot of one volume.
    pub fn volume(&self, name: &str) -> Option<VolumeInfo> {
        self.inner.read().get(name).map(|r| r.to_info(name))
    }

    /// Snapshot of every volume, sorted by name.
    pub fn volumes(&self) -> Vec<VolumeInfo> {
        let table = self.inner.read();
        let mut infos: Vec<VolumeInfo> = table
            .iter()
            .map(|(name, record)| record.to_info(name))
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pairs: &[(&str, &str)]) -> VolumeOptions {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_absent_volume_counts_zero() {
        let manager = MountManager::new();

        assert!(!manager.has_mount("data"));
        assert_eq!(manager.count("data"), 0);
        assert!(!manager.is_active("data"));
        assert!(manager.get_options("data").is_empty());
    }

    #[test]
    fn test_add_creates_record_at_one() {
        let manager = MountManager::new();
        manager.add("data", "/mnt/data");

        assert!(manager.has_mount("data"));
        assert_eq!(manager.count("data"), 1);
        assert_eq!(manager.hostdir("data"), Some(PathBuf::from("/mnt/data")));
    }

    #[test]
    fn test_add_on_active_record_is_noop() {
        let manager = MountManager::new();
        manager.add("data", "/mnt/data");
        manager.increment("data").unwrap();
        manager.add("data", "/elsewhere");

        assert_eq!(manager.count("data"), 2);
        assert_eq!(manager.hostdir("data"), Some(PathBuf::from("/mnt/data")));
    }

    #[test]
    fn test_increment_and_decrement() {
        let manager = MountManager::new();
        manager.add("data", "/mnt/data");

        assert_eq!(manager.increment("data").unwrap(), 2);
        assert_eq!(manager.increment("data").unwrap(), 3);
        assert_eq!(manager.decrement("data").unwrap(), 2);
        assert_eq!(manager.count("data"), 2);
    }

    #[test]
    fn test_decrement_below_zero_fails() {
        let manager = MountManager::new();
        manager.add("data", "/mnt/data");
        assert_eq!(manager.decrement("data").unwrap(), 0);

        let result = manager.decrement("data");
        assert!(matches!(result, Err(NetshareError::InvalidState(_))));
        assert_eq!(manager.count("data"), 0);
    }

    #[test]
    fn test_increment_unknown_volume_fails() {
        let manager = MountManager::new();
        assert!(matches!(
            manager.increment("ghost"),
            Err(NetshareError::NotFound(_))
        ));
        assert!(matches!(
            manager.decrement("ghost"),
            Err(NetshareError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_if_not_managed_removes_idle_record() {
        let manager = MountManager::new();
        manager.add("data", "/mnt/data");

        assert!(!manager.delete_if_not_managed("data"));
        manager.decrement("data").unwrap();
        assert!(manager.delete_if_not_managed("data"));
        assert!(!manager.has_mount("data"));
    }

    #[test]
    fn test_managed_record_survives_and_keeps_options() {
        let manager = MountManager::new();
        manager
            .create("data", "/mnt/data", options(&[("seaweedfsopts", "-readOnly")]))
            .unwrap();
        assert_eq!(manager.count("data"), 0);

        manager.add("data", "/mnt/data");
        assert_eq!(manager.count("data"), 1);
        manager.decrement("data").unwrap();

        assert!(!manager.delete_if_not_managed("data"));
        assert!(manager.has_mount("data"));
        assert_eq!(
            manager.get_option("data", "seaweedfsopts").as_deref(),
            Some("-readOnly")
        );
        assert!(manager.has_option("data", "seaweedfsopts"));
        assert!(!manager.has_option("data", "nfsopts"));
    }

    #[test]
    fn test_create_rejects_active_volume() {
        let manager = MountManager::new();
        manager.add("data", "/mnt/data");

        let result = manager.create("data", "/mnt/data", VolumeOptions::new());
        assert!(matches!(result, Err(NetshareError::InvalidState(_))));
    }

    #[test]
    fn test_delete_in_use_fails() {
        let manager = MountManager::new();
        manager.add("data", "/mnt/data");

        let err = manager.delete("data").unwrap_err();
        assert!(err.to_string().contains("in use"));

        manager.decrement("data").unwrap();
        manager.delete("data").unwrap();
        assert!(matches!(manager.delete("data"), Err(NetshareError::NotFound(_))));
    }

    #[test]
    fn test_volumes_sorted_with_mountpoint_only_when_active() {
        let manager = MountManager::new();
        manager.add("zeta", "/mnt/zeta");
        manager
            .create("alpha", "/mnt/alpha", VolumeOptions::new())
            .unwrap();

        let volumes = manager.volumes();
        assert_eq!(volumes.len(), 2);
        assert_eq!(volumes[0].name, "alpha");
        assert_eq!(volumes[0].mountpoint, "");
        assert_eq!(volumes[1].name, "zeta");
        assert_eq!(volumes[1].mountpoint, "/mnt/zeta");
        assert_eq!(volumes[1].refcount, 1);
    }

    #[test]
    fn test_clones_share_one_table() {
        let manager = MountManager::new();
        let other = manager.clone();
        manager.add("data", "/mnt/data");

        assert_eq!(other.count("data"), 1);
    }

    #[test]
    fn test_concurrent_increments() {
        let manager = MountManager::new();
        manager.add("data", "/mnt/data");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        manager.increment("data").unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(manager.count("data"), 801);
    }
}
