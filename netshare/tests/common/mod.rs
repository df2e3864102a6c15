#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use netshare::backends::Backend;
use netshare::protocol::{MountRequest, UnmountRequest, VolumeOptions};
use netshare::{BackendKind, MountManager, NetshareResult, VolumeDriver};
use parking_lot::Mutex;
use tempfile::TempDir;

/// Physical mount/unmount invocations seen by a [`RecordingBackend`].
#[derive(Default)]
pub struct Invocations {
    pub mounts: AtomicUsize,
    pub unmounts: AtomicUsize,
    pub mounted_at: Mutex<Vec<PathBuf>>,
}

impl Invocations {
    pub fn mounts(&self) -> usize {
        self.mounts.load(Ordering::SeqCst)
    }

    pub fn unmounts(&self) -> usize {
        self.unmounts.load(Ordering::SeqCst)
    }
}

/// Backend that records calls instead of running mount utilities.
///
/// `delay` widens the window in which concurrent callers would race if the
/// driver did not serialize them.
pub struct RecordingBackend {
    pub calls: Arc<Invocations>,
    pub delay: Duration,
}

impl Backend for RecordingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Seaweedfs
    }

    fn mount_volume(
        &self,
        _name: &str,
        _source: &str,
        dest: &Path,
        _options: &VolumeOptions,
    ) -> NetshareResult<()> {
        std::thread::sleep(self.delay);
        self.calls.mounts.fetch_add(1, Ordering::SeqCst);
        self.calls.mounted_at.lock().push(dest.to_path_buf());
        Ok(())
    }

    fn unmount_volume(&self, _name: &str, _dest: &Path) -> NetshareResult<()> {
        std::thread::sleep(self.delay);
        self.calls.unmounts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Driver over a recording backend with an isolated root directory.
pub struct TestContext {
    pub driver: Arc<VolumeDriver>,
    pub calls: Arc<Invocations>,
    pub root: PathBuf,
    _temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let calls = Arc::new(Invocations::default());
        let backend = RecordingBackend {
            calls: calls.clone(),
            delay,
        };
        let driver = VolumeDriver::new(&root, MountManager::new(), Box::new(backend));

        Self {
            driver: Arc::new(driver),
            calls,
            root,
            _temp_dir: temp_dir,
        }
    }

    pub fn mount(&self, name: &str) -> String {
        self.driver
            .mount(&MountRequest {
                name: name.to_string(),
            })
            .expect("mount should succeed")
            .mountpoint
    }

    pub fn unmount(&self, name: &str) {
        self.driver
            .unmount(&UnmountRequest {
                name: name.to_string(),
            })
            .expect("unmount should succeed");
    }
}
