//! Netshare - volume mount lifecycle for network filesystems.
//!
//! Maps volume names to mountpoints backed by a network filesystem. Each
//! physical mount is shared by reference count across concurrent consumers
//! and performed by an external mount utility.
//!
//! ```rust,no_run
//! use netshare::{BackendConfig, BackendKind, MountManager, VolumeDriver, create_backend};
//! use netshare::protocol::MountRequest;
//!
//! let backend = create_backend(BackendKind::Seaweedfs, &BackendConfig::default())?;
//! let driver = VolumeDriver::new("/var/lib/netshare", MountManager::new(), backend);
//! let response = driver.mount(&MountRequest { name: "filer:8888/buckets/data".into() })?;
//! println!("mounted at {}", response.mountpoint);
//! # Ok::<(), netshare::NetshareError>(())
//! ```

pub mod backends;
pub mod driver;
pub mod mounts;
pub mod registry;
pub mod util;

pub use backends::{Backend, BackendConfig, available_backends, create_backend, is_registered};
pub use driver::VolumeDriver;
pub use mounts::MountManager;
pub use netshare_shared::errors::{NetshareError, NetshareResult};
pub use netshare_shared::{constants, protocol};
pub use registry::BackendKind;
