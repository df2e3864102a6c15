//! Request and response shapes exchanged with the volume driver.
//!
//! These mirror the storage-plugin calls of the host runtime. The transport
//! that carries them is not part of this workspace.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Option key to option value. Ordered so command lines and listings are
/// deterministic.
pub type VolumeOptions = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountResponse {
    pub mountpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmountRequest {
    pub name: String,
}

/// Pre-provisions a volume with static options before any mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    pub name: String,
    #[serde(default)]
    pub options: VolumeOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveRequest {
    pub name: String,
}

/// Snapshot of one volume's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub name: String,
    /// Empty while the volume has no active mount.
    pub mountpoint: String,
    pub refcount: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: VolumeOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub scope: String,
}
