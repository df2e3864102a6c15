//! Backend registry: the network filesystems a driver can be built for.

use netshare_shared::errors::NetshareError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported backend filesystem kinds.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Cifs,
    Nfs,
    Efs,
    Ceph,
    Seaweedfs,
}

impl BackendKind {
    /// Every kind, in registry order.
    pub const ALL: [BackendKind; 5] = [
        BackendKind::Cifs,
        BackendKind::Nfs,
        BackendKind::Efs,
        BackendKind::Ceph,
        BackendKind::Seaweedfs,
    ];

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Cifs => "cifs",
            BackendKind::Nfs => "nfs",
            BackendKind::Efs => "efs",
            BackendKind::Ceph => "ceph",
            BackendKind::Seaweedfs => "seaweedfs",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = NetshareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<_> = BackendKind::ALL.iter().map(|k| k.as_str()).collect();
                NetshareError::Config(format!(
                    "Unknown backend type: '{}'. Supported: {}",
                    s,
                    names.join(", ")
                ))
            })
    }
}
