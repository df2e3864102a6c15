//! Backend configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings a backend is constructed from. Immutable once the backend exists.
///
/// Every field is optional; each backend fills in its own defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Default endpoint host, used when a source string omits one.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Default endpoint port, used when a source string omits one.
    #[serde(default)]
    pub port: Option<u16>,

    /// Default comma-separated backend flags.
    #[serde(default)]
    pub options: Option<String>,

    /// External mount binary to invoke.
    #[serde(default)]
    pub binary: Option<PathBuf>,

    /// NFS protocol version (3 or 4).
    #[serde(default)]
    pub nfs_version: Option<u8>,
}
