//! Shared constants between the driver library and the CLI.

/// Per-volume option keys.
///
/// Each backend reads its extra mount flags from a single well-known key.
pub mod option_keys {
    /// Overrides the volume name as the source string.
    pub const SHARE: &str = "share";

    /// Comma-separated extra flags for `weed mount`.
    pub const SEAWEEDFS: &str = "seaweedfsopts";

    /// Comma-separated `-o` options for NFS mounts.
    pub const NFS: &str = "nfsopts";
}

/// Backend defaults used when neither the source string nor the
/// configuration supply a value.
pub mod defaults {
    /// Default Seaweedfs filer host.
    pub const SEAWEEDFS_FILER: &str = "localhost";

    /// Default Seaweedfs filer port.
    pub const SEAWEEDFS_FILER_PORT: u16 = 8888;

    /// Seaweedfs client binary.
    pub const SEAWEEDFS_BINARY: &str = "weed";

    /// NFS protocol version.
    pub const NFS_VERSION: u8 = 4;

    /// Options applied to NFSv3 mounts that specify none.
    pub const NFS_V3_OPTIONS: &str = "port=2049,nolock,proto=tcp";

    /// System mount binary.
    pub const MOUNT_BINARY: &str = "mount";

    /// System unmount binary.
    pub const UMOUNT_BINARY: &str = "umount";

    /// Root directory under which mountpoints are created.
    pub const ROOT_DIR: &str = "/var/lib/docker-volumes/netshare";
}

/// Environment fallbacks for CLI flags.
pub mod envs {
    pub const NETSHARE_ROOT: &str = "NETSHARE_ROOT";
    pub const NETSHARE_ENDPOINT: &str = "NETSHARE_ENDPOINT";
    pub const NETSHARE_PORT: &str = "NETSHARE_PORT";
    pub const NETSHARE_OPTIONS: &str = "NETSHARE_OPTIONS";
    pub const NETSHARE_BINARY: &str = "NETSHARE_BINARY";
    pub const NETSHARE_NFS_VERSION: &str = "NETSHARE_NFS_VERSION";
}

/// Volume scope reported by capabilities.
pub const SCOPE_LOCAL: &str = "local";
