//! NFS backend: kernel NFS client driven through the system `mount`.
//!
//! Unlike FUSE backends, `mount -t nfs*` returns once the mount is in place,
//! so the command runs to completion while the driver lock is held.

use std::path::{Path, PathBuf};
use std::process::Command;

use netshare_shared::constants::{defaults, option_keys};
use netshare_shared::errors::{NetshareError, NetshareResult};
use netshare_shared::protocol::VolumeOptions;

use super::factory::BackendRegistration;
use super::{Backend, BackendConfig, merge_options, parse_source};
use crate::registry::BackendKind;
use crate::util;

pub struct NfsBackend {
    server: Option<String>,
    version: u8,
    binary: PathBuf,
    default_options: VolumeOptions,
}

impl NfsBackend {
    pub fn new(config: &BackendConfig) -> NetshareResult<Self> {
        let version = config.nfs_version.unwrap_or(defaults::NFS_VERSION);
        if !matches!(version, 3 | 4) {
            return Err(NetshareError::Config(format!(
                "unsupported NFS version {}, expected 3 or 4",
                version
            )));
        }

        let mut default_options = VolumeOptions::new();
        if let Some(opts) = config.options.as_deref().filter(|o| !o.is_empty()) {
            default_options.insert(option_keys::NFS.to_string(), opts.to_string());
        }

        Ok(Self {
            server: config.endpoint.clone().filter(|e| !e.is_empty()),
            version,
            binary: config
                .binary
                .clone()
                .unwrap_or_else(|| PathBuf::from(defaults::MOUNT_BINARY)),
            default_options,
        })
    }

    /// Build the `mount` argument vector for `source` at `dest`.
    ///
    /// `host[:port]/export` becomes `host:/export`; a port is passed on as
    /// the `port=` mount option.
    pub fn mount_args(
        &self,
        name: &str,
        source: &str,
        dest: &Path,
        options: &VolumeOptions,
    ) -> NetshareResult<Vec<String>> {
        let parsed = parse_source(source);
        let server = if parsed.endpoint.is_empty() {
            self.server.clone().ok_or_else(|| {
                NetshareError::Config(format!(
                    "no NFS server in source '{}' for volume {} and none configured",
                    source, name
                ))
            })?
        } else {
            parsed.endpoint
        };

        let options = merge_options(options, &self.default_options);
        let mut opts: Vec<String> = options
            .get(option_keys::NFS)
            .map(|v| super::split_flags(v))
            .unwrap_or_default();
        if parsed.port != 0 {
            opts.push(format!("port={}", parsed.port));
        }

        let mut args = Vec::new();
        match self.version {
            3 => {
                let opts = if opts.is_empty() {
                    defaults::NFS_V3_OPTIONS.to_string()
                } else {
                    opts.join(",")
                };
                args.extend(["-t".to_string(), "nfs".to_string(), "-o".to_string(), opts]);
            }
            _ => {
                args.extend(["-t".to_string(), "nfs4".to_string()]);
                if !opts.is_empty() {
                    args.extend(["-o".to_string(), opts.join(",")]);
                }
            }
        }
        args.push(format!("{}:{}", server, parsed.path));
        args.push(dest.display().to_string());
        Ok(args)
    }
}

impl Backend for NfsBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Nfs
    }

    fn mount_volume(
        &self,
        name: &str,
        source: &str,
        dest: &Path,
        options: &VolumeOptions,
    ) -> NetshareResult<()> {
        let args = self.mount_args(name, source, dest, options)?;
        util::run(Command::new(&self.binary).args(&args))?;
        tracing::info!(volume = %name, dest = %dest.display(), "NFS volume mounted");
        Ok(())
    }
}

fn create(config: &BackendConfig) -> NetshareResult<Box<dyn Backend>> {
    Ok(Box::new(NfsBackend::new(config)?))
}

inventory::submit! {
    BackendRegistration {
        kind: BackendKind::Nfs,
        factory: create,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(version: u8, endpoint: Option<&str>, options: Option<&str>) -> NfsBackend {
        NfsBackend::new(&BackendConfig {
            endpoint: endpoint.map(str::to_string),
            options: options.map(str::to_string),
            nfs_version: Some(version),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_v4_without_options() {
        let args = backend(4, None, None)
            .mount_args("vol", "nas/export/data", Path::new("/mnt/vol"), &VolumeOptions::new())
            .unwrap();
        assert_eq!(args, ["-t", "nfs4", "nas:/export/data", "/mnt/vol"]);
    }

    #[test]
    fn test_v4_with_options_and_port() {
        let args = backend(4, None, Some("rw,noatime"))
            .mount_args("vol", "nas:2050/export", Path::new("/mnt/vol"), &VolumeOptions::new())
            .unwrap();
        assert_eq!(
            args,
            ["-t", "nfs4", "-o", "rw,noatime,port=2050", "nas:/export", "/mnt/vol"]
        );
    }

    #[test]
    fn test_v3_default_options() {
        let args = backend(3, Some("nas"), None)
            .mount_args("vol", "/export", Path::new("/mnt/vol"), &VolumeOptions::new())
            .unwrap();
        assert_eq!(
            args,
            ["-t", "nfs", "-o", "port=2049,nolock,proto=tcp", "nas:/export", "/mnt/vol"]
        );
    }

    #[test]
    fn test_volume_options_override() {
        let per_volume: VolumeOptions = [(option_keys::NFS.to_string(), "ro".to_string())]
            .into_iter()
            .collect();
        let args = backend(4, None, Some("rw"))
            .mount_args("vol", "nas/export", Path::new("/mnt/vol"), &per_volume)
            .unwrap();
        assert_eq!(args, ["-t", "nfs4", "-o", "ro", "nas:/export", "/mnt/vol"]);
    }

    #[test]
    fn test_missing_server_is_config_error() {
        let result = backend(4, None, None).mount_args(
            "vol",
            "/export",
            Path::new("/mnt/vol"),
            &VolumeOptions::new(),
        );
        assert!(matches!(result, Err(NetshareError::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let result = NfsBackend::new(&BackendConfig {
            nfs_version: Some(2),
            ..Default::default()
        });
        assert!(matches!(result, Err(NetshareError::Config(_))));
    }
}
