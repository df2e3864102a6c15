//! Seaweedfs backend: object store mounted through `weed mount` (FUSE).
//!
//! `weed mount` stays in the foreground for the lifetime of the mount, so the
//! process is spawned, probed once, and released to the OS.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use netshare_shared::constants::{defaults, option_keys};
use netshare_shared::errors::NetshareResult;
use netshare_shared::protocol::VolumeOptions;
use parking_lot::Mutex;

use super::factory::BackendRegistration;
use super::{Backend, BackendConfig, ParsedSource, merge_options, parse_source, split_flags};
use crate::registry::BackendKind;
use crate::util;

pub struct SeaweedfsBackend {
    filer: String,
    filer_port: u16,
    binary: PathBuf,
    /// `{seaweedfsopts: <configured flags>}`, or empty.
    default_options: VolumeOptions,
    /// Volume name to PID of the released `weed mount`. Diagnostics only.
    running_mounts: Mutex<HashMap<String, u32>>,
}

impl SeaweedfsBackend {
    pub fn new(config: &BackendConfig) -> Self {
        let mut default_options = VolumeOptions::new();
        if let Some(opts) = config.options.as_deref().filter(|o| !o.is_empty()) {
            default_options.insert(option_keys::SEAWEEDFS.to_string(), opts.to_string());
        }

        Self {
            filer: config
                .endpoint
                .clone()
                .unwrap_or_else(|| defaults::SEAWEEDFS_FILER.to_string()),
            filer_port: config.port.unwrap_or(defaults::SEAWEEDFS_FILER_PORT),
            binary: config
                .binary
                .clone()
                .unwrap_or_else(|| PathBuf::from(defaults::SEAWEEDFS_BINARY)),
            default_options,
            running_mounts: Mutex::new(HashMap::new()),
        }
    }

    /// Parse a source and fill the configured filer/port in for absent parts.
    pub fn resolve_source(&self, source: &str) -> ParsedSource {
        let mut parsed = parse_source(source);
        if parsed.endpoint.is_empty() {
            parsed.endpoint = self.filer.clone();
        }
        if parsed.port == 0 {
            parsed.port = self.filer_port;
        }
        parsed
    }

    /// Build the `weed` argument vector for mounting `source` at `dest`.
    pub fn mount_args(&self, source: &str, dest: &Path, options: &VolumeOptions) -> Vec<String> {
        let options = merge_options(options, &self.default_options);
        let extra = match options.get(option_keys::SEAWEEDFS) {
            Some(value) => {
                tracing::debug!("opts = {}", value);
                split_flags(value)
            }
            None => Vec::new(),
        };

        let ParsedSource {
            endpoint,
            port,
            path,
        } = self.resolve_source(source);

        let mut args = vec![
            "mount".to_string(),
            format!("-dir={}", dest.display()),
            format!("-filer={}:{}", endpoint, port),
            format!("-filer.path={}", path),
        ];
        args.extend(extra);
        args
    }

    /// PID of the `weed mount` released for `name`, if any.
    pub fn running_pid(&self, name: &str) -> Option<u32> {
        self.running_mounts.lock().get(name).copied()
    }
}

impl Backend for SeaweedfsBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Seaweedfs
    }

    fn mount_volume(
        &self,
        name: &str,
        source: &str,
        dest: &Path,
        options: &VolumeOptions,
    ) -> NetshareResult<()> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(self.mount_args(source, dest, options));

        let pid = util::spawn_detached(cmd, name)?;
        self.running_mounts.lock().insert(name.to_string(), pid);
        tracing::info!(volume = %name, pid, "Seaweedfs mount process running");
        Ok(())
    }

    fn unmount_volume(&self, name: &str, dest: &Path) -> NetshareResult<()> {
        super::unmount_path(dest)?;
        self.running_mounts.lock().remove(name);
        Ok(())
    }
}

fn create(config: &BackendConfig) -> NetshareResult<Box<dyn Backend>> {
    Ok(Box::new(SeaweedfsBackend::new(config)))
}

inventory::submit! {
    BackendRegistration {
        kind: BackendKind::Seaweedfs,
        factory: create,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netshare_shared::errors::NetshareError;

    fn backend(options: Option<&str>) -> SeaweedfsBackend {
        SeaweedfsBackend::new(&BackendConfig {
            endpoint: Some("filer.local".to_string()),
            port: Some(8888),
            options: options.map(str::to_string),
            ..Default::default()
        })
    }

    fn volume_options(value: &str) -> VolumeOptions {
        [(option_keys::SEAWEEDFS.to_string(), value.to_string())]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_defaults_without_config() {
        let backend = SeaweedfsBackend::new(&BackendConfig::default());
        let resolved = backend.resolve_source("/data");
        assert_eq!(resolved.endpoint, "localhost");
        assert_eq!(resolved.port, 8888);
        assert_eq!(resolved.path, "/data");
    }

    #[test]
    fn test_resolve_falls_back_to_configured_filer() {
        let backend = backend(None);

        let resolved = backend.resolve_source("/buckets/a");
        assert_eq!(resolved.endpoint, "filer.local");
        assert_eq!(resolved.port, 8888);

        let resolved = backend.resolve_source("other:notaport/buckets/a");
        assert_eq!(resolved.endpoint, "other");
        assert_eq!(resolved.port, 8888);
    }

    #[test]
    fn test_mount_args_from_source() {
        let backend = backend(None);
        let args = backend.mount_args(
            "other:9333/buckets/a",
            Path::new("/mnt/vol"),
            &VolumeOptions::new(),
        );

        assert_eq!(
            args,
            vec![
                "mount",
                "-dir=/mnt/vol",
                "-filer=other:9333",
                "-filer.path=/buckets/a",
            ]
        );
    }

    #[test]
    fn test_mount_args_configured_flags_appended() {
        let backend = backend(Some("-readOnly,-collection=c1"));
        let args = backend.mount_args("/x", Path::new("/mnt/vol"), &VolumeOptions::new());

        assert_eq!(
            &args[1..],
            &[
                "-dir=/mnt/vol",
                "-filer=filer.local:8888",
                "-filer.path=/x",
                "-readOnly",
                "-collection=c1",
            ]
        );
    }

    #[test]
    fn test_mount_args_volume_options_override_defaults() {
        let backend = backend(Some("-a,-b"));
        let args = backend.mount_args("/x", Path::new("/mnt/vol"), &volume_options("-c,-d"));

        assert_eq!(&args[4..], &["-c", "-d"]);
    }

    #[test]
    fn test_mount_spawns_and_records_pid() {
        // Stand-in for `weed` that ignores its arguments and stays up.
        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("fake-weed");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 30\n").unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let backend = SeaweedfsBackend::new(&BackendConfig {
            binary: Some(script),
            ..Default::default()
        });
        backend
            .mount_volume("vol", "/x", dir.path(), &VolumeOptions::new())
            .unwrap();

        let pid = backend.running_pid("vol").expect("pid recorded");
        assert!(util::is_process_alive(pid));
        unsafe {
            libc::kill(pid as i32, libc::SIGKILL);
        }
    }

    #[test]
    fn test_mount_missing_binary_is_spawn_error() {
        let backend = SeaweedfsBackend::new(&BackendConfig {
            binary: Some(PathBuf::from("/nonexistent/weed")),
            ..Default::default()
        });

        let result = backend.mount_volume("vol", "/x", Path::new("/tmp"), &VolumeOptions::new());
        assert!(matches!(result, Err(NetshareError::Spawn(_))));
        assert!(backend.running_pid("vol").is_none());
    }
}
