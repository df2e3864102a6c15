use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use netshare::constants::{defaults, envs};
use netshare::{BackendConfig, BackendKind, MountManager, VolumeDriver};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::commands::serve::ServeArgs;

/// Reference-counted network filesystem mounts for container volumes
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List backend kinds and whether this build supports them
    Backends,

    /// Serve volume requests (one JSON object per line) on stdin/stdout
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct GlobalFlags {
    /// Directory under which volume mountpoints are created
    #[arg(long, global = true, env = envs::NETSHARE_ROOT, default_value = defaults::ROOT_DIR)]
    pub root: PathBuf,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub debug: bool,
}

impl GlobalFlags {
    /// Log to stderr; stdout carries responses.
    pub fn init_tracing(&self) {
        let env_filter = if self.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        };

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_ansi(false),
            )
            .try_init();
    }

    pub fn create_driver(
        &self,
        kind: BackendKind,
        config: &BackendConfig,
    ) -> anyhow::Result<VolumeDriver> {
        let backend = netshare::create_backend(kind, config)?;
        tracing::info!(backend = %kind, root = %self.root.display(), "Volume driver ready");
        Ok(VolumeDriver::new(&self.root, MountManager::new(), backend))
    }
}
