//! Line-delimited JSON request loop.
//!
//! Each stdin line is one request; each is handled on its own blocking task so
//! requests reach the driver concurrently, the way a host runtime dispatches
//! plugin calls. Responses are written one per line as they complete.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use netshare::constants::envs;
use netshare::protocol::{
    Capabilities, CreateRequest, MountRequest, RemoveRequest, UnmountRequest, VolumeInfo,
};
use netshare::{BackendConfig, BackendKind, NetshareResult, VolumeDriver};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Backend filesystem kind (cifs, nfs, efs, ceph, seaweedfs)
    pub backend: BackendKind,

    /// Default endpoint host when a source omits one
    #[arg(long, env = envs::NETSHARE_ENDPOINT)]
    pub endpoint: Option<String>,

    /// Default endpoint port when a source omits one
    #[arg(long, env = envs::NETSHARE_PORT)]
    pub port: Option<u16>,

    /// Default comma-separated backend flags
    #[arg(long, env = envs::NETSHARE_OPTIONS)]
    pub options: Option<String>,

    /// External mount binary
    #[arg(long, env = envs::NETSHARE_BINARY)]
    pub binary: Option<PathBuf>,

    /// NFS protocol version (3 or 4)
    #[arg(long, env = envs::NETSHARE_NFS_VERSION)]
    pub nfs_version: Option<u8>,
}

impl ServeArgs {
    fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            endpoint: self.endpoint.clone(),
            port: self.port,
            options: self.options.clone(),
            binary: self.binary.clone(),
            nfs_version: self.nfs_version,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(tag = "op", rename_all = "lowercase")]
enum Request {
    Mount(MountRequest),
    Unmount(UnmountRequest),
    Create(CreateRequest),
    Remove(RemoveRequest),
    Get { name: String },
    List,
    Path { name: String },
    Capabilities,
}

impl Request {
    fn name(&self) -> Option<&str> {
        match self {
            Request::Mount(r) => Some(&r.name),
            Request::Unmount(r) => Some(&r.name),
            Request::Create(r) => Some(&r.name),
            Request::Remove(r) => Some(&r.name),
            Request::Get { name } | Request::Path { name } => Some(name),
            Request::List | Request::Capabilities => None,
        }
    }
}

#[derive(Serialize, Debug, Default)]
struct Response {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mountpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    volume: Option<VolumeInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    volumes: Option<Vec<VolumeInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    capabilities: Option<Capabilities>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Response {
    fn failure(name: Option<&str>, error: impl ToString) -> Self {
        Self {
            ok: false,
            name: name.map(str::to_string),
            error: Some(error.to_string()),
            ..Default::default()
        }
    }
}

fn dispatch(driver: &VolumeDriver, request: Request) -> NetshareResult<Response> {
    let mut response = Response {
        ok: true,
        name: request.name().map(str::to_string),
        ..Default::default()
    };

    match request {
        Request::Mount(r) => response.mountpoint = Some(driver.mount(&r)?.mountpoint),
        Request::Unmount(r) => driver.unmount(&r)?,
        Request::Create(r) => driver.create(&r)?,
        Request::Remove(r) => driver.remove(&r)?,
        Request::Get { name } => response.volume = Some(driver.get(&name)?),
        Request::List => response.volumes = Some(driver.list()),
        Request::Path { name } => response.mountpoint = Some(driver.path(&name)?.mountpoint),
        Request::Capabilities => response.capabilities = Some(driver.capabilities()),
    }
    Ok(response)
}

fn handle_line(driver: &VolumeDriver, line: &str) -> String {
    let response = match serde_json::from_str::<Request>(line) {
        Ok(request) => {
            let name = request.name().map(str::to_string);
            dispatch(driver, request).unwrap_or_else(|e| {
                tracing::warn!(volume = ?name, "Request failed: {}", e);
                Response::failure(name.as_deref(), e)
            })
        }
        Err(e) => Response::failure(None, format!("invalid request: {}", e)),
    };

    serde_json::to_string(&response)
        .unwrap_or_else(|e| format!(r#"{{"ok":false,"error":"unencodable response: {}"}}"#, e))
}

pub async fn execute(args: ServeArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let driver = Arc::new(global.create_driver(args.backend, &args.backend_config())?);

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = rx.recv().await {
            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let driver = driver.clone();
        let tx = tx.clone();
        in_flight.spawn_blocking(move || {
            let _ = tx.send(handle_line(&driver, &line));
        });
    }

    while let Some(result) = in_flight.join_next().await {
        result?;
    }
    drop(tx);
    writer.await??;

    tracing::debug!("stdin closed, serve loop done");
    Ok(())
}
