//! Process helpers for invoking external mount utilities.

use std::process::{Command, Stdio};

use netshare_shared::errors::{NetshareError, NetshareResult};

/// Check if a process with the given PID exists.
///
/// Uses `libc::kill(pid, 0)` which sends a null signal to check existence.
/// An exited but unreaped child still counts as alive.
pub fn is_process_alive(pid: u32) -> bool {
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

/// Spawn a self-backgrounding mount process and give it up.
///
/// Performs a single liveness probe right after spawn; a process that is
/// already gone fails the call with [`NetshareError::ProcessDead`]. On success
/// the child handle is dropped without waiting or killing, so the process is
/// owned by the OS from here on. Only the PID comes back, for diagnostics.
///
/// # Arguments
/// * `cmd` - Fully built command (program + arguments)
/// * `name` - Volume name the process serves, used in errors and logs
pub fn spawn_detached(mut cmd: Command, name: &str) -> NetshareResult<u32> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    tracing::debug!(volume = %name, "exec: {:?}", cmd);

    let child = cmd.spawn().map_err(|e| {
        tracing::error!(volume = %name, "Error while starting mount process: {}", e);
        NetshareError::Spawn(format!(
            "Failed to start {}: {}",
            cmd.get_program().to_string_lossy(),
            e
        ))
    })?;

    let pid = child.id();
    if !is_process_alive(pid) {
        tracing::error!(volume = %name, pid, "Mount process is dead right after spawn");
        return Err(NetshareError::ProcessDead(name.to_string()));
    }

    // Dropping a Child neither waits for nor kills the process.
    drop(child);

    tracing::debug!(volume = %name, pid, "Released mount process");
    Ok(pid)
}

/// Run a command to completion, failing on a non-zero exit status.
///
/// The error carries the command line and whatever the command wrote to stderr.
pub fn run(cmd: &mut Command) -> NetshareResult<()> {
    tracing::debug!("exec: {:?}", cmd);

    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| NetshareError::Spawn(format!("Failed to run {:?}: {}", cmd, e)))?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(NetshareError::Spawn(format!(
        "{:?} exited with {}: {}",
        cmd,
        output.status,
        stderr.trim()
    )))
}
