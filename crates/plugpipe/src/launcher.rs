//! Spawns a plugin process and wires its stdio into a [`ManagedChannel`].

use crate::process::ChildHandle;
use plugpipe_core::{DiagnosticSink, LaunchError, LaunchSpec, ManagedChannel};
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, Command};
use tracing::{debug, info};

/// Starts the plugin described by `spec` and returns the managed channel
/// over its stdin/stdout. The plugin's stderr is forwarded to the spec's
/// diagnostic sink for as long as the process runs.
///
/// Spawn failures and missing pipes are distinct errors; if a pipe is
/// missing after a successful spawn, the child is killed before the error
/// is returned so nothing leaks.
pub async fn start(spec: LaunchSpec) -> Result<ManagedChannel, LaunchError> {
    debug!(command = %spec.command, args = ?spec.args, "starting plugin process");

    let mut cmd = Command::new(&spec.command);
    cmd.args(&spec.args)
        .envs(&spec.env)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = &spec.working_directory {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|source| LaunchError::Start {
        command: spec.command.clone(),
        source,
    })?;

    let stdin = match child.stdin.take() {
        Some(stdin) => stdin,
        None => return Err(abort(child, "stdin").await),
    };
    let stdout = match child.stdout.take() {
        Some(stdout) => stdout,
        None => return Err(abort(child, "stdout").await),
    };
    let stderr = match child.stderr.take() {
        Some(stderr) => stderr,
        None => return Err(abort(child, "stderr").await),
    };

    forward_diagnostics(stderr, spec.diagnostics.clone());

    info!(pid = ?child.id(), command = %spec.command, "plugin process started");
    Ok(ManagedChannel::new(
        stdout,
        stdin,
        Box::new(ChildHandle::new(child)),
        spec.grace_period,
    ))
}

/// A pipe went missing part way through wiring; the child must not outlive
/// the failed launch.
async fn abort(mut child: Child, side: &'static str) -> LaunchError {
    let _ = child.kill().await;
    LaunchError::PipeUnavailable { side }
}

fn forward_diagnostics(mut stderr: ChildStderr, sink: DiagnosticSink) {
    tokio::spawn(async move {
        let shared = sink.inner();
        let mut buf = [0u8; 4096];
        loop {
            match stderr.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    // lock per chunk: a sink shared between plugins must not
                    // be held for one child's whole lifetime
                    let mut sink = shared.lock().await;
                    if let Err(err) = sink.write_all(&buf[..n]).await {
                        debug!(error = %err, "plugin stderr forwarding stopped");
                        break;
                    }
                }
                Err(err) => {
                    debug!(error = %err, "plugin stderr forwarding stopped");
                    break;
                }
            }
        }
    });
}
