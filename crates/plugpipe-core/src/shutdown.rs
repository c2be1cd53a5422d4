use crate::error::ShutdownError;
use crate::process::ProcessHandle;
use std::time::Duration;
use tokio::time;
use tracing::{debug, warn};

/// How long `stop_process` waits for a cooperative exit before escalating
/// to a forced kill. Overridable per launch via `LaunchSpec::grace_period`.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(1);

/// Stops a plugin process: cooperative signal, bounded wait, forced kill.
///
/// The protocol moves `Running -> Signaled -> {Exited, ForceKilled}` and
/// never re-enters `Running`:
///
/// - if the stop signal cannot be delivered, that error is returned
///   immediately and neither wait nor kill is attempted;
/// - the wait races a timer of `grace`; if the process exits first the
///   protocol ends in `Exited` and returns the wait's own result;
/// - if the timer fires first the process is killed. A failed kill is
///   `ShutdownError::Kill`; a successful one is reported as
///   `ShutdownError::StopTimeout` so the caller knows the plugin did not
///   exit cooperatively.
///
/// `kill` reaps the process, so the escalation path leaves no zombie and
/// nothing ever waits on the handle twice.
pub async fn stop_process(
    process: &mut dyn ProcessHandle,
    grace: Duration,
) -> Result<(), ShutdownError> {
    process.interrupt().map_err(ShutdownError::Signal)?;
    debug!(pid = ?process.id(), "sent stop signal to plugin process");

    match time::timeout(grace, process.wait()).await {
        Ok(Ok(status)) => {
            debug!(%status, "plugin process exited");
            Ok(())
        }
        Ok(Err(err)) => Err(ShutdownError::Wait(err)),
        Err(_elapsed) => {
            warn!(
                grace_ms = grace.as_millis() as u64,
                "plugin process did not stop within the grace period, killing it"
            );
            process.kill().await.map_err(ShutdownError::Kill)?;
            Err(ShutdownError::StopTimeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io;
    use std::process::ExitStatus;

    fn exit_status(code: i32) -> ExitStatus {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            ExitStatus::from_raw(code << 8)
        }
        #[cfg(windows)]
        {
            use std::os::windows::process::ExitStatusExt;
            ExitStatus::from_raw(code as u32)
        }
    }

    /// Scriptable stand-in for a real child process.
    struct FakeProcess {
        /// `None` means the process ignores the stop signal forever.
        exits_after: Option<Duration>,
        signal_error: Option<io::ErrorKind>,
        wait_error: Option<io::ErrorKind>,
        kill_error: Option<io::ErrorKind>,
        interrupted: bool,
        killed: bool,
        waited: bool,
    }

    impl FakeProcess {
        fn exiting_after(delay: Duration) -> Self {
            FakeProcess {
                exits_after: Some(delay),
                signal_error: None,
                wait_error: None,
                kill_error: None,
                interrupted: false,
                killed: false,
                waited: false,
            }
        }

        fn ignoring_signals() -> Self {
            let mut fake = Self::exiting_after(Duration::ZERO);
            fake.exits_after = None;
            fake
        }
    }

    #[async_trait]
    impl ProcessHandle for FakeProcess {
        fn id(&self) -> Option<u32> {
            Some(4242)
        }

        fn interrupt(&mut self) -> io::Result<()> {
            if let Some(kind) = self.signal_error {
                return Err(io::Error::new(kind, "signal delivery failed"));
            }
            self.interrupted = true;
            Ok(())
        }

        async fn wait(&mut self) -> io::Result<ExitStatus> {
            self.waited = true;
            if let Some(kind) = self.wait_error {
                return Err(io::Error::new(kind, "wait failed"));
            }
            match self.exits_after {
                Some(delay) => {
                    time::sleep(delay).await;
                    Ok(exit_status(0))
                }
                None => std::future::pending().await,
            }
        }

        async fn kill(&mut self) -> io::Result<()> {
            if let Some(kind) = self.kill_error {
                return Err(io::Error::new(kind, "kill failed"));
            }
            self.killed = true;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cooperative_exit_within_grace_returns_ok() {
        let mut fake = FakeProcess::exiting_after(Duration::from_millis(10));
        stop_process(&mut fake, Duration::from_secs(1)).await.unwrap();
        assert!(fake.interrupted);
        assert!(!fake.killed);
    }

    #[tokio::test(start_paused = true)]
    async fn unresponsive_process_is_killed_after_grace() {
        let mut fake = FakeProcess::ignoring_signals();
        let err = stop_process(&mut fake, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ShutdownError::StopTimeout));
        assert!(fake.interrupted);
        assert!(fake.killed);
    }

    #[tokio::test(start_paused = true)]
    async fn signal_failure_short_circuits() {
        let mut fake = FakeProcess::exiting_after(Duration::ZERO);
        fake.signal_error = Some(io::ErrorKind::NotFound);
        let err = stop_process(&mut fake, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ShutdownError::Signal(_)));
        // neither wait nor kill may run after a delivery failure
        assert!(!fake.waited);
        assert!(!fake.killed);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_failure_is_surfaced() {
        let mut fake = FakeProcess::exiting_after(Duration::ZERO);
        fake.wait_error = Some(io::ErrorKind::Other);
        let err = stop_process(&mut fake, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ShutdownError::Wait(_)));
        assert!(!fake.killed);
    }

    #[tokio::test(start_paused = true)]
    async fn kill_failure_is_distinct_from_timeout() {
        let mut fake = FakeProcess::ignoring_signals();
        fake.kill_error = Some(io::ErrorKind::PermissionDenied);
        let err = stop_process(&mut fake, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ShutdownError::Kill(_)));
    }

    mod managed_close {
        use super::*;
        use crate::channel::ManagedChannel;

        fn managed(fake: FakeProcess) -> ManagedChannel {
            ManagedChannel::new(
                tokio::io::empty(),
                Vec::new(),
                Box::new(fake),
                Duration::from_secs(1),
            )
        }

        #[tokio::test(start_paused = true)]
        async fn managed_channel_debug_names_the_pid() {
            let channel = managed(FakeProcess::exiting_after(Duration::ZERO));
            let rendered = format!("{channel:?}");
            assert!(rendered.contains("ManagedChannel"));
            assert!(rendered.contains("4242"));
            channel.close().await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn close_runs_shutdown_protocol() {
            let channel = managed(FakeProcess::exiting_after(Duration::from_millis(5)));
            channel.close().await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn shutdown_error_wins_over_stream_error() {
            // stream close succeeds here; the protocol's error is the one
            // reported
            let channel = managed(FakeProcess::ignoring_signals());
            let err = channel.close().await.unwrap_err();
            assert!(matches!(err, ShutdownError::StopTimeout));
        }

        #[tokio::test(start_paused = true)]
        async fn stream_error_reported_when_shutdown_succeeds() {
            struct BrokenWriter;

            impl tokio::io::AsyncWrite for BrokenWriter {
                fn poll_write(
                    self: std::pin::Pin<&mut Self>,
                    _cx: &mut std::task::Context<'_>,
                    buf: &[u8],
                ) -> std::task::Poll<io::Result<usize>> {
                    std::task::Poll::Ready(Ok(buf.len()))
                }

                fn poll_flush(
                    self: std::pin::Pin<&mut Self>,
                    _cx: &mut std::task::Context<'_>,
                ) -> std::task::Poll<io::Result<()>> {
                    std::task::Poll::Ready(Ok(()))
                }

                fn poll_shutdown(
                    self: std::pin::Pin<&mut Self>,
                    _cx: &mut std::task::Context<'_>,
                ) -> std::task::Poll<io::Result<()>> {
                    std::task::Poll::Ready(Err(io::Error::new(
                        io::ErrorKind::BrokenPipe,
                        "shutdown failed",
                    )))
                }
            }

            let channel = ManagedChannel::new(
                tokio::io::empty(),
                BrokenWriter,
                Box::new(FakeProcess::exiting_after(Duration::ZERO)),
                Duration::from_secs(1),
            );
            let err = channel.close().await.unwrap_err();
            assert!(matches!(err, ShutdownError::StreamClose(_)));
        }
    }
}
