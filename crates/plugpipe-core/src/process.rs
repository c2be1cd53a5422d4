use async_trait::async_trait;
use std::io;
use std::process::ExitStatus;

/// Capability trait over a live OS process.
///
/// This is the seam between the shutdown protocol and the concrete process
/// type: production code wraps a tokio `Child`, tests substitute a fake.
/// Exactly one `ManagedChannel` owns a given handle, and the shutdown
/// protocol is the sole consumer of `wait`; nothing else may race it.
#[async_trait]
pub trait ProcessHandle: Send {
    /// OS process id, `None` once the process has been reaped.
    fn id(&self) -> Option<u32>;

    /// Requests cooperative termination (SIGINT on Unix). On platforms
    /// without a cooperative interrupt this degrades to an immediate kill
    /// request.
    fn interrupt(&mut self) -> io::Result<()>;

    /// Blocks until the process has exited and returns its exit status.
    /// A non-zero exit is a status, not an error; `Err` means the wait
    /// itself failed.
    async fn wait(&mut self) -> io::Result<ExitStatus>;

    /// Forces the process to exit and reaps it.
    async fn kill(&mut self) -> io::Result<()>;
}
