use async_trait::async_trait;
use plugpipe_core::ProcessHandle;
use std::io;
use std::process::ExitStatus;
use tokio::process::Child;

/// `ProcessHandle` over a spawned tokio [`Child`].
pub struct ChildHandle {
    child: Child,
}

impl ChildHandle {
    pub fn new(child: Child) -> Self {
        Self { child }
    }
}

#[async_trait]
impl ProcessHandle for ChildHandle {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    #[cfg(unix)]
    fn interrupt(&mut self) -> io::Result<()> {
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        let pid = self.child.id().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "plugin process has already been reaped",
            )
        })?;
        signal::kill(Pid::from_raw(pid as i32), Signal::SIGINT).map_err(io::Error::from)
    }

    // No cooperative interrupt on this platform; degrade to an immediate
    // kill request and let the shutdown protocol's wait pick up the exit.
    #[cfg(not(unix))]
    fn interrupt(&mut self) -> io::Result<()> {
        self.child.start_kill()
    }

    async fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait().await
    }

    async fn kill(&mut self) -> io::Result<()> {
        self.child.kill().await
    }
}
