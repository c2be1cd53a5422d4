use std::io;
use thiserror::Error;

/// Errors from launching a plugin process and wiring up its pipes.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The spawned process did not expose one of its standard pipes.
    #[error("plugin process did not expose a {side} pipe")]
    PipeUnavailable { side: &'static str },

    /// Process creation itself failed (missing executable, permissions, ...).
    #[error("failed to start plugin process `{command}`")]
    Start {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Errors from closing a managed channel and stopping its plugin process.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Closing the channel's write stream failed.
    #[error("failed to close the channel's write stream")]
    StreamClose(#[source] io::Error),

    /// The cooperative stop signal could not be delivered.
    #[error("failed to signal plugin process to stop")]
    Signal(#[source] io::Error),

    /// Waiting on the process failed (the wait itself, not a non-zero exit).
    #[error("failed waiting for plugin process to exit")]
    Wait(#[source] io::Error),

    /// Forced kill after the grace period failed.
    #[error("error killing plugin process after timeout")]
    Kill(#[source] io::Error),

    /// The process ignored the stop signal and was killed. The kill
    /// succeeded; this is surfaced so callers know the plugin did not
    /// exit cooperatively.
    #[error("plugin process killed after timeout waiting for process to stop")]
    StopTimeout,
}
