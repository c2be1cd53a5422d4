//! Plugpipe - host/plugin communication over a subprocess's stdio
//!
//! A host launches a plugin executable and talks to it over the plugin's
//! standard input/output, composed into one bidirectional byte channel.
//! Closing the channel runs a graceful-shutdown protocol: cooperative
//! signal, bounded wait, forced kill. What flows over the channel is up to
//! the protocol layer the caller attaches; this crate imposes no framing
//! or encoding.
//!
//! Host side:
//!
//! ```no_run
//! use plugpipe::{LaunchSpec, launcher};
//!
//! # async fn run() -> Result<(), plugpipe::PlugpipeError> {
//! let spec = LaunchSpec::builder()
//!     .command("./my-plugin")
//!     .build()
//!     .map_err(anyhow::Error::from)?;
//! let channel = launcher::start(spec).await?;
//! // hand `channel` to an RPC/codec layer, then:
//! channel.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Plugin side: [`new_provider`] / [`new_consumer`] wrap the process's own
//! stdin/stdout.

mod error;
pub mod launcher;
mod process;
mod role;

pub use error::PlugpipeError;
pub use plugpipe_core::{
    DEFAULT_GRACE_PERIOD, DiagnosticSink, DuplexChannel, LaunchError, LaunchSpec,
    LaunchSpecBuilder, ManagedChannel, ProcessHandle, ShutdownError,
};
pub use process::ChildHandle;
pub use role::{
    Consumer, Provider, StdioChannel, new_consumer, new_provider, start_consumer, start_provider,
};
