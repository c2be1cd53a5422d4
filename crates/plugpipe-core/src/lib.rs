//! Plugpipe core - platform-independent channel and process abstractions
//!
//! This crate provides the configuration, error types, the process handle
//! trait, the duplex byte channel, and the graceful-shutdown protocol that
//! the tokio-backed `plugpipe` crate builds on. Nothing here spawns a real
//! process; the `ProcessHandle` trait is the seam where the launcher (or a
//! test fake) plugs in.

mod channel;
mod config;
mod error;
mod process;
mod shutdown;
mod stdio;

pub use channel::*;
pub use config::*;
pub use error::*;
pub use process::*;
pub use shutdown::*;
pub use stdio::*;
