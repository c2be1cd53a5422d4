//! Role adapters binding a byte channel to either end of the host/plugin
//! relationship.
//!
//! A [`Provider`] serves an API over its channel; a [`Consumer`] calls one.
//! Either role can sit on either side of the process boundary: code running
//! as the plugin wraps its own stdin/stdout ([`new_provider`] /
//! [`new_consumer`]), while the host launches the plugin and gets the
//! opposite end ([`start_provider`] / [`start_consumer`]). The protocol
//! endpoint itself is supplied by the caller; these adapters only hand it
//! the channel.

use crate::launcher;
use plugpipe_core::{DuplexChannel, LaunchError, LaunchSpec, ManagedChannel};
use tokio::io::{Stdin, Stdout};

/// The current process's own stdin/stdout as one duplex channel.
pub type StdioChannel = DuplexChannel<Stdin, Stdout>;

fn stdio_channel() -> StdioChannel {
    DuplexChannel::new(tokio::io::stdin(), tokio::io::stdout())
}

/// The serving end of a plugin API.
pub struct Provider<C> {
    channel: C,
}

/// The calling end of a plugin API.
pub struct Consumer<C> {
    channel: C,
}

/// For code running as the plugin: serve an API to the host over this
/// process's stdin/stdout.
pub fn new_provider() -> Provider<StdioChannel> {
    Provider::new(stdio_channel())
}

/// For code running as the plugin: consume an API the host provides over
/// this process's stdin/stdout.
pub fn new_consumer() -> Consumer<StdioChannel> {
    Consumer::new(stdio_channel())
}

/// Launches a plugin that provides an API; the host gets the consumer end.
/// Closing the returned channel shuts the plugin down.
pub async fn start_provider(spec: LaunchSpec) -> Result<Consumer<ManagedChannel>, LaunchError> {
    Ok(Consumer::new(launcher::start(spec).await?))
}

/// Launches a plugin that consumes an API this host provides; the host
/// gets the provider end. Closing the returned channel shuts the plugin
/// down.
pub async fn start_consumer(spec: LaunchSpec) -> Result<Provider<ManagedChannel>, LaunchError> {
    Ok(Provider::new(launcher::start(spec).await?))
}

impl<C> Provider<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Hands the channel to a server endpoint of the caller's protocol
    /// layer and runs it to completion.
    pub async fn serve_with<F, Fut, T>(self, attach: F) -> T
    where
        F: FnOnce(C) -> Fut,
        Fut: Future<Output = T>,
    {
        attach(self.channel).await
    }

    pub fn into_channel(self) -> C {
        self.channel
    }
}

impl<C> Consumer<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Hands the channel to a client endpoint of the caller's protocol
    /// layer.
    pub async fn connect_with<F, Fut, T>(self, attach: F) -> T
    where
        F: FnOnce(C) -> Fut,
        Fut: Future<Output = T>,
    {
        attach(self.channel).await
    }

    pub fn into_channel(self) -> C {
        self.channel
    }
}
