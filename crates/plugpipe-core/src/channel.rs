use crate::error::ShutdownError;
use crate::process::ProcessHandle;
use crate::shutdown::stop_process;
use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tracing::debug;

pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// One bidirectional byte channel composed from a readable and a writable
/// stream. Reads and writes pass straight through; no buffering, no
/// framing. Message boundaries belong to whatever protocol layer sits on
/// top.
pub struct DuplexChannel<R, W> {
    reader: Option<R>,
    writer: W,
}

impl<R, W> DuplexChannel<R, W>
where
    R: AsyncRead + Send + Unpin,
    W: AsyncWrite + Send + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: Some(reader),
            writer,
        }
    }

    /// Closes both sides: the read side is released first, then the write
    /// side is shut down. Calling this twice is safe; the second call has
    /// nothing left to release and reports only the write-side shutdown
    /// result.
    pub async fn close(&mut self) -> Result<(), ShutdownError> {
        self.reader.take();
        self.writer
            .shutdown()
            .await
            .map_err(ShutdownError::StreamClose)
    }
}

impl<R, W> AsyncRead for DuplexChannel<R, W>
where
    R: AsyncRead + Send + Unpin,
    W: Send + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut self.get_mut().reader {
            Some(reader) => Pin::new(reader).poll_read(cx, buf),
            // read side already closed: EOF
            None => Poll::Ready(Ok(())),
        }
    }
}

impl<R, W> AsyncWrite for DuplexChannel<R, W>
where
    R: Send + Unpin,
    W: AsyncWrite + Send + Unpin,
{
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().writer).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().writer).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().writer).poll_shutdown(cx)
    }
}

/// A duplex channel bound to the plugin process behind it.
///
/// Closing a `ManagedChannel` does not merely close the streams: it runs
/// the graceful-shutdown protocol, so once `close` returns the process is
/// guaranteed to be no longer running (exited or killed). `close` consumes
/// the channel; dropping one without closing it leaves the plugin running.
pub struct ManagedChannel {
    streams: DuplexChannel<BoxedReader, BoxedWriter>,
    process: Box<dyn ProcessHandle>,
    grace: Duration,
}

impl ManagedChannel {
    pub fn new<R, W>(
        reader: R,
        writer: W,
        process: Box<dyn ProcessHandle>,
        grace: Duration,
    ) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            streams: DuplexChannel::new(Box::new(reader) as BoxedReader, Box::new(writer) as BoxedWriter),
            process,
            grace,
        }
    }

    /// OS process id of the plugin, while it is still attached.
    pub fn pid(&self) -> Option<u32> {
        self.process.id()
    }

    /// Closes the streams, then stops the plugin process.
    ///
    /// The write side is closed before the process is signalled so that a
    /// cooperating plugin observes end-of-input promptly, which is usually
    /// what triggers its own exit. Errors are aggregated last-failure-wins:
    /// a stream-close error is reported only if the shutdown protocol
    /// itself succeeds.
    pub async fn close(self) -> Result<(), ShutdownError> {
        let ManagedChannel {
            mut streams,
            mut process,
            grace,
        } = self;

        let mut failure = None;
        if let Err(err) = streams.close().await {
            debug!(error = %err, "error closing plugin channel streams");
            failure = Some(err);
        }
        // release the pipe fds before asking the process to stop
        drop(streams);

        if let Err(err) = stop_process(process.as_mut(), grace).await {
            failure = Some(err);
        }

        match failure {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

impl fmt::Debug for ManagedChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedChannel")
            .field("pid", &self.pid())
            .field("grace", &self.grace)
            .finish_non_exhaustive()
    }
}

impl AsyncRead for ManagedChannel {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().streams).poll_read(cx, buf)
    }
}

impl AsyncWrite for ManagedChannel {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().streams).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().streams).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().streams).poll_shutdown(cx)
    }
}
