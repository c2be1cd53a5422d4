use std::fmt;
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::sync::Mutex;

/// Destination for a plugin's diagnostic (stderr) output.
///
/// Cloneable handle around a shared writer; the launcher forwards the
/// child's stderr into it for the lifetime of the process.
pub struct DiagnosticSink(Arc<Mutex<Box<dyn AsyncWrite + Unpin + Sync + Send>>>);

impl Clone for DiagnosticSink {
    fn clone(&self) -> Self {
        DiagnosticSink(self.0.clone())
    }
}

impl fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DiagnosticSink")
    }
}

impl DiagnosticSink {
    pub fn new(writer: Box<dyn AsyncWrite + Unpin + Sync + Send>) -> DiagnosticSink {
        DiagnosticSink(Arc::new(Mutex::new(writer)))
    }

    /// Forwards plugin diagnostics to this process's own stderr.
    pub fn stderr() -> DiagnosticSink {
        DiagnosticSink::new(Box::new(tokio::io::stderr()))
    }

    /// Discards plugin diagnostics.
    pub fn null() -> DiagnosticSink {
        DiagnosticSink::new(Box::new(tokio::io::sink()))
    }

    pub fn inner(&self) -> Arc<Mutex<Box<dyn AsyncWrite + Unpin + Sync + Send>>> {
        self.0.clone()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        DiagnosticSink::stderr()
    }
}
