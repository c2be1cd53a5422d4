use plugpipe_core::{LaunchError, ShutdownError};

/// Unified error type for plugpipe operations.
///
/// The launcher and the channel return the narrow enums; this exists for
/// callers that funnel both phases through one error path.
#[derive(Debug, thiserror::Error)]
pub enum PlugpipeError {
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
    #[error("unexpected error: {0}")]
    Other(#[from] anyhow::Error),
}
