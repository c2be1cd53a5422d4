use crate::shutdown::DEFAULT_GRACE_PERIOD;
use crate::stdio::DiagnosticSink;
use derive_builder::Builder;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Everything needed to launch one plugin process.
///
/// Arguments, environment, and working directory are passed through to
/// process creation unmodified; resolution policy belongs to the caller.
/// The spec is consumed once by `plugpipe::launcher::start`.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into, strip_option))]
pub struct LaunchSpec {
    /// Path of the plugin executable.
    pub command: String,

    #[builder(default)]
    pub args: Vec<String>,

    #[builder(default)]
    pub env: HashMap<String, String>,

    #[builder(default)]
    pub working_directory: Option<PathBuf>,

    /// Where the plugin's stderr goes.
    #[builder(default)]
    pub diagnostics: DiagnosticSink,

    /// How long the shutdown protocol waits for a cooperative exit
    /// before killing the plugin.
    #[builder(default = "DEFAULT_GRACE_PERIOD")]
    pub grace_period: Duration,
}

impl LaunchSpec {
    pub fn builder() -> LaunchSpecBuilder {
        LaunchSpecBuilder::default()
    }
}
