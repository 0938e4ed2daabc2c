//! Error types for the executor crate.

use std::path::PathBuf;
use std::time::Duration;

/// Errors that keep a compilation from producing a [`ProcessOutcome`].
///
/// A compiler that runs and exits non-zero is *not* an error here; that is
/// reported as a failed [`press_core::CompileResult`].
///
/// [`ProcessOutcome`]: crate::ProcessOutcome
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExecutorError {
    /// Compiler binary not found at the configured path or in `PATH`.
    #[error("compiler binary not found at {path}")]
    BinaryNotFound { path: PathBuf },

    /// The process exists but could not be started (permissions, resource limits, ...).
    #[error("failed to spawn {program}: {source}")]
    SpawnFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A standard stream was not captured by the spawned child.
    #[error("child {0} is not piped")]
    PipeUnavailable(&'static str),

    /// Reading the artifact from the child's stdout failed midway.
    #[error("failed to read compiler output: {0}")]
    StreamRead(#[source] std::io::Error),

    /// The compiler did not exit within the configured timeout and was killed.
    #[error("compiler did not finish within {}s", .timeout.as_secs_f64())]
    Timeout { timeout: Duration },

    /// Underlying I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
