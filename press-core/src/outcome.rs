use std::fmt;

/// Outcome of one compilation.
///
/// Exactly one variant is produced per request. A failed compilation never
/// carries partial artifact bytes.
#[derive(Clone, PartialEq, Eq)]
pub enum CompileResult {
    /// The compiler exited successfully; `artifact` is everything it wrote to stdout.
    Success { artifact: Vec<u8> },
    /// The compiler exited unsuccessfully; `diagnostics` is its decoded stderr.
    Failure { diagnostics: String },
}

impl CompileResult {
    /// Builds a failure from raw diagnostic bytes, replacing invalid UTF-8 with U+FFFD.
    #[must_use]
    pub fn failure_from_bytes(stderr: &[u8]) -> Self {
        Self::Failure {
            diagnostics: String::from_utf8_lossy(stderr).into_owned(),
        }
    }

    /// Returns `true` for [`CompileResult::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

// Artifacts can be megabytes of PDF; only their size is printed.
impl fmt::Debug for CompileResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { artifact } => f
                .debug_struct("Success")
                .field("artifact_len", &artifact.len())
                .finish(),
            Self::Failure { diagnostics } => f
                .debug_struct("Failure")
                .field("diagnostics", diagnostics)
                .finish(),
        }
    }
}
