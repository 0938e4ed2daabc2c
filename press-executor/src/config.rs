//! Compiler invocation settings.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default upper bound on a single compilation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// How the compiler formats its diagnostics on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticFormat {
    /// Multi-line, source-annotated output.
    Human,
    /// One line per diagnostic.
    Short,
}

impl DiagnosticFormat {
    /// The value passed to `--diagnostic-format`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Short => "short",
        }
    }
}

impl fmt::Display for DiagnosticFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`DiagnosticFormat`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown diagnostic format '{0}': expected 'human' or 'short'")]
pub struct ParseDiagnosticFormatError(pub String);

impl FromStr for DiagnosticFormat {
    type Err = ParseDiagnosticFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "short" => Ok(Self::Short),
            _ => Err(ParseDiagnosticFormatError(s.to_owned())),
        }
    }
}

/// Configuration for running the Typst compiler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct CompilerConfig {
    /// Path to the compiler, or a bare name looked up in `PATH`.
    pub program: PathBuf,

    /// Arguments placed before the `compile` subcommand, e.g. `--color never`.
    pub global_args: Vec<String>,

    /// Passed as `--diagnostic-format` when set.
    pub diagnostic_format: Option<DiagnosticFormat>,

    /// Upper bound on one compilation; the child is killed when it elapses.
    pub timeout: Duration,
}

impl CompilerConfig {
    /// Create a config for `program` with no extra arguments and the default timeout.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            global_args: Vec::new(),
            diagnostic_format: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Default for CompilerConfig {
    /// `typst` from `PATH`.
    fn default() -> Self {
        Self::new("typst")
    }
}
