//! Process bridge: runs one child process with all three standard streams piped.
//!
//! The child's stdout and stderr are drained concurrently with each other,
//! with the write of its input, and with the wait for its exit. A pipe has a
//! bounded kernel buffer, so reading the streams one after the other lets a
//! child that fills the unread pipe block forever while the parent waits on
//! the other one.
//!
//! This module knows nothing about Typst or HTTP: it takes a program, its
//! arguments and the bytes for stdin, and returns what the process produced.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command};

use crate::config::DEFAULT_TIMEOUT;
use crate::ExecutorError;

/// A fully formed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute, resolved through `PATH` when it is a bare name.
    pub program: PathBuf,
    /// Arguments, in order, excluding the program itself.
    pub args: Vec<String>,
}

impl Invocation {
    /// Start an invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), args: Vec::new() }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Everything a terminated child produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code, or `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Complete stdout.
    pub stdout: Vec<u8>,
    /// Stderr, complete unless reading it failed.
    pub stderr: Vec<u8>,
}

impl ProcessOutcome {
    /// Returns `true` only for exit code 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs child processes with piped stdio under a timeout.
///
/// The bridge holds no per-process state; one instance serves any number of
/// concurrent calls to [`ProcessBridge::run`].
///
/// # Cancel Safety
/// Cancel safe. Dropping the future kills the child via `kill_on_drop`.
#[derive(Debug, Clone, Copy)]
pub struct ProcessBridge {
    timeout: Duration,
}

impl ProcessBridge {
    /// Create a bridge with the default 60 second timeout.
    #[must_use]
    pub fn new() -> Self {
        Self { timeout: DEFAULT_TIMEOUT }
    }

    /// Create a bridge with a custom timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// The per-run timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `invocation`, feeding `input` to its stdin, and collect its output.
    ///
    /// A failed write to stdin (typically a broken pipe because the child
    /// exited without reading) is logged and otherwise ignored; the outcome is
    /// judged by exit status alone. A failed read of stderr keeps whatever was
    /// read. A failed read of stdout is an error, because the artifact would be
    /// truncated.
    ///
    /// # Errors
    /// Returns [`ExecutorError::BinaryNotFound`] if the program does not exist.
    /// Returns [`ExecutorError::SpawnFailed`] if it exists but cannot be started.
    /// Returns [`ExecutorError::Timeout`] if it outlives the timeout; the child is killed.
    /// Returns [`ExecutorError::StreamRead`] if stdout cannot be read to the end.
    /// Returns [`ExecutorError::Io`] if waiting for the child fails.
    pub async fn run(
        &self,
        invocation: &Invocation,
        input: &[u8],
    ) -> Result<ProcessOutcome, ExecutorError> {
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&invocation.program, e))?;

        tracing::debug!(
            program = %invocation.program.display(),
            pid = ?child.id(),
            input_bytes = input.len(),
            "child spawned"
        );

        let stdin = child.stdin.take().ok_or(ExecutorError::PipeUnavailable("stdin"))?;
        let stdout = child.stdout.take().ok_or(ExecutorError::PipeUnavailable("stdout"))?;
        let stderr = child.stderr.take().ok_or(ExecutorError::PipeUnavailable("stderr"))?;

        let joined = tokio::time::timeout(self.timeout, async {
            tokio::join!(feed(stdin, input), drain(stdout), drain(stderr), child.wait())
        })
        .await;

        // On timeout the joined future has been dropped, closing all three pipes.
        let Ok((fed, stdout, stderr, status)) = joined else {
            tracing::warn!(
                program = %invocation.program.display(),
                timeout_ms = self.timeout.as_millis(),
                "child timed out, killing"
            );
            kill(&mut child).await;
            return Err(ExecutorError::Timeout { timeout: self.timeout });
        };

        let status: ExitStatus = status?;

        if let Err(e) = fed {
            tracing::warn!(error = %e, "writing child stdin failed");
        }
        if let Some(e) = stderr.error {
            tracing::warn!(error = %e, bytes = stderr.bytes.len(), "reading child stderr failed");
        }
        if let Some(e) = stdout.error {
            return Err(ExecutorError::StreamRead(e));
        }

        tracing::debug!(
            exit_code = ?status.code(),
            stdout_bytes = stdout.bytes.len(),
            stderr_bytes = stderr.bytes.len(),
            "child exited"
        );

        Ok(ProcessOutcome {
            exit_code: status.code(),
            stdout: stdout.bytes,
            stderr: stderr.bytes,
        })
    }
}

impl Default for ProcessBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Bytes read from a stream, plus the error that ended the read early, if any.
struct Drained {
    bytes: Vec<u8>,
    error: Option<io::Error>,
}

async fn drain<R: AsyncRead + Unpin>(mut reader: R) -> Drained {
    let mut bytes = Vec::new();
    // read_to_end keeps everything read before an error.
    let error = reader.read_to_end(&mut bytes).await.err();
    Drained { bytes, error }
}

/// Write all of `input`, then close the pipe so the child sees end-of-input.
async fn feed<W: AsyncWrite + Unpin>(mut writer: W, input: &[u8]) -> io::Result<()> {
    writer.write_all(input).await?;
    writer.shutdown().await
    // `writer` drops here, closing the pipe even if shutdown was a no-op.
}

async fn kill(child: &mut Child) {
    if let Err(e) = child.kill().await {
        tracing::warn!(error = %e, "failed to kill child");
    }
}

fn spawn_error(program: &Path, error: io::Error) -> ExecutorError {
    if error.kind() == io::ErrorKind::NotFound {
        ExecutorError::BinaryNotFound { path: program.to_owned() }
    } else {
        ExecutorError::SpawnFailed { program: program.to_owned(), source: error }
    }
}
