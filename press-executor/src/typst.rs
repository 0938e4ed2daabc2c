//! Typst compiler backend.
//!
//! Runs `typst compile - -`, which reads the document from stdin and writes
//! the PDF to stdout, through a [`ProcessBridge`].

use std::path::Path;
use std::time::Instant;

use async_trait::async_trait;
use press_core::{CompileRequest, CompileResult};

use crate::backend::Compiler;
use crate::bridge::{Invocation, ProcessBridge};
use crate::digest::ArtifactDigest;
use crate::{CompilerConfig, ExecutorError};

/// Typst compiler backend.
#[derive(Debug, Clone)]
pub struct TypstCompiler {
    config: CompilerConfig,
    bridge: ProcessBridge,
}

impl TypstCompiler {
    /// Create a backend from the given configuration.
    #[must_use]
    pub fn new(config: CompilerConfig) -> Self {
        let bridge = ProcessBridge::with_timeout(config.timeout);
        Self { config, bridge }
    }

    /// Create a backend running `typst` from `PATH` with default settings.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CompilerConfig::default())
    }

    /// The configuration this backend was built with.
    #[must_use]
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Build the command line for `request`.
    ///
    /// Shape: `<program> [global args] compile - - [--diagnostic-format F]
    /// [--jobs N] [--input key=value]...`
    #[must_use]
    pub fn invocation(&self, request: &CompileRequest) -> Invocation {
        let mut invocation = Invocation::new(&self.config.program)
            .args(self.config.global_args.iter().cloned())
            .args(["compile", "-", "-"]);

        if let Some(format) = self.config.diagnostic_format {
            invocation = invocation.arg("--diagnostic-format").arg(format.as_str());
        }
        if let Some(jobs) = request.jobs {
            invocation = invocation.arg("--jobs").arg(jobs.to_string());
        }
        for (key, value) in &request.variables {
            invocation = invocation.arg("--input").arg(format!("{key}={value}"));
        }
        invocation
    }
}

#[async_trait]
impl Compiler for TypstCompiler {
    async fn compile(&self, request: &CompileRequest) -> Result<CompileResult, ExecutorError> {
        let invocation = self.invocation(request);
        let started = Instant::now();

        tracing::info!(
            program = %invocation.program.display(),
            jobs = ?request.jobs.map(press_core::Jobs::get),
            variables = request.variables.len(),
            template_bytes = request.template.len(),
            "starting typst compilation"
        );
        tracing::debug!(args = ?invocation.args, "typst command line");

        let outcome = self.bridge.run(&invocation, request.template.as_bytes()).await?;
        let elapsed_ms = started.elapsed().as_millis();

        if outcome.success() {
            tracing::info!(
                artifact_bytes = outcome.stdout.len(),
                artifact_sha256 = %ArtifactDigest::of(&outcome.stdout),
                elapsed_ms,
                "typst compilation succeeded"
            );
            Ok(CompileResult::Success { artifact: outcome.stdout })
        } else {
            tracing::info!(
                exit_code = ?outcome.exit_code,
                stderr_bytes = outcome.stderr.len(),
                elapsed_ms,
                "typst compilation failed"
            );
            Ok(CompileResult::failure_from_bytes(&outcome.stderr))
        }
    }

    async fn health_check(&self) -> Result<(), ExecutorError> {
        which_binary(&self.config.program)
    }
}

/// Verify a binary exists either at the given path or in `PATH`.
fn which_binary(path: &Path) -> Result<(), ExecutorError> {
    // Anything with a directory component is used as-is by the OS.
    if path.components().count() > 1 || path.is_absolute() {
        if path.is_file() {
            return Ok(());
        }
        return Err(ExecutorError::BinaryNotFound { path: path.to_owned() });
    }

    let found = std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(path).is_file()))
        .unwrap_or(false);

    if found {
        Ok(())
    } else {
        Err(ExecutorError::BinaryNotFound { path: path.to_owned() })
    }
}
