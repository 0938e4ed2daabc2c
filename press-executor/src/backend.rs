//! Compiler abstraction trait.
//!
//! The HTTP layer depends on this trait only, so it can be driven by a test
//! double or by a different compiler without changing request handling.

use async_trait::async_trait;
use press_core::{CompileRequest, CompileResult};

use crate::ExecutorError;

/// A document compiler.
///
/// Implementations must be `Send + Sync` to be shared across request tasks.
///
/// # Cancel Safety
/// All methods are cancel safe. Dropping a `compile` future terminates any
/// process it started.
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compile one validated request.
    ///
    /// A compiler that runs and rejects the document yields
    /// `Ok(CompileResult::Failure { .. })`, not an error.
    ///
    /// # Errors
    /// Returns [`ExecutorError::BinaryNotFound`] or [`ExecutorError::SpawnFailed`]
    /// if the compiler cannot be started, [`ExecutorError::Timeout`] if it does
    /// not finish in time, and other variants for I/O failures.
    async fn compile(&self, request: &CompileRequest) -> Result<CompileResult, ExecutorError>;

    /// Check if the compiler is available.
    ///
    /// # Errors
    /// Returns [`ExecutorError::BinaryNotFound`] if the environment is not ready.
    async fn health_check(&self) -> Result<(), ExecutorError>;
}
