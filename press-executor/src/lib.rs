//! Child-process execution for the press compilation service.
//!
//! Spawns the Typst compiler per request, feeds it the document on stdin,
//! drains stdout and stderr concurrently, and maps the exit status to a
//! [`press_core::CompileResult`].

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod bridge;
pub mod config;
pub mod digest;
pub mod error;
pub mod typst;

pub use backend::Compiler;
pub use bridge::{Invocation, ProcessBridge, ProcessOutcome};
pub use config::{CompilerConfig, DiagnosticFormat, ParseDiagnosticFormatError};
pub use digest::ArtifactDigest;
pub use error::ExecutorError;
pub use typst::TypstCompiler;
