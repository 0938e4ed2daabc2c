//! Core types for the press Typst compilation service.
//!
//! Defines the validated compile request, its job count and input bindings,
//! and the two-variant compile result handed back to the HTTP layer.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod outcome;
pub mod request;

pub use error::CoreError;
pub use outcome::CompileResult;
pub use request::{CompileRequest, Jobs, Variables};
