//! HTTP gateway for the press Typst compilation service.
//!
//! Exposes `POST /api/typst/compile`, which validates a JSON body, runs the
//! compiler once, and answers with the PDF or the compiler's diagnostics.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod routes;
