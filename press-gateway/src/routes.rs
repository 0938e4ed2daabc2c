//! Axum route handlers for the press gateway API.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use press_core::{CompileRequest, CompileResult, CoreError, Jobs, Variables};
use press_executor::Compiler;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::GatewayError;

/// Content type of a successful compile response.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

// ── Shared state ─────────────────────────────────────────────────────────────

/// The compiler shared by all request tasks. Immutable; each call spawns its own process.
pub type SharedCompiler = Arc<dyn Compiler>;

// ── Request types ────────────────────────────────────────────────────────────

/// JSON body of `POST /api/typst/compile`, before validation.
///
/// `jobs` is read as a signed integer so that zero and negative values reach
/// validation and get a precise message instead of a generic parse error.
#[derive(Debug, Deserialize)]
pub struct CompileBody {
    pub template: String,
    #[serde(default)]
    pub jobs: Option<i64>,
    #[serde(default)]
    pub variables: Option<BTreeMap<String, String>>,
}

impl CompileBody {
    /// Validate the body into a [`CompileRequest`].
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidJobs`] for `jobs < 1` and
    /// [`CoreError::InvalidVariableKey`] for an empty key or one containing `=`.
    pub fn into_request(self) -> Result<CompileRequest, CoreError> {
        let variables = match self.variables {
            Some(map) => Variables::try_from(map)?,
            None => Variables::new(),
        };
        let mut request = CompileRequest::new(self.template).with_variables(variables);
        request.jobs = self.jobs.map(Jobs::new).transpose()?;
        Ok(request)
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router around `compiler`, accepting bodies up to
/// `max_body_bytes`.
pub fn create_router(compiler: SharedCompiler, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/typst/compile", post(compile_document))
        .route("/health", get(health))
        .with_state(compiler)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health`: liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

/// `POST /api/typst/compile`: compile a template to PDF.
///
/// Answers `200` with the PDF, or `500` with the compiler's diagnostics as
/// plain text. The body is fully validated before the compiler is started.
///
/// # Errors
/// Returns [`GatewayError::Body`] or [`GatewayError::Validation`] for bad
/// input, and [`GatewayError::Executor`] if the compiler could not be run.
pub async fn compile_document(
    State(compiler): State<SharedCompiler>,
    body: Result<Json<CompileBody>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(body) = body?;
    let request = body.into_request()?;

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("compile", %request_id);
    let result = compiler.compile(&request).instrument(span).await?;

    Ok(compile_response(result))
}

/// Convert a compile result to its HTTP response.
#[must_use]
pub fn compile_response(result: CompileResult) -> Response {
    match result {
        CompileResult::Success { artifact } => {
            ([(header::CONTENT_TYPE, PDF_CONTENT_TYPE)], artifact).into_response()
        }
        CompileResult::Failure { diagnostics } => {
            (StatusCode::INTERNAL_SERVER_ERROR, diagnostics).into_response()
        }
    }
}
