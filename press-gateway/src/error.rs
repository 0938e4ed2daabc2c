//! Error types for the gateway crate.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use press_core::CoreError;
use press_executor::ExecutorError;
use serde_json::json;

/// Errors that can occur during gateway request handling.
///
/// A compilation the compiler rejects is not one of these; it is answered
/// with the compiler's diagnostics by the route handler.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The request body is not JSON of the expected shape.
    #[error("invalid request body: {}", .0.body_text())]
    Body(#[from] JsonRejection),

    /// A field parsed but violates its constraints.
    #[error("invalid request: {0}")]
    Validation(#[from] CoreError),

    /// An error propagated from the executor layer.
    #[error("executor error: {0}")]
    Executor(#[from] ExecutorError),
}

impl GatewayError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            // A well-formed body with the wrong shape is a plain bad request here.
            GatewayError::Body(rejection)
                if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY =>
            {
                StatusCode::BAD_REQUEST
            }
            GatewayError::Body(rejection) => rejection.status(),
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Executor(err) => match err {
                ExecutorError::BinaryNotFound { .. } | ExecutorError::SpawnFailed { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                ExecutorError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, %status, "compile request failed");
        } else {
            tracing::debug!(error = %self, %status, "compile request rejected");
        }
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn gateway_error_validation_maps_to_400() {
        let err = GatewayError::Validation(CoreError::InvalidJobs { value: 0 });
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn gateway_error_spawn_failures_map_to_502() {
        let missing = GatewayError::Executor(ExecutorError::BinaryNotFound { path: "typst".into() });
        assert_eq!(missing.into_response().status(), StatusCode::BAD_GATEWAY);

        let denied = GatewayError::Executor(ExecutorError::SpawnFailed {
            program: "/opt/typst".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });
        assert_eq!(denied.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn gateway_error_timeout_maps_to_504() {
        let err = GatewayError::Executor(ExecutorError::Timeout { timeout: Duration::from_secs(60) });
        assert_eq!(err.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn gateway_error_other_executor_errors_map_to_500() {
        let err = GatewayError::Executor(ExecutorError::PipeUnavailable("stdout"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "Executor I/O errors must map to 500"
        );
    }

    #[test]
    fn gateway_error_display_includes_message() {
        let err = GatewayError::Validation(CoreError::InvalidVariableKey {
            key: "a=b".to_owned(),
            reason: "key must not contain '='",
        });
        let msg = err.to_string();
        assert!(msg.contains("a=b"), "Display must include the offending key");
    }
}
