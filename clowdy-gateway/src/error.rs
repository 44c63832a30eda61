//! Error types for the gateway crate.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors surfaced while handling a gateway HTTP request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// No project exists for the requested slug.
    #[error("unknown project slug: {0}")]
    UnknownSlug(String),

    /// The project has zero routes registered.
    #[error("project '{0}' has no routes")]
    NoRoutes(String),

    /// No route matched the request's (method, path).
    #[error("no route matches {0} {1}")]
    NoMatch(String, String),

    /// The matched route's function is not active.
    #[error("function is not active")]
    FunctionInactive,

    /// The invoke orchestrator itself failed (as opposed to a clean
    /// function-level error, which is reported inside a 200/shaped body).
    #[error("orchestrator error: {0}")]
    OrchestratorError(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::UnknownSlug(_) | GatewayError::NoRoutes(_) | GatewayError::NoMatch(..) => {
                StatusCode::NOT_FOUND
            }
            GatewayError::FunctionInactive => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::OrchestratorError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_slug_maps_to_404() {
        let resp = GatewayError::UnknownSlug("nope".to_owned()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn function_inactive_maps_to_503() {
        let resp = GatewayError::FunctionInactive.into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn orchestrator_error_maps_to_500() {
        let resp = GatewayError::OrchestratorError("boom".to_owned()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
