//! HTTP error mapping.

use crate::types::PipelineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            // A failed model invocation yields one clear failure response,
            // never a partial report.
            AppError::Pipeline(PipelineError::Model(msg)) => {
                error!(%msg, "Model invocation failed");
                StatusCode::BAD_GATEWAY
            }
            AppError::Pipeline(PipelineError::TurnLimit(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_maps_to_bad_gateway() {
        let response =
            AppError::Pipeline(PipelineError::Model("auth failed".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_turn_limit_maps_to_internal_error() {
        let response = AppError::Pipeline(PipelineError::TurnLimit(10)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
