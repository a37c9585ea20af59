//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::OrderError;
use orchestrator::OrchestratorError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Error returned by the orchestrator.
    Orchestrator(OrchestratorError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Orchestrator(err) => orchestrator_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn orchestrator_error_to_response(err: OrchestratorError) -> (StatusCode, String) {
    let status = match &err {
        OrchestratorError::Order(order_err) => match order_err {
            OrderError::AlreadyPaid | OrderError::Cancelled | OrderError::Fulfilled => {
                StatusCode::CONFLICT
            }
            OrderError::PartsNotSpecified
            | OrderError::PaymentMethodRequired
            | OrderError::NegativeTotal { .. }
            | OrderError::TotalOverflow => StatusCode::BAD_REQUEST,
        },
        OrchestratorError::OrderNotFound(_) | OrchestratorError::PartsNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        OrchestratorError::PaymentFailed(_) => StatusCode::BAD_GATEWAY,
        OrchestratorError::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        OrchestratorError::RepositoryFailure(_) => {
            tracing::error!(error = %err, "internal server error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, err.to_string())
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        ApiError::Orchestrator(err)
    }
}
