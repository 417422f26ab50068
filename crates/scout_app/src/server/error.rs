use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use scout_core::ValidationError;
use scout_engine::{ApiError, FailureKind};
use scout_logging::scout_error;

use super::types::ErrorBody;

/// Structured error returned by every route.
#[derive(Debug)]
pub struct RouteError {
    status: StatusCode,
    body: ErrorBody,
}

impl RouteError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: code.to_string(),
                message: message.into(),
                field: None,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }
}

impl From<ValidationError> for RouteError {
    fn from(err: ValidationError) -> Self {
        let mut route_error = Self::new(StatusCode::BAD_REQUEST, "invalid_parameter", err.to_string());
        route_error.body.field = Some(err.field().to_string());
        route_error
    }
}

impl From<ApiError> for RouteError {
    fn from(err: ApiError) -> Self {
        let (status, code) = match err.kind {
            FailureKind::Validation => (StatusCode::BAD_REQUEST, "upstream_rejected"),
            FailureKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            FailureKind::Upstream { .. } => (StatusCode::BAD_GATEWAY, "upstream_error"),
            FailureKind::Timeout => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            FailureKind::Unknown => (StatusCode::INTERNAL_SERVER_ERROR, "unknown_error"),
        };
        if status.is_server_error() {
            scout_error!("upstream call failed: {}", err);
        }
        Self::new(status, code, err.message)
    }
}

impl From<JsonRejection> for RouteError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for RouteError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
