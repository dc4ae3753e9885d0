//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, OrderError};
use scheduling::SchedulingError;

use crate::routes::slots::SlotCheckResponse;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(DomainError::SlotRejected { reason, suggestion }) => {
                let body = SlotCheckResponse::rejected(reason, suggestion);
                return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
            }
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        let body = serde_json::json!({ "ok": false, "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match &err {
        DomainError::Order(order_err) => match order_err {
            OrderError::NotFound(_) => (StatusCode::NOT_FOUND, "Order not found".to_string()),
            OrderError::IllegalTransition { .. }
            | OrderError::EditWindowClosed(_)
            | OrderError::CancelWindowClosed(_) => (StatusCode::BAD_REQUEST, order_err.to_string()),
            OrderError::ConcurrencyConflict { .. } | OrderError::AlreadyExists(_) => {
                (StatusCode::CONFLICT, order_err.to_string())
            }
        },
        DomainError::CustomerNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        DomainError::PaymentTokenRequired | DomainError::PaymentRequired => {
            (StatusCode::PAYMENT_REQUIRED, err.to_string())
        }
        DomainError::Payment(_)
        | DomainError::InvalidDeliverySlot(_)
        | DomainError::MissingField(_)
        | DomainError::TierRequired
        | DomainError::SlotRejected { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        DomainError::Scheduling(SchedulingError::SearchExhausted { .. })
        | DomainError::Scheduling(SchedulingError::InvalidRules(_)) => {
            tracing::error!(error = %err, "internal server error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}
