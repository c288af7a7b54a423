use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use shopledger_core::DomainError;
use shopledger_store::{OperationError, StoreError};

pub fn operation_error_to_response(err: OperationError) -> axum::response::Response {
    match err {
        OperationError::Domain(err) => domain_error_to_response(err),
        OperationError::Store(err) => store_error_to_response(err),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        err @ DomainError::InsufficientStock { .. } => {
            json_error(StatusCode::BAD_REQUEST, "insufficient_stock", err.to_string())
        }
        err @ DomainError::NotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthorized => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
