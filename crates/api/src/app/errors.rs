use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use faishion_core::DomainError;
use faishion_infra::QnaError;

pub fn qna_error_to_response(err: QnaError) -> axum::response::Response {
    let status = status_for(&err);
    match err {
        QnaError::Validation(msg) => json_error(status, "validation_error", msg),
        e @ QnaError::Unauthenticated => json_error(status, "unauthenticated", e.to_string()),
        QnaError::Forbidden(msg) => json_error(status, "forbidden", msg),
        e @ QnaError::NotFound(_) => json_error(status, "not_found", e.to_string()),
        QnaError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(status, "store_error", e.to_string())
        }
    }
}

/// Plain-text variant for the endpoints that answer with a message string.
pub fn qna_error_to_text(err: QnaError, context: &str) -> axum::response::Response {
    let status = status_for(&err);
    let body = match err {
        QnaError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            format!("{context}: {e}")
        }
        other => other.to_string(),
    };
    (status, body).into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
    }
}

/// Malformed or incomplete JSON body, keeping axum's status (400/415/422).
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(rejection.status(), "invalid_body", rejection.body_text())
}

pub fn text_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, message.into()).into_response()
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

fn status_for(err: &QnaError) -> StatusCode {
    match err {
        QnaError::Validation(_) => StatusCode::BAD_REQUEST,
        QnaError::Unauthenticated => StatusCode::UNAUTHORIZED,
        QnaError::Forbidden(_) => StatusCode::FORBIDDEN,
        QnaError::NotFound(_) => StatusCode::NOT_FOUND,
        QnaError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
