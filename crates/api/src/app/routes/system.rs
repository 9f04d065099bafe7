use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use faishion_infra::QnaError;

use crate::app::errors;
use crate::authz;
use crate::context::CallerContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(caller): Extension<CallerContext>) -> axum::response::Response {
    let Some(ctx) = caller.principal() else {
        return errors::qna_error_to_response(QnaError::Unauthenticated);
    };
    let principal = authz::principal_from_context(ctx);

    Json(serde_json::json!({
        "username": principal.username.as_str(),
        "roles": principal.roles.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "permissions": principal.permissions.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
    }))
    .into_response()
}
