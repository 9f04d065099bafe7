use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use faishion_auth::JwtValidator;

use crate::context::{CallerContext, PrincipalContext};

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Resolve the caller from an optional bearer token.
///
/// No `Authorization` header means an anonymous caller; a header that is
/// malformed or carries an invalid token is rejected with 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let caller = match extract_bearer(req.headers())? {
        None => CallerContext::anonymous(),
        Some(token) => {
            let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                StatusCode::UNAUTHORIZED
            })?;
            CallerContext::authenticated(PrincipalContext::new(claims.sub, claims.roles))
        }
    };

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, StatusCode> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(Some(token))
}
