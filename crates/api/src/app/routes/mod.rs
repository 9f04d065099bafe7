use axum::{routing::get, Router};

pub mod qna;
pub mod system;

/// Router for every endpoint behind caller resolution.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/qna", qna::router())
}
