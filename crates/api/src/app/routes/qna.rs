use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use faishion_auth::{Permission, Principal};
use faishion_core::{ProductId, QuestionId};
use faishion_infra::{PageRequest, QnaError, SortDirection};
use faishion_qna::{render_detail, render_summary, render_view, QuestionDraft};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_question))
        .route("/list", get(list_questions))
        .route("/save", post(save_question))
        .route("/answer/:id", put(answer_question))
        .route("/product/:product_id", get(list_product_questions))
        .route(
            "/:id",
            get(get_question).put(update_question).delete(delete_question),
        )
}

pub async fn list_questions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Query(params): Query<dto::ListQuery>,
) -> axum::response::Response {
    let direction = match params.direction.as_deref() {
        None => SortDirection::default(),
        Some(raw) => match raw.parse::<SortDirection>() {
            Ok(d) => d,
            Err(e) => return errors::domain_error_to_response(e),
        },
    };
    let page = PageRequest::new(params.page, params.size, direction);

    let principal = caller.principal().map(authz::principal_from_context);
    let reader = authz::reader_for(principal.as_ref());

    match services.qna.list(params.q, reader, page).await {
        Ok(found) => Json(found.map(|q| render_summary(&q, reader))).into_response(),
        Err(e) => errors::qna_error_to_response(e),
    }
}

pub async fn create_question(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::CreateQuestionRequest>, JsonRejection>,
) -> axum::response::Response {
    let principal = match require_asker(&caller) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let Some(product_id) = body.product_id else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "product_id is required",
        );
    };
    let draft = QuestionDraft::new(
        ProductId::new(product_id),
        body.title,
        body.content,
        body.secret,
    );
    let draft = match draft {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.qna.create_legacy(&principal, draft).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => errors::qna_error_to_response(e),
    }
}

pub async fn get_question(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_question_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let principal = caller.principal().map(authz::principal_from_context);
    let reader = authz::reader_for(principal.as_ref());

    match services.qna.get(id).await {
        Ok(q) => Json(render_detail(&q, reader)).into_response(),
        Err(e) => errors::qna_error_to_response(e),
    }
}

pub async fn update_question(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateQuestionRequest>, JsonRejection>,
) -> axum::response::Response {
    let Some(ctx) = caller.principal() else {
        return errors::qna_error_to_response(QnaError::Unauthenticated);
    };
    let principal = authz::principal_from_context(ctx);

    let id = match parse_question_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let edit = match body.into_edit() {
        Ok(e) => e,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.qna.update(&principal, id, edit).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => errors::qna_error_to_response(e),
    }
}

pub async fn delete_question(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Some(ctx) = caller.principal() else {
        return errors::qna_error_to_response(QnaError::Unauthenticated);
    };
    let principal = authz::principal_from_context(ctx);

    let id = match parse_question_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.qna.delete(&principal, id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => errors::qna_error_to_response(e),
    }
}

/// Sellers attach an answer. Responds with plain text.
pub async fn answer_question(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    body: Option<Json<dto::AnswerRequest>>,
) -> axum::response::Response {
    const CONTEXT: &str = "failed to register answer";

    let Some(ctx) = caller.principal() else {
        return errors::qna_error_to_text(QnaError::Unauthenticated, CONTEXT);
    };
    let principal = authz::principal_from_context(ctx);
    if let Err(e) = authz::require_permission(&principal, &Permission::QNA_ANSWER) {
        return errors::text_error(StatusCode::FORBIDDEN, e.to_string());
    }

    let id: QuestionId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::text_error(StatusCode::BAD_REQUEST, "invalid question id"),
    };
    let answer = body.and_then(|Json(b)| b.answer);

    match services.qna.answer(&principal, id, answer).await {
        Ok(_) => (StatusCode::OK, "answer registered").into_response(),
        Err(e) => errors::qna_error_to_text(e, CONTEXT),
    }
}

/// Product page listing; secret text is only shown to its author.
pub async fn list_product_questions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match product_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };
    let username = caller.principal().map(|p| p.username());

    match services.qna.list_by_product(product_id).await {
        Ok(questions) => Json(
            questions
                .iter()
                .map(|q| render_view(q, username))
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::qna_error_to_response(e),
    }
}

/// Current create path. Responds with plain text.
pub async fn save_question(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::SaveQuestionRequest>,
) -> axum::response::Response {
    const CONTEXT: &str = "failed to register question";

    let Some(ctx) = caller.principal() else {
        return errors::qna_error_to_text(QnaError::Unauthenticated, CONTEXT);
    };
    let principal = authz::principal_from_context(ctx);
    if let Err(e) = authz::require_permission(&principal, &Permission::QNA_ASK) {
        return errors::text_error(StatusCode::FORBIDDEN, e.to_string());
    }

    let draft = match body.into_draft() {
        Ok(d) => d,
        Err(e) => return errors::text_error(StatusCode::BAD_REQUEST, e.detail()),
    };

    match services.qna.save(&principal, draft).await {
        Ok(_) => (StatusCode::CREATED, "question registered").into_response(),
        Err(e) => errors::qna_error_to_text(e, CONTEXT),
    }
}

fn require_asker(caller: &CallerContext) -> Result<Principal, axum::response::Response> {
    let Some(ctx) = caller.principal() else {
        return Err(errors::qna_error_to_response(QnaError::Unauthenticated));
    };
    let principal = authz::principal_from_context(ctx);
    authz::require_permission(&principal, &Permission::QNA_ASK)
        .map_err(|e| errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))?;
    Ok(principal)
}

fn parse_question_id(raw: &str) -> Result<QuestionId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid question id")
    })
}
