//! Postgres-backed stores.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database (any code) | `Database` |
//! | PoolClosed / PoolTimedOut / Io / Tls | `Unavailable` |
//! | ColumnDecode / Decode / ColumnNotFound | `Decode` |
//! | Other | `Database` |
//!
//! ## Thread Safety
//!
//! `PostgresStore` is `Send + Sync`; the SQLx pool handles connection sharing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use faishion_auth::{Identity, IdentityKind};
use faishion_core::{ProductId, QuestionId, Username};
use faishion_qna::{AnswerText, NewQuestion, Question, QuestionEdit};

use super::{IdentityDirectory, ProductCatalog, QuestionRepository, StoreError};
use crate::query::{Page, PageRequest, QuestionFilter, SecretScope, SortDirection};

const SCHEMA: &str = include_str!("../../migrations/0001_qna.sql");

const QNA_COLUMNS: &str =
    "id, product_id, user_id, title, content, secret, answer, answered_by, answered_at, created_at";

// $1 = ILIKE pattern (NULL lists everything), $2 = staff flag, $3 = reader username.
const LIST_WHERE: &str = r#"
    WHERE $1::text IS NULL
       OR ((title ILIKE $1 OR content ILIKE $1)
           AND (NOT secret OR $2::boolean OR user_id = $3::text))
"#;

/// Postgres implementation of every store trait, sharing one pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if they are missing.
    pub async fn apply_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("apply_schema", e))?;
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct QnaRow {
    id: i64,
    product_id: i64,
    user_id: Option<String>,
    title: String,
    content: String,
    secret: bool,
    answer: Option<String>,
    answered_by: Option<String>,
    answered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl QnaRow {
    fn into_question(self, operation: &'static str) -> Result<Question, StoreError> {
        let username = |raw: Option<String>| -> Result<Option<Username>, StoreError> {
            raw.map(Username::parse)
                .transpose()
                .map_err(|e| StoreError::Decode {
                    operation,
                    message: e.to_string(),
                })
        };

        Ok(Question {
            id: QuestionId::new(self.id),
            product_id: ProductId::new(self.product_id),
            author: username(self.user_id)?,
            title: self.title,
            content: self.content,
            secret: self.secret,
            answer: self.answer,
            answered_by: username(self.answered_by)?,
            answered_at: self.answered_at,
            created_at: self.created_at,
        })
    }
}

fn scope_params(scope: &SecretScope) -> (bool, Option<&str>) {
    match scope {
        SecretScope::All => (true, None),
        SecretScope::OwnedBy(owner) => (false, Some(owner.as_str())),
        SecretScope::Nothing => (false, None),
    }
}

#[async_trait]
impl QuestionRepository for PostgresStore {
    #[instrument(skip(self, question), fields(product_id = %question.product_id))]
    async fn insert(&self, question: NewQuestion) -> Result<Question, StoreError> {
        let sql = format!(
            "INSERT INTO qna (product_id, user_id, title, content, secret, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {QNA_COLUMNS}"
        );
        let row: QnaRow = sqlx::query_as(&sql)
            .bind(question.product_id.get())
            .bind(question.author.as_str())
            .bind(&question.title)
            .bind(&question.content)
            .bind(question.secret)
            .bind(question.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_question", e))?;

        row.into_question("insert_question")
    }

    async fn get(&self, id: QuestionId) -> Result<Option<Question>, StoreError> {
        let sql = format!("SELECT {QNA_COLUMNS} FROM qna WHERE id = $1");
        let row: Option<QnaRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_question", e))?;

        row.map(|r| r.into_question("get_question")).transpose()
    }

    #[instrument(skip(self, filter))]
    async fn list(
        &self,
        filter: &QuestionFilter,
        page: &PageRequest,
    ) -> Result<Page<Question>, StoreError> {
        let pattern = filter.like_pattern();
        let (staff, owner) = scope_params(&filter.secret_scope);

        let count_sql = format!("SELECT COUNT(*) FROM qna {LIST_WHERE}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(pattern.as_deref())
            .bind(staff)
            .bind(owner)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_questions", e))?;

        let order = match page.direction {
            SortDirection::Asc => "ORDER BY created_at ASC, id ASC",
            SortDirection::Desc => "ORDER BY created_at DESC, id DESC",
        };
        let list_sql =
            format!("SELECT {QNA_COLUMNS} FROM qna {LIST_WHERE} {order} LIMIT $4 OFFSET $5");
        let rows: Vec<QnaRow> = sqlx::query_as(&list_sql)
            .bind(pattern.as_deref())
            .bind(staff)
            .bind(owner)
            .bind(i64::from(page.size))
            .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_questions", e))?;

        let content = rows
            .into_iter()
            .map(|r| r.into_question("list_questions"))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(content, page, u64::try_from(total).unwrap_or(0)))
    }

    async fn list_by_product(&self, product_id: ProductId) -> Result<Vec<Question>, StoreError> {
        let sql = format!("SELECT {QNA_COLUMNS} FROM qna WHERE product_id = $1 ORDER BY id ASC");
        let rows: Vec<QnaRow> = sqlx::query_as(&sql)
            .bind(product_id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_product_questions", e))?;

        rows.into_iter()
            .map(|r| r.into_question("list_product_questions"))
            .collect()
    }

    async fn update_text(
        &self,
        id: QuestionId,
        edit: &QuestionEdit,
    ) -> Result<Option<Question>, StoreError> {
        let sql = format!(
            "UPDATE qna SET title = $2, content = $3 WHERE id = $1 RETURNING {QNA_COLUMNS}"
        );
        let row: Option<QnaRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .bind(edit.title())
            .bind(edit.content())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_question", e))?;

        row.map(|r| r.into_question("update_question")).transpose()
    }

    async fn set_answer(
        &self,
        id: QuestionId,
        answer: &AnswerText,
        answered_by: &Username,
        answered_at: DateTime<Utc>,
    ) -> Result<Option<Question>, StoreError> {
        let sql = format!(
            "UPDATE qna SET answer = $2, answered_by = $3, answered_at = $4 \
             WHERE id = $1 RETURNING {QNA_COLUMNS}"
        );
        let row: Option<QnaRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .bind(answer.as_str())
            .bind(answered_by.as_str())
            .bind(answered_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("answer_question", e))?;

        row.map(|r| r.into_question("answer_question")).transpose()
    }

    async fn delete(&self, id: QuestionId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM qna WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_question", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProductCatalog for PostgresStore {
    async fn exists(&self, product_id: ProductId) -> Result<bool, StoreError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
            .bind(product_id.get())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("product_exists", e))
    }
}

#[async_trait]
impl IdentityDirectory for PostgresStore {
    async fn resolve(
        &self,
        username: &Username,
        kind: IdentityKind,
    ) -> Result<Option<Identity>, StoreError> {
        let sql = match kind {
            IdentityKind::Customer => "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)",
            IdentityKind::Seller => "SELECT EXISTS (SELECT 1 FROM sellers WHERE id = $1)",
        };
        let found: bool = sqlx::query_scalar(sql)
            .bind(username.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("resolve_identity", e))?;

        Ok(found.then(|| Identity::new(kind, username.clone())))
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Database {
            operation,
            message: match db_err.code() {
                Some(code) => format!("{} (code {})", db_err.message(), code),
                None => db_err.message().to_string(),
            },
        },
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("{operation}: connection pool unavailable"))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("{operation}: {e}")),
        sqlx::Error::Tls(e) => StoreError::Unavailable(format!("{operation}: {e}")),
        e @ (sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)) => StoreError::Decode {
            operation,
            message: e.to_string(),
        },
        other => StoreError::Database {
            operation,
            message: other.to_string(),
        },
    }
}
