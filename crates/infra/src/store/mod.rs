//! Storage abstractions for questions and the collaborators they reference.
//!
//! Products and accounts are owned elsewhere; this layer only needs to know
//! whether they exist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use faishion_auth::{Identity, IdentityKind};
use faishion_core::{ProductId, QuestionId, Username};
use faishion_qna::{AnswerText, NewQuestion, Question, QuestionEdit};

use crate::query::{Page, PageRequest, QuestionFilter};

pub mod in_memory;
pub mod postgres;

pub use in_memory::{
    InMemoryIdentityDirectory, InMemoryProductCatalog, InMemoryQuestionStore, InMemoryStores,
};
pub use postgres::PostgresStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed row in {operation}: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
}

/// Persistence for questions.
///
/// Mutations return `None`/`false` when the id does not exist.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn insert(&self, question: NewQuestion) -> Result<Question, StoreError>;

    async fn get(&self, id: QuestionId) -> Result<Option<Question>, StoreError>;

    async fn list(
        &self,
        filter: &QuestionFilter,
        page: &PageRequest,
    ) -> Result<Page<Question>, StoreError>;

    /// All questions on a product, in ascending id order.
    async fn list_by_product(&self, product_id: ProductId) -> Result<Vec<Question>, StoreError>;

    async fn update_text(
        &self,
        id: QuestionId,
        edit: &QuestionEdit,
    ) -> Result<Option<Question>, StoreError>;

    /// Store (or overwrite) the answer.
    async fn set_answer(
        &self,
        id: QuestionId,
        answer: &AnswerText,
        answered_by: &Username,
        answered_at: DateTime<Utc>,
    ) -> Result<Option<Question>, StoreError>;

    async fn delete(&self, id: QuestionId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn exists(&self, product_id: ProductId) -> Result<bool, StoreError>;
}

/// Single resolver for both account spaces.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn resolve(
        &self,
        username: &Username,
        kind: IdentityKind,
    ) -> Result<Option<Identity>, StoreError>;
}
