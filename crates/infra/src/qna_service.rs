//! Question & answer use cases.
//!
//! The service resolves the collaborators a request references (product,
//! customer or seller account), enforces ownership for edits, and persists
//! through the repository. Rendering and role checks stay with the caller.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use faishion_auth::{IdentityKind, Permission, Principal};
use faishion_core::{DomainError, ProductId, QuestionId};
use faishion_qna::{AnswerText, Question, QuestionDraft, QuestionEdit, Reader};

use crate::query::{Page, PageRequest, QuestionFilter};
use crate::store::{IdentityDirectory, ProductCatalog, QuestionRepository, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QnaError {
    #[error("{0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for QnaError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err.detail().to_string())
    }
}

#[derive(Clone)]
pub struct QnaService {
    questions: Arc<dyn QuestionRepository>,
    products: Arc<dyn ProductCatalog>,
    identities: Arc<dyn IdentityDirectory>,
}

impl QnaService {
    pub fn new(
        questions: Arc<dyn QuestionRepository>,
        products: Arc<dyn ProductCatalog>,
        identities: Arc<dyn IdentityDirectory>,
    ) -> Self {
        Self {
            questions,
            products,
            identities,
        }
    }

    /// Board listing with optional search.
    #[instrument(skip(self, reader))]
    pub async fn list(
        &self,
        search: Option<String>,
        reader: Reader<'_>,
        page: PageRequest,
    ) -> Result<Page<Question>, QnaError> {
        let filter = QuestionFilter::new(search, reader);
        Ok(self.questions.list(&filter, &page).await?)
    }

    /// Older create path: an unknown customer is ignored rather than rejected.
    #[instrument(skip(self, principal, draft), fields(user = %principal.username))]
    pub async fn create_legacy(
        &self,
        principal: &Principal,
        draft: QuestionDraft,
    ) -> Result<Option<Question>, QnaError> {
        let resolved = self
            .identities
            .resolve(&principal.username, IdentityKind::Customer)
            .await?;
        let Some(customer) = resolved else {
            tracing::warn!("no customer account for caller; question dropped");
            return Ok(None);
        };

        if !self.products.exists(draft.product_id()).await? {
            return Err(QnaError::NotFound("product"));
        }

        let stored = self
            .questions
            .insert(draft.into_new(customer.into_username(), Utc::now()))
            .await?;
        tracing::info!(question_id = %stored.id, "question created");
        Ok(Some(stored))
    }

    /// Current create path: product first, then the customer account.
    #[instrument(
        skip(self, principal, draft),
        fields(user = %principal.username, product_id = %draft.product_id())
    )]
    pub async fn save(
        &self,
        principal: &Principal,
        draft: QuestionDraft,
    ) -> Result<Question, QnaError> {
        if !self.products.exists(draft.product_id()).await? {
            return Err(QnaError::NotFound("product"));
        }

        let customer = self
            .identities
            .resolve(&principal.username, IdentityKind::Customer)
            .await?
            .ok_or_else(|| QnaError::Forbidden("no customer account for this login".to_string()))?;

        let stored = self
            .questions
            .insert(draft.into_new(customer.into_username(), Utc::now()))
            .await?;
        tracing::info!(question_id = %stored.id, secret = stored.secret, "question saved");
        Ok(stored)
    }

    pub async fn get(&self, id: QuestionId) -> Result<Question, QnaError> {
        self.questions
            .get(id)
            .await?
            .ok_or(QnaError::NotFound("question"))
    }

    /// Replace title/content. Only the author or a moderator may edit.
    #[instrument(skip(self, principal, edit), fields(user = %principal.username))]
    pub async fn update(
        &self,
        principal: &Principal,
        id: QuestionId,
        edit: QuestionEdit,
    ) -> Result<Question, QnaError> {
        let existing = self.get(id).await?;
        ensure_owner_or_moderator(principal, &existing)?;

        let updated = self
            .questions
            .update_text(id, &edit)
            .await?
            .ok_or(QnaError::NotFound("question"))?;
        tracing::info!("question updated");
        Ok(updated)
    }

    #[instrument(skip(self, principal), fields(user = %principal.username))]
    pub async fn delete(&self, principal: &Principal, id: QuestionId) -> Result<(), QnaError> {
        let existing = self.get(id).await?;
        ensure_owner_or_moderator(principal, &existing)?;

        if !self.questions.delete(id).await? {
            return Err(QnaError::NotFound("question"));
        }
        tracing::info!("question deleted");
        Ok(())
    }

    /// Attach (or replace) the answer. The caller must have a seller account.
    #[instrument(skip(self, principal, answer), fields(user = %principal.username))]
    pub async fn answer(
        &self,
        principal: &Principal,
        id: QuestionId,
        answer: Option<String>,
    ) -> Result<Question, QnaError> {
        let answer = AnswerText::parse(answer)?;

        let seller = self
            .identities
            .resolve(&principal.username, IdentityKind::Seller)
            .await?
            .ok_or_else(|| QnaError::Forbidden("no seller account for this login".to_string()))?;

        let answered = self
            .questions
            .set_answer(id, &answer, seller.username(), Utc::now())
            .await?
            .ok_or(QnaError::NotFound("question"))?;
        tracing::info!("question answered");
        Ok(answered)
    }

    /// Every question on a product; an unknown product simply has none.
    pub async fn list_by_product(&self, product_id: ProductId) -> Result<Vec<Question>, QnaError> {
        Ok(self.questions.list_by_product(product_id).await?)
    }
}

fn ensure_owner_or_moderator(principal: &Principal, question: &Question) -> Result<(), QnaError> {
    if question.is_author(Some(&principal.username)) || principal.can(&Permission::QNA_MODERATE) {
        Ok(())
    } else {
        Err(QnaError::Forbidden(
            "only the author can change this question".to_string(),
        ))
    }
}
