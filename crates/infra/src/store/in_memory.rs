//! In-memory stores for tests/dev. Not optimized for performance.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use faishion_auth::{Identity, IdentityKind};
use faishion_core::{ProductId, QuestionId, Username};
use faishion_qna::{AnswerText, NewQuestion, Question, QuestionEdit};

use super::{IdentityDirectory, ProductCatalog, QuestionRepository, StoreError};
use crate::qna_service::QnaService;
use crate::query::{Page, PageRequest, QuestionFilter, SortDirection};

fn poisoned(what: &str) -> StoreError {
    StoreError::Unavailable(format!("{what} lock poisoned"))
}

#[derive(Debug, Default)]
struct QuestionTable {
    rows: BTreeMap<QuestionId, Question>,
    last_id: i64,
}

#[derive(Debug, Default)]
pub struct InMemoryQuestionStore {
    inner: RwLock<QuestionTable>,
}

impl InMemoryQuestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionStore {
    async fn insert(&self, question: NewQuestion) -> Result<Question, StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned("question"))?;
        table.last_id += 1;
        let id = QuestionId::new(table.last_id);
        let stored = question.into_question(id);
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: QuestionId) -> Result<Option<Question>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned("question"))?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &QuestionFilter,
        page: &PageRequest,
    ) -> Result<Page<Question>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned("question"))?;

        let mut matching: Vec<&Question> =
            table.rows.values().filter(|q| filter.matches(q)).collect();
        matching.sort_by_key(|q| (q.created_at, q.id));
        if page.direction == SortDirection::Desc {
            matching.reverse();
        }

        let total = matching.len() as u64;
        let content = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.size as usize)
            .cloned()
            .collect();

        Ok(Page::new(content, page, total))
    }

    async fn list_by_product(&self, product_id: ProductId) -> Result<Vec<Question>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned("question"))?;
        Ok(table
            .rows
            .values()
            .filter(|q| q.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn update_text(
        &self,
        id: QuestionId,
        edit: &QuestionEdit,
    ) -> Result<Option<Question>, StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned("question"))?;
        Ok(table.rows.get_mut(&id).map(|q| {
            q.title = edit.title().to_string();
            q.content = edit.content().to_string();
            q.clone()
        }))
    }

    async fn set_answer(
        &self,
        id: QuestionId,
        answer: &AnswerText,
        answered_by: &Username,
        answered_at: DateTime<Utc>,
    ) -> Result<Option<Question>, StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned("question"))?;
        Ok(table.rows.get_mut(&id).map(|q| {
            q.answer = Some(answer.as_str().to_string());
            q.answered_by = Some(answered_by.clone());
            q.answered_at = Some(answered_at);
            q.clone()
        }))
    }

    async fn delete(&self, id: QuestionId) -> Result<bool, StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned("question"))?;
        Ok(table.rows.remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProductCatalog {
    ids: RwLock<HashSet<ProductId>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product_id: ProductId) {
        if let Ok(mut ids) = self.ids.write() {
            ids.insert(product_id);
        }
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn exists(&self, product_id: ProductId) -> Result<bool, StoreError> {
        let ids = self.ids.read().map_err(|_| poisoned("product"))?;
        Ok(ids.contains(&product_id))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryIdentityDirectory {
    accounts: RwLock<HashSet<Identity>>,
}

impl InMemoryIdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, identity: Identity) {
        if let Ok(mut accounts) = self.accounts.write() {
            accounts.insert(identity);
        }
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryIdentityDirectory {
    async fn resolve(
        &self,
        username: &Username,
        kind: IdentityKind,
    ) -> Result<Option<Identity>, StoreError> {
        let accounts = self.accounts.read().map_err(|_| poisoned("identity"))?;
        let candidate = Identity::new(kind, username.clone());
        Ok(accounts.contains(&candidate).then_some(candidate))
    }
}

/// The three in-memory stores, shared so callers can seed them after wiring.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStores {
    pub questions: Arc<InMemoryQuestionStore>,
    pub products: Arc<InMemoryProductCatalog>,
    pub identities: Arc<InMemoryIdentityDirectory>,
}

impl InMemoryStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&self, id: i64) -> &Self {
        self.products.insert(ProductId::new(id));
        self
    }

    pub fn add_customer(&self, username: Username) -> &Self {
        self.identities.register(Identity::Customer(username));
        self
    }

    pub fn add_seller(&self, username: Username) -> &Self {
        self.identities.register(Identity::Seller(username));
        self
    }

    pub fn service(&self) -> QnaService {
        QnaService::new(
            self.questions.clone(),
            self.products.clone(),
            self.identities.clone(),
        )
    }
}
