use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use faishion_core::{DomainError, DomainResult, ProductId, QuestionId, Username};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 4000;
pub const MAX_ANSWER_CHARS: usize = 4000;

/// A question as persisted.
///
/// `product_id` and `author` are fixed at creation. `author` is `None` only
/// when the owning account no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub product_id: ProductId,
    pub author: Option<Username>,
    pub title: String,
    pub content: String,
    pub secret: bool,
    pub answer: Option<String>,
    pub answered_by: Option<Username>,
    pub answered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Question {
    /// True only for an authenticated caller who owns the question.
    pub fn is_author(&self, caller: Option<&Username>) -> bool {
        match (caller, self.author.as_ref()) {
            (Some(caller), Some(author)) => caller == author,
            _ => false,
        }
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

/// Validated question submission (not yet bound to an author).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    product_id: ProductId,
    title: String,
    content: String,
    secret: bool,
}

impl QuestionDraft {
    pub fn new(
        product_id: ProductId,
        title: impl Into<String>,
        content: impl Into<String>,
        secret: bool,
    ) -> DomainResult<Self> {
        let title = title.into();
        let content = content.into();
        require_text("title", &title, MAX_TITLE_CHARS)?;
        require_text("content", &content, MAX_CONTENT_CHARS)?;

        Ok(Self {
            product_id,
            title,
            content,
            secret,
        })
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn secret(&self) -> bool {
        self.secret
    }

    /// Bind the draft to its author, producing the record to insert.
    pub fn into_new(self, author: Username, created_at: DateTime<Utc>) -> NewQuestion {
        NewQuestion {
            product_id: self.product_id,
            author,
            title: self.title,
            content: self.content,
            secret: self.secret,
            created_at,
        }
    }
}

/// Insert payload handed to storage; storage assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub product_id: ProductId,
    pub author: Username,
    pub title: String,
    pub content: String,
    pub secret: bool,
    pub created_at: DateTime<Utc>,
}

impl NewQuestion {
    pub fn into_question(self, id: QuestionId) -> Question {
        Question {
            id,
            product_id: self.product_id,
            author: Some(self.author),
            title: self.title,
            content: self.content,
            secret: self.secret,
            answer: None,
            answered_by: None,
            answered_at: None,
            created_at: self.created_at,
        }
    }
}

/// Validated title/content replacement. Nothing else on a question is editable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionEdit {
    title: String,
    content: String,
}

impl QuestionEdit {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> DomainResult<Self> {
        let title = title.into();
        let content = content.into();
        require_text("title", &title, MAX_TITLE_CHARS)?;
        require_text("content", &content, MAX_CONTENT_CHARS)?;
        Ok(Self { title, content })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Answer body; never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerText(String);

impl AnswerText {
    /// Accepts the raw (possibly missing) request value.
    pub fn parse(raw: Option<String>) -> DomainResult<Self> {
        let text = raw.unwrap_or_default();
        require_text("answer", &text, MAX_ANSWER_CHARS)?;
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

fn require_text(field: &str, value: &str, max_chars: usize) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} must not be blank")));
    }
    if value.chars().count() > max_chars {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(())
}
