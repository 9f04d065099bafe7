//! Read-time rendering of questions.
//!
//! Secret text is masked here and nowhere else; nothing rendered is ever
//! written back to storage. The answer is public once given and is never
//! masked.

use chrono::{DateTime, Utc};
use serde::Serialize;

use faishion_core::{ProductId, QuestionId, Username};

use crate::Question;

/// Title shown in place of a secret question's title.
pub const SECRET_TITLE: &str = "비밀글입니다";
/// Content shown in place of a secret question's content.
pub const SECRET_NOTICE: &str = "🔒 비밀글입니다. 작성자만 열람할 수 있습니다.";
/// Display name used when the owning account is gone.
pub const ANONYMOUS: &str = "익명";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Who is looking at a question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reader<'a> {
    username: Option<&'a Username>,
    may_read_secrets: bool,
}

impl<'a> Reader<'a> {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Authenticated reader without any privilege over other people's questions.
    pub fn member(username: &'a Username) -> Self {
        Self {
            username: Some(username),
            may_read_secrets: false,
        }
    }

    /// Seller/admin reader allowed to see secret text (needed to answer it).
    pub fn staff(username: &'a Username) -> Self {
        Self {
            username: Some(username),
            may_read_secrets: true,
        }
    }

    pub fn username(&self) -> Option<&'a Username> {
        self.username
    }

    pub fn may_read_secrets(&self) -> bool {
        self.may_read_secrets
    }

    /// Whether this reader gets the real title/content of `question`.
    pub fn can_read(&self, question: &Question) -> bool {
        !question.secret || self.may_read_secrets || question.is_author(self.username)
    }
}

/// Storefront view of one question on a product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub user_name: String,
    pub title: String,
    pub content: String,
    pub answer: Option<String>,
    pub secret: bool,
    pub created_at: String,
    pub is_author: bool,
}

/// Row of the board listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionSummary {
    pub id: QuestionId,
    pub product_id: ProductId,
    pub user_id: String,
    pub title: String,
    pub secret: bool,
    pub answered: bool,
    pub created_at: String,
}

/// Single-question detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionDetail {
    pub id: QuestionId,
    pub product_id: ProductId,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub answer: Option<String>,
    pub answered_by: Option<Username>,
    pub answered_at: Option<DateTime<Utc>>,
    pub secret: bool,
    pub created_at: DateTime<Utc>,
    pub is_author: bool,
}

/// Render a question for the product page.
///
/// Only the author sees a secret question's title and content; every other
/// caller (including sellers) gets the placeholders.
pub fn render_view(question: &Question, caller: Option<&Username>) -> QuestionView {
    let is_author = question.is_author(caller);
    let (title, content) = visible_text(question, !question.secret || is_author);

    QuestionView {
        id: question.id,
        user_name: display_name(question),
        title,
        content,
        answer: question.answer.clone(),
        secret: question.secret,
        created_at: format_timestamp(question.created_at),
        is_author,
    }
}

pub fn render_summary(question: &Question, reader: Reader<'_>) -> QuestionSummary {
    let (title, _) = visible_text(question, reader.can_read(question));

    QuestionSummary {
        id: question.id,
        product_id: question.product_id,
        user_id: display_name(question),
        title,
        secret: question.secret,
        answered: question.is_answered(),
        created_at: format_timestamp(question.created_at),
    }
}

pub fn render_detail(question: &Question, reader: Reader<'_>) -> QuestionDetail {
    let (title, content) = visible_text(question, reader.can_read(question));

    QuestionDetail {
        id: question.id,
        product_id: question.product_id,
        user_id: display_name(question),
        title,
        content,
        answer: question.answer.clone(),
        answered_by: question.answered_by.clone(),
        answered_at: question.answered_at,
        secret: question.secret,
        created_at: question.created_at,
        is_author: question.is_author(reader.username()),
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn visible_text(question: &Question, readable: bool) -> (String, String) {
    if readable {
        (question.title.clone(), question.content.clone())
    } else {
        (SECRET_TITLE.to_string(), SECRET_NOTICE.to_string())
    }
}

fn display_name(question: &Question) -> String {
    question
        .author
        .as_ref()
        .map(|u| u.as_str().to_string())
        .unwrap_or_else(|| ANONYMOUS.to_string())
}
