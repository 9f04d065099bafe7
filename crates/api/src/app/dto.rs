use serde::{Deserialize, Serialize};

use faishion_core::{DomainResult, ProductId};
use faishion_qna::{QuestionDraft, QuestionEdit};

/// Body of `POST /qna/save`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SaveQuestionRequest {
    #[serde(alias = "productId")]
    pub product_id: i64,
    pub title: String,
    pub content: String,
    #[serde(default, alias = "isSecret")]
    pub secret: bool,
}

impl SaveQuestionRequest {
    pub fn into_draft(self) -> DomainResult<QuestionDraft> {
        QuestionDraft::new(ProductId::new(self.product_id), self.title, self.content, self.secret)
    }
}

/// Body of `POST /qna`.
///
/// `product_id` is optional on the wire so a missing value is reported as a
/// validation error rather than a body rejection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateQuestionRequest {
    #[serde(default, alias = "productId")]
    pub product_id: Option<i64>,
    pub title: String,
    pub content: String,
    #[serde(default, alias = "isSecret")]
    pub secret: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateQuestionRequest {
    pub title: String,
    pub content: String,
}

impl UpdateQuestionRequest {
    pub fn into_edit(self) -> DomainResult<QuestionEdit> {
        QuestionEdit::new(self.title, self.content)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub answer: Option<String>,
}

/// Query string of `GET /qna/list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub direction: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_request_accepts_camel_case_aliases() {
        let body: SaveQuestionRequest = serde_json::from_str(
            r#"{"productId": 3, "title": "Size?", "content": "Runs small?", "isSecret": true}"#,
        )
        .unwrap();
        assert_eq!(body.product_id, 3);
        assert!(body.secret);
    }

    #[test]
    fn secret_defaults_to_false() {
        let body: CreateQuestionRequest =
            serde_json::from_str(r#"{"title": "t", "content": "c"}"#).unwrap();
        assert_eq!(body.product_id, None);
        assert!(!body.secret);
    }

    #[test]
    fn blank_edit_is_rejected() {
        let edit = UpdateQuestionRequest {
            title: " ".into(),
            content: "c".into(),
        };
        assert!(edit.into_edit().is_err());
    }
}
