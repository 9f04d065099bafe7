//! `faishion-qna`: product question & answer domain.
//!
//! Pure types and rules: what a question is, what makes a submission valid,
//! and how a stored question is rendered for a given reader.

pub mod question;
pub mod view;

pub use question::{AnswerText, NewQuestion, Question, QuestionDraft, QuestionEdit};
pub use view::{
    QuestionDetail, QuestionSummary, QuestionView, Reader, render_detail, render_summary,
    render_view,
};
