//! Infrastructure layer: storage adapters, query types and the QnA service.

pub mod qna_service;
pub mod query;
pub mod store;

pub use qna_service::{QnaError, QnaService};
pub use query::{Page, PageRequest, QuestionFilter, SecretScope, SortDirection};
pub use store::{IdentityDirectory, ProductCatalog, QuestionRepository, StoreError};
