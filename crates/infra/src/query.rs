//! Listing query types: filters and offset pagination.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use faishion_core::{DomainError, Username};
use faishion_qna::{Question, Reader};

/// Sort order over (created_at, id).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(DomainError::validation("direction must be one of: asc, desc")),
        }
    }
}

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub direction: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: Self::DEFAULT_SIZE,
            direction: SortDirection::Desc,
        }
    }
}

impl PageRequest {
    pub const DEFAULT_SIZE: u32 = 10;
    pub const MAX_SIZE: u32 = 100;

    pub fn new(page: Option<u32>, size: Option<u32>, direction: SortDirection) -> Self {
        Self {
            page: page.unwrap_or(0),
            size: size.unwrap_or(Self::DEFAULT_SIZE).clamp(1, Self::MAX_SIZE),
            direction,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// One page of results plus totals across all pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size.max(1));
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: total_elements.div_ceil(size),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

/// Which secret questions a search is allowed to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretScope {
    /// Staff: every secret question.
    All,
    /// Only secret questions written by this account.
    OwnedBy(Username),
    /// Anonymous reader: none.
    Nothing,
}

/// Board listing filter.
///
/// Without a search term every question is listed (and masked at render
/// time). With a search term, secret questions only match when the reader
/// could read them, so hidden text cannot be probed by searching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFilter {
    pub search: Option<String>,
    pub secret_scope: SecretScope,
}

impl QuestionFilter {
    pub fn new(search: Option<String>, reader: Reader<'_>) -> Self {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let secret_scope = if reader.may_read_secrets() {
            SecretScope::All
        } else {
            match reader.username() {
                Some(u) => SecretScope::OwnedBy(u.clone()),
                None => SecretScope::Nothing,
            }
        };

        Self {
            search,
            secret_scope,
        }
    }

    /// No search term: list everything.
    pub fn unfiltered() -> Self {
        Self {
            search: None,
            secret_scope: SecretScope::Nothing,
        }
    }

    /// In-process evaluation (the SQL adapter expresses the same predicate).
    pub fn matches(&self, question: &Question) -> bool {
        let Some(term) = &self.search else {
            return true;
        };

        let term = term.to_lowercase();
        let text_matches = question.title.to_lowercase().contains(&term)
            || question.content.to_lowercase().contains(&term);
        if !text_matches {
            return false;
        }

        if !question.secret {
            return true;
        }
        match &self.secret_scope {
            SecretScope::All => true,
            SecretScope::OwnedBy(owner) => question.author.as_ref() == Some(owner),
            SecretScope::Nothing => false,
        }
    }

    /// `ILIKE` pattern for the search term, with wildcards escaped.
    pub fn like_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|term| {
            let mut escaped = String::with_capacity(term.len() + 2);
            escaped.push('%');
            for ch in term.chars() {
                if matches!(ch, '%' | '_' | '\\') {
                    escaped.push('\\');
                }
                escaped.push(ch);
            }
            escaped.push('%');
            escaped
        })
    }
}
