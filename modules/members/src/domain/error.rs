use query_core::PageError;
use query_db::QueryError;
use sea_orm::DbErr;
use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid page request: page_index={page_index}, page_size={page_size}")]
    InvalidPageRequest { page_index: i64, page_size: i64 },

    #[error("Unknown sort field: {field}")]
    UnknownSortField { field: String },

    #[error("Member not found: {id}")]
    MemberNotFound { id: i64 },

    #[error("Team not found: {id}")]
    TeamNotFound { id: i64 },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Persistence failure: {0}")]
    Persistence(#[from] DbErr),
}

impl DomainError {
    pub fn member_not_found(id: i64) -> Self {
        Self::MemberNotFound { id }
    }

    pub fn team_not_found(id: i64) -> Self {
        Self::TeamNotFound { id }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<PageError> for DomainError {
    fn from(e: PageError) -> Self {
        match e {
            PageError::InvalidPageRequest {
                page_index,
                page_size,
            } => Self::InvalidPageRequest {
                page_index,
                page_size,
            },
            PageError::UnknownSortField(field) => Self::UnknownSortField { field },
            PageError::InvalidSort(token) => Self::validation("sort", format!("malformed token '{token}'")),
        }
    }
}

impl From<QueryError> for DomainError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::Page(p) => p.into(),
            QueryError::Db(db) => Self::Persistence(db),
        }
    }
}
