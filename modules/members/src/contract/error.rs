use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MembersError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl MembersError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for MembersError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            MemberNotFound { id } => Self::not_found("member", id),
            TeamNotFound { id } => Self::not_found("team", id),
            InvalidPageRequest {
                page_index,
                page_size,
            } => Self::validation(format!(
                "Invalid page request: page_index={page_index}, page_size={page_size}"
            )),
            UnknownSortField { field } => Self::validation(format!("Unknown sort field: {field}")),
            Validation { field, message } => Self::validation(format!("{field}: {message}")),
            Persistence(_) => Self::internal(),
        }
    }
}
