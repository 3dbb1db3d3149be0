//! Store-independent paging primitives: sort specifications, page requests,
//! page envelopes and the total-count assembly rules.
//!
//! Nothing here talks to a database. `query-db` turns these types into
//! SeaORM queries.

pub mod count;
mod page;
mod sort;

pub use count::{assemble_page, inferred_total, CountStrategy};
pub use page::{Page, PageRequest};
pub use sort::{NullsOrder, OrderKey, SortDir, SortSpec};

use thiserror::Error;

/// Errors detected while building a page request, before any query runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("invalid page request: page_index={page_index}, page_size={page_size}")]
    InvalidPageRequest { page_index: i64, page_size: i64 },

    #[error("unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("malformed sort token: {0}")]
    InvalidSort(String),
}

#[cfg(test)]
mod tests;
