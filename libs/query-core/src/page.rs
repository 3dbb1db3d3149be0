use serde::{Deserialize, Serialize};

use crate::{PageError, SortSpec};

/// Offset/limit window request expressed as a zero-based page index and a page size.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest")]
pub struct PageRequest {
    page_index: u64,
    page_size: u64,
    #[serde(default)]
    sort: SortSpec,
}

/// Wire shape of [`PageRequest`]; deserialization goes through [`PageRequest::new`].
#[derive(Deserialize)]
struct RawPageRequest {
    page_index: i64,
    page_size: i64,
    #[serde(default)]
    sort: SortSpec,
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = PageError;

    fn try_from(raw: RawPageRequest) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.page_index, raw.page_size)?.with_sort(raw.sort))
    }
}

impl PageRequest {
    /// Validate caller-supplied numbers. Negative values and windows whose
    /// offset cannot be represented by the store are rejected; a size of zero
    /// is accepted and produces an empty page.
    pub fn new(page_index: i64, page_size: i64) -> Result<Self, PageError> {
        let invalid = || PageError::InvalidPageRequest {
            page_index,
            page_size,
        };
        if page_index < 0 || page_size < 0 {
            return Err(invalid());
        }
        page_index.checked_mul(page_size).ok_or_else(invalid)?;

        Ok(Self {
            page_index: page_index as u64,
            page_size: page_size as u64,
            sort: SortSpec::empty(),
        })
    }

    /// First page of `page_size` rows.
    pub fn first(page_size: u64) -> Self {
        Self {
            page_index: 0,
            page_size,
            sort: SortSpec::empty(),
        }
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// Reject sizes above `max_page_size`.
    pub fn check_max_size(self, max_page_size: u64) -> Result<Self, PageError> {
        if self.page_size > max_page_size {
            return Err(PageError::InvalidPageRequest {
                page_index: self.page_index as i64,
                page_size: self.page_size as i64,
            });
        }
        Ok(self)
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    /// Rows to skip.
    pub fn offset(&self) -> u64 {
        self.page_index.saturating_mul(self.page_size)
    }

    /// Maximum rows to return.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

/// A bounded slice of an ordered result set plus the total matching count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total: u64,
    pub page_index: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total: u64) -> Self {
        debug_assert!(content.len() as u64 <= request.page_size());
        debug_assert!(total >= content.len() as u64);
        Self {
            content,
            total,
            page_index: request.page_index(),
            page_size: request.page_size(),
        }
    }

    pub fn offset(&self) -> u64 {
        self.page_index.saturating_mul(self.page_size)
    }

    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return if self.total == 0 { 0 } else { 1 };
        }
        self.total.div_ceil(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.page_index.saturating_add(1) < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn is_first(&self) -> bool {
        !self.has_previous()
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    /// Map content while preserving paging metadata (row -> DTO convenience)
    pub fn map_content<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total: self.total,
            page_index: self.page_index,
            page_size: self.page_size,
        }
    }
}
