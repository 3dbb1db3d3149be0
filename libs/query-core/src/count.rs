//! Total-count selection and page assembly.
//!
//! A page needs the number of rows matching the filter. Depending on the
//! [`CountStrategy`] that number comes back with the window query itself
//! (`COUNT(*) OVER ()`) or from a second, separate count query that re-runs
//! the join and the filters. The second query is the expensive path: it is
//! handed to [`assemble_page`] as a deferred supplier and only executed when
//! the page contents cannot prove the total on their own.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Page, PageRequest};

/// Where the total comes from when it cannot be inferred.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountStrategy {
    /// Window rows carry the total (`COUNT(*) OVER ()`); one round trip.
    Combined,
    /// A separate count query over the same join and filters, run lazily.
    #[default]
    Separate,
}

/// Total implied by a short page, if any.
///
/// A page shorter than the limit is the tail of the result set, so the total
/// is `offset + len`. That only holds when the page actually reached into
/// the result set: an empty page at a non-zero offset may lie past the end
/// and says nothing about the total.
pub fn inferred_total(offset: u64, limit: u64, content_len: u64) -> Option<u64> {
    if content_len >= limit {
        return None;
    }
    if offset == 0 || content_len > 0 {
        Some(offset + content_len)
    } else {
        None
    }
}

/// Combine page content with a total-count supplier.
///
/// The supplier is called at most once, and never when the total can be
/// inferred from the content (see [`inferred_total`]). Supplier errors are
/// returned as-is and no page is built.
pub async fn assemble_page<T, E, F, Fut>(
    content: Vec<T>,
    request: &PageRequest,
    total_supplier: F,
) -> Result<Page<T>, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<u64, E>>,
{
    let len = content.len() as u64;
    let total = match inferred_total(request.offset(), request.limit(), len) {
        Some(total) => {
            trace!(total, "total inferred from page content");
            total
        }
        None => {
            trace!("total not inferable; invoking count supplier");
            total_supplier().await?
        }
    };
    // A count racing a concurrent delete may come back below the window size.
    Ok(Page::new(content, request, total.max(len)))
}
