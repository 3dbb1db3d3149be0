//! Sort specs and page requests → SeaORM queries.
//!
//! The caller hands in a fully filtered `Select` for the rows (any projection,
//! joins included) and a second `Select` carrying the same join and filters
//! for the total. This module applies ordering and the offset/limit window,
//! executes the row query and obtains the total according to the
//! [`CountStrategy`].

use std::collections::HashMap;

use query_core::{
    assemble_page, CountStrategy, NullsOrder, Page, PageError, PageRequest, SortDir, SortSpec,
};
use sea_orm::{
    sea_query::{Expr, NullOrdering, Order, SimpleExpr},
    ConnectionTrait, DbErr, EntityTrait, FromQueryResult, PaginatorTrait, QueryOrder, QueryResult,
    QuerySelect, Select,
};
use thiserror::Error;
use tracing::debug;

/// Column alias carrying the window total in [`CountStrategy::Combined`] mode.
pub const TOTAL_COUNT_ALIAS: &str = "total_count";

/// Whitelist of sortable API field names → SQL expressions.
///
/// Keys are matched case-insensitively. Expressions should be table-qualified
/// when the query joins tables sharing column names.
#[derive(Clone, Debug, Default)]
pub struct FieldMap {
    map: HashMap<String, SimpleExpr>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    #[must_use]
    pub fn insert(mut self, api_name: impl Into<String>, expr: impl Into<SimpleExpr>) -> Self {
        self.map
            .insert(api_name.into().to_lowercase(), expr.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&SimpleExpr> {
        self.map.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Errors from executing a paged or sorted query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Page(#[from] PageError),

    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

/// Resolve a field by name, reporting unknown names as `UnknownSortField`
fn resolve_field<'a>(fields: &'a FieldMap, name: &str) -> Result<&'a SimpleExpr, PageError> {
    fields
        .get(name)
        .ok_or_else(|| PageError::UnknownSortField(name.to_string()))
}

/// Extension trait applying a [`SortSpec`] through a [`FieldMap`].
pub trait SortExt: Sized {
    fn apply_sort(self, sort: &SortSpec, fields: &FieldMap) -> Result<Self, PageError>;
}

impl<E> SortExt for Select<E>
where
    E: EntityTrait,
{
    fn apply_sort(self, sort: &SortSpec, fields: &FieldMap) -> Result<Self, PageError> {
        let mut query = self;

        for key in sort.keys() {
            let expr = resolve_field(fields, &key.field)?.clone();

            let sea_order = match key.dir {
                SortDir::Asc => Order::Asc,
                SortDir::Desc => Order::Desc,
            };

            query = match key.nulls {
                Some(NullsOrder::First) => {
                    query.order_by_with_nulls(expr, sea_order, NullOrdering::First)
                }
                Some(NullsOrder::Last) => {
                    query.order_by_with_nulls(expr, sea_order, NullOrdering::Last)
                }
                None => query.order_by(expr, sea_order),
            };
        }

        Ok(query)
    }
}

/// A projected row plus the window total it was selected with.
#[derive(Clone, Debug, PartialEq)]
pub struct Counted<M> {
    pub row: M,
    pub total: i64,
}

impl<M: FromQueryResult> FromQueryResult for Counted<M> {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        Ok(Self {
            row: M::from_query_result(res, pre)?,
            total: res.try_get(pre, TOTAL_COUNT_ALIAS)?,
        })
    }
}

/// Fetch one page of `rows` projected into `M`.
///
/// `count` must carry the same joins and filters as `rows`; its projection
/// and ordering are irrelevant. The requested sort is validated against
/// `fields` and completed with `tiebreaker` so page boundaries are stable.
pub async fn fetch_page<E, M, C>(
    rows: Select<E>,
    count: Select<E>,
    conn: &C,
    request: &PageRequest,
    fields: &FieldMap,
    tiebreaker: (&str, SortDir), // e.g. ("id", SortDir::Asc)
    strategy: CountStrategy,
) -> Result<Page<M>, QueryError>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
    M: FromQueryResult + Send + Sync,
    C: ConnectionTrait,
{
    let effective_sort = request
        .sort()
        .clone()
        .ensure_tiebreaker(tiebreaker.0, tiebreaker.1);
    let window = rows
        .apply_sort(&effective_sort, fields)?
        .offset(request.offset())
        .limit(request.limit());

    debug!(
        offset = request.offset(),
        limit = request.limit(),
        sort = %effective_sort.to_signed_tokens(),
        ?strategy,
        "fetching page"
    );

    if request.limit() == 0 {
        let total = count.count(conn).await?;
        return Ok(Page::new(Vec::new(), request, total));
    }

    match strategy {
        CountStrategy::Separate => {
            let content = window.into_model::<M>().all(conn).await?;
            let page = assemble_page(content, request, || count.count(conn)).await?;
            Ok(page)
        }
        CountStrategy::Combined => {
            let counted = window
                .expr_as(Expr::cust("COUNT(*) OVER ()"), TOTAL_COUNT_ALIAS)
                .into_model::<Counted<M>>()
                .all(conn)
                .await?;

            let window_total = counted.first().map(|c| c.total.max(0) as u64);
            let content: Vec<M> = counted.into_iter().map(|c| c.row).collect();

            match window_total {
                Some(total) => {
                    let len = content.len() as u64;
                    Ok(Page::new(content, request, total.max(len)))
                }
                // no rows, no window total
                None => Ok(assemble_page(content, request, || count.count(conn)).await?),
            }
        }
    }
}

/// Fetch every row of `rows` in the requested order, completed with `tiebreaker`.
pub async fn fetch_sorted<E, M, C>(
    rows: Select<E>,
    conn: &C,
    sort: &SortSpec,
    fields: &FieldMap,
    tiebreaker: (&str, SortDir),
) -> Result<Vec<M>, QueryError>
where
    E: EntityTrait,
    M: FromQueryResult + Send + Sync,
    C: ConnectionTrait,
{
    let effective_sort = sort.clone().ensure_tiebreaker(tiebreaker.0, tiebreaker.1);
    let rows = rows
        .apply_sort(&effective_sort, fields)?
        .into_model::<M>()
        .all(conn)
        .await?;
    Ok(rows)
}
