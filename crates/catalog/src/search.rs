//! Full-text search over the book index.

use crate::book::Book;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::SqlitePool;

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub books: Vec<Book>,
    /// How many more matches exist past this page, capped at the
    /// `more_results_cap` the search was run with.
    pub more_results: usize,
}

/// Matching book ids for `query` plus the (capped) number of further matches.
///
/// With `limit == 0` every match is returned and `offset` is ignored.
/// Otherwise up to `limit + more_results_cap` ids are fetched from `offset`:
/// anything past `limit` is only counted, which is far cheaper than a full
/// `COUNT(*)` over a large match set.
pub(crate) async fn search_ids(
    pool: &SqlitePool,
    query: &str,
    offset: usize,
    limit: usize,
    more_results_cap: usize,
) -> Result<(Vec<i64>, usize)> {
    let mut ids: Vec<i64> = if limit == 0 {
        sqlx::query_scalar(include_str!("../queries/search.sql"))
            .bind(query)
            .fetch_all(pool)
            .await
            .or_raise(|| ErrorKind::Database)?
    } else {
        let fetch = i64::try_from(limit.saturating_add(more_results_cap)).or_raise(|| ErrorKind::InvalidData("limit"))?;
        let offset = i64::try_from(offset).or_raise(|| ErrorKind::InvalidData("offset"))?;
        sqlx::query_scalar(include_str!("../queries/search_paged.sql"))
            .bind(query)
            .bind(fetch)
            .bind(offset)
            .fetch_all(pool)
            .await
            .or_raise(|| ErrorKind::Database)?
    };
    let mut more_results = 0;
    if limit > 0 && ids.len() > limit {
        more_results = ids.len() - limit;
        ids.truncate(limit);
    }
    Ok((ids, more_results))
}
