//! Identity resolution: does a book with this title and author sequence exist?

use crate::error::{ErrorKind, Result};
use crate::hydrate::authors_by_book_ids;
use exn::ResultExt;
use sqlx::SqliteConnection;

/// Find the book whose title matches exactly (case-sensitive) and whose
/// authors are `authors`, element for element and in the same order.
///
/// Candidates are checked in ascending id order. A book without any linked
/// author has the empty sequence.
pub(crate) async fn resolve(conn: &mut SqliteConnection, title: &str, authors: &[String]) -> Result<Option<i64>> {
    let candidates: Vec<i64> = sqlx::query_scalar(include_str!("../queries/find_books_by_title.sql"))
        .bind(title)
        .fetch_all(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    if candidates.is_empty() {
        return Ok(None);
    }
    let mut sequences = authors_by_book_ids(conn, &candidates).await?;
    Ok(candidates
        .into_iter()
        .find(|id| sequences.remove(id).unwrap_or_default().as_slice() == authors))
}
