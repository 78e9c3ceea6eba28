//! Idempotent creation and linking of name-keyed entities.
//!
//! Names are unique. The insert resolves a conflicting name to the existing
//! row and returns its id in the same statement, and links are inserted with
//! `OR IGNORE` so attaching the same name to the same owner twice is a no-op.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::SqliteConnection;

/// Get or create the author called `name` and link it to `book_id`.
pub(crate) async fn upsert_author(conn: &mut SqliteConnection, book_id: i64, name: &str) -> Result<i64> {
    let author_id: i64 = sqlx::query_scalar(include_str!("../queries/upsert_author.sql"))
        .bind(name)
        .fetch_one(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    sqlx::query(include_str!("../queries/link_book_author.sql"))
        .bind(book_id)
        .bind(author_id)
        .execute(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(author_id)
}

/// Get or create the tag called `name` and link it to `file_id`.
pub(crate) async fn upsert_tag(conn: &mut SqliteConnection, file_id: i64, name: &str) -> Result<i64> {
    let tag_id: i64 = sqlx::query_scalar(include_str!("../queries/upsert_tag.sql"))
        .bind(name)
        .fetch_one(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    sqlx::query(include_str!("../queries/link_file_tag.sql"))
        .bind(file_id)
        .bind(tag_id)
        .execute(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(tag_id)
}
