//! Search index maintenance.
//!
//! Each book has exactly one FTS document, keyed by `docid = books.id`. The
//! per-file columns (extension, tags, filename, source) accumulate one entry
//! per imported file. Tokens are appended as-is: a tag shared by two files of
//! the same book appears twice in the document.

use crate::book::{Book, BookFile};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::SqliteConnection;

#[derive(sqlx::FromRow)]
struct SearchDocumentRow {
    docid: i64,
    extension: Option<String>,
    tags: Option<String>,
    filename: Option<String>,
    source: Option<String>,
}

/// Space-separated append; an empty column takes the new value unchanged.
fn append(existing: Option<String>, addition: &str) -> String {
    match existing {
        Some(existing) if !existing.is_empty() => format!("{existing} {addition}"),
        _ => addition.to_string(),
    }
}

/// Index `file` as part of `book`, creating the book's document if `is_new`
/// and merging into the existing document otherwise.
pub(crate) async fn index_book(conn: &mut SqliteConnection, book: &Book, file: &BookFile, is_new: bool) -> Result<()> {
    let tags = file.tags.join(" ");
    let filename = file.current_filename.to_string_lossy().into_owned();
    let source = file.source.as_deref().unwrap_or_default();
    if is_new {
        sqlx::query(include_str!("../queries/insert_search_document.sql"))
            .bind(book.id)
            .bind(book.joined_authors())
            .bind(book.series.as_deref())
            .bind(&book.title)
            .bind(&file.extension)
            .bind(&tags)
            .bind(&filename)
            .bind(source)
            .execute(&mut *conn)
            .await
            .or_raise(|| ErrorKind::Database)?;
        return Ok(());
    }

    let document: Option<SearchDocumentRow> = sqlx::query_as(include_str!("../queries/get_search_document.sql"))
        .bind(book.id)
        .fetch_optional(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    let Some(document) = document else {
        exn::bail!(ErrorKind::MissingSearchDocument(book.id));
    };
    sqlx::query(include_str!("../queries/update_search_document.sql"))
        .bind(append(document.extension, &file.extension))
        .bind(append(document.tags, &tags))
        .bind(append(document.filename, &filename))
        .bind(append(document.source, source))
        .bind(document.docid)
        .execute(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}
