//! Bulk reconstruction of books and files from flat rows.
//!
//! Every loader fetches one flat row set for a whole list of identifiers and
//! groups children under their parents through identifier-keyed maps. Children
//! only ever refer to their parent by id.
//!
//! SQLite caps the number of bound parameters per statement, so identifier
//! lists are inlined into the query text instead of bound. Only `i64` values
//! are ever inlined.

use crate::book::{Book, BookFile};
use crate::error::{ErrorKind, Result};
use crate::models::{BookRow, FileRow, LinkRow, group_names};
use exn::ResultExt;
use sqlx::SqliteConnection;
use std::collections::HashMap;

/// Placeholder for the inlined identifier list in the `queries/*.sql` files.
const ID_LIST: &str = "{ids}";

pub(crate) fn inline_ids(sql: &str, ids: &[i64]) -> String {
    let list = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
    sql.replace(ID_LIST, &list)
}

/// Author names per book id, in the order they were linked.
pub(crate) async fn authors_by_book_ids(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> Result<HashMap<i64, Vec<String>>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let sql = inline_ids(include_str!("../queries/get_authors_by_book_ids.sql"), ids);
    let rows: Vec<LinkRow> =
        sqlx::query_as(&sql).fetch_all(&mut *conn).await.or_raise(|| ErrorKind::Database)?;
    Ok(group_names(rows))
}

/// Tag names per file id, in the order they were linked.
pub(crate) async fn tags_by_file_ids(conn: &mut SqliteConnection, ids: &[i64]) -> Result<HashMap<i64, Vec<String>>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let sql = inline_ids(include_str!("../queries/get_tags_by_file_ids.sql"), ids);
    let rows: Vec<LinkRow> =
        sqlx::query_as(&sql).fetch_all(&mut *conn).await.or_raise(|| ErrorKind::Database)?;
    Ok(group_names(rows))
}

/// Turn file rows into files with their tags attached, keeping each file's
/// owning book id alongside it.
async fn attach_tags(conn: &mut SqliteConnection, rows: Vec<FileRow>) -> Result<Vec<(i64, BookFile)>> {
    let file_ids = rows.iter().map(|row| row.id).collect::<Vec<_>>();
    let mut tags = tags_by_file_ids(conn, &file_ids).await?;
    rows.into_iter()
        .map(|row| {
            let book_id = row.book_id;
            let mut file = BookFile::try_from(row)?;
            file.tags = tags.remove(&file.id).unwrap_or_default();
            Ok((book_id, file))
        })
        .collect()
}

/// Files with their tags, in ascending file id order.
pub(crate) async fn files_by_ids(conn: &mut SqliteConnection, ids: &[i64]) -> Result<Vec<BookFile>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = inline_ids(include_str!("../queries/get_files_by_ids.sql"), ids);
    let rows: Vec<FileRow> =
        sqlx::query_as(&sql).fetch_all(&mut *conn).await.or_raise(|| ErrorKind::Database)?;
    let files = attach_tags(conn, rows).await?;
    Ok(files.into_iter().map(|(_, file)| file).collect())
}

/// Files (with their tags) per book id.
pub(crate) async fn files_by_book_ids(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> Result<HashMap<i64, Vec<BookFile>>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let sql = inline_ids(include_str!("../queries/get_files_by_book_ids.sql"), ids);
    let rows: Vec<FileRow> =
        sqlx::query_as(&sql).fetch_all(&mut *conn).await.or_raise(|| ErrorKind::Database)?;
    let mut map: HashMap<i64, Vec<BookFile>> = HashMap::new();
    for (book_id, file) in attach_tags(conn, rows).await? {
        map.entry(book_id).or_default().push(file);
    }
    Ok(map)
}

/// Books with their authors and files, in the order of `ids`.
///
/// Unknown ids are skipped; a repeated id yields the book once per mention.
pub(crate) async fn books_by_ids(conn: &mut SqliteConnection, ids: &[i64]) -> Result<Vec<Book>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = inline_ids(include_str!("../queries/get_books_by_ids.sql"), ids);
    let rows: Vec<BookRow> =
        sqlx::query_as(&sql).fetch_all(&mut *conn).await.or_raise(|| ErrorKind::Database)?;
    let mut authors = authors_by_book_ids(conn, ids).await?;
    let mut files = files_by_book_ids(conn, ids).await?;

    let mut books = HashMap::with_capacity(rows.len());
    for row in rows {
        let mut book = Book::try_from(row)?;
        book.authors = authors.remove(&book.id).unwrap_or_default();
        book.files = files.remove(&book.id).unwrap_or_default();
        books.insert(book.id, book);
    }
    Ok(ids.iter().filter_map(|id| books.get(id).cloned()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_ids() {
        assert_eq!(inline_ids("SELECT * FROM books WHERE id IN ({ids})", &[3, 1, 2]), "SELECT * FROM books WHERE id IN (3,1,2)");
        assert_eq!(inline_ids("id IN ({ids})", &[-5]), "id IN (-5)");
    }
}
