//! Transactional import staging.

use crate::book::Book;
use crate::error::{ErrorKind, Result};
use crate::index::index_book;
use crate::models::FileRow;
use crate::resolve::resolve;
use crate::upsert::{upsert_author, upsert_tag};
use exn::ResultExt;
use sqlx::{Sqlite, SqlitePool, Transaction};
use time::UtcDateTime;

/// An import whose catalog writes are done but not yet committed.
///
/// Holds the open transaction. Nothing is visible to other connections until
/// [`commit`](Self::commit); dropping the value (or calling
/// [`rollback`](Self::rollback)) discards every write.
pub struct StagedImport {
    tx: Transaction<'static, Sqlite>,
    book: Book,
    created: bool,
}
impl StagedImport {
    /// The imported book, with the book, file and timestamp fields filled in.
    pub fn book(&self) -> &Book {
        &self.book
    }

    /// Whether the import created a new book (as opposed to adding a file to
    /// an existing one).
    pub fn created(&self) -> bool {
        self.created
    }

    pub async fn commit(self) -> Result<Book> {
        self.tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(self.book)
    }

    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await.or_raise(|| ErrorKind::Database)
    }
}

/// Run the catalog side of an import inside a new write transaction, waiting
/// for any other staged import to finish first:
///
/// 1. reject anything but exactly one file,
/// 2. reject a content hash that is already cataloged,
/// 3. resolve the book by title and ordered authors,
/// 4. create the book and link its authors (in order) if it's new,
/// 5. insert the file,
/// 6. link the file's tags,
/// 7. create or merge the book's search document.
pub(crate) async fn stage(pool: &SqlitePool, mut book: Book) -> Result<StagedImport> {
    if book.files.len() != 1 {
        exn::bail!(ErrorKind::MultipleFiles(book.files.len()));
    }
    // Take the write lock up front: a deferred transaction that only finds out
    // at its first write that another import got there first can't wait for
    // it, since its read snapshot is already stale.
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await.or_raise(|| ErrorKind::Database)?;

    let duplicate: Option<i64> = sqlx::query_scalar(include_str!("../queries/find_file_by_hash.sql"))
        .bind(&book.files[0].hash)
        .fetch_optional(&mut *tx)
        .await
        .or_raise(|| ErrorKind::Database)?;
    if let Some(id) = duplicate {
        exn::bail!(ErrorKind::Duplicate(id));
    }

    let existing = resolve(&mut tx, &book.title, &book.authors).await?;
    let created = existing.is_none();
    match existing {
        Some(id) => {
            book.id = id;
            sqlx::query(include_str!("../queries/touch_book.sql"))
                .bind(id)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        },
        None => {
            let (id, created_on, updated_on): (i64, i64, i64) =
                sqlx::query_as(include_str!("../queries/insert_book.sql"))
                    .bind(book.series.as_deref())
                    .bind(&book.title)
                    .fetch_one(&mut *tx)
                    .await
                    .or_raise(|| ErrorKind::Database)?;
            book.id = id;
            book.created_on = UtcDateTime::from_unix_timestamp(created_on).ok();
            book.updated_on = UtcDateTime::from_unix_timestamp(updated_on).ok();
            for author in &book.authors {
                upsert_author(&mut tx, book.id, author).await?;
            }
        },
    }

    let row = FileRow::new(book.id, &book.files[0])?;
    let file_id: i64 = sqlx::query_scalar(include_str!("../queries/insert_file.sql"))
        .bind(row.book_id)
        .bind(row.extension)
        .bind(row.original_filename)
        .bind(row.filename)
        .bind(row.file_size)
        .bind(row.file_mtime)
        .bind(row.hash)
        .bind(row.regexp_name)
        .bind(row.template_override)
        .bind(row.source)
        .fetch_one(&mut *tx)
        .await
        .or_raise(|| ErrorKind::Database)?;
    book.files[0].id = file_id;

    for tag in &book.files[0].tags {
        upsert_tag(&mut tx, file_id, tag).await?;
    }

    index_book(&mut tx, &book, &book.files[0], created).await?;
    tracing::debug!(book = book.id, file = file_id, created, "Import staged");
    Ok(StagedImport { tx, book, created })
}
