//! Repository for books and their files.

use crate::Database;
use crate::book::{Book, BookFile};
use crate::error::{ErrorKind, Result};
use crate::hydrate::{books_by_ids, files_by_ids};
use crate::import::{StagedImport, stage};
use crate::search::{SearchPage, search_ids};
use exn::ResultExt;
use sqlx::SqlitePool;
use tracing::instrument;

/// Repository for managing books, files, authors and tags in the catalog.
///
/// # Relationships
///
/// - A book has many files; a file belongs to exactly one book
/// - Books and authors are many-to-many, in credit order
/// - Files and tags are many-to-many, in the order they were attached
/// - Deleting a book cascades to its files, links and search document
/// - Deleting a file cascades to its tag links
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Import
    // =========================================================================

    /// Stage the import of a book carrying exactly one file.
    ///
    /// All catalog writes happen inside one transaction which is handed back
    /// uncommitted, so that the file can be placed on disk first. See
    /// [`StagedImport`].
    ///
    /// # Errors
    /// - [`ErrorKind::MultipleFiles`] unless the book has exactly one file.
    /// - [`ErrorKind::Duplicate`] if the file's hash is already cataloged;
    ///   nothing has been written.
    /// - [`ErrorKind::MissingSearchDocument`] if the book already exists but
    ///   its search document doesn't.
    #[instrument(skip_all, fields(title = %book.title))]
    pub async fn stage_import(&self, book: Book) -> Result<StagedImport> {
        stage(&self.pool, book).await
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    /// Get the id of the file with the given content hash.
    pub async fn find_file_by_hash(&self, hash: impl AsRef<str>) -> Result<Option<i64>> {
        sqlx::query_scalar(include_str!("../queries/find_file_by_hash.sql"))
            .bind(hash.as_ref())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// Get books, with their authors, files and tags, by id.
    ///
    /// Books come back in the order of `ids`; unknown ids are skipped.
    /// Everything is read inside a single transaction.
    pub async fn get_books_by_id(&self, ids: &[i64]) -> Result<Vec<Book>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let books = books_by_ids(&mut tx, ids).await?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(books)
    }

    /// Get files, with their tags, by id (ascending id order).
    pub async fn get_files_by_id(&self, ids: &[i64]) -> Result<Vec<BookFile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let files = files_by_ids(&mut tx, ids).await?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(files)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Search the catalog, returning every matching book.
    ///
    /// All fields are searched by default; `field:terms` restricts a term to
    /// one of `author`, `title`, `series`, `extension`, `tags`, `filename` or
    /// `source`. For example: `author:King title:Shining`.
    pub async fn search(&self, query: &str) -> Result<Vec<Book>> {
        Ok(self.search_paged(query, 0, 0, 0).await?.books)
    }

    /// Search the catalog one page at a time.
    ///
    /// A `limit` of `0` returns every match. Otherwise at most `limit` books
    /// are returned starting at `offset`, and
    /// [`more_results`](SearchPage::more_results) counts the further matches
    /// up to `more_results_cap`.
    #[instrument(skip(self))]
    pub async fn search_paged(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
        more_results_cap: usize,
    ) -> Result<SearchPage> {
        let (ids, more_results) = search_ids(&self.pool, query, offset, limit, more_results_cap).await?;
        let books = self.get_books_by_id(&ids).await?;
        tracing::debug!(found = books.len(), more_results, "Search complete");
        Ok(SearchPage { books, more_results })
    }
}
