//! Importing books into the library.
//!
//! An import is all-or-nothing: the catalog records are written inside one
//! transaction, the file is moved or copied under the library root, and only
//! then is the transaction committed. If placing the file fails, the catalog
//! is left exactly as it was.

pub mod error;

use crate::Library;
use crate::import::error::{ErrorKind, Result};
use exn::ResultExt;
use shelf_catalog::Book;
use shelf_catalog::error::ErrorKind as CatalogErrorKind;
use shelf_storage::{Mode, Placement, move_or_copy, validate_path};
use std::ops::Deref;
use std::path::Path;
use tracing::instrument;

/// The outcome of a successful import. Either way the book carries its
/// catalog id and the imported file (with its id) as its only file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Import {
    /// No book with this title and author sequence existed; one was created.
    Created(Book),
    /// The file was added to an existing book.
    Attached(Book),
}
impl Import {
    pub fn book(&self) -> &Book {
        match self {
            Self::Created(book) | Self::Attached(book) => book,
        }
    }

    pub fn into_book(self) -> Book {
        match self {
            Self::Created(book) | Self::Attached(book) => book,
        }
    }
}

impl Library {
    /// Import a book using the library's configured [`Mode`].
    pub async fn import(&self, book: Book) -> Result<Import> {
        self.import_book(book, self.mode).await
    }

    /// Import a book carrying exactly one file.
    ///
    /// The file is read from its `original_filename` and placed at its
    /// `current_filename`, relative to the library root (missing directories
    /// are created). A book with the same title and the same authors *in the
    /// same order* gets the file attached; otherwise a new book is created.
    ///
    /// # Errors
    /// - [`ErrorKind::Malformed`] unless there's exactly one file, with a
    ///   `current_filename` that stays inside the library root.
    /// - [`ErrorKind::Duplicate`] if the content hash is already cataloged.
    /// - [`ErrorKind::Catalog`] if the catalog couldn't be updated.
    /// - [`ErrorKind::Placement`] if the file couldn't be moved or copied.
    ///
    /// Nothing is committed to the catalog in any of these cases.
    #[instrument(skip_all, fields(title = %book.title, ?mode))]
    pub async fn import_book(&self, mut book: Book, mode: Mode) -> Result<Import> {
        let [file] = book.files.as_mut_slice() else {
            exn::bail!(ErrorKind::Malformed);
        };
        file.current_filename = validate_path(&file.current_filename).or_raise(|| ErrorKind::Malformed)?;
        let src = file.original_filename.clone();
        let dst = self.root.join(&file.current_filename);

        let staged = match self.repo.stage_import(book).await {
            Ok(staged) => staged,
            Err(e) => {
                let kind = match e.deref() {
                    CatalogErrorKind::Duplicate(id) => ErrorKind::Duplicate(*id),
                    CatalogErrorKind::MultipleFiles(_) => ErrorKind::Malformed,
                    _ => ErrorKind::Catalog,
                };
                return Err(e).or_raise(|| kind);
            },
        };

        let placement = match move_or_copy(&src, &dst, mode).await {
            Ok(placement) => placement,
            Err(e) => {
                if let Err(rollback) = staged.rollback().await {
                    tracing::warn!(error = ?rollback, "Rollback failed; dropping the transaction instead");
                }
                return Err(e).or_raise(|| ErrorKind::Placement);
            },
        };

        let created = staged.created();
        let book = match staged.commit().await {
            Ok(book) => book,
            Err(e) => {
                // Don't leave an uncataloged copy behind. A moved file stays
                // where it is, the source is gone.
                if placement == Placement::Copied {
                    remove_uncommitted(&dst).await;
                } else {
                    tracing::warn!(path = %dst.display(), "Import not committed; file left in the library root");
                }
                return Err(e).or_raise(|| ErrorKind::Catalog);
            },
        };

        tracing::info!(book = book.id, file = book.files[0].id, created, ?placement, "Imported book");
        Ok(if created { Import::Created(book) } else { Import::Attached(book) })
    }
}

/// Remove a copy whose catalog entry was never committed.
async fn remove_uncommitted(dst: &Path) {
    if let Err(e) = tokio::fs::remove_file(dst).await {
        tracing::warn!(error = %e, path = %dst.display(), "Import not committed; could not remove the copied file");
    }
}
