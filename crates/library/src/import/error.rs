//! Error types for the [`import`](super) module.

use derive_more::{Display, Error};

/// An import error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies why an import failed. Whatever the kind, nothing was committed
/// to the catalog.
#[derive(Debug, Clone, Copy, Display, Error)]
pub enum ErrorKind {
    /// The file's content hash is already cataloged, as the file with this id.
    #[display("file already cataloged with id {_0}")]
    Duplicate(#[error(not(source))] i64),
    /// The book didn't carry exactly one file, or the file's library path
    /// is unusable.
    #[display("malformed import request")]
    Malformed,
    /// A [catalog](shelf_catalog) operation failed; the transaction was rolled back.
    Catalog,
    /// The file couldn't be moved or copied into the library root.
    Placement,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Catalog | Self::Placement)
    }
}
