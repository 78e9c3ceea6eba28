//! Errors raised by the catalog.

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong in the catalog. `Duplicate`, `MultipleFiles` and
/// `MissingSearchDocument` are raised before or instead of a store failure and
/// carry what the caller needs to report them.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A statement against the store failed.
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// A file with the same content hash is already cataloged.
    #[display("a duplicate book already exists with file id {_0}")]
    Duplicate(#[error(not(source))] i64),
    /// An import request must carry exactly one file.
    #[display("book to import must contain exactly one file, found {_0}")]
    MultipleFiles(#[error(not(source))] usize),
    /// Every existing book must have a search document; this one doesn't.
    #[display("existing book {_0} not found in search index")]
    MissingSearchDocument(#[error(not(source))] i64),
    /// A row could not be converted to or from its model.
    #[display("invalid catalog data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database)
    }
}
