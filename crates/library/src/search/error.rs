//! Error types for the [`search`](super) module.

use derive_more::{Display, Error};

/// A search error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for search and retrieval.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The query was rejected by the full-text index, or the
    /// [catalog](shelf_catalog) couldn't be read.
    Catalog,
}
