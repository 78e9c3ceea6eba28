//! Errors raised by [`Library`](crate::Library) outside of importing and
//! searching, which have their own (see [`import::error`](crate::import::error)
//! and [`search::error`](crate::search::error)).

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the subsystem a library operation failed in.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Opening or querying the [catalog](shelf_catalog) failed.
    Catalog,
    /// The conversion program couldn't be found, or failed.
    Convert,
    /// A filesystem operation under the library root or cache failed.
    Storage,
    /// The configuration is unusable.
    Config,
    /// Conversion target extensions are plain ASCII alphanumerics.
    #[display("invalid extension: {_0:?}")]
    InvalidExtension(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
