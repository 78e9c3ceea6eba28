//! Conversion errors.

use derive_more::{Display, Error};

/// A conversion error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("conversion program not found on your system")]
    NotFound,
    /// The program exited with a non-zero exit code.
    /// Without an exit code it was killed by a signal; that's reported as `-1`.
    #[display("conversion program exited with code: {_0}")]
    Failed(#[error(not(source))] i32),
    /// The program could not be started.
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }
}
