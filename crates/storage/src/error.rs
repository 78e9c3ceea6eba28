//! Errors raised while placing or inspecting files.

use derive_more::{Display, Error};
use std::io;
use std::path::{Path, PathBuf};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong on the filesystem, with the offending path where the
/// caller can act on it.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("no such file: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    #[display("not allowed to access {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Leaves the library root, names nothing, or isn't a regular file.
    #[display("unusable path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// Any other I/O failure.
    #[display("filesystem error: {_0}")]
    Io(io::Error),
}
impl From<io::Error> for ErrorKind {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
impl ErrorKind {
    /// Attach `path` to the I/O failures a caller can do something about.
    pub(crate) fn from_io(e: io::Error, path: &Path) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(e),
        }
    }

    /// Only unclassified I/O failures might go away on their own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
