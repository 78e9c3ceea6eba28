//! Path validation for files stored under the library root.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a path relative to the library root and returns it normalized.
///
/// `.` components and repeated separators are dropped and `..` is resolved
/// lexically. The path is rejected with
/// [`InvalidPath`](crate::error::ErrorKind::InvalidPath) if it would leave
/// the root, resolves to nothing, carries a Windows prefix, or contains a
/// null byte. A leading `/` is ignored: the result is always relative.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use shelf_storage::validate_path;
/// assert!(validate_path("King, Stephen/The Shining.epub").is_ok());
/// assert!(validate_path("../outside.epub").is_err());
/// assert_eq!(
///     validate_path("King, Stephen/./drafts/../The Shining.epub").unwrap(),
///     Path::new("King, Stephen/The Shining.epub")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(path.to_path_buf());
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => {
                // Null bytes survive Path::components() on Unix but truncate
                // the path in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(invalid());
                }
                components.push(s);
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
        }
    }
    if components.is_empty() {
        exn::bail!(invalid());
    }
    Ok(components.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Herbert, Frank/Dune.epub", "Herbert, Frank/Dune.epub")]
    #[case("Dune.epub", "Dune.epub")]
    #[case("a//b///Dune.epub", "a/b/Dune.epub")]
    #[case("./a/./Dune.epub", "a/Dune.epub")]
    #[case("a/b/../Dune.epub", "a/Dune.epub")]
    #[case("/rooted/Dune.epub", "rooted/Dune.epub")]
    fn test_valid_paths(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate(input).unwrap(), Path::new(expected));
    }

    #[rstest]
    #[case("../Dune.epub")]
    #[case("a/../../Dune.epub")]
    #[case("..")]
    #[case("")]
    #[case(".")]
    #[case("a/..")]
    #[case("Dune\0.epub")]
    fn test_invalid_paths(#[case] input: &str) {
        assert!(validate(input).is_err());
    }
}
