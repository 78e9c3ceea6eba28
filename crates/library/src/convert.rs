use crate::Library;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shelf_catalog::BookFile;
use shelf_convert::Converter;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::instrument;

impl Library {
    /// Convert a cataloged file to the format named by `extension`, returning
    /// the path of the converted copy.
    ///
    /// Converted copies are cached as `<hash>.<extension>` in the
    /// [cache directory](Self::cache_dir); a copy that's already cached is
    /// returned without converting again. Without an explicit
    /// [converter](Self::with_converter), one is discovered on `PATH`.
    #[instrument(skip_all, fields(file = file.id, hash = %file.hash, %extension))]
    pub async fn convert(&self, file: &BookFile, extension: &str) -> Result<PathBuf> {
        if extension.is_empty() || !extension.bytes().all(|b| b.is_ascii_alphanumeric()) {
            exn::bail!(ErrorKind::InvalidExtension(extension.to_string()));
        }
        let cached = self.cache.join(format!("{}.{extension}", file.hash));
        if fs::try_exists(&cached).await.or_raise(|| ErrorKind::Storage)? {
            tracing::debug!(path = %cached.display(), "Converted file already cached");
            return Ok(cached);
        }
        fs::create_dir_all(&self.cache).await.or_raise(|| ErrorKind::Storage)?;

        let converter = match &self.converter {
            Some(converter) => converter.clone(),
            None => Converter::discover().or_raise(|| ErrorKind::Convert)?,
        };
        // Converters pick the output format from the extension, so the
        // in-progress name keeps it.
        let partial = self.cache.join(format!("{}.partial.{extension}", file.hash));
        let (src, dst) = (self.path_of(file), partial.clone());
        let converted = match tokio::task::spawn_blocking(move || converter.convert(src, dst)).await {
            Ok(result) => result.or_raise(|| ErrorKind::Convert),
            Err(e) => Err(e).or_raise(|| ErrorKind::Convert),
        };
        if let Err(e) = converted {
            discard(&partial).await;
            return Err(e);
        }
        if let Err(e) = fs::rename(&partial, &cached).await {
            discard(&partial).await;
            return Err(e).or_raise(|| ErrorKind::Storage);
        }
        Ok(cached)
    }

    /// [`convert`](Self::convert) to EPUB.
    pub async fn convert_to_epub(&self, file: &BookFile) -> Result<PathBuf> {
        self.convert(file, "epub").await
    }
}

/// Remove whatever a failed conversion left behind.
async fn discard(partial: &Path) {
    match fs::remove_file(partial).await {
        Ok(()) => {},
        Err(e) if e.kind() == io::ErrorKind::NotFound => {},
        Err(e) => tracing::warn!(error = %e, path = %partial.display(), "Could not remove partial conversion"),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::Book;
    use crate::tests::{incoming, library};
    use rstest::rstest;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn converter(program: &str) -> Converter {
        Converter::new(which::which(program).unwrap())
    }

    async fn imported(library: &Library, dir: &Path) -> BookFile {
        let src = incoming(dir, "dune.mobi", "spice");
        let file = library.prepare_file(&src, "Dune.mobi").await.unwrap();
        let book = Book::new("Dune", ["Frank Herbert"]).with_file(file);
        library.import(book).await.unwrap().into_book().files.remove(0)
    }

    #[tokio::test]
    async fn test_convert_caches_by_hash() {
        let dir = tempfile::tempdir().unwrap();
        // `cp` takes (source, destination) just like a real converter.
        let library = library(dir.path()).await.with_converter(converter("cp"));
        let file = imported(&library, dir.path()).await;

        let converted = library.convert_to_epub(&file).await.unwrap();
        assert_eq!(converted, dir.path().join("cache").join(format!("{}.epub", file.hash)));
        assert_eq!(fs::read_to_string(&converted).unwrap(), "spice");

        // A cached copy is returned as-is.
        fs::write(&converted, "cached").unwrap();
        assert_eq!(library.convert_to_epub(&file).await.unwrap(), converted);
        assert_eq!(fs::read_to_string(&converted).unwrap(), "cached");
        library.close().await;
    }

    #[tokio::test]
    async fn test_convert_failure() {
        let dir = tempfile::tempdir().unwrap();
        let library = library(dir.path()).await.with_converter(converter("false"));
        let file = imported(&library, dir.path()).await;

        let err = library.convert(&file, "azw3").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Convert));
        assert!(!dir.path().join("cache").join(format!("{}.azw3", file.hash)).exists());
        library.close().await;
    }

    #[tokio::test]
    async fn test_output_of_failed_conversion_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("half-convert");
        fs::write(&script, "#!/bin/sh\necho partial > \"$2\"\nexit 1\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        let library = library(dir.path()).await.with_converter(Converter::new(script.clone()));
        let file = imported(&library, dir.path()).await;

        for _ in 0..2 {
            let err = library.convert_to_epub(&file).await.unwrap_err();
            assert!(matches!(&*err, ErrorKind::Convert));
        }
        let cache = dir.path().join("cache");
        assert_eq!(fs::read_dir(&cache).unwrap().count(), 0);
        library.close().await;
    }

    #[rstest]
    #[case("")]
    #[case("../epub")]
    #[case("tar.gz")]
    #[tokio::test]
    async fn test_invalid_extension(#[case] extension: &str) {
        let dir = tempfile::tempdir().unwrap();
        let library = library(dir.path()).await.with_converter(converter("cp"));
        let file = imported(&library, dir.path()).await;
        let err = library.convert(&file, extension).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidExtension(_)));
        library.close().await;
    }
}
