//! A book library: a [catalog](shelf_catalog) plus the directory tree its
//! files live in.
//!
//! [`Library`] ties the two together. Importing a book writes the catalog
//! records and places the file under the library root as one unit; searching
//! and retrieval go straight to the catalog; converted copies of files are
//! cached next to the catalog database.

mod convert;
pub mod error;
pub mod import;
pub mod search;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shelf_catalog::{BookFile, Database, Durability, Repository};
use shelf_config::{Config, SearchConfig};
use shelf_convert::Converter;
use shelf_storage::{Mode, inspect, unique_name, validate_path};
use std::path::{Path, PathBuf};
use tracing::instrument;

pub use crate::import::Import;
pub use shelf_catalog::{Book, SearchPage};

/// Name of the directory, next to the catalog file, holding converted files.
const CACHE_DIR: &str = "cache";

pub struct Library {
    db: Database,
    repo: Repository,
    root: PathBuf,
    cache: PathBuf,
    mode: Mode,
    search: SearchConfig,
    converter: Option<Converter>,
}
impl Library {
    /// Wrap an already connected catalog.
    ///
    /// Files are placed under `root`; converted files are cached in `cache`.
    pub fn new(db: Database, root: impl Into<PathBuf>, cache: impl Into<PathBuf>) -> Self {
        Self {
            repo: Repository::from(&db),
            db,
            root: root.into(),
            cache: cache.into(),
            mode: Mode::default(),
            search: SearchConfig::default(),
            converter: None,
        }
    }

    /// Open (creating if necessary) the catalog at `catalog` for the library
    /// rooted at `root`.
    #[instrument(skip_all, fields(catalog = %catalog.as_ref().display(), ?durability))]
    pub async fn open(catalog: impl AsRef<Path>, root: impl Into<PathBuf>, durability: Durability) -> Result<Self> {
        let catalog = catalog.as_ref();
        let cache = catalog.parent().unwrap_or(Path::new("")).join(CACHE_DIR);
        let db = Database::connect(catalog, durability).await.or_raise(|| ErrorKind::Catalog)?;
        Ok(Self::new(db, root, cache))
    }

    /// Open the library described by a (validated) configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate().or_raise(|| ErrorKind::Config)?;
        let library = &config.library;
        let mut this = Self::open(&library.catalog, &library.root, library.durability)
            .await?
            .with_mode(library.mode)
            .with_search(config.search.clone());
        if let Some(program) = &config.convert.program {
            this = this.with_converter(Converter::new(program));
        }
        Ok(this)
    }

    /// Default placement mode for [`import`](Self::import).
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Page size and "more results" cap for [`search_page`](Self::search_page).
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Use this converter instead of discovering one on first use.
    pub fn with_converter(mut self, converter: Converter) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache
    }

    /// Where a cataloged file lives on disk.
    pub fn path_of(&self, file: &BookFile) -> PathBuf {
        self.root.join(&file.current_filename)
    }

    /// Describe the file at `src` for import at `relative` under the library
    /// root.
    ///
    /// Reads size, modification time and content hash from `src`. If
    /// something already occupies `relative`, the first free
    /// [`unique_name`] variant of it is used instead.
    pub async fn prepare_file(&self, src: impl AsRef<Path>, relative: impl AsRef<Path>) -> Result<BookFile> {
        let src = src.as_ref();
        let relative = validate_path(relative).or_raise(|| ErrorKind::Storage)?;
        let stat = inspect(src).await.or_raise(|| ErrorKind::Storage)?;
        let destination = unique_name(self.root.join(&relative)).await.or_raise(|| ErrorKind::Storage)?;
        let relative = match destination.strip_prefix(&self.root) {
            Ok(unique) => unique.to_path_buf(),
            Err(_) => relative,
        };
        Ok(BookFile::new(src, relative, stat.size, stat.modified, stat.hash))
    }

    /// Close the catalog. The library should not be used afterwards.
    pub async fn close(&self) {
        self.db.close().await;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;

    /// A library over an in-memory catalog, rooted inside `dir`.
    pub(crate) async fn library(dir: &Path) -> Library {
        let db = Database::connect_in_memory().await.unwrap();
        Library::new(db, dir.join("books"), dir.join("cache"))
    }

    /// Write `contents` to `name` inside `dir/incoming`.
    pub(crate) fn incoming(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join("incoming").join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_prepare_file() {
        let dir = tempfile::tempdir().unwrap();
        let library = library(dir.path()).await;
        let src = incoming(dir.path(), "dune.epub", "spice");

        let file = library.prepare_file(&src, "Herbert, Frank/./Dune.epub").await.unwrap();
        assert_eq!(file.original_filename, src);
        assert_eq!(file.current_filename, Path::new("Herbert, Frank/Dune.epub"));
        assert_eq!(file.extension, "epub");
        assert_eq!(file.file_size, 5);
        assert_eq!(file.hash.len(), 64);
        assert_eq!(library.path_of(&file), dir.path().join("books/Herbert, Frank/Dune.epub"));
        library.close().await;
    }

    #[tokio::test]
    async fn test_prepare_file_avoids_occupied_names() {
        let dir = tempfile::tempdir().unwrap();
        let library = library(dir.path()).await;
        let src = incoming(dir.path(), "dune.epub", "spice");
        fs::create_dir_all(dir.path().join("books")).unwrap();
        fs::write(dir.path().join("books/Dune.epub"), "other").unwrap();

        let file = library.prepare_file(&src, "Dune.epub").await.unwrap();
        assert_eq!(file.current_filename, Path::new("Dune (1).epub"));
        library.close().await;
    }

    #[tokio::test]
    async fn test_prepare_file_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let library = library(dir.path()).await;
        let src = incoming(dir.path(), "dune.epub", "spice");
        let err = library.prepare_file(&src, "../Dune.epub").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Storage));
        library.close().await;
    }

    #[tokio::test]
    async fn test_open_persists_between_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog.db");
        let src = incoming(dir.path(), "dune.epub", "spice");

        let library = Library::open(&catalog, dir.path().join("books"), Durability::Strict).await.unwrap();
        assert_eq!(library.cache_dir(), dir.path().join("cache"));
        let file = library.prepare_file(&src, "Dune.epub").await.unwrap();
        let book = Book::new("Dune", ["Frank Herbert"]).with_file(file);
        library.import(book).await.unwrap();
        library.close().await;

        let library = Library::open(&catalog, dir.path().join("books"), Durability::Relaxed).await.unwrap();
        let found = library.search("dune").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].authors, vec!["Frank Herbert"]);
        library.close().await;
    }

    #[tokio::test]
    async fn test_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.library.catalog = dir.path().join("data/catalog.db");
        config.library.root = dir.path().join("books");
        config.library.mode = Mode::Move;
        config.search.page_size = 7;
        config.convert.program = Some(PathBuf::from("/opt/calibre/ebook-convert"));
        fs::create_dir_all(dir.path().join("data")).unwrap();

        let library = Library::from_config(&config).await.unwrap();
        assert_eq!(library.root(), dir.path().join("books"));
        assert_eq!(library.cache_dir(), dir.path().join("data/cache"));
        assert_eq!(library.mode, Mode::Move);
        assert_eq!(library.search.page_size, 7);
        assert_eq!(library.converter.as_ref().map(Converter::program), Some(Path::new("/opt/calibre/ebook-convert")));
        library.close().await;
    }

    #[tokio::test]
    async fn test_from_invalid_config() {
        let mut config = Config::default();
        config.library.root = PathBuf::from("relative/books");
        let err = Library::from_config(&config).await.err().unwrap();
        assert!(matches!(&*err, ErrorKind::Config));
    }
}
