//! Catalog models.
//!
//! A [`Book`] is a logical work identified by its title and its *ordered* list
//! of authors. Each [`BookFile`] is one physical artifact of that work,
//! deduplicated across the whole catalog by its content hash.

use std::path::PathBuf;
use time::UtcDateTime;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Catalog identifier (`0` until the book has been imported).
    pub id: i64,
    /// Author names, in credit order. The order is part of the book's identity.
    pub authors: Vec<String>,
    pub title: String,
    pub series: Option<String>,
    pub files: Vec<BookFile>,
    pub created_on: Option<UtcDateTime>,
    pub updated_on: Option<UtcDateTime>,
}
impl Book {
    pub fn new<A, S>(title: impl Into<String>, authors: A) -> Self
    where
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: 0,
            authors: authors.into_iter().map(Into::into).collect(),
            title: title.into(),
            series: None,
            files: Vec::new(),
            created_on: None,
            updated_on: None,
        }
    }

    pub fn with_series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }

    pub fn with_file(mut self, file: BookFile) -> Self {
        self.files.push(file);
        self
    }

    /// Author names joined the way they're displayed and indexed.
    pub fn joined_authors(&self) -> String {
        self.authors.join(crate::AUTHOR_SEPARATOR)
    }
}

/// A physical file belonging to a [`Book`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFile {
    /// Catalog identifier (`0` until the file has been imported).
    pub id: i64,
    /// File extension without the leading dot (e.g. `"epub"`).
    pub extension: String,
    /// Where the file was imported from.
    pub original_filename: PathBuf,
    /// Where the file lives, relative to the library root.
    pub current_filename: PathBuf,
    pub file_size: u64,
    pub file_mtime: UtcDateTime,
    /// Content hash; unique across the whole catalog.
    pub hash: String,
    /// Name of the filename pattern that matched on import.
    pub regexp_name: String,
    pub template_override: Option<String>,
    /// Free-form note about where the file came from.
    pub source: Option<String>,
    /// Tag names, in the order they were attached.
    pub tags: Vec<String>,
}
impl BookFile {
    pub fn new(
        original_filename: impl Into<PathBuf>,
        current_filename: impl Into<PathBuf>,
        file_size: u64,
        file_mtime: UtcDateTime,
        hash: impl Into<String>,
    ) -> Self {
        let current_filename = current_filename.into();
        let extension = current_filename
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            id: 0,
            extension,
            original_filename: original_filename.into(),
            current_filename,
            file_size,
            file_mtime,
            hash: hash.into(),
            regexp_name: String::new(),
            template_override: None,
            source: None,
            tags: Vec::new(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_regexp_name(mut self, regexp_name: impl Into<String>) -> Self {
        self.regexp_name = regexp_name.into();
        self
    }

    pub fn with_template_override(mut self, template: impl Into<String>) -> Self {
        self.template_override = Some(template.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_tags<T, S>(mut self, tags: T) -> Self
    where
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}
