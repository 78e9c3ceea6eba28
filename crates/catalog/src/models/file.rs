use crate::book::BookFile;
use crate::error::{Error, ErrorKind};
use crate::models::timestamp;
use exn::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};

#[derive(sqlx::FromRow)]
pub(crate) struct FileRow {
    pub(crate) id: i64,
    pub(crate) book_id: i64,
    pub(crate) extension: String,
    pub(crate) original_filename: String,
    pub(crate) filename: String,
    pub(crate) file_size: i64,
    pub(crate) file_mtime: i64,
    pub(crate) hash: String,
    pub(crate) regexp_name: String,
    pub(crate) template_override: Option<String>,
    pub(crate) source: Option<String>,
}

fn sqlx_hates_paths(path: &Path, field: &'static str) -> Result<String, Error> {
    Ok(path.to_str().ok_or_raise(|| ErrorKind::InvalidData(field))?.to_string())
}

impl FileRow {
    /// Build the row to insert for `file`, owned by `book_id`.
    pub(crate) fn new(book_id: i64, file: &BookFile) -> Result<Self, Error> {
        Ok(Self {
            id: file.id,
            book_id,
            extension: file.extension.clone(),
            original_filename: sqlx_hates_paths(&file.original_filename, "original filename")?,
            filename: sqlx_hates_paths(&file.current_filename, "filename")?,
            file_size: i64::try_from(file.file_size).or_raise(|| ErrorKind::InvalidData("file size"))?,
            file_mtime: file.file_mtime.unix_timestamp(),
            hash: file.hash.clone(),
            regexp_name: file.regexp_name.clone(),
            template_override: file.template_override.clone(),
            source: file.source.clone(),
        })
    }
}
impl TryFrom<FileRow> for BookFile {
    type Error = Error;
    fn try_from(row: FileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            extension: row.extension,
            original_filename: PathBuf::from(row.original_filename),
            current_filename: PathBuf::from(row.filename),
            file_size: u64::try_from(row.file_size).or_raise(|| ErrorKind::InvalidData("file size"))?,
            file_mtime: timestamp(row.file_mtime, "file modification date")?,
            hash: row.hash,
            regexp_name: row.regexp_name,
            template_override: row.template_override,
            source: row.source,
            tags: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::UtcDateTime;

    #[test]
    fn test_row_to_model() {
        let modified = UtcDateTime::now();
        let row = FileRow {
            id: 3,
            book_id: 1,
            extension: "epub".to_string(),
            original_filename: "/downloads/shining.epub".to_string(),
            filename: "King, Stephen/The Shining.epub".to_string(),
            file_size: 1024,
            file_mtime: modified.unix_timestamp(),
            hash: "692ed948ccd76c2230efe90175a519a3092b1862ab049704b7221738e56028ca".to_string(),
            regexp_name: "author-title".to_string(),
            template_override: None,
            source: Some("gutenberg".to_string()),
        };
        let file = BookFile::try_from(row).unwrap();
        assert_eq!(file.current_filename, Path::new("King, Stephen/The Shining.epub"));
        assert_eq!(file.file_size, 1024);
        // Unix timestamps are whole seconds.
        assert_eq!(file.file_mtime, modified.replace_nanosecond(0).unwrap());
        assert!(file.tags.is_empty());
    }

    #[test]
    fn test_model_to_row() {
        let file = BookFile::new("/downloads/shining.epub", "King, Stephen/The Shining.epub", 1024, UtcDateTime::now(), "abc")
            .with_source("gutenberg")
            .with_tags(["horror"]);
        let row = FileRow::new(9, &file).unwrap();
        assert_eq!(row.book_id, 9);
        assert_eq!(row.filename, "King, Stephen/The Shining.epub");
        assert_eq!(row.extension, "epub");
        assert_eq!(row.source.as_deref(), Some("gutenberg"));
    }

    #[test]
    fn test_negative_size_is_rejected() {
        let row = FileRow {
            id: 3,
            book_id: 1,
            extension: "epub".to_string(),
            original_filename: "a".to_string(),
            filename: "b".to_string(),
            file_size: -1,
            file_mtime: 0,
            hash: "abc".to_string(),
            regexp_name: String::new(),
            template_override: None,
            source: None,
        };
        assert!(BookFile::try_from(row).is_err());
    }
}
