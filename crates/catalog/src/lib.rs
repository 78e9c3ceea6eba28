//! SQLite catalog of books, their authors, tags and files.
//!
//! # Architecture
//! The catalog stores:
//! - **Books**: logical works, identified by title plus the *ordered* list of
//!   author names. The same title credited in a different order is a
//!   different book.
//! - **Files**: physical artifacts of a book, keyed by content hash. A hash
//!   can only ever exist once in the catalog.
//! - **Authors** and **Tags**: name-keyed entities linked to books and files
//!   respectively.
//! - **Search documents**: one FTS4 row per book, denormalizing the author
//!   names, series, title and every file's extension, tags and source.
//!
//! Imports are staged inside a single transaction (see
//! [`Repository::stage_import`]) so the caller can place the file on disk
//! before deciding to commit.

mod book;
mod db;
pub mod error;
mod hydrate;
mod import;
mod index;
mod models;
mod repo;
mod resolve;
mod search;
mod upsert;

pub use crate::book::{Book, BookFile};
pub use crate::db::{Database, Durability};
pub use crate::import::StagedImport;
pub use crate::repo::Repository;
pub use crate::search::SearchPage;

/// Separator between author names in display strings and the search index.
pub const AUTHOR_SEPARATOR: &str = " & ";
