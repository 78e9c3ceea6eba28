//! Searching the catalog and retrieving books and files by id.
//!
//! Queries use SQLite FTS4 syntax. All fields are searched by default;
//! `field:terms` restricts a term to one of `author`, `title`, `series`,
//! `extension`, `tags`, `filename` or `source`, e.g.
//! `author:King title:Shining`.

pub mod error;

use crate::Library;
use crate::search::error::{ErrorKind, Result};
use exn::ResultExt;
use shelf_catalog::{Book, BookFile, SearchPage};
use tracing::instrument;

impl Library {
    /// Every book matching `query`.
    pub async fn search(&self, query: &str) -> Result<Vec<Book>> {
        self.repo.search(query).await.or_raise(|| ErrorKind::Catalog)
    }

    /// At most `limit` books matching `query`, skipping the first `offset`.
    ///
    /// [`more_results`](SearchPage::more_results) counts the matches past
    /// this page, up to `more_results_cap`. A `limit` of `0` returns every
    /// match and ignores `offset`.
    pub async fn search_paged(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
        more_results_cap: usize,
    ) -> Result<SearchPage> {
        self.repo.search_paged(query, offset, limit, more_results_cap).await.or_raise(|| ErrorKind::Catalog)
    }

    /// The zero-based `page` of books matching `query`, using the library's
    /// configured page size and "more results" cap.
    #[instrument(skip(self))]
    pub async fn search_page(&self, query: &str, page: usize) -> Result<SearchPage> {
        let offset = page.saturating_mul(self.search.page_size);
        self.search_paged(query, offset, self.search.page_size, self.search.more_results_cap).await
    }

    /// Books by id, in the order given. Unknown ids are skipped.
    pub async fn get_books_by_id(&self, ids: &[i64]) -> Result<Vec<Book>> {
        self.repo.get_books_by_id(ids).await.or_raise(|| ErrorKind::Catalog)
    }

    /// Files by id, with their tags.
    pub async fn get_files_by_id(&self, ids: &[i64]) -> Result<Vec<BookFile>> {
        self.repo.get_files_by_id(ids).await.or_raise(|| ErrorKind::Catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{incoming, library};
    use shelf_config::SearchConfig;
    use std::path::Path;

    async fn populate(library: &Library, dir: &Path) -> Vec<Book> {
        let mut books = Vec::new();
        for (i, title) in ["Carrie", "Christine", "Cujo", "Misery", "It"].into_iter().enumerate() {
            let src = incoming(dir, &format!("{i}.epub"), title);
            let file = library.prepare_file(&src, format!("King, Stephen/{title}.epub")).await.unwrap();
            let file = file.with_tags(["horror"]);
            let book = Book::new(title, ["Stephen King"]).with_file(file);
            books.push(library.import(book).await.unwrap().into_book());
        }
        books
    }

    #[tokio::test]
    async fn test_search_pages() {
        let dir = tempfile::tempdir().unwrap();
        let library = library(dir.path()).await.with_search(SearchConfig { page_size: 2, more_results_cap: 10 });
        populate(&library, dir.path()).await;

        let first = library.search_page("king", 0).await.unwrap();
        assert_eq!(first.books.len(), 2);
        assert_eq!(first.more_results, 3);
        let last = library.search_page("king", 2).await.unwrap();
        assert_eq!(last.books.len(), 1);
        assert_eq!(last.more_results, 0);

        let capped = library.search_paged("tags:horror", 0, 2, 1).await.unwrap();
        assert_eq!(capped.books.len(), 2);
        assert_eq!(capped.more_results, 1);
        assert_eq!(library.search("author:king").await.unwrap().len(), 5);
        library.close().await;
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let library = library(dir.path()).await;
        let books = populate(&library, dir.path()).await;

        let ids = [books[3].id, 9999, books[0].id];
        let found = library.get_books_by_id(&ids).await.unwrap();
        assert_eq!(found.iter().map(|b| b.title.as_str()).collect::<Vec<_>>(), ["Misery", "Carrie"]);
        assert_eq!(found[0].files[0].tags, vec!["horror"]);

        let files = library.get_files_by_id(&[books[1].files[0].id]).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].current_filename, Path::new("King, Stephen/Christine.epub"));
        assert!(library.get_books_by_id(&[]).await.unwrap().is_empty());
        library.close().await;
    }
}
