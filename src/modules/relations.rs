//! Book ↔ author resolution.
//!
//! Only the forward reference (`Book.authorIds`) is stored. The reverse direction sits
//! behind [`BooksByAuthor`] so an indexed lookup can replace the scan without changing
//! which books are returned.

use std::sync::Arc;

use async_trait::async_trait;
use bookshelf_db::{Collection, StoreResult};
use futures_util::future::try_join_all;

use super::authors::models::Author;
use super::books::models::Book;

/// Reverse lookup from an author id to the books that reference it.
#[async_trait]
pub trait BooksByAuthor: Send + Sync {
    async fn books_by_author(&self, author_id: &str) -> StoreResult<Vec<Book>>;
}

/// Unindexed lookup: scans every book and tests membership, O(total books).
pub struct ScanBooksByAuthor {
    books: Collection<Book>,
}

impl ScanBooksByAuthor {
    pub fn new(books: Collection<Book>) -> Self {
        Self { books }
    }
}

#[async_trait]
impl BooksByAuthor for ScanBooksByAuthor {
    async fn books_by_author(&self, author_id: &str) -> StoreResult<Vec<Book>> {
        Ok(self
            .books
            .scan_all()
            .await?
            .into_iter()
            .filter(|book| book.author_ids.iter().any(|id| id == author_id))
            .collect())
    }
}

/// Lazily resolves relationship fields. Never fails: a broken relationship yields an
/// empty list so the rest of a response survives.
#[derive(Clone)]
pub struct Relations {
    authors: Collection<Author>,
    books_by_author: Arc<dyn BooksByAuthor>,
}

impl Relations {
    pub fn new(authors: Collection<Author>, books_by_author: Arc<dyn BooksByAuthor>) -> Self {
        Self {
            authors,
            books_by_author,
        }
    }

    /// Fetch every referenced author concurrently, in `authorIds` order. Ids that no
    /// longer resolve are dropped.
    pub async fn authors_of_book(&self, book: &Book) -> Vec<Author> {
        let lookups = book.author_ids.iter().map(|id| self.authors.get(id));
        match try_join_all(lookups).await {
            Ok(found) => {
                let authors: Vec<Author> = found.into_iter().flatten().collect();
                if authors.len() < book.author_ids.len() {
                    tracing::debug!(
                        book_id = %book.id,
                        missing = book.author_ids.len() - authors.len(),
                        "dropped unresolved author ids"
                    );
                }
                authors
            }
            Err(e) => {
                tracing::error!(book_id = %book.id, error = %e, "error resolving book authors");
                Vec::new()
            }
        }
    }

    pub async fn books_of_author(&self, author: &Author) -> Vec<Book> {
        match self.books_by_author.books_by_author(&author.id).await {
            Ok(books) => books,
            Err(e) => {
                tracing::error!(author_id = %author.id, error = %e, "error resolving author books");
                Vec::new()
            }
        }
    }
}
