use std::collections::HashSet;

use bookshelf_db::{Collection, StoreResult};
use futures_util::future::try_join_all;

use super::models::{Book, BookFilter, BookInput, BookPatch, BookSort, BookSortField};
use crate::error::{ServiceError, ServiceResult};
use crate::modules::authors::models::{Author, AuthorFilter};
use crate::query::{paginate, sort_by_key, Page, PageRequest};
use crate::utils;

/// Query engine and mutation coordinator for the book collection.
///
/// Title uniqueness is a check-then-act over a scan followed by a separate `put`; nothing
/// locks between the two, so concurrent creates of the same title can both succeed.
#[derive(Clone)]
pub struct BookService {
    books: Collection<Book>,
    authors: Collection<Author>,
}

impl BookService {
    pub fn new(books: Collection<Book>, authors: Collection<Author>) -> Self {
        Self { books, authors }
    }

    /// Filter, sort and paginate a full scan. Store failures degrade to an empty page.
    pub async fn list_books(
        &self,
        filter: Option<&BookFilter>,
        sort: Option<BookSort>,
        page: PageRequest,
    ) -> Page<Book> {
        match self.try_list_books(filter, sort, page).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(
                    operation = "listBooks",
                    table = %self.books.table(),
                    error = %e,
                    "error listing books"
                );
                Page::empty()
            }
        }
    }

    async fn try_list_books(
        &self,
        filter: Option<&BookFilter>,
        sort: Option<BookSort>,
        page: PageRequest,
    ) -> StoreResult<Page<Book>> {
        let mut items = self.books.scan_all().await?;

        if let Some(filter) = filter {
            // authorName costs an extra scan of the author collection
            let named_author_ids = match filter.author_name() {
                Some(name) => Some(self.author_ids_named(name).await?),
                None => None,
            };
            items.retain(|book| filter.matches(book, named_author_ids.as_deref()));
        }

        if let Some(sort) = sort {
            sort_books(&mut items, sort);
        }

        Ok(paginate(items, page))
    }

    async fn author_ids_named(&self, name: &str) -> StoreResult<Vec<String>> {
        let filter = AuthorFilter::by_name(name);
        Ok(self
            .authors
            .scan_all()
            .await?
            .into_iter()
            .filter(|author| filter.matches(author))
            .map(|author| author.id)
            .collect())
    }

    /// Store failures propagate.
    pub async fn get_book(&self, id: &str) -> ServiceResult<Option<Book>> {
        Ok(self.books.get(id).await?)
    }

    /// Every book whose title or description contains `query`, ignoring case. Unpaginated;
    /// store failures degrade to no matches.
    pub async fn search_books(&self, query: &str) -> Vec<Book> {
        match self.books.scan_all().await {
            Ok(books) => {
                let needle = query.to_lowercase();
                books
                    .into_iter()
                    .filter(|book| {
                        book.title.to_lowercase().contains(&needle)
                            || (!book.description.is_empty()
                                && book.description.to_lowercase().contains(&needle))
                    })
                    .collect()
            }
            Err(e) => {
                tracing::error!(
                    operation = "searchBooks",
                    table = %self.books.table(),
                    error = %e,
                    "error searching books"
                );
                Vec::new()
            }
        }
    }

    pub async fn create_book(&self, input: BookInput) -> ServiceResult<Book> {
        let title = validate_title(&input.title)?;
        self.ensure_title_available(title, None).await?;

        let book = Book::create(utils::new_id(), input, utils::now());
        self.books
            .put(&book)
            .await
            .map_err(ServiceError::write_failed("put"))?;

        tracing::info!(operation = "createBook", book_id = %book.id, "book created");
        Ok(book)
    }

    /// Validate the whole batch, then persist every book concurrently.
    ///
    /// Titles are checked against each other and against the stored collection before any
    /// write. A store failure during the concurrent writes is not rolled back: books already
    /// written stay written.
    pub async fn create_books(&self, inputs: Vec<BookInput>) -> ServiceResult<Vec<Book>> {
        let mut seen = HashSet::with_capacity(inputs.len());
        for input in &inputs {
            let title = validate_title(&input.title)?;
            if !seen.insert(title.to_lowercase()) {
                return Err(ServiceError::Validation(format!(
                    "Duplicate title \"{}\" in batch input.",
                    title
                )));
            }
        }

        for input in &inputs {
            self.ensure_title_available(input.title.trim(), None).await?;
        }

        let books: Vec<Book> = inputs
            .into_iter()
            .map(|input| Book::create(utils::new_id(), input, utils::now()))
            .collect();

        try_join_all(books.iter().map(|book| self.books.put(book)))
            .await
            .map_err(ServiceError::write_failed("batch put"))?;

        tracing::info!(operation = "createBooks", count = books.len(), "books created");
        Ok(books)
    }

    /// `Ok(None)` when the book does not exist. A changed title is re-checked for
    /// uniqueness, ignoring the book itself.
    pub async fn update_book(&self, id: &str, patch: BookPatch) -> ServiceResult<Option<Book>> {
        let Some(existing) = self.books.get(id).await? else {
            return Ok(None);
        };

        if let Some(title) = patch.title.as_deref() {
            let title = validate_title(title)?;
            if title.to_lowercase() != existing.title_key() {
                self.ensure_title_available(title, Some(id)).await?;
            }
        }

        let updated = existing.apply(patch, utils::now());
        self.books
            .put(&updated)
            .await
            .map_err(ServiceError::write_failed("put"))?;

        tracing::info!(operation = "updateBook", book_id = %id, "book updated");
        Ok(Some(updated))
    }

    /// Always `true` on success, whether or not the book existed. Store failures propagate.
    pub async fn delete_book(&self, id: &str) -> ServiceResult<bool> {
        self.books.delete(id).await?;
        tracing::info!(operation = "deleteBook", book_id = %id, "book deleted");
        Ok(true)
    }

    /// Scan then delete every book concurrently. Not transactional.
    pub async fn delete_all_books(&self) -> ServiceResult<bool> {
        let books = self.books.scan_all().await?;
        try_join_all(books.iter().map(|book| self.books.delete(&book.id))).await?;

        tracing::info!(operation = "deleteAllBooks", count = books.len(), "books deleted");
        Ok(true)
    }

    /// Conflict if another book already has `title`, ignoring case.
    ///
    /// Candidates come from [`Self::search_books`], so a failing scan finds no conflict.
    async fn ensure_title_available(&self, title: &str, except_id: Option<&str>) -> ServiceResult<()> {
        let wanted = title.to_lowercase();
        let clash = self
            .search_books(title)
            .await
            .into_iter()
            .find(|book| book.title_key() == wanted && Some(book.id.as_str()) != except_id);

        match clash {
            Some(existing) => {
                tracing::warn!(
                    title = %title,
                    existing_id = %existing.id,
                    "duplicate book title rejected"
                );
                Err(ServiceError::duplicate_title(title))
            }
            None => Ok(()),
        }
    }
}

fn validate_title(title: &str) -> ServiceResult<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        Err(ServiceError::empty_title())
    } else {
        Ok(trimmed)
    }
}

fn sort_books(items: &mut [Book], sort: BookSort) {
    match sort.field {
        BookSortField::Title => sort_by_key(items, sort.direction, |b| b.title.clone()),
        BookSortField::Description => {
            sort_by_key(items, sort.direction, |b| b.description.clone())
        }
        BookSortField::CreatedAt => sort_by_key(items, sort.direction, |b| b.created_at),
        BookSortField::UpdatedAt => sort_by_key(items, sort.direction, |b| b.updated_at),
    }
}
