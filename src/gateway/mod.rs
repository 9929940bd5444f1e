//! Operation gateway: authenticates a call, dispatches it to the catalog services and maps
//! the outcome onto the transport error taxonomy.
//!
//! Read paths (`listBooks`, `listAuthors`, `searchBooks`, relationship resolution) never
//! fail on store errors; write paths surface validation, conflict and internal errors.

pub mod operation;
pub mod transport;

use std::sync::Arc;

use bookshelf_authz::ApiKeyGuard;
use bookshelf_db::{Collection, KeyValueStore};
use bookshelf_http::AppError;
use bookshelf_kernel::settings::Settings;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::Instrument;

use crate::error::{ServiceError, ServiceResult};
use crate::modules::authors::AuthorService;
use crate::modules::books::BookService;
use crate::modules::relations::{Relations, ScanBooksByAuthor};

pub use operation::{GatewayRequest, Operation};

pub struct Gateway {
    books: BookService,
    authors: AuthorService,
    relations: Relations,
    guard: ApiKeyGuard,
}

impl Gateway {
    pub fn new(
        books: BookService,
        authors: AuthorService,
        relations: Relations,
        guard: ApiKeyGuard,
    ) -> Self {
        Self {
            books,
            authors,
            relations,
            guard,
        }
    }

    /// Wire services over `backend` using the configured table names and API key.
    pub fn from_settings(backend: Arc<dyn KeyValueStore>, settings: &Settings) -> Self {
        let books = Collection::new(backend.clone(), settings.database.books_table.clone());
        let authors = Collection::new(backend, settings.database.authors_table.clone());

        Self::new(
            BookService::new(books.clone(), authors.clone()),
            AuthorService::new(authors.clone()),
            Relations::new(authors, Arc::new(ScanBooksByAuthor::new(books))),
            ApiKeyGuard::new(settings.auth.header.clone(), settings.auth.api_key.clone()),
        )
    }

    pub fn guard(&self) -> &ApiKeyGuard {
        &self.guard
    }

    pub fn books(&self) -> &BookService {
        &self.books
    }

    pub fn authors(&self) -> &AuthorService {
        &self.authors
    }

    pub fn relations(&self) -> &Relations {
        &self.relations
    }

    /// Authenticate, parse and run one call. Success is wrapped as `{"data": ...}`.
    pub async fn handle(&self, api_key: Option<&str>, body: &[u8]) -> Result<Value, AppError> {
        self.guard
            .validate(api_key)
            .map_err(|e| AppError::unauthenticated(e.to_string()))?;

        let operation = Operation::from_slice(body)
            .map_err(|e| AppError::bad_request(format!("invalid operation request: {}", e)))?;

        let span = tracing::info_span!("operation", operation = operation.name());
        let data = self.execute(operation).instrument(span).await?;

        Ok(json!({ "data": data }))
    }

    /// Run an already authenticated operation.
    pub async fn execute(&self, operation: Operation) -> ServiceResult<Value> {
        tracing::debug!(operation = operation.name(), "dispatching operation");

        match operation {
            Operation::Health(_) => encode("OK"),
            Operation::ListBooks(args) => {
                let page = args.page();
                encode(
                    self.books
                        .list_books(args.filter.as_ref(), args.sort, page)
                        .await,
                )
            }
            Operation::GetBook(args) => encode(self.books.get_book(&args.id).await?),
            Operation::SearchBooks(args) => encode(self.books.search_books(&args.query).await),
            Operation::CreateBook(args) => encode(self.books.create_book(args.input).await?),
            Operation::CreateBooks(args) => encode(self.books.create_books(args.inputs).await?),
            Operation::UpdateBook(args) => {
                encode(self.books.update_book(&args.id, args.input).await?)
            }
            Operation::DeleteBook(args) => encode(self.books.delete_book(&args.id).await?),
            Operation::DeleteAllBooks(_) => encode(self.books.delete_all_books().await?),
            Operation::ListAuthors(args) => {
                let page = args.page();
                encode(self.authors.list_authors(args.filter.as_ref(), page).await)
            }
            Operation::GetAuthor(args) => encode(self.authors.get_author(&args.id).await),
            Operation::CreateAuthor(args) => encode(self.authors.create_author(args.input).await?),
            Operation::UpdateAuthor(args) => {
                encode(self.authors.update_author(&args.id, args.input).await?)
            }
            Operation::DeleteAuthor(args) => encode(self.authors.delete_author(&args.id).await?),
            Operation::DeleteAllAuthors(_) => encode(self.authors.delete_all_authors().await?),
            Operation::ResolveAuthorsOfBook(args) => match self.books.get_book(&args.id).await {
                Ok(Some(book)) => encode(self.relations.authors_of_book(&book).await),
                Ok(None) => Err(ServiceError::book_not_found(&args.id)),
                Err(e) => {
                    tracing::warn!(
                        book_id = %args.id,
                        error = %e,
                        "book lookup failed; no authors resolved"
                    );
                    encode(Vec::<Value>::new())
                }
            },
            Operation::ResolveBooksOfAuthor(args) => {
                match self.authors.try_get_author(&args.id).await {
                    Ok(Some(author)) => encode(self.relations.books_of_author(&author).await),
                    Ok(None) => Err(ServiceError::author_not_found(&args.id)),
                    Err(e) => {
                        tracing::warn!(
                            author_id = %args.id,
                            error = %e,
                            "author lookup failed; no books resolved"
                        );
                        encode(Vec::<Value>::new())
                    }
                }
            }
        }
    }
}

fn encode<T: Serialize>(value: T) -> ServiceResult<Value> {
    Ok(serde_json::to_value(value)?)
}
