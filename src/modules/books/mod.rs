//! Book collection: models plus the query engine and mutation coordinator.

pub mod models;
pub mod service;

pub use models::{Book, BookFilter, BookInput, BookPatch, BookSort, BookSortField};
pub use service::BookService;
