pub mod models;
pub mod service;

pub use models::{Author, AuthorFilter, AuthorInput, AuthorPatch};
pub use service::AuthorService;
