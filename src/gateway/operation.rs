//! Closed set of invocable operations, validated before anything reaches a service.

use serde::Deserialize;
use serde_json::Value;

use crate::modules::authors::{AuthorFilter, AuthorInput, AuthorPatch};
use crate::modules::books::{BookFilter, BookInput, BookPatch, BookSort};
use crate::query::PageRequest;

/// Wire shape of a gateway call: `{"operation": "listBooks", "arguments": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayRequest {
    pub operation: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", content = "arguments", rename_all = "camelCase")]
pub enum Operation {
    Health(NoArgs),
    ListBooks(ListBooksArgs),
    GetBook(IdArgs),
    SearchBooks(SearchArgs),
    CreateBook(CreateBookArgs),
    CreateBooks(CreateBooksArgs),
    UpdateBook(UpdateBookArgs),
    DeleteBook(IdArgs),
    DeleteAllBooks(NoArgs),
    ListAuthors(ListAuthorsArgs),
    GetAuthor(IdArgs),
    CreateAuthor(CreateAuthorArgs),
    UpdateAuthor(UpdateAuthorArgs),
    DeleteAuthor(IdArgs),
    DeleteAllAuthors(NoArgs),
    ResolveAuthorsOfBook(IdArgs),
    ResolveBooksOfAuthor(IdArgs),
}

impl Operation {
    /// Parse a raw request body.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        let request: GatewayRequest = serde_json::from_slice(body)?;
        Self::try_from(request)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Health(_) => "health",
            Operation::ListBooks(_) => "listBooks",
            Operation::GetBook(_) => "getBook",
            Operation::SearchBooks(_) => "searchBooks",
            Operation::CreateBook(_) => "createBook",
            Operation::CreateBooks(_) => "createBooks",
            Operation::UpdateBook(_) => "updateBook",
            Operation::DeleteBook(_) => "deleteBook",
            Operation::DeleteAllBooks(_) => "deleteAllBooks",
            Operation::ListAuthors(_) => "listAuthors",
            Operation::GetAuthor(_) => "getAuthor",
            Operation::CreateAuthor(_) => "createAuthor",
            Operation::UpdateAuthor(_) => "updateAuthor",
            Operation::DeleteAuthor(_) => "deleteAuthor",
            Operation::DeleteAllAuthors(_) => "deleteAllAuthors",
            Operation::ResolveAuthorsOfBook(_) => "resolveAuthorsOfBook",
            Operation::ResolveBooksOfAuthor(_) => "resolveBooksOfAuthor",
        }
    }
}

impl TryFrom<GatewayRequest> for Operation {
    type Error = serde_json::Error;

    fn try_from(request: GatewayRequest) -> Result<Self, Self::Error> {
        // Argument-less calls may omit `arguments` entirely
        let arguments = match request.arguments {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        serde_json::from_value(serde_json::json!({
            "operation": request.operation,
            "arguments": arguments,
        }))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoArgs {}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListBooksArgs {
    #[serde(default)]
    pub filter: Option<BookFilter>,
    #[serde(default)]
    pub sort: Option<BookSort>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

impl ListBooksArgs {
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.limit, self.offset)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchArgs {
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBookArgs {
    pub input: BookInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBooksArgs {
    pub inputs: Vec<BookInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateBookArgs {
    pub id: String,
    pub input: BookPatch,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListAuthorsArgs {
    #[serde(default)]
    pub filter: Option<AuthorFilter>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

impl ListAuthorsArgs {
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.limit, self.offset)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAuthorArgs {
    pub input: AuthorInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAuthorArgs {
    pub id: String,
    pub input: AuthorPatch,
}
