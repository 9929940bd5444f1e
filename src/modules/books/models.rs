use bookshelf_db::Document;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::query::{contains_ci, non_empty, SortDirection};

/// A catalog book. Authors are referenced by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Server-generated identifier
    pub id: String,
    /// Non-empty; unique among books ignoring case (best effort)
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Ordered author references, not checked against the author collection
    #[serde(default)]
    pub author_ids: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Document for Book {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Book {
    /// Build a new book with `createdAt == updatedAt == now`.
    pub fn create(id: String, input: BookInput, now: OffsetDateTime) -> Self {
        Self {
            id,
            title: input.title.trim().to_string(),
            description: input.description.unwrap_or_default(),
            author_ids: input.author_ids,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overlay supplied fields and refresh `updatedAt`. `id` and `createdAt` never change.
    pub fn apply(mut self, patch: BookPatch, now: OffsetDateTime) -> Self {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(author_ids) = patch.author_ids {
            self.author_ids = author_ids;
        }
        self.updated_at = now;
        self
    }

    /// Lower-cased, trimmed title used for uniqueness checks.
    pub fn title_key(&self) -> String {
        self.title.trim().to_lowercase()
    }
}

/// Request model for creating a new book.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub author_ids: Vec<String>,
}

impl BookInput {
    pub fn new(title: impl Into<String>, description: impl Into<String>, author_ids: Vec<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            author_ids,
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author_ids: Option<Vec<String>>,
}

/// Conjunctive book filter. Empty strings are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookFilter {
    /// Case-insensitive substring of the title
    #[serde(default)]
    pub title: Option<String>,
    /// Case-insensitive substring of the description; books without one never match
    #[serde(default)]
    pub description: Option<String>,
    /// Exact membership in `authorIds`
    #[serde(default)]
    pub author_id: Option<String>,
    /// Case-insensitive substring of any referenced author's name
    #[serde(default)]
    pub author_name: Option<String>,
}

impl BookFilter {
    /// Author name query, if this filter needs the author collection.
    pub fn author_name(&self) -> Option<&str> {
        non_empty(&self.author_name)
    }

    /// Test every predicate except `authorName`, which is resolved by the caller into
    /// `named_author_ids`.
    pub fn matches(&self, book: &Book, named_author_ids: Option<&[String]>) -> bool {
        if let Some(title) = non_empty(&self.title) {
            if !contains_ci(&book.title, title) {
                return false;
            }
        }

        if let Some(description) = non_empty(&self.description) {
            if book.description.is_empty() || !contains_ci(&book.description, description) {
                return false;
            }
        }

        if let Some(author_id) = non_empty(&self.author_id) {
            if !book.author_ids.iter().any(|id| id == author_id) {
                return false;
            }
        }

        if let Some(named) = named_author_ids {
            if !book.author_ids.iter().any(|id| named.contains(id)) {
                return false;
            }
        }

        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookSortField {
    Title,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookSort {
    pub field: BookSortField,
    pub direction: SortDirection,
}
