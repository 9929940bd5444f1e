use bookshelf_db::Document;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::query::{contains_ci, non_empty};

/// A catalog author. Names may repeat; authors carry no `updatedAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Document for Author {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Author {
    pub fn create(id: String, input: AuthorInput, now: OffsetDateTime) -> Self {
        Self {
            id,
            name: input.name.trim().to_string(),
            created_at: now,
        }
    }

    pub fn apply(mut self, patch: AuthorPatch) -> Self {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorInput {
    pub name: String,
}

impl AuthorInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorPatch {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorFilter {
    /// Case-insensitive substring of the name
    #[serde(default)]
    pub name: Option<String>,
}

impl AuthorFilter {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn matches(&self, author: &Author) -> bool {
        non_empty(&self.name).map_or(true, |name| contains_ci(&author.name, name))
    }
}
