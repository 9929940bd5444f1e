use bookshelf_db::{Collection, StoreResult};
use futures_util::future::try_join_all;

use super::models::{Author, AuthorFilter, AuthorInput, AuthorPatch};
use crate::error::{ServiceError, ServiceResult};
use crate::query::{paginate, Page, PageRequest};
use crate::utils;

/// Queries and mutations over the author collection.
///
/// Unlike books there is no uniqueness check: author names may repeat.
#[derive(Clone)]
pub struct AuthorService {
    authors: Collection<Author>,
}

impl AuthorService {
    pub fn new(authors: Collection<Author>) -> Self {
        Self { authors }
    }

    /// Filter and paginate a full scan. Store failures degrade to an empty page.
    pub async fn list_authors(&self, filter: Option<&AuthorFilter>, page: PageRequest) -> Page<Author> {
        match self.try_list_authors(filter, page).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(
                    operation = "listAuthors",
                    table = %self.authors.table(),
                    error = %e,
                    "error listing authors"
                );
                Page::empty()
            }
        }
    }

    async fn try_list_authors(
        &self,
        filter: Option<&AuthorFilter>,
        page: PageRequest,
    ) -> StoreResult<Page<Author>> {
        let mut items = self.authors.scan_all().await?;
        if let Some(filter) = filter {
            items.retain(|author| filter.matches(author));
        }
        Ok(paginate(items, page))
    }

    /// Store failures are logged and reported as absent.
    pub async fn get_author(&self, id: &str) -> Option<Author> {
        match self.try_get_author(id).await {
            Ok(author) => author,
            Err(e) => {
                tracing::error!(
                    operation = "getAuthor",
                    table = %self.authors.table(),
                    author_id = %id,
                    error = %e,
                    "error getting author"
                );
                None
            }
        }
    }

    /// Store failures propagate, so callers can tell a missing author from a failed read.
    pub async fn try_get_author(&self, id: &str) -> ServiceResult<Option<Author>> {
        Ok(self.authors.get(id).await?)
    }

    pub async fn create_author(&self, input: AuthorInput) -> ServiceResult<Author> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::empty_author_name());
        }

        let author = Author::create(utils::new_id(), input, utils::now());
        self.authors
            .put(&author)
            .await
            .map_err(ServiceError::write_failed("put"))?;

        tracing::info!(operation = "createAuthor", author_id = %author.id, "author created");
        Ok(author)
    }

    /// `Ok(None)` when the author does not exist.
    pub async fn update_author(&self, id: &str, patch: AuthorPatch) -> ServiceResult<Option<Author>> {
        if matches!(patch.name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(ServiceError::empty_author_name());
        }

        let Some(existing) = self.get_author(id).await else {
            return Ok(None);
        };

        let updated = existing.apply(patch);
        self.authors
            .put(&updated)
            .await
            .map_err(ServiceError::write_failed("put"))?;

        tracing::info!(operation = "updateAuthor", author_id = %id, "author updated");
        Ok(Some(updated))
    }

    /// Always `true` on success, whether or not the author existed.
    pub async fn delete_author(&self, id: &str) -> ServiceResult<bool> {
        self.authors.delete(id).await?;
        tracing::info!(operation = "deleteAuthor", author_id = %id, "author deleted");
        Ok(true)
    }

    /// Scan then delete every author concurrently. Not transactional.
    pub async fn delete_all_authors(&self) -> ServiceResult<bool> {
        let authors = self.authors.scan_all().await?;
        try_join_all(authors.iter().map(|author| self.authors.delete(&author.id))).await?;

        tracing::info!(operation = "deleteAllAuthors", count = authors.len(), "authors deleted");
        Ok(true)
    }
}
