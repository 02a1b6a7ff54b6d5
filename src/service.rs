use crate::book::{Book, NewBook};
use crate::cache::BookCache;
use crate::error::{ApiError, ApiResult};
use crate::pagination::{Page, PageRequest};
use crate::repository::BookRepository;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Book operations behind the HTTP layer: reads go through the cache, writes
/// keep it in step with the repository.
pub struct BookService {
    repository: Arc<dyn BookRepository>,
    cache: BookCache,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>, cache: BookCache) -> Self {
        Self { repository, cache }
    }

    pub fn find_by_id(&self, id: u64) -> ApiResult<Option<Book>> {
        let repository = &self.repository;
        self.cache.get_or_load(id, |id| repository.find_by_id(id))
    }

    pub fn find_all_paged(&self, request: PageRequest) -> ApiResult<Page<Book>> {
        self.repository.find_page(request)
    }

    /// Stores every book not already known by its dedupe key.
    ///
    /// Fails with [`ApiError::DuplicateEntity`] when nothing is left to store.
    pub fn save_all(&self, books: Vec<NewBook>) -> ApiResult<Vec<Book>> {
        let submitted = books.len();
        let mut seen = HashSet::new();
        let mut fresh = Vec::with_capacity(submitted);

        for book in books {
            let dedupe_id = book.dedupe_id();
            if !seen.insert(dedupe_id.clone()) || self.repository.exists_by_dedupe_id(&dedupe_id)? {
                debug!(dedupe_id = %dedupe_id, "Skipping duplicate book");
                continue;
            }
            fresh.push(book);
        }

        if fresh.is_empty() {
            return Err(ApiError::DuplicateEntity("Book(s) already exist".to_string()));
        }

        let saved = self.repository.save_all(fresh)?;
        for book in &saved {
            self.cache.put(book.clone());
        }

        info!(submitted, saved = saved.len(), "Saved books");
        Ok(saved)
    }

    /// Removes the book from the repository before evicting it, so a read
    /// racing the delete can not put it back in the cache.
    pub fn delete_by_id(&self, id: u64) -> ApiResult<()> {
        self.repository.delete_by_id(id)?;
        self.cache.evict(id);
        Ok(())
    }

    pub fn cache(&self) -> &BookCache {
        &self.cache
    }

    pub fn count(&self) -> ApiResult<u64> {
        self.repository.count()
    }
}
