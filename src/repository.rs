//! Book persistence.

use crate::book::{Book, NewBook};
use crate::error::ApiError;
use crate::pagination::{Page, PageRequest};
use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

/// Storage for book records
pub trait BookRepository: Send + Sync {
    fn find_by_id(&self, id: u64) -> Result<Option<Book>, ApiError>;

    /// Books ordered by id
    fn find_page(&self, request: PageRequest) -> Result<Page<Book>, ApiError>;

    /// Assigns ids and stores every book, returning the stored records
    fn save_all(&self, books: Vec<NewBook>) -> Result<Vec<Book>, ApiError>;

    /// Removing an id that is not stored is not an error
    fn delete_by_id(&self, id: u64) -> Result<(), ApiError>;

    fn exists_by_dedupe_id(&self, dedupe_id: &str) -> Result<bool, ApiError>;

    fn count(&self) -> Result<u64, ApiError>;
}

#[derive(Default)]
struct Tables {
    books: BTreeMap<u64, Book>,
    dedupe_ids: HashSet<String>,
    next_id: u64,
}

/// In-process repository; ids start at 1 and are never reused.
#[derive(Default)]
pub struct InMemoryBookRepository {
    tables: RwLock<Tables>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> ApiError {
        ApiError::Internal("Failed to acquire lock on book repository".to_string())
    }
}

impl BookRepository for InMemoryBookRepository {
    fn find_by_id(&self, id: u64) -> Result<Option<Book>, ApiError> {
        let tables = self.tables.read().map_err(|_| Self::poisoned())?;
        Ok(tables.books.get(&id).cloned())
    }

    fn find_page(&self, request: PageRequest) -> Result<Page<Book>, ApiError> {
        let tables = self.tables.read().map_err(|_| Self::poisoned())?;

        let content = tables
            .books
            .values()
            .skip(request.offset())
            .take(request.size as usize)
            .cloned()
            .collect();

        Ok(Page::new(content, request, tables.books.len() as u64))
    }

    fn save_all(&self, books: Vec<NewBook>) -> Result<Vec<Book>, ApiError> {
        let mut tables = self.tables.write().map_err(|_| Self::poisoned())?;

        let mut saved = Vec::with_capacity(books.len());
        for book in books {
            tables.next_id += 1;
            let book = Book::new(tables.next_id, book);
            tables.dedupe_ids.insert(book.dedupe_id().to_string());
            tables.books.insert(book.id, book.clone());
            saved.push(book);
        }

        Ok(saved)
    }

    fn delete_by_id(&self, id: u64) -> Result<(), ApiError> {
        let mut tables = self.tables.write().map_err(|_| Self::poisoned())?;

        if let Some(book) = tables.books.remove(&id) {
            tables.dedupe_ids.remove(book.dedupe_id());
        }

        Ok(())
    }

    fn exists_by_dedupe_id(&self, dedupe_id: &str) -> Result<bool, ApiError> {
        let tables = self.tables.read().map_err(|_| Self::poisoned())?;
        Ok(tables.dedupe_ids.contains(dedupe_id))
    }

    fn count(&self) -> Result<u64, ApiError> {
        let tables = self.tables.read().map_err(|_| Self::poisoned())?;
        Ok(tables.books.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_book(title: &str, pages: u32) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Iain M. Banks".to_string(),
            pages,
            book_number: 1,
            finished: None,
        }
    }

    #[test]
    fn test_save_assigns_sequential_ids() {
        let repo = InMemoryBookRepository::new();
        let saved = repo
            .save_all(vec![new_book("Excession", 451), new_book("Look to Windward", 357)])
            .unwrap();

        assert_eq!(saved[0].id, 1);
        assert_eq!(saved[1].id, 2);
        assert_eq!(repo.count().unwrap(), 2);
        assert_eq!(repo.find_by_id(2).unwrap().unwrap().title, "Look to Windward");
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let repo = InMemoryBookRepository::new();
        repo.save_all(vec![new_book("Excession", 451)]).unwrap();
        repo.delete_by_id(1).unwrap();

        let saved = repo.save_all(vec![new_book("Inversions", 343)]).unwrap();
        assert_eq!(saved[0].id, 2);
        assert!(repo.find_by_id(1).unwrap().is_none());
    }

    #[test]
    fn test_dedupe_ids_follow_deletes() {
        let repo = InMemoryBookRepository::new();
        repo.save_all(vec![new_book("Excession", 451)]).unwrap();
        assert!(repo.exists_by_dedupe_id("Excession451").unwrap());
        assert!(!repo.exists_by_dedupe_id("Excession452").unwrap());

        repo.delete_by_id(1).unwrap();
        assert!(!repo.exists_by_dedupe_id("Excession451").unwrap());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let repo = InMemoryBookRepository::new();
        assert!(repo.delete_by_id(42).is_ok());
    }

    #[test]
    fn test_find_page() {
        let repo = InMemoryBookRepository::new();
        let books = (1..=5).map(|n| new_book(&format!("Book {}", n), 100 + n)).collect();
        repo.save_all(books).unwrap();

        let page = repo.find_page(PageRequest::new(1, 2)).unwrap();
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 3);
        let ids: Vec<u64> = page.content.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![3, 4]);
    }
}
