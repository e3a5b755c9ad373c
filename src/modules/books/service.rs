use std::sync::Arc;

use super::error::BookError;
use super::models::{Book, BookDraft};
use super::repository::{BookRepository, Page, PageRequest};

/// Listing and persistence operations used by the book handlers.
#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    pub async fn find_all(&self) -> Result<Vec<Book>, BookError> {
        let books = self.repository.find_all().await?;
        tracing::debug!(count = books.len(), "loaded all books");
        Ok(books)
    }

    /// Point lookup; a missing row is [`BookError::NotFound`].
    pub async fn find_by_id(&self, id: i64) -> Result<Book, BookError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(BookError::NotFound(id))
    }

    pub async fn save(&self, draft: BookDraft) -> Result<Book, BookError> {
        let inserting = draft.id.is_none();
        let book = self.repository.save(draft).await?;
        tracing::info!(book_id = book.id, inserted = inserting, "book saved");
        Ok(book)
    }

    pub async fn find_page(&self, request: PageRequest) -> Result<Page<Book>, BookError> {
        self.repository.find_page(request).await
    }

    pub async fn count(&self) -> Result<u64, BookError> {
        self.repository.count().await
    }
}
