//! Book service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookData, BookRequest},
    repository::{RowLock, Store, StoreTx},
};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Book not found with id: {}", id))
}

/// Blank ISBNs are stored as absent so they never collide
fn normalize_isbn(isbn: Option<&str>) -> Option<String> {
    isbn.map(str::trim)
        .filter(|isbn| !isbn.is_empty())
        .map(str::to_string)
}

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn Store>,
}

impl BooksService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let mut tx = self.store.begin().await?;
        tx.list_books().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        let mut tx = self.store.begin().await?;
        tx.book_by_id(id, RowLock::None).await?.ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, request: &BookRequest) -> AppResult<Book> {
        let data = Self::book_data(request)?;
        let mut tx = self.store.begin().await?;

        if let Some(isbn) = &data.isbn {
            if tx.isbn_exists(isbn, None).await? {
                return Err(AppError::DuplicateKey(format!(
                    "Book with ISBN '{}' already exists",
                    isbn
                )));
            }
        }
        Self::lock_references(tx.as_mut(), &data).await?;

        let book = tx.insert_book(&data).await?;
        tx.commit().await?;

        tracing::info!("Created book {} ({})", book.id, book.title);
        Ok(book)
    }

    /// Full replacement of a book's fields
    pub async fn update(&self, id: i64, request: &BookRequest) -> AppResult<Book> {
        let data = Self::book_data(request)?;
        let mut tx = self.store.begin().await?;

        let existing = tx
            .book_by_id(id, RowLock::Update)
            .await?
            .ok_or_else(|| not_found(id))?;

        if let Some(isbn) = &data.isbn {
            if existing.isbn.as_ref() != Some(isbn) && tx.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::DuplicateKey(format!(
                    "Book with ISBN '{}' already exists",
                    isbn
                )));
            }
        }
        Self::lock_references(tx.as_mut(), &data).await?;

        let book = tx.update_book(id, &data).await?;
        tx.commit().await?;

        tracing::info!("Updated book {}", id);
        Ok(book)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.store.begin().await?;

        tx.book_by_id(id, RowLock::Update)
            .await?
            .ok_or_else(|| not_found(id))?;

        tx.delete_book(id).await?;
        tx.commit().await?;

        tracing::info!("Deleted book {}", id);
        Ok(())
    }

    fn book_data(request: &BookRequest) -> AppResult<BookData> {
        let author_id = request
            .author_id
            .ok_or_else(|| AppError::BadRequest("Author ID is required".to_string()))?;
        let genre_id = request
            .genre_id
            .ok_or_else(|| AppError::BadRequest("Genre ID is required".to_string()))?;

        Ok(BookData {
            title: request.title.clone(),
            isbn: normalize_isbn(request.isbn.as_deref()),
            publication_date: request.publication_date,
            description: request.description.clone(),
            author_id,
            genre_id,
        })
    }

    /// Resolve author then genre, holding both until commit
    async fn lock_references(tx: &mut dyn StoreTx, data: &BookData) -> AppResult<()> {
        tx.author_by_id(data.author_id, RowLock::Share)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author not found with id: {}", data.author_id)))?;
        tx.genre_by_id(data.genre_id, RowLock::Share)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre not found with id: {}", data.genre_id)))?;
        Ok(())
    }
}
