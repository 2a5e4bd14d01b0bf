//! Author service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorRequest},
    repository::{RowLock, Store},
};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Author not found with id: {}", id))
}

fn duplicate(name: &str) -> AppError {
    AppError::DuplicateKey(format!("Author with name '{}' already exists", name))
}

#[derive(Clone)]
pub struct AuthorsService {
    store: Arc<dyn Store>,
}

impl AuthorsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Author>> {
        let mut tx = self.store.begin().await?;
        tx.list_authors().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Author> {
        let mut tx = self.store.begin().await?;
        tx.author_by_id(id, RowLock::None).await?.ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, data: &AuthorRequest) -> AppResult<Author> {
        let mut tx = self.store.begin().await?;

        if tx.author_name_exists(&data.name, None).await? {
            return Err(duplicate(&data.name));
        }

        let author = tx.insert_author(data).await?;
        tx.commit().await?;

        tracing::info!("Created author {} ({})", author.id, author.name);
        Ok(author)
    }

    pub async fn update(&self, id: i64, data: &AuthorRequest) -> AppResult<Author> {
        let mut tx = self.store.begin().await?;

        let existing = tx
            .author_by_id(id, RowLock::Update)
            .await?
            .ok_or_else(|| not_found(id))?;

        if existing.name != data.name && tx.author_name_exists(&data.name, Some(id)).await? {
            return Err(duplicate(&data.name));
        }

        let author = tx.update_author(id, data).await?;
        tx.commit().await?;

        tracing::info!("Updated author {}", id);
        Ok(author)
    }

    /// Delete an author that no book references
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.store.begin().await?;

        tx.author_by_id(id, RowLock::Update)
            .await?
            .ok_or_else(|| not_found(id))?;

        let books = tx.count_books_by_author(id).await?;
        if books > 0 {
            tracing::debug!("Refusing to delete author {}: {} book(s) reference it", id, books);
            return Err(AppError::HasDependents(
                "Cannot delete author with associated books".to_string(),
            ));
        }

        tx.delete_author(id).await?;
        tx.commit().await?;

        tracing::info!("Deleted author {}", id);
        Ok(())
    }
}
