//! Genre service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::genre::{Genre, GenreRequest},
    repository::{RowLock, Store},
};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Genre not found with id: {}", id))
}

fn duplicate(name: &str) -> AppError {
    AppError::DuplicateKey(format!("Genre with name '{}' already exists", name))
}

#[derive(Clone)]
pub struct GenresService {
    store: Arc<dyn Store>,
}

impl GenresService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        let mut tx = self.store.begin().await?;
        tx.list_genres().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Genre> {
        let mut tx = self.store.begin().await?;
        tx.genre_by_id(id, RowLock::None).await?.ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, data: &GenreRequest) -> AppResult<Genre> {
        let mut tx = self.store.begin().await?;

        if tx.genre_name_exists(&data.name, None).await? {
            return Err(duplicate(&data.name));
        }

        let genre = tx.insert_genre(data).await?;
        tx.commit().await?;

        tracing::info!("Created genre {} ({})", genre.id, genre.name);
        Ok(genre)
    }

    pub async fn update(&self, id: i64, data: &GenreRequest) -> AppResult<Genre> {
        let mut tx = self.store.begin().await?;

        let existing = tx
            .genre_by_id(id, RowLock::Update)
            .await?
            .ok_or_else(|| not_found(id))?;

        if existing.name != data.name && tx.genre_name_exists(&data.name, Some(id)).await? {
            return Err(duplicate(&data.name));
        }

        let genre = tx.update_genre(id, data).await?;
        tx.commit().await?;

        tracing::info!("Updated genre {}", id);
        Ok(genre)
    }

    /// Delete a genre that no book references
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.store.begin().await?;

        tx.genre_by_id(id, RowLock::Update)
            .await?
            .ok_or_else(|| not_found(id))?;

        if tx.count_books_by_genre(id).await? > 0 {
            return Err(AppError::HasDependents(
                "Cannot delete genre with associated books".to_string(),
            ));
        }

        tx.delete_genre(id).await?;
        tx.commit().await?;

        tracing::info!("Deleted genre {}", id);
        Ok(())
    }
}
