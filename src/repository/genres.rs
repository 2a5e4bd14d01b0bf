//! Genre storage

use async_trait::async_trait;

use super::{
    postgres::{delete_error, write_error, PgTx},
    RowLock,
};
use crate::{
    error::{AppError, AppResult},
    models::genre::{Genre, GenreRequest},
};

#[async_trait]
pub trait GenresTx {
    async fn list_genres(&mut self) -> AppResult<Vec<Genre>>;

    async fn genre_by_id(&mut self, id: i64, lock: RowLock) -> AppResult<Option<Genre>>;

    /// Whether `name` is taken by any genre other than `exclude_id`
    async fn genre_name_exists(&mut self, name: &str, exclude_id: Option<i64>) -> AppResult<bool>;

    async fn insert_genre(&mut self, data: &GenreRequest) -> AppResult<Genre>;

    async fn update_genre(&mut self, id: i64, data: &GenreRequest) -> AppResult<Genre>;

    async fn delete_genre(&mut self, id: i64) -> AppResult<()>;
}

#[async_trait]
impl GenresTx for PgTx {
    async fn list_genres(&mut self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT id, name, description FROM genres ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn genre_by_id(&mut self, id: i64, lock: RowLock) -> AppResult<Option<Genre>> {
        let query = format!(
            "SELECT id, name, description FROM genres WHERE id = $1{}",
            lock.sql_suffix()
        );
        let genre = sqlx::query_as::<_, Genre>(&query)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(genre)
    }

    async fn genre_name_exists(&mut self, name: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM genres WHERE name = $1 AND ($2::BIGINT IS NULL OR id != $2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }

    async fn insert_genre(&mut self, data: &GenreRequest) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (name, description) VALUES ($1, $2) RETURNING id, name, description",
        )
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| write_error(e, &format!("Genre with name '{}' already exists", data.name), "Genre not found"))
    }

    async fn update_genre(&mut self, id: i64, data: &GenreRequest) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>(
            "UPDATE genres SET name = $1, description = $2 WHERE id = $3 RETURNING id, name, description",
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| write_error(e, &format!("Genre with name '{}' already exists", data.name), "Genre not found"))?
        .ok_or_else(|| AppError::NotFound(format!("Genre not found with id: {}", id)))
    }

    async fn delete_genre(&mut self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| delete_error(e, "Cannot delete genre with associated books"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Genre not found with id: {}", id)));
        }
        Ok(())
    }
}
