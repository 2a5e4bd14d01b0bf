//! Author storage

use async_trait::async_trait;

use super::{
    postgres::{delete_error, write_error, PgTx},
    RowLock,
};
use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorRequest},
};

#[async_trait]
pub trait AuthorsTx {
    async fn list_authors(&mut self) -> AppResult<Vec<Author>>;

    async fn author_by_id(&mut self, id: i64, lock: RowLock) -> AppResult<Option<Author>>;

    /// Whether `name` is taken by any author other than `exclude_id`
    async fn author_name_exists(&mut self, name: &str, exclude_id: Option<i64>) -> AppResult<bool>;

    async fn insert_author(&mut self, data: &AuthorRequest) -> AppResult<Author>;

    async fn update_author(&mut self, id: i64, data: &AuthorRequest) -> AppResult<Author>;

    async fn delete_author(&mut self, id: i64) -> AppResult<()>;
}

#[async_trait]
impl AuthorsTx for PgTx {
    async fn list_authors(&mut self) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>(
            "SELECT id, name, biography, birth_date FROM authors ORDER BY id",
        )
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows)
    }

    async fn author_by_id(&mut self, id: i64, lock: RowLock) -> AppResult<Option<Author>> {
        let query = format!(
            "SELECT id, name, biography, birth_date FROM authors WHERE id = $1{}",
            lock.sql_suffix()
        );
        let author = sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(author)
    }

    async fn author_name_exists(&mut self, name: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM authors WHERE name = $1 AND ($2::BIGINT IS NULL OR id != $2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }

    async fn insert_author(&mut self, data: &AuthorRequest) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (name, biography, birth_date)
            VALUES ($1, $2, $3)
            RETURNING id, name, biography, birth_date
            "#,
        )
        .bind(&data.name)
        .bind(&data.biography)
        .bind(data.birth_date)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| write_error(e, &format!("Author with name '{}' already exists", data.name), "Author not found"))
    }

    async fn update_author(&mut self, id: i64, data: &AuthorRequest) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors SET name = $1, biography = $2, birth_date = $3
            WHERE id = $4
            RETURNING id, name, biography, birth_date
            "#,
        )
        .bind(&data.name)
        .bind(&data.biography)
        .bind(data.birth_date)
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| write_error(e, &format!("Author with name '{}' already exists", data.name), "Author not found"))?
        .ok_or_else(|| AppError::NotFound(format!("Author not found with id: {}", id)))
    }

    async fn delete_author(&mut self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| delete_error(e, "Cannot delete author with associated books"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author not found with id: {}", id)));
        }
        Ok(())
    }
}
