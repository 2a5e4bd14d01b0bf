//! Book storage, including the dependent-row lookups used to guard author
//! and genre deletion

use async_trait::async_trait;

use super::{
    postgres::{write_error, PgTx},
    RowLock,
};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookData},
};

const BOOK_COLUMNS: &str = "id, title, isbn, publication_date, description, author_id, genre_id";

#[async_trait]
pub trait BooksTx {
    async fn list_books(&mut self) -> AppResult<Vec<Book>>;

    async fn book_by_id(&mut self, id: i64, lock: RowLock) -> AppResult<Option<Book>>;

    /// Whether `isbn` is taken by any book other than `exclude_id`
    async fn isbn_exists(&mut self, isbn: &str, exclude_id: Option<i64>) -> AppResult<bool>;

    async fn insert_book(&mut self, data: &BookData) -> AppResult<Book>;

    async fn update_book(&mut self, id: i64, data: &BookData) -> AppResult<Book>;

    async fn delete_book(&mut self, id: i64) -> AppResult<()>;

    async fn count_books_by_author(&mut self, author_id: i64) -> AppResult<i64>;

    async fn count_books_by_genre(&mut self, genre_id: i64) -> AppResult<i64>;
}

fn duplicate_isbn(data: &BookData) -> String {
    format!(
        "Book with ISBN '{}' already exists",
        data.isbn.as_deref().unwrap_or_default()
    )
}

#[async_trait]
impl BooksTx for PgTx {
    async fn list_books(&mut self) -> AppResult<Vec<Book>> {
        let query = format!("SELECT {} FROM books ORDER BY id", BOOK_COLUMNS);
        let rows = sqlx::query_as::<_, Book>(&query)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn book_by_id(&mut self, id: i64, lock: RowLock) -> AppResult<Option<Book>> {
        let query = format!(
            "SELECT {} FROM books WHERE id = $1{}",
            BOOK_COLUMNS,
            lock.sql_suffix()
        );
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(book)
    }

    async fn isbn_exists(&mut self, isbn: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND ($2::BIGINT IS NULL OR id != $2))",
        )
        .bind(isbn)
        .bind(exclude_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }

    async fn insert_book(&mut self, data: &BookData) -> AppResult<Book> {
        let query = format!(
            r#"
            INSERT INTO books (title, isbn, publication_date, description, author_id, genre_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(&data.title)
            .bind(&data.isbn)
            .bind(data.publication_date)
            .bind(&data.description)
            .bind(data.author_id)
            .bind(data.genre_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| write_error(e, &duplicate_isbn(data), "Author or genre not found"))
    }

    async fn update_book(&mut self, id: i64, data: &BookData) -> AppResult<Book> {
        let query = format!(
            r#"
            UPDATE books
            SET title = $1, isbn = $2, publication_date = $3, description = $4,
                author_id = $5, genre_id = $6
            WHERE id = $7
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(&data.title)
            .bind(&data.isbn)
            .bind(data.publication_date)
            .bind(&data.description)
            .bind(data.author_id)
            .bind(data.genre_id)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| write_error(e, &duplicate_isbn(data), "Author or genre not found"))?
            .ok_or_else(|| AppError::NotFound(format!("Book not found with id: {}", id)))
    }

    async fn delete_book(&mut self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book not found with id: {}", id)));
        }
        Ok(())
    }

    async fn count_books_by_author(&mut self, author_id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count)
    }

    async fn count_books_by_genre(&mut self, genre_id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE genre_id = $1")
            .bind(genre_id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count)
    }
}
