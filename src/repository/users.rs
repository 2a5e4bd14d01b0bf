//! Credential storage

use async_trait::async_trait;

use super::postgres::{write_error, PgTx};
use crate::{
    error::AppResult,
    models::user::{NewUser, User},
};

#[async_trait]
pub trait UsersTx {
    /// Look a user up by username, falling back to email
    async fn user_by_username_or_email(&mut self, login: &str) -> AppResult<Option<User>>;

    async fn username_exists(&mut self, username: &str) -> AppResult<bool>;

    async fn email_exists(&mut self, email: &str) -> AppResult<bool>;

    async fn insert_user(&mut self, user: &NewUser) -> AppResult<User>;
}

#[async_trait]
impl UsersTx for PgTx {
    async fn user_by_username_or_email(&mut self, login: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, role
            FROM users
            WHERE username = $1 OR email = $1
            ORDER BY (username = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(login)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(user)
    }

    async fn username_exists(&mut self, username: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(exists)
    }

    async fn email_exists(&mut self, email: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(exists)
    }

    async fn insert_user(&mut self, user: &NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password, role
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| write_error(e, "Username or email already exists", "User not found"))
    }
}
