//! PostgreSQL backend

use async_trait::async_trait;
use sqlx::{error::ErrorKind, Pool, Postgres, Transaction};

use super::{Store, StoreTx};
use crate::error::{AppError, AppResult};

/// Store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Open PostgreSQL transaction
pub struct PgTx {
    pub(super) tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

/// Translate a constraint violation raised by an INSERT or UPDATE.
///
/// The pre-checks in the services catch these cases first; this covers the
/// writer that raced past them.
pub(super) fn write_error(e: sqlx::Error, duplicate: &str, missing_reference: &str) -> AppError {
    match e.as_database_error().map(|db| db.kind()) {
        Some(ErrorKind::UniqueViolation) => AppError::DuplicateKey(duplicate.to_string()),
        Some(ErrorKind::ForeignKeyViolation) => AppError::NotFound(missing_reference.to_string()),
        _ => AppError::Database(e),
    }
}

/// Translate a foreign-key violation raised by a DELETE
pub(super) fn delete_error(e: sqlx::Error, dependents: &str) -> AppError {
    match e.as_database_error().map(|db| db.kind()) {
        Some(ErrorKind::ForeignKeyViolation) => AppError::HasDependents(dependents.to_string()),
        _ => AppError::Database(e),
    }
}
