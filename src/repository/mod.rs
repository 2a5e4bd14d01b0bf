//! Repository layer for catalog and credential storage.
//!
//! Services never talk to a connection directly: every operation opens a
//! [`StoreTx`] through [`Store::begin`], runs its checks and writes on it and
//! commits. Dropping a transaction without committing rolls it back.

pub mod authors;
pub mod books;
pub mod genres;
pub mod memory;
pub mod postgres;
pub mod users;

use async_trait::async_trait;

use crate::error::AppResult;

pub use authors::AuthorsTx;
pub use books::BooksTx;
pub use genres::GenresTx;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use users::UsersTx;

/// Row lock taken when a row is read inside a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLock {
    None,
    /// Keeps the row from being deleted or updated until commit
    Share,
    /// Exclusive, for rows about to be updated or deleted
    Update,
}

impl RowLock {
    pub fn sql_suffix(&self) -> &'static str {
        match self {
            RowLock::None => "",
            RowLock::Share => " FOR SHARE",
            RowLock::Update => " FOR UPDATE",
        }
    }
}

/// Entry point to a storage backend
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a transaction
    async fn begin(&self) -> AppResult<Box<dyn StoreTx>>;

    /// Round trip to the backend, used by the readiness check
    async fn ping(&self) -> AppResult<()>;
}

/// One storage transaction covering every table
#[async_trait]
pub trait StoreTx: UsersTx + AuthorsTx + GenresTx + BooksTx + Send {
    async fn commit(self: Box<Self>) -> AppResult<()>;
}
