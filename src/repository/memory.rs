//! In-process backend for development runs and tests.
//!
//! The whole state sits behind one async mutex. A transaction owns the lock
//! for its lifetime, so concurrent transactions are serialized. Reads go to
//! the locked state directly; the first write takes a staged copy, which
//! commit publishes and drop discards.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{AuthorsTx, BooksTx, GenresTx, RowLock, Store, StoreTx, UsersTx};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorRequest},
        book::{Book, BookData},
        genre::{Genre, GenreRequest},
        user::{NewUser, User},
    },
};

#[derive(Debug, Clone)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: Table<User>,
    authors: Table<Author>,
    genres: Table<Genre>,
    books: Table<Book>,
}

/// Store kept entirely in memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn open(&self) -> MemoryTx {
        MemoryTx {
            guard: self.state.clone().lock_owned().await,
            staged: None,
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn StoreTx>> {
        Ok(Box::new(self.open().await))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Open memory transaction
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    /// Copy taken on the first write
    staged: Option<MemoryState>,
}

impl MemoryTx {
    fn state(&self) -> &MemoryState {
        self.staged.as_ref().unwrap_or(&*self.guard)
    }

    fn state_mut(&mut self) -> &mut MemoryState {
        let guard = &self.guard;
        self.staged.get_or_insert_with(|| MemoryState::clone(guard))
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTx { mut guard, staged } = *self;
        if let Some(staged) = staged {
            *guard = staged;
        }
        Ok(())
    }
}

#[async_trait]
impl UsersTx for MemoryTx {
    async fn user_by_username_or_email(&mut self, login: &str) -> AppResult<Option<User>> {
        let users = self.state().users.rows.values();
        let by_username = users.clone().find(|u| u.username == login);
        Ok(by_username
            .or_else(|| users.clone().find(|u| u.email == login))
            .cloned())
    }

    async fn username_exists(&mut self, username: &str) -> AppResult<bool> {
        Ok(self.state().users.rows.values().any(|u| u.username == username))
    }

    async fn email_exists(&mut self, email: &str) -> AppResult<bool> {
        Ok(self.state().users.rows.values().any(|u| u.email == email))
    }

    async fn insert_user(&mut self, user: &NewUser) -> AppResult<User> {
        if self.username_exists(&user.username).await? || self.email_exists(&user.email).await? {
            return Err(AppError::DuplicateKey("Username or email already exists".to_string()));
        }
        let table = &mut self.state_mut().users;
        let row = User {
            id: table.next_id(),
            username: user.username.clone(),
            email: user.email.clone(),
            password: user.password_hash.clone(),
            role: user.role,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }
}

#[async_trait]
impl AuthorsTx for MemoryTx {
    async fn list_authors(&mut self) -> AppResult<Vec<Author>> {
        Ok(self.state().authors.rows.values().cloned().collect())
    }

    async fn author_by_id(&mut self, id: i64, _lock: RowLock) -> AppResult<Option<Author>> {
        Ok(self.state().authors.rows.get(&id).cloned())
    }

    async fn author_name_exists(&mut self, name: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        Ok(self
            .state()
            .authors
            .rows
            .values()
            .any(|a| a.name == name && Some(a.id) != exclude_id))
    }

    async fn insert_author(&mut self, data: &AuthorRequest) -> AppResult<Author> {
        if self.author_name_exists(&data.name, None).await? {
            return Err(AppError::DuplicateKey(format!("Author with name '{}' already exists", data.name)));
        }
        let table = &mut self.state_mut().authors;
        let row = Author {
            id: table.next_id(),
            name: data.name.clone(),
            biography: data.biography.clone(),
            birth_date: data.birth_date,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_author(&mut self, id: i64, data: &AuthorRequest) -> AppResult<Author> {
        if self.author_name_exists(&data.name, Some(id)).await? {
            return Err(AppError::DuplicateKey(format!("Author with name '{}' already exists", data.name)));
        }
        let row = self
            .state_mut()
            .authors
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Author not found with id: {}", id)))?;
        row.name = data.name.clone();
        row.biography = data.biography.clone();
        row.birth_date = data.birth_date;
        Ok(row.clone())
    }

    async fn delete_author(&mut self, id: i64) -> AppResult<()> {
        if self.count_books_by_author(id).await? > 0 {
            return Err(AppError::HasDependents("Cannot delete author with associated books".to_string()));
        }
        self.state_mut()
            .authors
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Author not found with id: {}", id)))
    }
}

#[async_trait]
impl GenresTx for MemoryTx {
    async fn list_genres(&mut self) -> AppResult<Vec<Genre>> {
        Ok(self.state().genres.rows.values().cloned().collect())
    }

    async fn genre_by_id(&mut self, id: i64, _lock: RowLock) -> AppResult<Option<Genre>> {
        Ok(self.state().genres.rows.get(&id).cloned())
    }

    async fn genre_name_exists(&mut self, name: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        Ok(self
            .state()
            .genres
            .rows
            .values()
            .any(|g| g.name == name && Some(g.id) != exclude_id))
    }

    async fn insert_genre(&mut self, data: &GenreRequest) -> AppResult<Genre> {
        if self.genre_name_exists(&data.name, None).await? {
            return Err(AppError::DuplicateKey(format!("Genre with name '{}' already exists", data.name)));
        }
        let table = &mut self.state_mut().genres;
        let row = Genre {
            id: table.next_id(),
            name: data.name.clone(),
            description: data.description.clone(),
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_genre(&mut self, id: i64, data: &GenreRequest) -> AppResult<Genre> {
        if self.genre_name_exists(&data.name, Some(id)).await? {
            return Err(AppError::DuplicateKey(format!("Genre with name '{}' already exists", data.name)));
        }
        let row = self
            .state_mut()
            .genres
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Genre not found with id: {}", id)))?;
        row.name = data.name.clone();
        row.description = data.description.clone();
        Ok(row.clone())
    }

    async fn delete_genre(&mut self, id: i64) -> AppResult<()> {
        if self.count_books_by_genre(id).await? > 0 {
            return Err(AppError::HasDependents("Cannot delete genre with associated books".to_string()));
        }
        self.state_mut()
            .genres
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Genre not found with id: {}", id)))
    }
}

impl MemoryTx {
    /// Same guarantees the foreign keys and unique index give in PostgreSQL
    fn check_book_constraints(&self, data: &BookData, exclude_id: Option<i64>) -> AppResult<()> {
        if !self.state().authors.rows.contains_key(&data.author_id)
            || !self.state().genres.rows.contains_key(&data.genre_id)
        {
            return Err(AppError::NotFound("Author or genre not found".to_string()));
        }
        if let Some(isbn) = &data.isbn {
            let taken = self
                .state()
                .books
                .rows
                .values()
                .any(|b| b.isbn.as_ref() == Some(isbn) && Some(b.id) != exclude_id);
            if taken {
                return Err(AppError::DuplicateKey(format!("Book with ISBN '{}' already exists", isbn)));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BooksTx for MemoryTx {
    async fn list_books(&mut self) -> AppResult<Vec<Book>> {
        Ok(self.state().books.rows.values().cloned().collect())
    }

    async fn book_by_id(&mut self, id: i64, _lock: RowLock) -> AppResult<Option<Book>> {
        Ok(self.state().books.rows.get(&id).cloned())
    }

    async fn isbn_exists(&mut self, isbn: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        Ok(self
            .state()
            .books
            .rows
            .values()
            .any(|b| b.isbn.as_deref() == Some(isbn) && Some(b.id) != exclude_id))
    }

    async fn insert_book(&mut self, data: &BookData) -> AppResult<Book> {
        self.check_book_constraints(data, None)?;
        let table = &mut self.state_mut().books;
        let row = Book {
            id: table.next_id(),
            title: data.title.clone(),
            isbn: data.isbn.clone(),
            publication_date: data.publication_date,
            description: data.description.clone(),
            author_id: data.author_id,
            genre_id: data.genre_id,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_book(&mut self, id: i64, data: &BookData) -> AppResult<Book> {
        self.check_book_constraints(data, Some(id))?;
        let row = self
            .state_mut()
            .books
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book not found with id: {}", id)))?;
        row.title = data.title.clone();
        row.isbn = data.isbn.clone();
        row.publication_date = data.publication_date;
        row.description = data.description.clone();
        row.author_id = data.author_id;
        row.genre_id = data.genre_id;
        Ok(row.clone())
    }

    async fn delete_book(&mut self, id: i64) -> AppResult<()> {
        self.state_mut()
            .books
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Book not found with id: {}", id)))
    }

    async fn count_books_by_author(&mut self, author_id: i64) -> AppResult<i64> {
        Ok(self
            .state()
            .books
            .rows
            .values()
            .filter(|b| b.author_id == author_id)
            .count() as i64)
    }

    async fn count_books_by_genre(&mut self, genre_id: i64) -> AppResult<i64> {
        Ok(self
            .state()
            .books
            .rows
            .values()
            .filter(|b| b.genre_id == genre_id)
            .count() as i64)
    }
}
