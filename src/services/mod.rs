//! Business logic services

pub mod auth;
pub mod authors;
pub mod books;
pub mod bootstrap;
pub mod genres;
pub mod tokens;

use std::sync::Arc;

use crate::{config::AuthConfig, error::AppResult, repository::Store};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub authors: authors::AuthorsService,
    pub genres: genres::GenresService,
    pub books: books::BooksService,
    store: Arc<dyn Store>,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: Arc<dyn Store>, auth_config: &AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(store.clone(), tokens::TokenCodec::from_config(auth_config)),
            authors: authors::AuthorsService::new(store.clone()),
            genres: genres::GenresService::new(store.clone()),
            books: books::BooksService::new(store.clone()),
            store,
        }
    }

    /// Storage round trip for the readiness check
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
