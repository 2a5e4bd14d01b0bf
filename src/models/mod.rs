//! Data models for the library catalog

pub mod author;
pub mod book;
pub mod genre;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use genre::Genre;
pub use user::{Principal, Role, User};
