//! Store behaviour against a live PostgreSQL database
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`

use std::sync::Arc;

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;

use library_server::{
    config::AuthConfig,
    error::AppError,
    models::{
        author::AuthorRequest,
        book::{BookData, BookRequest},
        genre::GenreRequest,
    },
    repository::{PgStore, Store},
    services::Services,
};

async fn pg_store() -> Arc<PgStore> {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Arc::new(PgStore::new(pool))
}

/// Suffix keeping rows from parallel tests apart
fn unique() -> String {
    Utc::now().timestamp_nanos_opt().unwrap_or_default().to_string()
}

fn author(name: &str) -> AuthorRequest {
    AuthorRequest {
        name: name.to_string(),
        biography: None,
        birth_date: None,
    }
}

fn book(title: &str, author_id: i64, genre_id: i64) -> BookRequest {
    BookRequest {
        title: title.to_string(),
        isbn: None,
        publication_date: None,
        description: None,
        author_id: Some(author_id),
        genre_id: Some(genre_id),
    }
}

async fn services() -> (Services, Arc<PgStore>) {
    let store = pg_store().await;
    (Services::new(store.clone(), &AuthConfig::default()), store)
}

#[tokio::test]
#[ignore]
async fn test_concurrent_duplicate_author_yields_one_row() {
    let (services, _) = services().await;
    let name = format!("Twin {}", unique());
    let (first, second) = (author(&name), author(&name));

    let (a, b) = tokio::join!(services.authors.create(&first), services.authors.create(&second));

    let created = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(created, 1, "{:?} / {:?}", a, b);
    assert!(matches!(a, Err(AppError::DuplicateKey(_))) || matches!(b, Err(AppError::DuplicateKey(_))));

    let matching = services
        .authors
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.name == name)
        .count();
    assert_eq!(matching, 1);
}

#[tokio::test]
#[ignore]
async fn test_delete_racing_dependent_insert_keeps_integrity() {
    let (services, _) = services().await;
    let suffix = unique();
    let writer = services.authors.create(&author(&format!("Racer {}", suffix))).await.unwrap();
    let genre = services
        .genres
        .create(&GenreRequest {
            name: format!("Race {}", suffix),
            description: None,
        })
        .await
        .unwrap();
    let request = book(&format!("Photo finish {}", suffix), writer.id, genre.id);

    let (deleted, created) = tokio::join!(services.authors.delete(writer.id), services.books.create(&request));

    match (&deleted, &created) {
        (Ok(()), Err(AppError::NotFound(_))) => {
            assert!(matches!(services.authors.get_by_id(writer.id).await, Err(AppError::NotFound(_))));
        }
        (Err(AppError::HasDependents(_)), Ok(book)) => {
            assert_eq!(services.books.get_by_id(book.id).await.unwrap().author_id, writer.id);
            assert!(services.authors.get_by_id(writer.id).await.is_ok());
        }
        other => panic!("Unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
#[ignore]
async fn test_unique_constraint_maps_to_duplicate() {
    let (services, store) = services().await;
    let name = format!("Constraint {}", unique());
    services.authors.create(&author(&name)).await.unwrap();

    // Straight to the store, skipping the service's existence check
    let mut tx = store.begin().await.unwrap();
    let result = tx.insert_author(&author(&name)).await;
    assert!(matches!(result, Err(AppError::DuplicateKey(_))), "{:?}", result);
}

#[tokio::test]
#[ignore]
async fn test_foreign_keys_map_to_not_found_and_dependents() {
    let (services, store) = services().await;
    let suffix = unique();
    let writer = services.authors.create(&author(&format!("Anchor {}", suffix))).await.unwrap();
    let genre = services
        .genres
        .create(&GenreRequest {
            name: format!("Anchor {}", suffix),
            description: None,
        })
        .await
        .unwrap();
    services
        .books
        .create(&book(&format!("Anchored {}", suffix), writer.id, genre.id))
        .await
        .unwrap();

    let mut tx = store.begin().await.unwrap();
    let result = tx.delete_author(writer.id).await;
    assert!(matches!(result, Err(AppError::HasDependents(_))), "{:?}", result);

    let mut tx = store.begin().await.unwrap();
    let result = tx
        .insert_book(&BookData {
            title: "Orphan".to_string(),
            isbn: None,
            publication_date: None,
            description: None,
            author_id: i64::MAX,
            genre_id: genre.id,
        })
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))), "{:?}", result);
}
