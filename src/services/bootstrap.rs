//! Start-up seeding of default accounts and a sample catalog

use chrono::NaiveDate;

use crate::{
    config::SeedConfig,
    error::{AppError, AppResult},
    models::{author::AuthorRequest, book::BookRequest, genre::GenreRequest, user::Role},
    services::Services,
};

/// Create the configured accounts and whichever sample catalog rows are missing.
///
/// Safe to run on every start: rows that already exist are left alone.
pub async fn seed(services: &Services, config: &SeedConfig) -> AppResult<()> {
    if !config.enabled {
        tracing::debug!("Seeding disabled");
        return Ok(());
    }

    ensure_user(
        services,
        &config.admin_username,
        &config.admin_email,
        &config.admin_password,
        Role::Admin,
    )
    .await?;
    ensure_user(
        services,
        &config.user_username,
        &config.user_email,
        &config.user_password,
        Role::User,
    )
    .await?;

    if config.sample_catalog {
        seed_catalog(services).await?;
    }

    Ok(())
}

async fn ensure_user(services: &Services, username: &str, email: &str, password: &str, role: Role) -> AppResult<()> {
    match services.auth.create_user(username, email, password, role).await {
        Ok(user) => {
            tracing::info!("Created default {} account '{}'", user.role, user.username);
            Ok(())
        }
        Err(AppError::DuplicateKey(_)) => {
            tracing::debug!("Default account '{}' already present", username);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn ensure_genre(services: &Services, name: &str, description: &str) -> AppResult<i64> {
    if let Some(genre) = services.genres.list().await?.into_iter().find(|g| g.name == name) {
        return Ok(genre.id);
    }
    let genre = services
        .genres
        .create(&GenreRequest {
            name: name.to_string(),
            description: Some(description.to_string()),
        })
        .await?;
    Ok(genre.id)
}

async fn ensure_author(services: &Services, name: &str, birth_date: Option<NaiveDate>) -> AppResult<i64> {
    if let Some(author) = services.authors.list().await?.into_iter().find(|a| a.name == name) {
        return Ok(author.id);
    }
    let author = services
        .authors
        .create(&AuthorRequest {
            name: name.to_string(),
            biography: Some(format!("Biography of {}", name)),
            birth_date,
        })
        .await?;
    Ok(author.id)
}

/// Each sample row is created only when no row with its natural key or title exists
async fn seed_catalog(services: &Services) -> AppResult<()> {
    let fiction = ensure_genre(services, "Fiction", "Fictional works").await?;
    let non_fiction = ensure_genre(services, "Non-Fiction", "Non-fictional works").await?;

    let author_one = ensure_author(services, "Author One", NaiveDate::from_ymd_opt(1970, 1, 1)).await?;
    let author_two = ensure_author(services, "Author Two", NaiveDate::from_ymd_opt(1980, 5, 15)).await?;

    let books = services.books.list().await?;
    let mut created = 0;
    for (title, isbn, author_id, genre_id) in [
        ("Book One", "1234567890", author_one, fiction),
        ("Book Two", "0987654321", author_two, non_fiction),
    ] {
        let present = books
            .iter()
            .any(|b| b.title == title || b.isbn.as_deref() == Some(isbn));
        if present {
            continue;
        }

        services
            .books
            .create(&BookRequest {
                title: title.to_string(),
                isbn: Some(isbn.to_string()),
                publication_date: NaiveDate::from_ymd_opt(2020, 1, 1),
                description: Some(format!("Description of {}", title)),
                author_id: Some(author_id),
                genre_id: Some(genre_id),
            })
            .await?;
        created += 1;
    }

    tracing::info!("Sample catalog checked, {} book(s) created", created);
    Ok(())
}
