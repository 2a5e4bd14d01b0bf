//! API integration tests

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use library_server::services::tokens::TokenCodec;

use crate::common::{app, login, send};

#[tokio::test]
async fn test_health_check() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books/{id}"].is_object());
}

#[tokio::test]
async fn test_login() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "admin" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["type"], "Bearer");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = app().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "nobody", "password": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_and_read_catalog() {
    let app = app().await;

    let (status, user) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "username": "alice", "email": "alice@x.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["username"], "alice");
    assert_eq!(user["role"], "ROLE_USER");
    assert!(user.get("password").is_none());

    let token = login(&app, "alice", "secret1").await;

    let (status, me) = send(&app, Method::GET, "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["roles"], json!(["ROLE_USER"]));

    let (status, authors) = send(&app, Method::GET, "/api/v1/authors", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(authors, json!([]));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/authors",
        Some(&token),
        Some(json!({ "name": "Orwell" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_invalid_input() {
    let app = app().await;
    let alice = json!({ "username": "alice", "email": "alice@x.com", "password": "secret1" });

    let (status, _) = send(&app, Method::POST, "/api/v1/auth/register", None, Some(alice.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, Method::POST, "/api/v1/auth/register", None, Some(alice)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "username": "bob", "email": "not-an-email", "password": "123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["email"].is_string());
    assert!(body["fields"]["password"].is_string());
}

#[tokio::test]
async fn test_register_cannot_choose_role() {
    let app = app().await;

    let (status, user) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "username": "mallory",
            "email": "mallory@x.com",
            "password": "secret1",
            "role": "ROLE_ADMIN"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["role"], "ROLE_USER");
}

#[tokio::test]
async fn test_protected_routes_require_valid_token() {
    let app = app().await;

    let (status, _) = send(&app, Method::GET, "/api/v1/books", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/v1/books", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/v1/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Correct secret, but already expired
    let codec = TokenCodec::new("integration-test-secret", Duration::hours(1));
    let expired = codec
        .issue("admin", &["ROLE_ADMIN".to_string()], Utc::now() - Duration::hours(2))
        .unwrap();
    let (status, _) = send(&app, Method::GET, "/api/v1/books", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Valid signature from another deployment
    let foreign = TokenCodec::new("other-secret", Duration::hours(1))
        .issue("admin", &["ROLE_ADMIN".to_string()], Utc::now())
        .unwrap();
    let (status, _) = send(&app, Method::GET, "/api/v1/books", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_author_with_books_cannot_be_deleted() {
    let app = app().await;
    let admin = login(&app, "admin", "admin").await;

    let (status, author) = send(
        &app,
        Method::POST,
        "/api/v1/authors",
        Some(&admin),
        Some(json!({ "name": "Orwell", "birthDate": "1903-06-25" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(author["birthDate"], "1903-06-25");
    let author_id = author["id"].as_i64().unwrap();

    let (status, genre) = send(
        &app,
        Method::POST,
        "/api/v1/genres",
        Some(&admin),
        Some(json!({ "name": "Dystopia" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let genre_id = genre["id"].as_i64().unwrap();

    let (status, book) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(&admin),
        Some(json!({ "title": "1984", "isbn": "123", "authorId": author_id, "genreId": genre_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["authorId"], author_id);
    let book_id = book["id"].as_i64().unwrap();

    let author_uri = format!("/api/v1/authors/{}", author_id);
    let (status, _) = send(&app, Method::DELETE, &author_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, still_there) = send(&app, Method::GET, &author_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(still_there["name"], "Orwell");

    let book_uri = format!("/api/v1/books/{}", book_id);
    let (status, body) = send(&app, Method::DELETE, &book_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::DELETE, &author_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &author_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_integrity_errors() {
    let app = app().await;
    let admin = login(&app, "admin", "admin").await;

    let (status, author) = send(
        &app,
        Method::POST,
        "/api/v1/authors",
        Some(&admin),
        Some(json!({ "name": "Orwell" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let author_id = author["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/authors",
        Some(&admin),
        Some(json!({ "name": "Orwell" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Unknown genre
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(&admin),
        Some(json!({ "title": "1984", "authorId": author_id, "genreId": 999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("Genre"));

    // Missing author id
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(&admin),
        Some(json!({ "title": "1984", "genreId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["authorId"].is_string());

    // Missing required string reaches validation instead of a parse error
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(&admin),
        Some(json!({ "authorId": author_id, "genreId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["title"].is_string());

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/genres/999",
        Some(&admin),
        Some(json!({ "name": "Poetry" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, books) = send(&app, Method::GET, "/api/v1/books", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books, json!([]));
}

#[tokio::test]
async fn test_update_replaces_book() {
    let app = app().await;
    let admin = login(&app, "admin", "admin").await;

    let (_, author) = send(&app, Method::POST, "/api/v1/authors", Some(&admin), Some(json!({ "name": "Orwell" }))).await;
    let (_, genre) = send(&app, Method::POST, "/api/v1/genres", Some(&admin), Some(json!({ "name": "Dystopia" }))).await;
    let (status, book) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(&admin),
        Some(json!({
            "title": "1984",
            "isbn": "123",
            "description": "A novel",
            "authorId": author["id"],
            "genreId": genre["id"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/v1/books/{}", book["id"]);
    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin),
        Some(json!({
            "title": "Nineteen Eighty-Four",
            "isbn": "123",
            "publicationDate": "1949-06-08",
            "authorId": author["id"],
            "genreId": genre["id"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Nineteen Eighty-Four");
    assert_eq!(updated["publicationDate"], "1949-06-08");
    assert_eq!(updated["description"], Value::Null);

    let reader = login(&app, "user", "password").await;
    let (status, fetched) = send(&app, Method::GET, &uri, Some(&reader), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&reader), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_id_is_json_bad_request() {
    let app = app().await;
    let admin = login(&app, "admin", "admin").await;

    let (status, body) = send(&app, Method::GET, "/api/v1/books/abc", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
    assert!(body["message"].is_string());

    let (status, body) = send(&app, Method::DELETE, "/api/v1/authors/1.5", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_role_is_checked_before_body() {
    let app = app().await;
    let reader = login(&app, "user", "password").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(&reader),
        Some(json!({ "title": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.get("fields").is_none());

    let (status, _) = send(&app, Method::PUT, "/api/v1/genres/abc", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
