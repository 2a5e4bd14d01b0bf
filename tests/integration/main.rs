//! HTTP-level tests driving the full router over the in-memory store,
//! plus `#[ignore]`d store tests against a live PostgreSQL database

mod api_tests;
mod common;
mod postgres_tests;
