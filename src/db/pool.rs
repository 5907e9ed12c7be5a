//! Database connection pool
//!
//! Gazette stores everything in a single SQLite database. This module
//! creates the connection pool from a configured path (or ":memory:"),
//! creating the parent directory for file-based databases and enabling
//! foreign key enforcement on the pool.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

/// Create a SQLite connection pool from configuration.
///
/// Accepts a plain file path, a `sqlite:` URL, or `:memory:`. File-based
/// databases are created on first use (`mode=rwc`), including any missing
/// parent directories.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the connection
/// cannot be established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    connect(&config.url, 20).await
}

/// Create a SQLite in-memory database pool for testing.
///
/// The pool is capped at a single connection: an in-memory SQLite database
/// exists per connection, so a second connection would see an empty schema.
pub async fn create_test_pool() -> Result<SqlitePool> {
    connect(":memory:", 1).await
}

async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool> {
    // Ensure the database directory exists for file-based SQLite
    if !url.starts_with(":memory:") && !url.starts_with("sqlite::memory:") {
        let path = if url.starts_with("sqlite:") {
            url.trim_start_matches("sqlite:")
        } else {
            url
        };

        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {:?}", parent)
                })?;
            }
        }
    }

    // Build the connection URL with create=true for file-based databases
    let connection_url = if url.starts_with("sqlite:") {
        // If it already has options, don't modify
        if url.contains('?') {
            url.to_string()
        } else {
            format!("{}?mode=rwc", url)
        }
    } else if url == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite:{}?mode=rwc", url)
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&connection_url)
        .await
        .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

    // Enable foreign keys for SQLite
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .context("Failed to enable foreign keys")?;

    Ok(pool)
}
