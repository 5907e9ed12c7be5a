//! Article repository
//!
//! Database operations for articles and their like relation.
//!
//! This module provides:
//! - `ArticleRepository` trait defining the interface for article data access
//! - `SqlxArticleRepository` implementing the trait over SQLite
//!
//! Deleting an article removes its comments and like rows here as well;
//! the schema has no cascade, so this is the only place that cleanup
//! happens.

use crate::models::{Article, ArticleInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Create a new article
    async fn create(&self, input: &ArticleInput) -> Result<Article>;

    /// Get article by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// List all articles
    async fn list_all(&self) -> Result<Vec<Article>>;

    /// Search articles whose title or content contains the term
    /// (case-insensitive). An empty term matches every article.
    async fn search(&self, term: &str) -> Result<Vec<Article>>;

    /// Overwrite title and content of an article.
    /// Returns false when the article does not exist.
    async fn update(&self, id: i64, input: &ArticleInput) -> Result<bool>;

    /// Delete an article together with its comments and like rows.
    /// Returns false when the article does not exist.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Add a user to the article's like set. Returns false when the user
    /// already liked the article.
    async fn add_like(&self, article_id: i64, user_id: i64) -> Result<bool>;

    /// Remove a user from the article's like set. Returns false when the
    /// user had not liked the article.
    async fn remove_like(&self, article_id: i64, user_id: i64) -> Result<bool>;

    /// Check whether a user is in the article's like set
    async fn is_liked(&self, article_id: i64, user_id: i64) -> Result<bool>;

    /// Count users in the article's like set
    async fn like_count(&self, article_id: i64) -> Result<i64>;
}

/// SQLx-based article repository implementation
pub struct SqlxArticleRepository {
    pool: SqlitePool,
}

impl SqlxArticleRepository {
    /// Create a new SQLx article repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, input: &ArticleInput) -> Result<Article> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO articles (title, content, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create article")?;

        Ok(Article {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            content: input.content.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, content, created_at, updated_at
            FROM articles
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get article by ID")?;

        row.map(|row| row_to_article(&row)).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, created_at, updated_at
            FROM articles
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list articles")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn search(&self, term: &str) -> Result<Vec<Article>> {
        let pattern = format!("%{}%", term);

        let rows = sqlx::query(
            r#"
            SELECT id, title, content, created_at, updated_at
            FROM articles
            WHERE title LIKE ? OR content LIKE ?
            ORDER BY id
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .context("Failed to search articles")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn update(&self, id: i64, input: &ArticleInput) -> Result<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE articles
            SET title = ?, content = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update article")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        // Dependent rows first: the foreign keys have no ON DELETE CASCADE
        sqlx::query("DELETE FROM comments WHERE article_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete article comments")?;

        sqlx::query("DELETE FROM article_likes WHERE article_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete article likes")?;

        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete article")?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_like(&self, article_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO article_likes (article_id, user_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to add like")?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_like(&self, article_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM article_likes
            WHERE article_id = ? AND user_id = ?
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("Failed to remove like")?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_liked(&self, article_id: i64, user_id: i64) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT 1 AS present
            FROM article_likes
            WHERE article_id = ? AND user_id = ?
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to check like")?;

        Ok(row.is_some())
    }

    async fn like_count(&self, article_id: i64) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count
            FROM article_likes
            WHERE article_id = ?
            "#,
        )
        .bind(article_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count likes")?;

        Ok(row.get("count"))
    }
}

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    Ok(Article {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (SqlitePool, SqlxArticleRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxArticleRepository::new(pool.clone());
        (pool, repo)
    }

    async fn create_test_user(pool: &SqlitePool, id: i64) {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, is_superuser, created_at, updated_at)
            VALUES (?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(id)
        .bind(format!("user{}", id))
        .bind("hash")
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .expect("Failed to create test user");
    }

    #[tokio::test]
    async fn test_create_and_get_article() {
        let (_pool, repo) = setup_test_repo().await;

        let created = repo
            .create(&ArticleInput::new("Test", "Hello world"))
            .await
            .expect("Failed to create article");
        assert!(created.id > 0);

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get article")
            .expect("Article not found");
        assert_eq!(found.title, "Test");
        assert_eq!(found.content, "Hello world");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let (_pool, repo) = setup_test_repo().await;

        let found = repo.get_by_id(42).await.expect("Failed to get article");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_all_returns_every_article() {
        let (_pool, repo) = setup_test_repo().await;

        repo.create(&ArticleInput::new("First", "a")).await.unwrap();
        repo.create(&ArticleInput::new("Second", "b")).await.unwrap();
        repo.create(&ArticleInput::new("Third", "c")).await.unwrap();

        let articles = repo.list_all().await.expect("Failed to list articles");
        assert_eq!(articles.len(), 3);
        assert_eq!(articles[0].title, "First");
        assert_eq!(articles[2].title, "Third");
    }

    #[tokio::test]
    async fn test_search_matches_title_or_content_any_case() {
        let (_pool, repo) = setup_test_repo().await;

        repo.create(&ArticleInput::new("My Cat", "purrs")).await.unwrap();
        repo.create(&ArticleInput::new("Dogs", "scattered toys")).await.unwrap();
        repo.create(&ArticleInput::new("Birds", "tweet")).await.unwrap();

        let found = repo.search("cat").await.expect("Failed to search");
        let titles: Vec<_> = found.iter().map(|a| a.title.as_str()).collect();

        // "Cat" in the first title, "scattered" in the second body
        assert_eq!(titles, vec!["My Cat", "Dogs"]);
    }

    #[tokio::test]
    async fn test_search_empty_term_returns_all() {
        let (_pool, repo) = setup_test_repo().await;

        repo.create(&ArticleInput::new("One", "a")).await.unwrap();
        repo.create(&ArticleInput::new("Two", "b")).await.unwrap();

        let found = repo.search("").await.expect("Failed to search");
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let (_pool, repo) = setup_test_repo().await;

        let article = repo
            .create(&ArticleInput::new("Old", "old text"))
            .await
            .unwrap();

        let updated = repo
            .update(article.id, &ArticleInput::new("New", "new text"))
            .await
            .expect("Failed to update");
        assert!(updated);

        let found = repo.get_by_id(article.id).await.unwrap().unwrap();
        assert_eq!(found.title, "New");
        assert_eq!(found.content, "new text");
    }

    #[tokio::test]
    async fn test_update_missing_article_reports_false() {
        let (_pool, repo) = setup_test_repo().await;

        let updated = repo
            .update(42, &ArticleInput::new("New", "new text"))
            .await
            .expect("Failed to update");
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_delete_removes_comments_and_likes() {
        let (pool, repo) = setup_test_repo().await;
        create_test_user(&pool, 1).await;

        let article = repo.create(&ArticleInput::new("Doomed", "text")).await.unwrap();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO comments (article_id, user_id, content, created_at, updated_at) VALUES (?, 1, 'hi', ?, ?)",
        )
        .bind(article.id)
        .bind(now)
        .bind(now)
        .execute(&pool)
        .await
        .unwrap();
        repo.add_like(article.id, 1).await.unwrap();

        let deleted = repo.delete(article.id).await.expect("Failed to delete");
        assert!(deleted);

        assert!(repo.get_by_id(article.id).await.unwrap().is_none());

        let comment_count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM comments")
            .fetch_one(&pool)
            .await
            .unwrap()
            .get("count");
        assert_eq!(comment_count, 0);
        assert_eq!(repo.like_count(article.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_article_reports_false() {
        let (_pool, repo) = setup_test_repo().await;

        let deleted = repo.delete(42).await.expect("Failed to delete");
        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_like_set_membership() {
        let (pool, repo) = setup_test_repo().await;
        create_test_user(&pool, 1).await;

        let article = repo.create(&ArticleInput::new("Liked", "text")).await.unwrap();

        assert!(!repo.is_liked(article.id, 1).await.unwrap());
        assert!(repo.add_like(article.id, 1).await.unwrap());
        assert!(repo.is_liked(article.id, 1).await.unwrap());

        // A second add is ignored by the set
        assert!(!repo.add_like(article.id, 1).await.unwrap());
        assert_eq!(repo.like_count(article.id).await.unwrap(), 1);

        assert!(repo.remove_like(article.id, 1).await.unwrap());
        assert!(!repo.is_liked(article.id, 1).await.unwrap());
        assert!(!repo.remove_like(article.id, 1).await.unwrap());
    }
}
