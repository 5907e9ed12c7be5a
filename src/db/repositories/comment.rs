//! Comment repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

use crate::models::{Comment, CommentWithAuthor};

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, article_id: i64, user_id: i64, content: &str) -> Result<Comment>;

    /// Get a comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Get comments for an article, oldest first, with author usernames
    async fn list_for_article(&self, article_id: i64) -> Result<Vec<CommentWithAuthor>>;

    /// Get every comment in the system, oldest first, with author usernames
    async fn list_all(&self) -> Result<Vec<CommentWithAuthor>>;

    /// Overwrite a comment's content.
    /// Returns false when the comment does not exist.
    async fn update_content(&self, id: i64, content: &str) -> Result<bool>;

    /// Delete a comment.
    /// Returns false when the comment does not exist.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: SqlitePool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

const COMMENT_WITH_AUTHOR_SELECT: &str = r#"
    SELECT c.id, c.article_id, c.user_id, c.content, c.created_at, c.updated_at,
           u.username AS author
    FROM comments c
    JOIN users u ON u.id = c.user_id
"#;

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, article_id: i64, user_id: i64, content: &str) -> Result<Comment> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO comments (article_id, user_id, content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .bind(content)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create comment")?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            article_id,
            user_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(
            r#"
            SELECT id, article_id, user_id, content, created_at, updated_at
            FROM comments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get comment by ID")?;

        Ok(row.map(|row| Comment {
            id: row.get("id"),
            article_id: row.get("article_id"),
            user_id: row.get("user_id"),
            content: row.get("content"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }))
    }

    async fn list_for_article(&self, article_id: i64) -> Result<Vec<CommentWithAuthor>> {
        let sql = format!(
            "{} WHERE c.article_id = ? ORDER BY c.id",
            COMMENT_WITH_AUTHOR_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(article_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list comments for article")?;

        Ok(rows.iter().map(row_to_comment_with_author).collect())
    }

    async fn list_all(&self) -> Result<Vec<CommentWithAuthor>> {
        let sql = format!("{} ORDER BY c.id", COMMENT_WITH_AUTHOR_SELECT);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list comments")?;

        Ok(rows.iter().map(row_to_comment_with_author).collect())
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE comments
            SET content = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(content)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update comment")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete comment")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_comment_with_author(row: &SqliteRow) -> CommentWithAuthor {
    CommentWithAuthor {
        id: row.get("id"),
        article_id: row.get("article_id"),
        user_id: row.get("user_id"),
        author: row.get("author"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> (SqlitePool, SqlxCommentRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxCommentRepository::new(pool.clone());
        (pool, repo)
    }

    async fn seed_user(pool: &SqlitePool, id: i64, username: &str) {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, is_superuser, created_at, updated_at)
            VALUES (?, ?, 'hash', 0, ?, ?)
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .expect("Failed to seed user");
    }

    async fn seed_article(pool: &SqlitePool, id: i64) {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO articles (id, title, content, created_at, updated_at) VALUES (?, 't', 'c', ?, ?)",
        )
        .bind(id)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .expect("Failed to seed article");
    }

    #[tokio::test]
    async fn test_create_and_get_comment() {
        let (pool, repo) = setup().await;
        seed_user(&pool, 1, "alice").await;
        seed_article(&pool, 1).await;

        let created = repo
            .create(1, 1, "nice!")
            .await
            .expect("Failed to create comment");
        assert!(created.id > 0);

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get comment")
            .expect("Comment not found");
        assert_eq!(found.content, "nice!");
        assert_eq!(found.article_id, 1);
        assert_eq!(found.user_id, 1);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let (_pool, repo) = setup().await;

        let found = repo.get_by_id(7).await.expect("Failed to get comment");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_for_article_joins_author() {
        let (pool, repo) = setup().await;
        seed_user(&pool, 1, "alice").await;
        seed_user(&pool, 2, "bob").await;
        seed_article(&pool, 1).await;
        seed_article(&pool, 2).await;

        repo.create(1, 1, "first").await.unwrap();
        repo.create(1, 2, "second").await.unwrap();
        repo.create(2, 1, "elsewhere").await.unwrap();

        let comments = repo
            .list_for_article(1)
            .await
            .expect("Failed to list comments");

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "first");
        assert_eq!(comments[0].author, "alice");
        assert_eq!(comments[1].author, "bob");
    }

    #[tokio::test]
    async fn test_list_all_spans_articles() {
        let (pool, repo) = setup().await;
        seed_user(&pool, 1, "alice").await;
        seed_article(&pool, 1).await;
        seed_article(&pool, 2).await;

        repo.create(1, 1, "one").await.unwrap();
        repo.create(2, 1, "two").await.unwrap();

        let comments = repo.list_all().await.expect("Failed to list comments");
        assert_eq!(comments.len(), 2);
    }

    #[tokio::test]
    async fn test_update_content_keeps_id() {
        let (pool, repo) = setup().await;
        seed_user(&pool, 1, "alice").await;
        seed_article(&pool, 1).await;

        let comment = repo.create(1, 1, "tpyo").await.unwrap();

        let updated = repo
            .update_content(comment.id, "typo")
            .await
            .expect("Failed to update comment");
        assert!(updated);

        let found = repo.get_by_id(comment.id).await.unwrap().unwrap();
        assert_eq!(found.id, comment.id);
        assert_eq!(found.content, "typo");
    }

    #[tokio::test]
    async fn test_update_missing_comment_reports_false() {
        let (_pool, repo) = setup().await;

        let updated = repo
            .update_content(99, "text")
            .await
            .expect("Failed to update comment");
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_delete_comment() {
        let (pool, repo) = setup().await;
        seed_user(&pool, 1, "alice").await;
        seed_article(&pool, 1).await;

        let comment = repo.create(1, 1, "bye").await.unwrap();

        assert!(repo.delete(comment.id).await.expect("Failed to delete"));
        assert!(repo.get_by_id(comment.id).await.unwrap().is_none());
        assert!(!repo.delete(comment.id).await.expect("Failed to delete"));
    }
}
