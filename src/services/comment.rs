//! Comment service
//!
//! Implements the comment rules:
//! - Posting trims whitespace; text that trims to empty is a silent no-op
//! - Only the author may edit or delete a comment
//! - Editing to empty text deletes the comment instead

use anyhow::Context;
use std::sync::Arc;

use crate::db::repositories::{ArticleRepository, CommentRepository};
use crate::models::Comment;

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Comment not found
    #[error("Comment not found: {0}")]
    NotFound(i64),

    /// Parent article not found
    #[error("Article not found: {0}")]
    ArticleNotFound(i64),

    /// Acting user is not the comment's author. Carries the parent article
    /// id so callers can send the user back to the article view.
    #[error("User {user_id} does not own comment {comment_id}")]
    NotOwner {
        comment_id: i64,
        user_id: i64,
        article_id: i64,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// What an edit did to the comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Content was overwritten
    Updated,
    /// The new text trimmed to empty, so the comment was deleted
    Deleted,
}

/// Comment service
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    article_repo: Arc<dyn ArticleRepository>,
}

impl CommentService {
    /// Create a new comment service
    pub fn new(repo: Arc<dyn CommentRepository>, article_repo: Arc<dyn ArticleRepository>) -> Self {
        Self { repo, article_repo }
    }

    /// Post a comment on an article.
    ///
    /// The text is trimmed first; text that trims to empty creates nothing
    /// and returns `None` (a silent no-op, not an error).
    ///
    /// # Errors
    ///
    /// - `ArticleNotFound` if the article id does not resolve
    pub async fn post(
        &self,
        article_id: i64,
        user_id: i64,
        text: &str,
    ) -> Result<Option<Comment>, CommentServiceError> {
        let article = self
            .article_repo
            .get_by_id(article_id)
            .await
            .context("Failed to get article")?
            .ok_or(CommentServiceError::ArticleNotFound(article_id))?;

        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let comment = self
            .repo
            .create(article.id, user_id, text)
            .await
            .context("Failed to create comment")?;

        tracing::info!(comment_id = comment.id, article_id, "Comment posted");
        Ok(Some(comment))
    }

    /// Edit a comment's text.
    ///
    /// Returns the parent article id together with the outcome so callers
    /// can redirect back to the article. Text that trims to empty deletes
    /// the comment; otherwise the content is overwritten and the comment
    /// keeps its id.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `ArticleNotFound` if either id fails to resolve
    /// - `NotOwner` if `user_id` is not the comment's author; the comment
    ///   is left untouched
    pub async fn edit(
        &self,
        comment_id: i64,
        user_id: i64,
        text: &str,
    ) -> Result<(i64, EditOutcome), CommentServiceError> {
        let comment = self.fetch_owned(comment_id, user_id).await?;

        let text = text.trim();
        let outcome = if text.is_empty() {
            self.repo
                .delete(comment.id)
                .await
                .context("Failed to delete comment")?;
            tracing::info!(comment_id, "Comment emptied, deleted");
            EditOutcome::Deleted
        } else {
            self.repo
                .update_content(comment.id, text)
                .await
                .context("Failed to update comment")?;
            EditOutcome::Updated
        };

        Ok((comment.article_id, outcome))
    }

    /// Delete a comment. Returns the parent article id.
    ///
    /// # Errors
    ///
    /// Same taxonomy as `edit`.
    pub async fn remove(&self, comment_id: i64, user_id: i64) -> Result<i64, CommentServiceError> {
        let comment = self.fetch_owned(comment_id, user_id).await?;

        self.repo
            .delete(comment.id)
            .await
            .context("Failed to delete comment")?;

        tracing::info!(comment_id, "Comment deleted");
        Ok(comment.article_id)
    }

    /// Fetch a comment, verify its parent article still resolves, and check
    /// that `user_id` is its author.
    async fn fetch_owned(
        &self,
        comment_id: i64,
        user_id: i64,
    ) -> Result<Comment, CommentServiceError> {
        let comment = self
            .repo
            .get_by_id(comment_id)
            .await
            .context("Failed to get comment")?
            .ok_or(CommentServiceError::NotFound(comment_id))?;

        // Defensive: the foreign key makes a dangling article reference
        // unreachable, but a missing parent is still a NotFound, not a 500.
        self.article_repo
            .get_by_id(comment.article_id)
            .await
            .context("Failed to get article")?
            .ok_or(CommentServiceError::ArticleNotFound(comment.article_id))?;

        if comment.user_id != user_id {
            tracing::warn!(comment_id, user_id, "Rejected comment mutation by non-owner");
            return Err(CommentServiceError::NotOwner {
                comment_id,
                user_id,
                article_id: comment.article_id,
            });
        }

        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxArticleRepository, SqlxCommentRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::ArticleInput;
    use chrono::Utc;
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, CommentService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let service = CommentService::new(
            SqlxCommentRepository::boxed(pool.clone()),
            SqlxArticleRepository::boxed(pool.clone()),
        );
        (pool, service)
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

    async fn seed_article(pool: &SqlitePool) -> i64 {
        use crate::db::repositories::ArticleRepository;
        let repo = SqlxArticleRepository::new(pool.clone());
        repo.create(&ArticleInput::new("Test", "Hello world"))
            .await
            .expect("Failed to seed article")
            .id
    }

    async fn count_comments(pool: &SqlitePool) -> i64 {
        use sqlx::Row;
        sqlx::query("SELECT COUNT(*) AS count FROM comments")
            .fetch_one(pool)
            .await
            .unwrap()
            .get("count")
    }

    #[tokio::test]
    async fn test_post_trims_content() {
        let (pool, service) = setup().await;
        seed_user(&pool, 1, "alice").await;
        let article_id = seed_article(&pool).await;

        let comment = service
            .post(article_id, 1, "  nice!  ")
            .await
            .expect("Failed to post")
            .expect("Comment should be created");

        assert_eq!(comment.content, "nice!");
        assert_eq!(comment.article_id, article_id);
        assert_eq!(comment.user_id, 1);
    }

    #[tokio::test]
    async fn test_post_empty_text_is_silent_noop() {
        let (pool, service) = setup().await;
        seed_user(&pool, 1, "alice").await;
        let article_id = seed_article(&pool).await;

        for text in ["", "   ", "\t\n  "] {
            let result = service.post(article_id, 1, text).await.expect("Failed to post");
            assert!(result.is_none());
        }
        assert_eq!(count_comments(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_post_on_missing_article_is_not_found() {
        let (pool, service) = setup().await;
        seed_user(&pool, 1, "alice").await;

        let result = service.post(42, 1, "hello").await;
        assert!(matches!(
            result,
            Err(CommentServiceError::ArticleNotFound(42))
        ));
    }

    #[tokio::test]
    async fn test_edit_overwrites_and_keeps_id() {
        let (pool, service) = setup().await;
        seed_user(&pool, 1, "alice").await;
        let article_id = seed_article(&pool).await;

        let comment = service.post(article_id, 1, "tpyo").await.unwrap().unwrap();

        let (returned_article, outcome) = service
            .edit(comment.id, 1, "  typo  ")
            .await
            .expect("Failed to edit");
        assert_eq!(returned_article, article_id);
        assert_eq!(outcome, EditOutcome::Updated);

        use crate::db::repositories::CommentRepository;
        let repo = SqlxCommentRepository::new(pool.clone());
        let found = repo.get_by_id(comment.id).await.unwrap().unwrap();
        assert_eq!(found.id, comment.id);
        assert_eq!(found.content, "typo");
    }

    #[tokio::test]
    async fn test_edit_to_empty_deletes() {
        let (pool, service) = setup().await;
        seed_user(&pool, 1, "alice").await;
        let article_id = seed_article(&pool).await;

        let comment = service.post(article_id, 1, "bye").await.unwrap().unwrap();

        let (_, outcome) = service
            .edit(comment.id, 1, "   ")
            .await
            .expect("Failed to edit");
        assert_eq!(outcome, EditOutcome::Deleted);
        assert_eq!(count_comments(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_edit_by_non_owner_is_rejected_unchanged() {
        let (pool, service) = setup().await;
        seed_user(&pool, 1, "alice").await;
        seed_user(&pool, 2, "bob").await;
        let article_id = seed_article(&pool).await;

        let comment = service.post(article_id, 1, "mine").await.unwrap().unwrap();

        let result = service.edit(comment.id, 2, "hijacked").await;
        assert!(matches!(result, Err(CommentServiceError::NotOwner { .. })));

        use crate::db::repositories::CommentRepository;
        let repo = SqlxCommentRepository::new(pool.clone());
        let found = repo.get_by_id(comment.id).await.unwrap().unwrap();
        assert_eq!(found.content, "mine");
    }

    #[tokio::test]
    async fn test_remove_by_owner() {
        let (pool, service) = setup().await;
        seed_user(&pool, 1, "alice").await;
        let article_id = seed_article(&pool).await;

        let comment = service.post(article_id, 1, "gone soon").await.unwrap().unwrap();

        let returned_article = service
            .remove(comment.id, 1)
            .await
            .expect("Failed to remove");
        assert_eq!(returned_article, article_id);
        assert_eq!(count_comments(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_remove_by_non_owner_is_rejected_unchanged() {
        let (pool, service) = setup().await;
        seed_user(&pool, 1, "alice").await;
        seed_user(&pool, 2, "bob").await;
        let article_id = seed_article(&pool).await;

        let comment = service.post(article_id, 1, "mine").await.unwrap().unwrap();

        let result = service.remove(comment.id, 2).await;
        assert!(matches!(result, Err(CommentServiceError::NotOwner { .. })));
        assert_eq!(count_comments(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_edit_missing_comment_is_not_found() {
        let (pool, service) = setup().await;
        seed_user(&pool, 1, "alice").await;

        let result = service.edit(7, 1, "text").await;
        assert!(matches!(result, Err(CommentServiceError::NotFound(7))));

        let result = service.remove(7, 1).await;
        assert!(matches!(result, Err(CommentServiceError::NotFound(7))));
    }
}
