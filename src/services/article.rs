//! Article service
//!
//! Implements business logic for article management:
//! - Create, read, update, delete articles
//! - Case-insensitive substring search over title and content
//! - Like-set toggling
//! - Validation
//!
//! Deleting an article takes its comments and like rows with it; the
//! cascade lives in the repository, not the schema.

use crate::db::repositories::{ArticleRepository, CommentRepository};
use crate::models::{Article, ArticleInput, CommentWithAuthor, TITLE_MAX_CHARS};
use anyhow::Context;
use std::sync::Arc;

/// Error types for article service operations
#[derive(Debug, thiserror::Error)]
pub enum ArticleServiceError {
    /// Article not found
    #[error("Article not found: {0}")]
    NotFound(i64),

    /// Validation error (empty or over-long fields)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// An article assembled with everything its read view shows
#[derive(Debug, Clone)]
pub struct ArticleView {
    pub article: Article,
    pub comments: Vec<CommentWithAuthor>,
    pub like_count: i64,
    /// Whether the viewing user (if any) has liked the article
    pub liked_by_viewer: bool,
}

/// Article service for managing blog articles
pub struct ArticleService {
    repo: Arc<dyn ArticleRepository>,
    comment_repo: Arc<dyn CommentRepository>,
}

impl ArticleService {
    /// Create a new article service
    pub fn new(repo: Arc<dyn ArticleRepository>, comment_repo: Arc<dyn CommentRepository>) -> Self {
        Self { repo, comment_repo }
    }

    /// List every article alongside every comment in the system.
    ///
    /// The comment fetch is deliberately unfiltered: the list page groups
    /// comments per article in the template.
    pub async fn list(
        &self,
    ) -> Result<(Vec<Article>, Vec<CommentWithAuthor>), ArticleServiceError> {
        let articles = self
            .repo
            .list_all()
            .await
            .context("Failed to list articles")?;
        let comments = self
            .comment_repo
            .list_all()
            .await
            .context("Failed to list comments")?;
        Ok((articles, comments))
    }

    /// Create a new article
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the title or content is empty after trimming,
    ///   or the title exceeds the length limit
    pub async fn create(&self, input: ArticleInput) -> Result<Article, ArticleServiceError> {
        let input = validate_input(input)?;

        let article = self
            .repo
            .create(&input)
            .await
            .context("Failed to create article")?;

        tracing::info!(article_id = article.id, "Article created");
        Ok(article)
    }

    /// Fetch an article by id
    ///
    /// # Errors
    ///
    /// - `NotFound` if the id does not resolve
    pub async fn get(&self, id: i64) -> Result<Article, ArticleServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get article")?
            .ok_or(ArticleServiceError::NotFound(id))
    }

    /// Fetch an article plus everything its read view shows: comments with
    /// author names, the like count, and whether `viewer` has liked it.
    pub async fn read_view(
        &self,
        id: i64,
        viewer: Option<i64>,
    ) -> Result<ArticleView, ArticleServiceError> {
        let article = self.get(id).await?;

        let comments = self
            .comment_repo
            .list_for_article(id)
            .await
            .context("Failed to list comments")?;
        let like_count = self
            .repo
            .like_count(id)
            .await
            .context("Failed to count likes")?;
        let liked_by_viewer = match viewer {
            Some(user_id) => self
                .repo
                .is_liked(id, user_id)
                .await
                .context("Failed to check like")?,
            None => false,
        };

        Ok(ArticleView {
            article,
            comments,
            like_count,
            liked_by_viewer,
        })
    }

    /// Overwrite an article's title and content
    ///
    /// # Errors
    ///
    /// - `NotFound` if the id does not resolve
    /// - `ValidationError` as for `create`
    pub async fn update(
        &self,
        id: i64,
        input: ArticleInput,
    ) -> Result<Article, ArticleServiceError> {
        let input = validate_input(input)?;

        let updated = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update article")?;
        if !updated {
            return Err(ArticleServiceError::NotFound(id));
        }

        tracing::info!(article_id = id, "Article updated");
        self.get(id).await
    }

    /// Delete an article together with its comments and like rows
    ///
    /// # Errors
    ///
    /// - `NotFound` if the id does not resolve
    pub async fn delete(&self, id: i64) -> Result<(), ArticleServiceError> {
        let deleted = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete article")?;
        if !deleted {
            return Err(ArticleServiceError::NotFound(id));
        }

        tracing::info!(article_id = id, "Article deleted");
        Ok(())
    }

    /// Search articles whose title or content contains `term` as a
    /// case-insensitive substring. An empty or missing term matches every
    /// article (the empty string is a substring of everything).
    pub async fn search(&self, term: &str) -> Result<Vec<Article>, ArticleServiceError> {
        let articles = self
            .repo
            .search(term)
            .await
            .context("Failed to search articles")?;
        Ok(articles)
    }

    /// Toggle `user_id`'s membership in the article's like set.
    ///
    /// Returns true when the toggle added the like, false when it removed
    /// it. Two toggles by the same user always restore the original set.
    pub async fn toggle_like(
        &self,
        article_id: i64,
        user_id: i64,
    ) -> Result<bool, ArticleServiceError> {
        // NotFound before touching the like set
        self.get(article_id).await?;

        let already_liked = self
            .repo
            .is_liked(article_id, user_id)
            .await
            .context("Failed to check like")?;

        if already_liked {
            self.repo
                .remove_like(article_id, user_id)
                .await
                .context("Failed to remove like")?;
        } else {
            self.repo
                .add_like(article_id, user_id)
                .await
                .context("Failed to add like")?;
        }

        Ok(!already_liked)
    }
}

/// Trim the input and check the field rules shared by create and update
fn validate_input(input: ArticleInput) -> Result<ArticleInput, ArticleServiceError> {
    let title = input.title.trim();
    let content = input.content.trim();

    if title.is_empty() {
        return Err(ArticleServiceError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(ArticleServiceError::ValidationError(format!(
            "Title cannot exceed {} characters",
            TITLE_MAX_CHARS
        )));
    }
    if content.is_empty() {
        return Err(ArticleServiceError::ValidationError(
            "Content cannot be empty".to_string(),
        ));
    }

    Ok(ArticleInput::new(title, content))
}
