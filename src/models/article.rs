//! Article model
//!
//! This module provides:
//! - `Article` entity representing a blog article
//! - `ArticleInput` carrying the writable fields of the create/update forms
//!
//! Likes are not a field on the article record; they live in a separate
//! membership relation keyed by (article, user) and are exposed through
//! the article repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum accepted title length, in characters.
pub const TITLE_MAX_CHARS: usize = 128;

/// Article entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier
    pub id: i64,
    /// Article title
    pub title: String,
    /// Body text
    pub content: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Writable article fields, shared by create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleInput {
    /// Article title
    pub title: String,
    /// Body text
    pub content: String,
}

impl ArticleInput {
    /// Create a new input from already-validated fields
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}
