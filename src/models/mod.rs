//! Data models
//!
//! This module contains the data structures used throughout Gazette.
//! Models represent:
//! - Database entities (Article, Comment, User, Session)
//! - Form input records

mod article;
mod comment;
mod session;
mod user;

pub use article::{Article, ArticleInput, TITLE_MAX_CHARS};
pub use comment::{Comment, CommentWithAuthor};
pub use session::Session;
pub use user::User;
