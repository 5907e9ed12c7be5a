//! Services layer - Business logic
//!
//! This module contains all business logic services for Gazette.
//! Services are responsible for:
//! - Implementing business rules (search semantics, like toggle, comment
//!   trimming, ownership checks, credential checks)
//! - Coordinating between repositories
//! - Handling validation and error cases

pub mod article;
pub mod comment;
pub mod password;
pub mod user;

pub use article::{ArticleService, ArticleServiceError, ArticleView};
pub use comment::{CommentService, CommentServiceError, EditOutcome};
pub use password::{hash_password, verify_password};
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
