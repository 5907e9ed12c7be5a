//! User service
//!
//! Implements business logic for accounts and authentication:
//! - Registration (regular users; superusers come from configuration)
//! - Login/logout
//! - Session validation with expiry cleanup
//! - Bootstrap administrator creation at startup

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{Session, User};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use std::sync::Arc;

/// Default session expiration time in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Minimum accepted password length for registration
const PASSWORD_MIN_CHARS: usize = 8;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("Username '{0}' is already taken")]
    UserExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Input for user registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
}

impl RegisterInput {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Input for user login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// User service for managing accounts and sessions
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
        }
    }

    /// Register a new regular (non-superuser) user
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the username is empty or the password is too
    ///   short
    /// - `UserExists` if the username is already taken
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if input.password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(UserServiceError::ValidationError(format!(
                "Password must be at least {} characters",
                PASSWORD_MIN_CHARS
            )));
        }

        if self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(username.to_string()));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(username.to_string(), password_hash, false);

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        tracing::info!(user_id = created.id, username = %created.username, "User registered");
        Ok(created)
    }

    /// Login with credentials, creating a session on success
    ///
    /// # Errors
    ///
    /// - `AuthenticationError` if the username or password is wrong; the
    ///   message never says which
    pub async fn login(&self, input: LoginInput) -> Result<Session, UserServiceError> {
        let user = self
            .user_repo
            .get_by_username(input.username.trim())
            .await
            .context("Failed to look up user")?
            .ok_or_else(|| {
                UserServiceError::AuthenticationError(
                    "Invalid username or password".to_string(),
                )
            })?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !password_valid {
            tracing::warn!(username = %user.username, "Login failed: bad password");
            return Err(UserServiceError::AuthenticationError(
                "Invalid username or password".to_string(),
            ));
        }

        let session = Session::new(user.id, self.session_expiration_days);
        let session = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok(session)
    }

    /// Delete the session identified by `token`, if any
    pub async fn logout(&self, token: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Returns `None` for unknown tokens. Expired sessions are deleted on
    /// sight and also resolve to `None`.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to look up session")?
        {
            Some(session) => session,
            None => return Ok(None),
        };

        if session.is_expired() {
            self.session_repo
                .delete(&session.id)
                .await
                .context("Failed to delete expired session")?;
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to look up session user")?;
        Ok(user)
    }

    /// Create the configured administrator account when it does not exist
    /// yet. Called once at startup; an existing account of the same name is
    /// left alone, whatever its flags.
    pub async fn ensure_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), UserServiceError> {
        if self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to check admin username")?
            .is_some()
        {
            return Ok(());
        }

        let password_hash = hash_password(password).context("Failed to hash admin password")?;
        let user = User::new(username.to_string(), password_hash, true);
        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create admin user")?;

        tracing::info!(user_id = created.id, username, "Bootstrap admin created");
        Ok(())
    }
}
