//! Web middleware and shared state
//!
//! Contains:
//! - `AppState` with the services and template engine
//! - Session-cookie resolution middleware (runs on every request, never
//!   rejects; the guard decides what a missing user means)
//! - The `MaybeUser` extractor handlers use to see who is asking
//! - Render helpers shared by the HTML handlers

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::models::User;
use crate::services::{ArticleService, CommentService, UserService};
use crate::view::Templates;
use crate::web::error::PageError;
use crate::web::flash::{self, IncomingFlash};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Session lifetime mirrored into the cookie's Max-Age
pub const SESSION_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub templates: Arc<Templates>,
    pub site: SiteConfig,
    pub user_service: Arc<UserService>,
    pub article_service: Arc<ArticleService>,
    pub comment_service: Arc<CommentService>,
}

impl AppState {
    /// Context with the variables every page expects: site presentation,
    /// the current user, and any pending flash messages.
    pub fn base_context(&self, user: Option<&User>, flash: &IncomingFlash) -> tera::Context {
        let mut ctx = tera::Context::new();
        ctx.insert("site_title", &self.site.title);
        ctx.insert("tagline", &self.site.tagline);
        ctx.insert("current_user", &user);
        ctx.insert("flash_messages", &flash.0);
        ctx
    }

    /// Render a template to an HTML response, clearing the flash cookie
    /// when this render consumed pending messages.
    pub fn render_page(
        &self,
        template: &str,
        ctx: &tera::Context,
        flash: &IncomingFlash,
    ) -> Result<Response, PageError> {
        let html = self.templates.render(template, ctx)?;
        let mut response = Html(html).into_response();
        if !flash.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&flash::clear_cookie_value()) {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
        }
        Ok(response)
    }
}

/// Authenticated user resolved from the session cookie
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Extract the session token from the request's Cookie headers.
///
/// Clients may split their cookies over several `Cookie` headers (HTTP/2
/// allows it), so every header is scanned, not just the first.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let cookie_str = match value.to_str() {
            Ok(cookie_str) => cookie_str,
            Err(_) => continue,
        };
        for cookie in cookie_str.split(';') {
            let cookie = cookie.trim();
            if let Some(token) = cookie.strip_prefix(&format!("{}=", SESSION_COOKIE)) {
                return Some(token.to_string());
            }
        }
    }
    None
}

/// Session resolution middleware.
///
/// Resolves the session cookie to a `User` and stores it in the request
/// extensions. Unknown, expired, or absent sessions simply leave no user
/// behind; nothing is rejected here.
pub async fn resolve_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = session_token(request.headers()) {
        match state.user_service.validate_session(&token).await {
            Ok(Some(user)) => {
                request.extensions_mut().insert(AuthenticatedUser(user));
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!(error = %err, "Session validation failed");
            }
        }
    }
    next.run(request).await
}

/// The request's user, when the session middleware resolved one.
/// Never fails; anonymous requests extract `MaybeUser(None)`.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .map(|auth| auth.0.clone());
        Ok(MaybeUser(user))
    }
}

/// Build the Set-Cookie value that stores a session token
pub fn session_cookie_value(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, SESSION_MAX_AGE_SECS
    )
}

/// Build the Set-Cookie value that clears the session cookie
pub fn clear_session_cookie_value() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE
    )
}
