//! Web layer - HTTP handlers and routing
//!
//! Server-rendered HTML over axum. Every route maps straight onto a
//! service call plus a template render or redirect:
//! - Article pages (list, create, read, update, delete, search, like)
//! - Comment actions (create, update, delete)
//! - Account pages (login, logout, register)
//! - Site pages (index, about)

pub mod accounts;
pub mod articles;
pub mod comments;
pub mod error;
pub mod flash;
pub mod guard;
pub mod middleware;
pub mod pages;


use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use error::PageError;
pub use middleware::AppState;

/// Build the application router.
///
/// The session middleware runs on every route so any handler can see who
/// is asking; the guards in the handlers decide what an anonymous request
/// may do.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/about", get(pages::about))
        .route("/article", get(articles::list))
        .route(
            "/article/create",
            get(articles::create_form).post(articles::create_submit),
        )
        .route("/article/read/{article_id}", get(articles::read))
        .route(
            "/article/update/{article_id}",
            get(articles::update_form).post(articles::update_submit),
        )
        .route(
            "/article/delete/{article_id}",
            get(articles::delete_confirm).post(articles::delete_submit),
        )
        .route("/article/search", get(articles::search))
        .route("/article/like/{article_id}", post(articles::like_toggle))
        .route(
            "/comment/create/{article_id}",
            get(comments::create_redirect).post(comments::create_submit),
        )
        .route("/comment/update/{comment_id}", post(comments::update_submit))
        .route("/comment/delete/{comment_id}", post(comments::delete_submit))
        .route(
            "/accounts/login",
            get(accounts::login_form).post(accounts::login_submit),
        )
        .route("/accounts/logout", post(accounts::logout))
        .route(
            "/accounts/register",
            get(accounts::register_form).post(accounts::register_submit),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::resolve_session,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
