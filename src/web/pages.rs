//! Site pages
//!
//! The index and about pages; plain renders with the shared layout.

use axum::{extract::State, response::Response};
use chrono::Utc;

use crate::web::error::PageError;
use crate::web::flash::IncomingFlash;
use crate::web::middleware::{AppState, MaybeUser};

/// GET / - index page
pub async fn index(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    let mut ctx = state.base_context(user.as_ref(), &flash);
    ctx.insert("now", &Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string());
    state.render_page("index.html", &ctx, &flash)
}

/// GET /about - about page
pub async fn about(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    let ctx = state.base_context(user.as_ref(), &flash);
    state.render_page("about.html", &ctx, &flash)
}
