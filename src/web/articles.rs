//! Article handlers
//!
//! List, create, read, update, delete, search, and the like toggle.
//! Mutating article actions are superuser-only; the like toggle needs any
//! logged-in user.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use serde::Deserialize;

use crate::models::{ArticleInput, TITLE_MAX_CHARS};
use crate::services::article::ArticleServiceError;
use crate::web::error::PageError;
use crate::web::flash::{self, FlashMessage, IncomingFlash};
use crate::web::guard::{self, GuardDecision};
use crate::web::middleware::{AppState, MaybeUser};

/// Form fields shared by the create and update forms
#[derive(Debug, Deserialize)]
pub struct ArticleForm {
    pub title: String,
    pub content: String,
}

/// Query parameters for search; the original application's parameter name
/// is kept as-is.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(rename = "searchTerm", default)]
    pub search_term: Option<String>,
}

/// Field-level validation mirroring the service rules, so the form can
/// re-render with inline errors instead of a flat rejection.
fn field_errors(form: &ArticleForm) -> (Option<String>, Option<String>) {
    let title = form.title.trim();
    let content = form.content.trim();

    let title_error = if title.is_empty() {
        Some("Title cannot be empty".to_string())
    } else if title.chars().count() > TITLE_MAX_CHARS {
        Some(format!("Title cannot exceed {} characters", TITLE_MAX_CHARS))
    } else {
        None
    };
    let content_error = if content.is_empty() {
        Some("Content cannot be empty".to_string())
    } else {
        None
    };

    (title_error, content_error)
}

/// Render the article list; also the body of delete's GET branch.
async fn render_list(
    state: &AppState,
    user: Option<&crate::models::User>,
    flash: &IncomingFlash,
) -> Result<Response, PageError> {
    let (articles, comments) = state
        .article_service
        .list()
        .await
        .map_err(|err| PageError::Internal(err.into()))?;

    let mut ctx = state.base_context(user, flash);
    ctx.insert("articles", &articles);
    ctx.insert("comments", &comments);
    state.render_page("article_list.html", &ctx, flash)
}

/// GET /article - all articles with every comment in the system
pub async fn list(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    render_list(&state, user.as_ref(), &flash).await
}

/// GET /article/create - empty article form (superuser only)
pub async fn create_form(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    let user = match guard::require_superuser(user, "/article/create") {
        GuardDecision::Allowed(user) => user,
        GuardDecision::Denied { location, message } => return Ok(flash::deny(&location, message)),
    };

    let mut ctx = state.base_context(Some(&user), &flash);
    ctx.insert("heading", "New article");
    ctx.insert("form_action", "/article/create");
    state.render_page("article_form.html", &ctx, &flash)
}

/// POST /article/create - validate and persist a new article
pub async fn create_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    flash: IncomingFlash,
    Form(form): Form<ArticleForm>,
) -> Result<Response, PageError> {
    let user = match guard::require_superuser(user, "/article/create") {
        GuardDecision::Allowed(user) => user,
        GuardDecision::Denied { location, message } => return Ok(flash::deny(&location, message)),
    };

    let (title_error, content_error) = field_errors(&form);
    if title_error.is_some() || content_error.is_some() {
        let mut ctx = state.base_context(Some(&user), &flash);
        ctx.insert("heading", "New article");
        ctx.insert("form_action", "/article/create");
        ctx.insert("title", &form.title);
        ctx.insert("content", &form.content);
        ctx.insert("title_error", &title_error);
        ctx.insert("content_error", &content_error);
        return state.render_page("article_form.html", &ctx, &flash);
    }

    state
        .article_service
        .create(ArticleInput::new(form.title, form.content))
        .await
        .map_err(|err| PageError::Internal(err.into()))?;

    Ok(flash::redirect_with_flash(
        "/article",
        FlashMessage::success("Article created."),
    ))
}

/// GET /article/read/{article_id} - one article with its comments
pub async fn read(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(article_id): Path<i64>,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    let view = state
        .article_service
        .read_view(article_id, user.as_ref().map(|u| u.id))
        .await
        .map_err(|err| match err {
            ArticleServiceError::NotFound(_) => PageError::NotFound,
            other => PageError::Internal(other.into()),
        })?;

    let mut ctx = state.base_context(user.as_ref(), &flash);
    ctx.insert("article", &view.article);
    ctx.insert("comments", &view.comments);
    ctx.insert("like_count", &view.like_count);
    ctx.insert("liked_by_viewer", &view.liked_by_viewer);
    state.render_page("article_read.html", &ctx, &flash)
}

/// GET /article/update/{article_id} - article form pre-populated (superuser only)
pub async fn update_form(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(article_id): Path<i64>,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    let path = format!("/article/update/{}", article_id);
    let user = match guard::require_superuser(user, &path) {
        GuardDecision::Allowed(user) => user,
        GuardDecision::Denied { location, message } => return Ok(flash::deny(&location, message)),
    };

    let article = state
        .article_service
        .get(article_id)
        .await
        .map_err(|err| match err {
            ArticleServiceError::NotFound(_) => PageError::NotFound,
            other => PageError::Internal(other.into()),
        })?;

    let mut ctx = state.base_context(Some(&user), &flash);
    ctx.insert("heading", "Edit article");
    ctx.insert("form_action", &path);
    ctx.insert("title", &article.title);
    ctx.insert("content", &article.content);
    state.render_page("article_form.html", &ctx, &flash)
}

/// POST /article/update/{article_id} - validate and persist an edit
pub async fn update_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(article_id): Path<i64>,
    flash: IncomingFlash,
    Form(form): Form<ArticleForm>,
) -> Result<Response, PageError> {
    let path = format!("/article/update/{}", article_id);
    let user = match guard::require_superuser(user, &path) {
        GuardDecision::Allowed(user) => user,
        GuardDecision::Denied { location, message } => return Ok(flash::deny(&location, message)),
    };

    let (title_error, content_error) = field_errors(&form);
    if title_error.is_some() || content_error.is_some() {
        let mut ctx = state.base_context(Some(&user), &flash);
        ctx.insert("heading", "Edit article");
        ctx.insert("form_action", &path);
        ctx.insert("title", &form.title);
        ctx.insert("content", &form.content);
        ctx.insert("title_error", &title_error);
        ctx.insert("content_error", &content_error);
        return state.render_page("article_form.html", &ctx, &flash);
    }

    state
        .article_service
        .update(article_id, ArticleInput::new(form.title, form.content))
        .await
        .map_err(|err| match err {
            ArticleServiceError::NotFound(_) => PageError::NotFound,
            other => PageError::Internal(other.into()),
        })?;

    Ok(flash::redirect_with_flash(
        &format!("/article/read/{}", article_id),
        FlashMessage::success("Article updated."),
    ))
}

/// GET /article/delete/{article_id} - behaves exactly like the list page
pub async fn delete_confirm(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(article_id): Path<i64>,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    let path = format!("/article/delete/{}", article_id);
    let user = match guard::require_superuser(user, &path) {
        GuardDecision::Allowed(user) => user,
        GuardDecision::Denied { location, message } => return Ok(flash::deny(&location, message)),
    };

    render_list(&state, Some(&user), &flash).await
}

/// POST /article/delete/{article_id} - delete the article and its
/// comments and likes
pub async fn delete_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(article_id): Path<i64>,
) -> Result<Response, PageError> {
    let path = format!("/article/delete/{}", article_id);
    match guard::require_superuser(user, &path) {
        GuardDecision::Allowed(_) => {}
        GuardDecision::Denied { location, message } => return Ok(flash::deny(&location, message)),
    }

    state
        .article_service
        .delete(article_id)
        .await
        .map_err(|err| match err {
            ArticleServiceError::NotFound(_) => PageError::NotFound,
            other => PageError::Internal(other.into()),
        })?;

    Ok(flash::redirect_with_flash(
        "/article",
        FlashMessage::success("Article deleted."),
    ))
}

/// GET /article/search?searchTerm=… - case-insensitive substring search
pub async fn search(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<SearchQuery>,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    let term = query.search_term.as_deref().unwrap_or("");
    let articles = state
        .article_service
        .search(term)
        .await
        .map_err(|err| PageError::Internal(err.into()))?;

    let mut ctx = state.base_context(user.as_ref(), &flash);
    ctx.insert("articles", &articles);
    ctx.insert("search_term", &term);
    state.render_page("search.html", &ctx, &flash)
}

/// POST /article/like/{article_id} - toggle the user's like
pub async fn like_toggle(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(article_id): Path<i64>,
) -> Result<Response, PageError> {
    let path = format!("/article/like/{}", article_id);
    let user = match guard::require_login(user, &path) {
        GuardDecision::Allowed(user) => user,
        GuardDecision::Denied { location, message } => return Ok(flash::deny(&location, message)),
    };

    state
        .article_service
        .toggle_like(article_id, user.id)
        .await
        .map_err(|err| match err {
            ArticleServiceError::NotFound(_) => PageError::NotFound,
            other => PageError::Internal(other.into()),
        })?;

    Ok(flash::see_other(&format!("/article/read/{}", article_id)))
}
