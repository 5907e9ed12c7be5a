//! Comment handlers
//!
//! Posting, editing, and deleting comments. All three need a logged-in
//! user; edit and delete additionally check ownership and recover a
//! failed check into a flash plus redirect, never an error page.

use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use serde::Deserialize;

use crate::services::comment::CommentServiceError;
use crate::web::error::PageError;
use crate::web::flash::{self, FlashMessage};
use crate::web::guard::{self, GuardDecision};
use crate::web::middleware::{AppState, MaybeUser};

/// The single form field comments travel in
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub comment: String,
}

fn article_read_path(article_id: i64) -> String {
    format!("/article/read/{}", article_id)
}

/// GET /comment/create/{article_id} - nothing to show; a logged-in user
/// goes to the article, anyone else to the login form
pub async fn create_redirect(MaybeUser(user): MaybeUser, Path(article_id): Path<i64>) -> Response {
    let path = format!("/comment/create/{}", article_id);
    match guard::require_login(user, &path) {
        GuardDecision::Allowed(_) => flash::see_other(&article_read_path(article_id)),
        GuardDecision::Denied { location, message } => flash::deny(&location, message),
    }
}

/// POST /comment/create/{article_id} - post a comment
///
/// Text that trims to empty creates nothing and redirects silently.
pub async fn create_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(article_id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Response, PageError> {
    let path = format!("/comment/create/{}", article_id);
    let user = match guard::require_login(user, &path) {
        GuardDecision::Allowed(user) => user,
        GuardDecision::Denied { location, message } => return Ok(flash::deny(&location, message)),
    };

    state
        .comment_service
        .post(article_id, user.id, &form.comment)
        .await
        .map_err(|err| match err {
            CommentServiceError::ArticleNotFound(_) => PageError::NotFound,
            other => PageError::Internal(other.into()),
        })?;

    Ok(flash::see_other(&article_read_path(article_id)))
}

/// POST /comment/update/{comment_id} - edit a comment; empty text deletes it
pub async fn update_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(comment_id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Response, PageError> {
    let path = format!("/comment/update/{}", comment_id);
    let user = match guard::require_login(user, &path) {
        GuardDecision::Allowed(user) => user,
        GuardDecision::Denied { location, message } => return Ok(flash::deny(&location, message)),
    };

    match state
        .comment_service
        .edit(comment_id, user.id, &form.comment)
        .await
    {
        Ok((article_id, _outcome)) => Ok(flash::see_other(&article_read_path(article_id))),
        Err(err) => not_owner_or_terminal(err),
    }
}

/// POST /comment/delete/{comment_id} - delete a comment
pub async fn delete_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(comment_id): Path<i64>,
) -> Result<Response, PageError> {
    let path = format!("/comment/delete/{}", comment_id);
    let user = match guard::require_login(user, &path) {
        GuardDecision::Allowed(user) => user,
        GuardDecision::Denied { location, message } => return Ok(flash::deny(&location, message)),
    };

    match state.comment_service.remove(comment_id, user.id).await {
        Ok(article_id) => Ok(flash::see_other(&article_read_path(article_id))),
        Err(err) => not_owner_or_terminal(err),
    }
}

/// An ownership failure bounces back to the article with a flash; the
/// NotFound variants stay terminal.
fn not_owner_or_terminal(err: CommentServiceError) -> Result<Response, PageError> {
    match err {
        CommentServiceError::NotOwner { article_id, .. } => Ok(flash::redirect_with_flash(
            &article_read_path(article_id),
            FlashMessage::error("You can only change your own comments."),
        )),
        CommentServiceError::NotFound(_) | CommentServiceError::ArticleNotFound(_) => {
            Err(PageError::NotFound)
        }
        other => Err(PageError::Internal(other.into())),
    }
}
