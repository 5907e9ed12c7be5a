//! Account handlers
//!
//! Login, logout, and registration. Login honors a `next` parameter so the
//! authorization guard can send people back to what they were doing; only
//! local targets (paths starting with `/`) are followed.

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::Response,
    Form,
};
use serde::Deserialize;

use crate::services::user::{LoginInput, RegisterInput, UserServiceError};
use crate::web::error::PageError;
use crate::web::flash::{self, FlashMessage, IncomingFlash};
use crate::web::middleware::{
    clear_session_cookie_value, session_cookie_value, session_token, AppState, MaybeUser,
};

/// Where account actions land when no `next` target is given
const DEFAULT_AFTER_LOGIN: &str = "/article";

/// Query parameters for the login form
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub next: Option<String>,
}

/// Form fields for login
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Form fields for registration
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

/// Only follow local redirect targets; anything else falls back to the
/// article list.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(target) if target.starts_with('/') && !target.starts_with("//") => target,
        _ => DEFAULT_AFTER_LOGIN,
    }
}

/// GET /accounts/login - render the login form
pub async fn login_form(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<LoginQuery>,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    let mut ctx = state.base_context(user.as_ref(), &flash);
    ctx.insert("next", &query.next.as_deref().unwrap_or(""));
    state.render_page("login.html", &ctx, &flash)
}

/// POST /accounts/login - verify credentials and open a session
pub async fn login_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    flash: IncomingFlash,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let session = match state
        .user_service
        .login(LoginInput::new(&form.username, &form.password))
        .await
    {
        Ok(session) => session,
        Err(UserServiceError::AuthenticationError(message)) => {
            let mut ctx = state.base_context(user.as_ref(), &flash);
            ctx.insert("error", &message);
            ctx.insert("username", &form.username);
            ctx.insert("next", &form.next.as_deref().unwrap_or(""));
            return state.render_page("login.html", &ctx, &flash);
        }
        Err(err) => return Err(PageError::Internal(err.into())),
    };

    let mut response = flash::see_other(safe_next(form.next.as_deref()));
    if let Ok(value) = HeaderValue::from_str(&session_cookie_value(&session.id)) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    Ok(response)
}

/// POST /accounts/logout - close the session
pub async fn logout(
    State(state): State<AppState>,
    request: axum::extract::Request,
) -> Result<Response, PageError> {
    if let Some(token) = session_token(request.headers()) {
        state
            .user_service
            .logout(&token)
            .await
            .map_err(|err| PageError::Internal(err.into()))?;
    }

    let mut response = flash::see_other(DEFAULT_AFTER_LOGIN);
    if let Ok(value) = HeaderValue::from_str(&clear_session_cookie_value()) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    Ok(response)
}

/// GET /accounts/register - render the registration form
pub async fn register_form(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    flash: IncomingFlash,
) -> Result<Response, PageError> {
    let ctx = state.base_context(user.as_ref(), &flash);
    state.render_page("register.html", &ctx, &flash)
}

/// POST /accounts/register - create a regular user
pub async fn register_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    flash: IncomingFlash,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PageError> {
    let render_error = |message: &str| -> Result<Response, PageError> {
        let mut ctx = state.base_context(user.as_ref(), &flash);
        ctx.insert("error", message);
        ctx.insert("username", &form.username);
        state.render_page("register.html", &ctx, &flash)
    };

    if form.password != form.password_confirm {
        return render_error("The passwords do not match.");
    }

    match state
        .user_service
        .register(RegisterInput::new(&form.username, &form.password))
        .await
    {
        Ok(_) => Ok(flash::redirect_with_flash(
            "/accounts/login",
            FlashMessage::success("Account created, you can log in now."),
        )),
        Err(UserServiceError::ValidationError(message)) => render_error(&message),
        Err(UserServiceError::UserExists(_)) => render_error("That username is already taken."),
        Err(err) => Err(PageError::Internal(err.into())),
    }
}
