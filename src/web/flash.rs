//! One-shot flash messages
//!
//! Flash messages ride in a short-lived `flash` cookie: set next to a
//! redirect, read and cleared by the next HTML render. The payload is a
//! percent-encoded JSON array of `{level, text}` objects so a redirect can
//! carry more than one message.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// Cookie carrying pending flash messages
pub const FLASH_COOKIE: &str = "flash";

/// Flash message severity, rendered as a CSS class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// A one-shot user-facing status message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            text: text.into(),
        }
    }
}

/// Build the Set-Cookie value that stores `messages` for the next render.
/// The cookie is deliberately short-lived; it only has to survive one
/// redirect.
pub fn set_cookie_value(messages: &[FlashMessage]) -> String {
    let json = serde_json::to_string(messages).unwrap_or_else(|_| "[]".to_string());
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age=60",
        FLASH_COOKIE,
        urlencoding::encode(&json)
    )
}

/// Build the Set-Cookie value that clears the flash cookie
pub fn clear_cookie_value() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", FLASH_COOKIE)
}

/// Parse the flash messages out of a Cookie header value. Anything
/// malformed decodes to no messages; a stale cookie is not worth a 500.
pub fn parse_cookie_header(cookie_header: &str) -> Vec<FlashMessage> {
    for cookie in cookie_header.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie.strip_prefix(&format!("{}=", FLASH_COOKIE)) {
            let decoded = match urlencoding::decode(value) {
                Ok(decoded) => decoded,
                Err(_) => return Vec::new(),
            };
            return serde_json::from_str(&decoded).unwrap_or_default();
        }
    }
    Vec::new()
}

/// Find the flash cookie across every `Cookie` header a request carries;
/// clients are free to split their cookies over several headers.
pub fn messages_from_headers(headers: &HeaderMap) -> Vec<FlashMessage> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(parse_cookie_header)
        .find(|messages| !messages.is_empty())
        .unwrap_or_default()
}

/// Extractor for the flash messages waiting in the request's cookie.
/// Never fails; no cookie means no messages.
#[derive(Debug, Clone, Default)]
pub struct IncomingFlash(pub Vec<FlashMessage>);

impl IncomingFlash {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(IncomingFlash(messages_from_headers(&parts.headers)))
    }
}

/// A 303 redirect to `location`
pub fn see_other(location: &str) -> Response {
    redirect_response(location, None)
}

/// A 303 redirect to `location` carrying a flash message for the next page
pub fn redirect_with_flash(location: &str, message: FlashMessage) -> Response {
    redirect_response(location, Some(&[message]))
}

/// Turn a guard denial into its response: a redirect that flashes the
/// denial message when one is present.
pub fn deny(location: &str, message: Option<FlashMessage>) -> Response {
    match message {
        Some(message) => redirect_with_flash(location, message),
        None => see_other(location),
    }
}

fn redirect_response(location: &str, messages: Option<&[FlashMessage]>) -> Response {
    let mut response = StatusCode::SEE_OTHER.into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(location) {
        headers.insert(header::LOCATION, value);
    }
    if let Some(messages) = messages {
        if let Ok(value) = HeaderValue::from_str(&set_cookie_value(messages)) {
            headers.insert(header::SET_COOKIE, value);
        }
    }
    response
}
