//! Double-submit CSRF tokens for the HTML forms.
//!
//! Form pages embed the `csrftoken` cookie value in a hidden
//! `csrfmiddlewaretoken` field; a POST is accepted only when both match.

use crate::cookies;
use crate::error::ShelfError;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{Html, IntoResponse, Response};
use uuid::Uuid;

/// Name of the CSRF cookie.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Name of the hidden form field.
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

/// The token a form page should embed.
#[derive(Debug, Clone)]
pub struct CsrfToken {
    value: String,
    issued: bool,
}

impl CsrfToken {
    /// Reuse the request's token, or mint a new one.
    pub fn for_request(headers: &HeaderMap) -> Self {
        match cookies::get(headers, CSRF_COOKIE).filter(|v| !v.is_empty()) {
            Some(value) => Self { value, issued: false },
            None => Self {
                value: Uuid::new_v4().simple().to_string(),
                issued: true,
            },
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// `Set-Cookie` value, only when the token was minted for this response.
    pub fn set_cookie(&self, secure: bool) -> Option<String> {
        self.issued
            .then(|| cookies::plain(CSRF_COOKIE, &self.value, secure))
    }

    /// An HTML response carrying the page, issuing the cookie if needed.
    pub fn render(&self, page: String, secure: bool) -> Response {
        let mut response = Html(page).into_response();
        let cookie = self
            .set_cookie(secure)
            .and_then(|cookie| HeaderValue::from_str(&cookie).ok());
        if let Some(value) = cookie {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        response
    }
}

/// Check a submitted token against the CSRF cookie.
pub fn verify(headers: &HeaderMap, submitted: &str) -> Result<(), ShelfError> {
    let expected = cookies::get(headers, CSRF_COOKIE).unwrap_or_default();
    if expected.is_empty() || !constant_time_eq(expected.as_bytes(), submitted.as_bytes()) {
        tracing::warn!("Rejected form post with a bad CSRF token");
        return Err(ShelfError::CsrfFailed);
    }
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn existing_token_is_reused() {
        let token = CsrfToken::for_request(&with_cookie("csrftoken=abc123"));
        assert_eq!(token.value(), "abc123");
        assert!(token.set_cookie(false).is_none());
    }

    #[test]
    fn missing_token_is_minted() {
        let token = CsrfToken::for_request(&HeaderMap::new());
        assert_eq!(token.value().len(), 32);
        let cookie = token.set_cookie(false).unwrap();
        assert!(cookie.starts_with(&format!("csrftoken={}", token.value())));
    }

    #[test]
    fn render_sets_cookie_once() {
        let minted = CsrfToken::for_request(&HeaderMap::new());
        let response = minted.render("<p>form</p>".to_string(), false);
        assert!(response.headers().get(header::SET_COOKIE).is_some());

        let reused = CsrfToken::for_request(&with_cookie("csrftoken=abc123"));
        let response = reused.render("<p>form</p>".to_string(), false);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[test]
    fn verify_requires_matching_cookie() {
        let headers = with_cookie("csrftoken=abc123");
        assert!(verify(&headers, "abc123").is_ok());
        assert!(matches!(verify(&headers, "abc124"), Err(ShelfError::CsrfFailed)));
        assert!(matches!(verify(&headers, ""), Err(ShelfError::CsrfFailed)));
        assert!(matches!(
            verify(&HeaderMap::new(), ""),
            Err(ShelfError::CsrfFailed)
        ));
    }
}
