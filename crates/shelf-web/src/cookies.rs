//! Reading the `Cookie` header and building `Set-Cookie` values.

use axum::http::{HeaderMap, header};

/// Cookie holding the timestamp of the last successful login.
pub const LAST_LOGIN_COOKIE: &str = "last_login";

/// Extract a cookie value from the request headers.
///
/// Quoted values are returned without their quotes.
pub fn get(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(&prefix))
        .map(unquote)
}

/// A `Set-Cookie` value for a cookie readable by page scripts.
pub fn plain(name: &str, value: &str, secure: bool) -> String {
    format!(
        "{}={}; Path=/; SameSite=Lax{}",
        name,
        quote_if_needed(value),
        secure_attr(secure)
    )
}

/// A `Set-Cookie` value for an `HttpOnly` cookie that expires after `max_age_secs`.
pub fn http_only(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        name,
        quote_if_needed(value),
        max_age_secs,
        secure_attr(secure)
    )
}

/// A `Set-Cookie` value that deletes `name`.
pub fn expired(name: &str) -> String {
    format!(
        "{}=\"\"; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        name
    )
}

fn secure_attr(secure: bool) -> &'static str {
    if secure { "; Secure" } else { "" }
}

// Values outside the RFC 6265 cookie-octet set (spaces, commas...) are quoted.
fn quote_if_needed(value: &str) -> String {
    let plain = value
        .bytes()
        .all(|b| b == 0x21 || (0x23..=0x2B).contains(&b) || (0x2D..=0x3A).contains(&b)
            || (0x3C..=0x5B).contains(&b) || (0x5D..=0x7E).contains(&b));
    if plain {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => value.to_string(),
    }
}
