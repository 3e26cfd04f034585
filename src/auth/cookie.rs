// Session cookie helpers

use axum::http::{header, HeaderMap};

/// Cookie carrying the access token
pub const ACCESS_COOKIE: &str = "token";
/// Cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Read a cookie value from the request headers
///
/// Empty values count as absent.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value for an HTTP-only, secure cookie scoped to `/`
pub fn session_cookie(name: &str, value: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; Secure", name, value)
}

/// `Set-Cookie` value that clears a cookie immediately
pub fn cleared_cookie(name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; Secure", name)
}
