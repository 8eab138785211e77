use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{header::AUTHORIZATION, Extensions, HeaderMap};
use axum_extra::extract::cookie::CookieJar;

use crate::ApiError;

pub const SESSION_COOKIE: &str = "smartassist_session";

pub fn require_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Unauthenticated."))?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(ApiError::unauthorized("Invalid authorization scheme."));
    }

    let token = parts.next().unwrap_or("");
    if token.is_empty() {
        return Err(ApiError::unauthorized("Missing bearer token."));
    }

    Ok(token.to_string())
}

/// Session token from the `Authorization` header, falling back to the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if headers.contains_key(AUTHORIZATION) {
        return require_bearer(headers).ok();
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|token| !token.is_empty())
}

pub fn require_session_token(headers: &HeaderMap) -> Result<String, ApiError> {
    session_token(headers).ok_or_else(|| ApiError::unauthorized("Unauthenticated."))
}

/// Key identifying a chat client for rate limiting.
///
/// The peer address is the client unless the peer is a trusted proxy. Behind a trusted
/// proxy the client is the nearest `X-Forwarded-For` hop that is not itself trusted,
/// then `X-Real-IP`.
pub fn client_key(
    headers: &HeaderMap,
    extensions: &Extensions,
    trusted_proxies: &[IpAddr],
) -> String {
    let Some(peer) = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
    else {
        return "anonymous".to_string();
    };

    if !trusted_proxies.contains(&peer) {
        return peer.to_string();
    }

    forwarded_client(headers, trusted_proxies)
        .unwrap_or(peer)
        .to_string()
}

fn forwarded_client(headers: &HeaderMap, trusted_proxies: &[IpAddr]) -> Option<IpAddr> {
    let hops: Vec<IpAddr> = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|hop| hop.trim().parse().ok())
        .collect();

    // Proxies append, so the rightmost untrusted hop is the one our proxy saw.
    if let Some(client) = hops.iter().rev().find(|hop| !trusted_proxies.contains(hop)) {
        return Some(*client);
    }

    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}
