use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use callboard_common::Identity;

use crate::AppState;

/// Caller identity resolved from the Basic auth header. Extract this in
/// every handler: a missing, malformed, or mismatched header never
/// rejects the request, it just yields `Identity::Anonymous` and lets the
/// access service decide what that caller may do.
pub struct Caller(pub Identity);

impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        let identity = match parse_basic(header) {
            Some((username, secret)) => state.accounts.resolve(Some((&username, &secret))).await,
            None => Identity::Anonymous,
        };
        Ok(Caller(identity))
    }
}

/// Parse `Basic <base64(username:secret)>`. Any malformation yields None.
fn parse_basic(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, secret) = decoded.split_once(':')?;
    Some((username.to_string(), secret.to_string()))
}
