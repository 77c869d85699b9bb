use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        HeaderMap, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine as _;
use tracing::warn;

use crate::config::Credentials;

const REALM: &str = "chat";

/// Reject any request whose basic-auth header does not match `credentials`.
pub async fn require_basic_auth(
    State(credentials): State<Arc<Credentials>>,
    request: Request,
    next: Next,
) -> Response {
    match basic_credentials(request.headers()) {
        Some((username, password))
            if username == credentials.username && password == credentials.password =>
        {
            next.run(request).await
        }
        Some((username, _)) => {
            warn!("Rejected basic auth for user {:?}", username);
            challenge()
        }
        None => {
            warn!("Missing or malformed Authorization header");
            challenge()
        }
    }
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn challenge() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(WWW_AUTHENTICATE, format!("Basic realm=\"{}\"", REALM))],
        "Unauthorized",
    )
        .into_response()
}
