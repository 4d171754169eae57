use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::AppState;
use crate::error::Error;

pub const SESSION_COOKIE: &str = "session-id";
pub const SESSION_HEADER: &str = "x-session-id";

/// Authorizes the request's session, refreshing its last activity, and puts
/// the `Session` into the request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    let session_id = session_token(request.headers()).ok_or(Error::Unauthorized)?;

    let session = match state.auth.authorize(session_id).await {
        Ok(session) => session,
        Err(Error::SessionNotExists) => return Err(Error::Unauthorized),
        Err(e) => {
            tracing::error!("Failed to authorize session {}: {}", session_id, e);
            return Err(e);
        }
    };

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Session id from the `x-session-id` header, else from the `session-id` cookie.
pub fn session_token(headers: &HeaderMap) -> Option<Uuid> {
    if let Some(value) = headers.get(SESSION_HEADER) {
        return value
            .to_str()
            .ok()
            .and_then(|v| Uuid::parse_str(v.trim()).ok());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}
