mod auth;

pub use auth::{SESSION_COOKIE, SESSION_HEADER, require_session, session_token};
