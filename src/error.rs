use std::fmt::Display;
use std::time::Duration;

use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("session does not exist")]
    SessionNotExists,

    #[error("note does not exist")]
    NoteNotExists,

    #[error("user does not exist")]
    UserNotExists,

    #[error("user with login {0:?} already exists")]
    UserExists(String),

    #[error("invalid login or password")]
    InvalidCredentials,

    #[error("missing or invalid session token")]
    Unauthorized,

    /// The session is valid but its user does not own the entity.
    #[error("not enough permissions for this note")]
    Forbidden,

    /// Redis could not be reached or rejected the command.
    #[error("{op} ({id}): cache store failure: {source}")]
    Cache {
        op: &'static str,
        id: String,
        #[source]
        source: redis::RedisError,
    },

    /// Postgres could not be reached or rejected the query.
    #[error("{op} ({id}): database failure: {source}")]
    Database {
        op: &'static str,
        id: String,
        #[source]
        source: sqlx::Error,
    },

    /// A cached payload that no longer decodes. Never treated as a miss.
    #[error("malformed cached payload at {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed record at {key}: bad or missing field {field:?}")]
    MalformedRecord { key: String, field: &'static str },

    #[error("{op} did not finish within {after:?}")]
    DeadlineExceeded { op: &'static str, after: Duration },
}

/// Coarse error classes callers map to outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    Conflict,
    Unauthenticated,
    Forbidden,
    StoreUnavailable,
    Serialization,
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::SessionNotExists | Error::NoteNotExists | Error::UserNotExists => {
                ErrorClass::NotFound
            }
            Error::UserExists(_) => ErrorClass::Conflict,
            Error::InvalidCredentials | Error::Unauthorized => ErrorClass::Unauthenticated,
            Error::Forbidden => ErrorClass::Forbidden,
            Error::Cache { .. } | Error::Database { .. } | Error::DeadlineExceeded { .. } => {
                ErrorClass::StoreUnavailable
            }
            Error::Serialization { .. } | Error::MalformedRecord { .. } => {
                ErrorClass::Serialization
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.class() == ErrorClass::NotFound
    }

    pub fn status(&self) -> StatusCode {
        match self.class() {
            ErrorClass::NotFound => StatusCode::NOT_FOUND,
            ErrorClass::Conflict => StatusCode::CONFLICT,
            ErrorClass::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorClass::Forbidden => StatusCode::FORBIDDEN,
            ErrorClass::StoreUnavailable | ErrorClass::Serialization => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Attaches the operation name and entity id to a store error.
pub(crate) trait StoreContext<T> {
    fn context(self, op: &'static str, id: impl Display) -> Result<T>;
}

impl<T> StoreContext<T> for redis::RedisResult<T> {
    fn context(self, op: &'static str, id: impl Display) -> Result<T> {
        self.map_err(|source| Error::Cache {
            op,
            id: id.to_string(),
            source,
        })
    }
}

impl<T> StoreContext<T> for std::result::Result<T, sqlx::Error> {
    fn context(self, op: &'static str, id: impl Display) -> Result<T> {
        self.map_err(|source| Error::Database {
            op,
            id: id.to_string(),
            source,
        })
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    code: i32,
    error_message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        // store failures keep their details in the log, not the body
        let error_message = match self.class() {
            ErrorClass::StoreUnavailable | ErrorClass::Serialization => {
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(ErrorResponse {
            code: status.as_u16() as i32,
            error_message,
        });

        (status, body).into_response()
    }
}
