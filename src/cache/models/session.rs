use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::Session;

pub const FIELD_ID: &str = "id";
pub const FIELD_USER_ID: &str = "user_id";
pub const FIELD_ROLE: &str = "role";
pub const FIELD_CREATED_AT: &str = "created_at";
pub const FIELD_LAST_ACTIVITY: &str = "last_activity";

/// Field/value pairs of a session as stored in its Redis hash.
pub fn session_fields(session: &Session) -> [(&'static str, String); 5] {
    [
        (FIELD_ID, session.id.to_string()),
        (FIELD_USER_ID, session.user_id.to_string()),
        (FIELD_ROLE, session.role.clone()),
        (FIELD_CREATED_AT, encode_timestamp(session.created_at)),
        (FIELD_LAST_ACTIVITY, encode_timestamp(session.last_activity)),
    ]
}

/// Rebuilds a session from a non-empty hash read back from `key`.
pub fn session_from_fields(key: &str, fields: &HashMap<String, String>) -> Result<Session> {
    let field = |name: &'static str| {
        fields.get(name).ok_or_else(|| Error::MalformedRecord {
            key: key.to_string(),
            field: name,
        })
    };

    let uuid = |name: &'static str| -> Result<Uuid> {
        Uuid::parse_str(field(name)?).map_err(|_| Error::MalformedRecord {
            key: key.to_string(),
            field: name,
        })
    };

    Ok(Session {
        id: uuid(FIELD_ID)?,
        user_id: uuid(FIELD_USER_ID)?,
        role: field(FIELD_ROLE)?.clone(),
        created_at: decode_timestamp(key, FIELD_CREATED_AT, field(FIELD_CREATED_AT)?)?,
        last_activity: decode_timestamp(key, FIELD_LAST_ACTIVITY, field(FIELD_LAST_ACTIVITY)?)?,
    })
}

pub fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_timestamp(key: &str, field: &'static str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| Error::MalformedRecord {
            key: key.to_string(),
            field,
        })
}
