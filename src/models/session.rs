use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::utils::now;

/// Upper bound on concurrently live sessions per user.
pub const MAX_SESSIONS: usize = 5;

/// Sliding lifetime of a session record and of the user's session list.
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 30);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: Uuid, role: impl Into<String>) -> Self {
        let current = now();

        Self {
            id: Uuid::new_v4(),
            user_id,
            role: role.into(),
            created_at: current,
            last_activity: current,
        }
    }

    /// Marks the session as used right now.
    pub fn touch(&mut self) {
        self.last_activity = now();
    }
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Stores a new session, evicting the user's least recently active
    /// sessions first so that at most [`MAX_SESSIONS`] remain afterwards.
    async fn create(&self, session: &Session) -> Result<()>;

    async fn fetch(&self, session_id: Uuid) -> Result<Session>;

    /// Live sessions of a user. Ids whose records already expired are dropped
    /// from the user's list on the way.
    async fn fetch_all(&self, user_id: Uuid) -> Result<Vec<Session>>;

    /// Rewrites every field and refreshes both TTLs. Does not check existence.
    async fn update(&self, session: &Session) -> Result<()>;

    async fn delete(&self, session_id: Uuid) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_active() {
        let user_id = Uuid::new_v4();
        let session = Session::new(user_id, "user");

        assert_eq!(session.user_id, user_id);
        assert_eq!(session.created_at, session.last_activity);
        assert_ne!(session.id, user_id);
    }

    #[test]
    fn touch_never_moves_activity_backwards() {
        let mut session = Session::new(Uuid::new_v4(), "user");
        let before = session.last_activity;
        session.touch();
        assert!(session.last_activity >= before);
        assert_eq!(session.created_at, before);
    }
}
