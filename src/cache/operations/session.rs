use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Client as RedisClient, aio::MultiplexedConnection};
use uuid::Uuid;

use super::connection;
use crate::cache::keys::{session_key, user_sessions_key};
use crate::cache::models::session::{FIELD_LAST_ACTIVITY, decode_timestamp};
use crate::cache::models::{session_fields, session_from_fields};
use crate::error::{Error, Result, StoreContext};
use crate::models::{MAX_SESSIONS, SESSION_TTL, Session, SessionRepository};

/// Redis-backed session store.
///
/// Each session is a hash at `session:<id>`; each user owns a list of
/// session ids at `session:user:<user_id>`, newest first. Both carry
/// [`SESSION_TTL`], refreshed whenever the session is written.
///
/// The per-user cap is enforced by count-then-evict-then-insert without a
/// lock, so concurrent logins of one user may briefly overshoot it; the next
/// `create` converges back to the cap.
pub struct RedisSessionRepository {
    redis_client: Arc<RedisClient>,
}

impl RedisSessionRepository {
    pub fn new(redis_client: Arc<RedisClient>) -> Self {
        Self { redis_client }
    }

    /// Id of the user's least recently active session among the first
    /// [`MAX_SESSIONS`] in their list, or `None` when no live session is left.
    ///
    /// Ids whose record already expired are removed while scanning.
    pub async fn fetch_oldest(&self, user_id: Uuid) -> Result<Option<Uuid>> {
        let mut conn = connection(&self.redis_client, "session.fetch_oldest", user_id).await?;
        Self::fetch_oldest_on(&mut conn, user_id).await
    }

    async fn fetch_oldest_on(
        conn: &mut MultiplexedConnection,
        user_id: Uuid,
    ) -> Result<Option<Uuid>> {
        let list_key = user_sessions_key(user_id);
        let ids = Self::session_ids(conn, &list_key, user_id).await?;

        let mut candidates = Vec::with_capacity(ids.len());
        for (raw, id) in ids {
            let last_activity: Option<String> = conn
                .hget(session_key(id), FIELD_LAST_ACTIVITY)
                .await
                .context("session.fetch_oldest", id)?;

            match last_activity {
                Some(raw_at) => {
                    let at = decode_timestamp(&session_key(id), FIELD_LAST_ACTIVITY, &raw_at)?;
                    candidates.push((id, at));
                }
                None => {
                    tracing::warn!("Dropping expired session {} of user {}", id, user_id);
                    let _: () = redis::pipe()
                        .atomic()
                        .lrem(&list_key, 1, &raw)
                        .ignore()
                        .del(session_key(id))
                        .ignore()
                        .query_async(&mut *conn)
                        .await
                        .context("session.fetch_oldest", id)?;
                }
            }
        }

        Ok(pick_oldest(candidates, Utc::now()))
    }

    async fn fetch_on(conn: &mut MultiplexedConnection, session_id: Uuid) -> Result<Session> {
        let key = session_key(session_id);
        let fields: HashMap<String, String> =
            conn.hgetall(&key).await.context("session.fetch", session_id)?;

        if fields.is_empty() {
            return Err(Error::SessionNotExists);
        }

        session_from_fields(&key, &fields)
    }

    /// The first [`MAX_SESSIONS`] ids of a user's list, raw and parsed.
    async fn session_ids(
        conn: &mut MultiplexedConnection,
        list_key: &str,
        user_id: Uuid,
    ) -> Result<Vec<(String, Uuid)>> {
        let raw: Vec<String> = conn
            .lrange(list_key, 0, MAX_SESSIONS as isize - 1)
            .await
            .context("session.list", user_id)?;

        raw.into_iter()
            .map(|entry| {
                let id = Uuid::parse_str(&entry).map_err(|_| Error::MalformedRecord {
                    key: list_key.to_string(),
                    field: "session id",
                })?;
                Ok((entry, id))
            })
            .collect()
    }

    async fn session_count(
        conn: &mut MultiplexedConnection,
        list_key: &str,
        user_id: Uuid,
    ) -> Result<usize> {
        // LLEN of a missing list is 0
        let count: Option<usize> = conn.llen(list_key).await.context("session.count", user_id)?;
        Ok(count.unwrap_or(0))
    }
}

/// Linear scan for the smallest last-activity, starting from `baseline`.
/// Only strictly earlier timestamps replace the current minimum, so the
/// first id seen wins ties. If nothing predates the baseline (clock skew),
/// the earliest candidate is still returned so eviction always progresses.
fn pick_oldest(candidates: Vec<(Uuid, DateTime<Utc>)>, baseline: DateTime<Utc>) -> Option<Uuid> {
    let mut oldest: Option<(Uuid, DateTime<Utc>)> = None;

    for (id, at) in &candidates {
        let current = oldest.map(|(_, min)| min).unwrap_or(baseline);
        if *at < current {
            oldest = Some((*id, *at));
        }
    }

    oldest.map(|(id, _)| id).or_else(|| {
        candidates
            .iter()
            .fold(None::<(Uuid, DateTime<Utc>)>, |min, (id, at)| match min {
                Some((_, m)) if m <= *at => min,
                _ => Some((*id, *at)),
            })
            .map(|(id, _)| id)
    })
}

#[async_trait]
impl SessionRepository for RedisSessionRepository {
    async fn create(&self, session: &Session) -> Result<()> {
        let list_key = user_sessions_key(session.user_id);
        let mut conn = connection(&self.redis_client, "session.create", session.id).await?;

        let mut count = Self::session_count(&mut conn, &list_key, session.user_id).await?;
        while count >= MAX_SESSIONS {
            if let Some(oldest) = Self::fetch_oldest_on(&mut conn, session.user_id).await? {
                tracing::debug!(
                    "Evicting session {} of user {} ({} live)",
                    oldest,
                    session.user_id,
                    count
                );

                let _: () = redis::pipe()
                    .atomic()
                    .lrem(&list_key, 1, oldest.to_string())
                    .ignore()
                    .del(session_key(oldest))
                    .ignore()
                    .query_async(&mut conn)
                    .await
                    .context("session.evict", oldest)?;
            }

            let remaining = Self::session_count(&mut conn, &list_key, session.user_id).await?;
            if remaining >= count {
                // another login of this user is racing us; accept the overshoot
                tracing::warn!(
                    "Session count of user {} did not shrink ({} -> {})",
                    session.user_id,
                    count,
                    remaining
                );
                break;
            }
            count = remaining;
        }

        let key = session_key(session.id);
        let ttl = SESSION_TTL.as_secs() as i64;

        let _: () = redis::pipe()
            .atomic()
            .hset_multiple(&key, &session_fields(session))
            .ignore()
            .expire(&key, ttl)
            .ignore()
            .lpush(&list_key, session.id.to_string())
            .ignore()
            .expire(&list_key, ttl)
            .ignore()
            .query_async(&mut conn)
            .await
            .context("session.create", session.id)?;

        tracing::info!("Created session {} for user {}", session.id, session.user_id);
        Ok(())
    }

    async fn fetch(&self, session_id: Uuid) -> Result<Session> {
        let mut conn = connection(&self.redis_client, "session.fetch", session_id).await?;
        Self::fetch_on(&mut conn, session_id).await
    }

    async fn fetch_all(&self, user_id: Uuid) -> Result<Vec<Session>> {
        let list_key = user_sessions_key(user_id);
        let mut conn = connection(&self.redis_client, "session.fetch_all", user_id).await?;

        let ids = Self::session_ids(&mut conn, &list_key, user_id).await?;
        let mut sessions = Vec::with_capacity(ids.len());

        for (raw, id) in ids {
            match Self::fetch_on(&mut conn, id).await {
                Ok(session) => sessions.push(session),
                Err(Error::SessionNotExists) => {
                    tracing::warn!("Unlinking expired session {} of user {}", id, user_id);
                    let _: () = conn
                        .lrem(&list_key, 1, &raw)
                        .await
                        .context("session.fetch_all", id)?;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(sessions)
    }

    async fn update(&self, session: &Session) -> Result<()> {
        let key = session_key(session.id);
        let ttl = SESSION_TTL.as_secs() as i64;
        let mut conn = connection(&self.redis_client, "session.update", session.id).await?;

        let _: () = redis::pipe()
            .atomic()
            .hset_multiple(&key, &session_fields(session))
            .ignore()
            .expire(&key, ttl)
            .ignore()
            .expire(user_sessions_key(session.user_id), ttl)
            .ignore()
            .query_async(&mut conn)
            .await
            .context("session.update", session.id)?;

        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> Result<()> {
        let mut conn = connection(&self.redis_client, "session.delete", session_id).await?;
        let session = Self::fetch_on(&mut conn, session_id).await?;

        let _: () = redis::pipe()
            .atomic()
            .lrem(user_sessions_key(session.user_id), 1, session.id.to_string())
            .ignore()
            .del(session_key(session.id))
            .ignore()
            .query_async(&mut conn)
            .await
            .context("session.delete", session_id)?;

        tracing::info!("Deleted session {} of user {}", session.id, session.user_id);
        Ok(())
    }
}
