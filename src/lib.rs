use std::sync::Arc;

use config::Config;
use redis::Client as RedisClient;
use sqlx::PgPool;

pub mod auth;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod notes;
pub mod utils;

pub use error::{Error, Result};

use auth::AuthService;
use cache::{CachedNoteRepository, CachedUserRepository, RedisSessionRepository};
use database::{PgNoteRepository, PgUserRepository};
use error::StoreContext;
use models::{NoteRepository, SessionRepository, UserRepository};
use notes::NoteService;
use uuid::Uuid;

/// Users and notes go through their read-through caches; sessions live in
/// Redis only.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub notes: Arc<dyn NoteRepository>,
}

impl Repositories {
    pub fn new(pool: PgPool, redis: Arc<RedisClient>) -> Self {
        Self {
            users: Arc::new(CachedUserRepository::new(
                PgUserRepository::new(pool.clone()),
                redis.clone(),
            )),
            sessions: Arc::new(RedisSessionRepository::new(redis.clone())),
            notes: Arc::new(CachedNoteRepository::new(PgNoteRepository::new(pool), redis)),
        }
    }

    /// Connects both stores and makes sure the tables exist.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = database::connect(config).await?;
        database::ensure_schema(&pool).await?;

        let redis_client =
            RedisClient::open(config.redis_url.clone()).context("redis.open", "client")?;

        tracing::info!("Connected to Postgres and Redis");
        Ok(Self::new(pool, Arc::new(redis_client)))
    }

    /// Deletes a user together with their notes and sessions. Notes go
    /// through the note repository one by one so that every cached copy is
    /// invalidated before the user row disappears.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        for note in self.notes.fetch_all(user_id).await? {
            match self.notes.delete(note.id).await {
                Ok(()) | Err(Error::NoteNotExists) => {}
                Err(e) => return Err(e),
            }
        }

        for session in self.sessions.fetch_all(user_id).await? {
            match self.sessions.delete(session.id).await {
                Ok(()) | Err(Error::SessionNotExists) => {}
                Err(e) => return Err(e),
            }
        }

        self.users.delete(user_id).await?;
        tracing::info!("Deleted user {} with their notes and sessions", user_id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub repositories: Repositories,
    pub auth: Arc<AuthService>,
    pub notes: Arc<NoteService>,
    pub config: Config,
}

impl AppState {
    pub fn new(repositories: Repositories, config: Config) -> Self {
        let auth = Arc::new(AuthService::new(
            repositories.clone(),
            config.operation_timeout(),
        ));
        let notes = Arc::new(NoteService::new(
            repositories.notes.clone(),
            config.operation_timeout(),
        ));

        Self {
            repositories,
            auth,
            notes,
            config,
        }
    }
}
