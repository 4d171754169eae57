#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use notes_backend::models::{
    Note, NotePatch, NoteRepository, User, UserRepository, normalize_login,
};
use notes_backend::{Error, Result};
use redis::aio::MultiplexedConnection;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Redis from `REDIS_URL`, or `None` (test skipped) when it is not reachable.
pub async fn redis_client() -> Option<Arc<redis::Client>> {
    init_tracing();
    dotenv::dotenv().ok();

    let Ok(url) = std::env::var("REDIS_URL") else {
        eprintln!("REDIS_URL not set, skipping");
        return None;
    };

    let client = redis::Client::open(url).ok()?;
    match client.get_multiplexed_async_connection().await {
        Ok(_) => Some(Arc::new(client)),
        Err(e) => {
            eprintln!("redis unreachable ({e}), skipping");
            None
        }
    }
}

/// A client whose every connection attempt is refused.
pub fn unreachable_redis() -> Arc<redis::Client> {
    init_tracing();
    Arc::new(redis::Client::open("redis://127.0.0.1:1/").expect("valid redis url"))
}

/// Postgres from `DATABASE_URL` with the tables in place, or `None`.
pub async fn pg_pool() -> Option<PgPool> {
    init_tracing();
    dotenv::dotenv().ok();

    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return None;
    };

    let pool = match PgPoolOptions::new().max_connections(4).connect(&url).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("postgres unreachable ({e}), skipping");
            return None;
        }
    };

    notes_backend::database::ensure_schema(&pool)
        .await
        .expect("create tables");
    Some(pool)
}

pub async fn conn(client: &redis::Client) -> MultiplexedConnection {
    client
        .get_multiplexed_async_connection()
        .await
        .expect("redis connection")
}

/// A login no other test run will use, since cache keys are shared.
pub fn unique_login(prefix: &str) -> String {
    format!("{}{}", prefix, &Uuid::new_v4().simple().to_string()[..10])
}

#[derive(Clone, Default)]
pub struct MemoryNoteRepository {
    notes: Arc<Mutex<HashMap<Uuid, Note>>>,
    fetches: Arc<AtomicUsize>,
}

impl MemoryNoteRepository {
    /// How many reads reached this store (single and collection).
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NoteRepository for MemoryNoteRepository {
    async fn create(&self, note: &Note) -> Result<()> {
        self.notes.lock().unwrap().insert(note.id, note.clone());
        Ok(())
    }

    async fn fetch(&self, note_id: Uuid) -> Result<Note> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.notes
            .lock()
            .unwrap()
            .get(&note_id)
            .cloned()
            .ok_or(Error::NoteNotExists)
    }

    async fn fetch_all(&self, user_id: Uuid) -> Result<Vec<Note>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut notes: Vec<Note> = self
            .notes
            .lock()
            .unwrap()
            .values()
            .filter(|n| n.author_id == user_id)
            .cloned()
            .collect();
        notes.sort_by_key(|n| (n.created_at, n.id));
        Ok(notes)
    }

    async fn update(&self, patch: &NotePatch) -> Result<()> {
        let mut notes = self.notes.lock().unwrap();
        let note = notes.get_mut(&patch.id).ok_or(Error::NoteNotExists)?;
        note.apply(patch);
        Ok(())
    }

    async fn delete(&self, note_id: Uuid) -> Result<()> {
        self.notes
            .lock()
            .unwrap()
            .remove(&note_id)
            .map(|_| ())
            .ok_or(Error::NoteNotExists)
    }
}

#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
    fetches: Arc<AtomicUsize>,
}

impl MemoryUserRepository {
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        let login = normalize_login(&user.login);
        if users.values().any(|u| u.login == login) {
            return Err(Error::UserExists(login));
        }

        let mut stored = user.clone();
        stored.login = login;
        users.insert(stored.id, stored);
        Ok(())
    }

    async fn fetch(&self, user_id: Uuid) -> Result<User> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.users
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or(Error::UserNotExists)
    }

    async fn fetch_by_login(&self, login: &str) -> Result<User> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let login = normalize_login(login);
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.login == login)
            .cloned()
            .ok_or(Error::UserNotExists)
    }

    async fn update(&self, user: &User) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        if !users.contains_key(&user.id) {
            return Err(Error::UserNotExists);
        }

        let mut stored = user.clone();
        stored.login = normalize_login(&user.login);
        users.insert(stored.id, stored);
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<()> {
        self.users
            .lock()
            .unwrap()
            .remove(&user_id)
            .map(|_| ())
            .ok_or(Error::UserNotExists)
    }
}
