use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::Result;
use crate::utils::{generate_salt, hash_password, now, verify_password};

pub const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    pub password: String,
    pub salt: String,
    pub role: String,
    pub registered_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

/// Logins are compared case-insensitively; this is the stored form.
pub fn normalize_login(login: &str) -> String {
    login.to_lowercase()
}

impl User {
    pub fn new(login: &str, password: &str) -> Self {
        let salt = generate_salt();
        let current = now();

        Self {
            id: Uuid::new_v4(),
            login: normalize_login(login),
            password: hash_password(password, &salt),
            salt,
            role: DEFAULT_ROLE.to_string(),
            registered_at: current,
            last_login_at: current,
        }
    }

    pub fn check_password(&self, password: &str) -> bool {
        verify_password(password, &self.salt, &self.password)
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<()>;

    async fn fetch(&self, user_id: Uuid) -> Result<User>;

    /// Looks a user up by login, ignoring case.
    async fn fetch_by_login(&self, login: &str) -> Result<User>;

    /// Full replacement of the stored user with the same id.
    async fn update(&self, user: &User) -> Result<()>;

    async fn delete(&self, user_id: Uuid) -> Result<()>;
}
