//! Account operations built on the repositories: registration, login with
//! session creation, per-request session authorization and logout.

use std::time::Duration;

use uuid::Uuid;

use crate::Repositories;
use crate::error::{Error, Result};
use crate::models::{Session, User};
use crate::utils::{now, with_deadline};

pub struct AuthService {
    repositories: Repositories,
    timeout: Duration,
}

impl AuthService {
    /// Every repository call made by the service is bounded by `timeout`.
    pub fn new(repositories: Repositories, timeout: Duration) -> Self {
        Self {
            repositories,
            timeout,
        }
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repositories
    }

    pub async fn register(&self, login: &str, password: &str) -> Result<User> {
        let user = User::new(login, password);

        with_deadline(
            "auth.register",
            self.timeout,
            self.repositories.users.create(&user),
        )
        .await?;

        tracing::info!("Registered user {} ({})", user.login, user.id);
        Ok(user)
    }

    /// Checks the credentials and opens a new session for the user. Opening
    /// a session may evict the user's least recently active one.
    pub async fn login(&self, login: &str, password: &str) -> Result<Session> {
        let mut user = with_deadline(
            "auth.login",
            self.timeout,
            self.repositories.users.fetch_by_login(login),
        )
        .await?;

        if !user.check_password(password) {
            tracing::debug!("Rejected password for user {}", user.id);
            return Err(Error::InvalidCredentials);
        }

        user.last_login_at = now();
        with_deadline(
            "auth.login",
            self.timeout,
            self.repositories.users.update(&user),
        )
        .await?;

        let session = Session::new(user.id, user.role.clone());
        with_deadline(
            "auth.login",
            self.timeout,
            self.repositories.sessions.create(&session),
        )
        .await?;

        tracing::info!("User {} logged in with session {}", user.id, session.id);
        Ok(session)
    }

    /// Resolves a session token and records the activity.
    pub async fn authorize(&self, session_id: Uuid) -> Result<Session> {
        let mut session = with_deadline(
            "auth.authorize",
            self.timeout,
            self.repositories.sessions.fetch(session_id),
        )
        .await?;

        session.touch();
        with_deadline(
            "auth.authorize",
            self.timeout,
            self.repositories.sessions.update(&session),
        )
        .await?;

        Ok(session)
    }

    /// Ends a session. Logging out of a session that is already gone succeeds.
    pub async fn logout(&self, session_id: Uuid) -> Result<()> {
        match with_deadline(
            "auth.logout",
            self.timeout,
            self.repositories.sessions.delete(session_id),
        )
        .await
        {
            Ok(()) | Err(Error::SessionNotExists) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn sessions(&self, user_id: Uuid) -> Result<Vec<Session>> {
        with_deadline(
            "auth.sessions",
            self.timeout,
            self.repositories.sessions.fetch_all(user_id),
        )
        .await
    }
}
