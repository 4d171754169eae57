use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result, StoreContext};
use crate::models::{User, UserRepository, normalize_login};

/// 用户存储库实现
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 登录名唯一约束冲突转换为 `UserExists`，其余错误视为存储故障
fn map_write_error(err: sqlx::Error, op: &'static str, user: &User) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::UserExists(normalize_login(&user.login))
        }
        _ => Error::Database {
            op,
            id: user.id.to_string(),
            source: err,
        },
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, login, password, salt, role, registered_at, last_login_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(normalize_login(&user.login))
        .bind(&user.password)
        .bind(&user.salt)
        .bind(&user.role)
        .bind(user.registered_at)
        .bind(user.last_login_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "user.create", user))?;

        tracing::info!("Created user: {}", user.id);
        Ok(())
    }

    async fn fetch(&self, user_id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password, salt, role, registered_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("user.fetch", user_id)?
        .ok_or(Error::UserNotExists)
    }

    async fn fetch_by_login(&self, login: &str) -> Result<User> {
        let login = normalize_login(login);

        sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password, salt, role, registered_at, last_login_at
            FROM users
            WHERE login = $1
            "#,
        )
        .bind(&login)
        .fetch_optional(&self.pool)
        .await
        .context("user.fetch_by_login", &login)?
        .ok_or(Error::UserNotExists)
    }

    async fn update(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET login = $1, password = $2, salt = $3, role = $4, last_login_at = $5
            WHERE id = $6
            "#,
        )
        .bind(normalize_login(&user.login))
        .bind(&user.password)
        .bind(&user.salt)
        .bind(&user.role)
        .bind(user.last_login_at)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "user.update", user))?;

        if result.rows_affected() == 0 {
            return Err(Error::UserNotExists);
        }
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("user.delete", user_id)?;

        if result.rows_affected() == 0 {
            return Err(Error::UserNotExists);
        }
        Ok(())
    }
}
