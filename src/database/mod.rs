// 数据库模块
// 连接池初始化、建表语句以及笔记/用户的持久化仓库

pub mod repositories;

pub use repositories::{PgNoteRepository, PgUserRepository};

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;

use crate::config::Config;
use crate::error::{Result, StoreContext};

pub async fn connect(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'notes_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .context("database.connect", "pool")
}

/// 创建表（如不存在）
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            login TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            salt TEXT NOT NULL,
            role TEXT NOT NULL,
            registered_at TIMESTAMPTZ NOT NULL,
            last_login_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("database.schema", "users")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notes (
            id UUID PRIMARY KEY,
            author_id UUID NOT NULL REFERENCES users (id),
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("database.schema", "notes")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS notes_author_id_idx ON notes (author_id)")
        .execute(pool)
        .await
        .context("database.schema", "notes_author_id_idx")?;

    Ok(())
}
