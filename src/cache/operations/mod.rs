/// 缓存操作
/// 读穿透：未命中时回源并写入缓存；写操作只删除缓存，不原地更新
pub mod note;
pub mod session;
pub mod user;

pub use note::CachedNoteRepository;
pub use session::RedisSessionRepository;
pub use user::CachedUserRepository;

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use redis::{AsyncCommands, Client as RedisClient, aio::MultiplexedConnection};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{Error, Result, StoreContext};

/// 笔记与用户缓存的过期时间，每次命中时刷新
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

pub(crate) async fn connection(
    redis: &RedisClient,
    op: &'static str,
    id: impl Display,
) -> Result<MultiplexedConnection> {
    redis.get_multiplexed_async_connection().await.context(op, id)
}

/// 读穿透：命中时刷新过期时间，未命中时调用 `load` 回源并写入缓存
///
/// 缓存内容无法反序列化时返回错误，不当作未命中处理。
/// 回源失败（包括不存在）原样返回，不缓存任何结果。
pub(crate) async fn read_through<T, F, Fut>(
    conn: &mut MultiplexedConnection,
    op: &'static str,
    key: &str,
    load: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let cached: Option<String> = conn.get(key).await.context(op, key)?;

    match cached {
        Some(json) => {
            let value = serde_json::from_str(&json).map_err(|source| Error::Serialization {
                key: key.to_string(),
                source,
            })?;

            let _: () = conn
                .expire(key, DEFAULT_TTL.as_secs() as i64)
                .await
                .context(op, key)?;

            tracing::debug!("Cache hit: {}", key);
            Ok(value)
        }
        None => {
            tracing::debug!("Cache miss: {}", key);
            let value = load().await?;
            store(conn, op, key, &value).await?;
            Ok(value)
        }
    }
}

async fn store<T: Serialize>(
    conn: &mut MultiplexedConnection,
    op: &'static str,
    key: &str,
    value: &T,
) -> Result<()> {
    let json = serde_json::to_string(value).map_err(|source| Error::Serialization {
        key: key.to_string(),
        source,
    })?;

    let _: () = conn
        .set_ex(key, json, DEFAULT_TTL.as_secs())
        .await
        .context(op, key)?;

    tracing::debug!("Set cache: {}", key);
    Ok(())
}

/// 删除给定的缓存键，键不存在不算错误
pub(crate) async fn invalidate(
    conn: &mut MultiplexedConnection,
    op: &'static str,
    keys: &[String],
) -> Result<()> {
    let _: () = conn.del(keys).await.context(op, keys.join(","))?;

    tracing::debug!("Invalidated cache: {:?}", keys);
    Ok(())
}
