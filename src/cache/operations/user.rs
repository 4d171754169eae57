use std::sync::Arc;

use async_trait::async_trait;
use redis::Client as RedisClient;
use uuid::Uuid;

use super::{connection, invalidate, read_through};
use crate::cache::keys::{user_key, user_login_key};
use crate::error::Result;
use crate::models::{User, UserRepository, normalize_login};

/// 用户缓存：按 ID 与登录名两种键缓存同一用户
pub struct CachedUserRepository<R> {
    repo: R,
    redis_client: Arc<RedisClient>,
}

impl<R: UserRepository> CachedUserRepository<R> {
    pub fn new(repo: R, redis_client: Arc<RedisClient>) -> Self {
        Self { repo, redis_client }
    }
}

#[async_trait]
impl<R: UserRepository> UserRepository for CachedUserRepository<R> {
    async fn create(&self, user: &User) -> Result<()> {
        // 新用户的键下不可能已有缓存
        self.repo.create(user).await
    }

    async fn fetch(&self, user_id: Uuid) -> Result<User> {
        let mut conn = connection(&self.redis_client, "user.fetch", user_id).await?;

        read_through(&mut conn, "user.fetch", &user_key(user_id), || {
            self.repo.fetch(user_id)
        })
        .await
    }

    async fn fetch_by_login(&self, login: &str) -> Result<User> {
        let login = normalize_login(login);
        let mut conn = connection(&self.redis_client, "user.fetch_by_login", &login).await?;

        read_through(
            &mut conn,
            "user.fetch_by_login",
            &user_login_key(&login),
            || self.repo.fetch_by_login(&login),
        )
        .await
    }

    async fn update(&self, user: &User) -> Result<()> {
        // 旧登录名的缓存键必须在登录名变更后失效
        let current = self.fetch(user.id).await?;

        self.repo.update(user).await?;

        let mut conn = connection(&self.redis_client, "user.update", user.id).await?;
        invalidate(
            &mut conn,
            "user.update",
            &[
                user_key(current.id),
                user_login_key(&current.login),
                user_login_key(&normalize_login(&user.login)),
            ],
        )
        .await
    }

    async fn delete(&self, user_id: Uuid) -> Result<()> {
        let current = self.fetch(user_id).await?;

        self.repo.delete(user_id).await?;

        let mut conn = connection(&self.redis_client, "user.delete", user_id).await?;
        invalidate(
            &mut conn,
            "user.delete",
            &[user_key(current.id), user_login_key(&current.login)],
        )
        .await
    }
}
