use std::sync::Arc;

use async_trait::async_trait;
use redis::Client as RedisClient;
use uuid::Uuid;

use super::{connection, invalidate, read_through};
use crate::cache::keys::{note_key, user_notes_key};
use crate::error::Result;
use crate::models::{Note, NotePatch, NoteRepository};

/// 笔记缓存：包装持久化仓库的读穿透缓存
pub struct CachedNoteRepository<R> {
    repo: R,
    redis_client: Arc<RedisClient>,
}

impl<R: NoteRepository> CachedNoteRepository<R> {
    pub fn new(repo: R, redis_client: Arc<RedisClient>) -> Self {
        Self { repo, redis_client }
    }

    /// 笔记变更后可能过期的缓存键
    fn stale_keys(note: &Note) -> [String; 2] {
        [note_key(note.id), user_notes_key(note.author_id)]
    }
}

#[async_trait]
impl<R: NoteRepository> NoteRepository for CachedNoteRepository<R> {
    async fn create(&self, note: &Note) -> Result<()> {
        self.repo.create(note).await?;

        // 新笔记改变了作者的笔记列表
        let mut conn = connection(&self.redis_client, "note.create", note.id).await?;
        invalidate(&mut conn, "note.create", &Self::stale_keys(note)).await
    }

    async fn fetch(&self, note_id: Uuid) -> Result<Note> {
        let mut conn = connection(&self.redis_client, "note.fetch", note_id).await?;

        read_through(&mut conn, "note.fetch", &note_key(note_id), || {
            self.repo.fetch(note_id)
        })
        .await
    }

    async fn fetch_all(&self, user_id: Uuid) -> Result<Vec<Note>> {
        let mut conn = connection(&self.redis_client, "note.fetch_all", user_id).await?;

        read_through(&mut conn, "note.fetch_all", &user_notes_key(user_id), || {
            self.repo.fetch_all(user_id)
        })
        .await
    }

    async fn update(&self, patch: &NotePatch) -> Result<()> {
        // 先读出旧笔记，以便知道需要失效的键
        let current = self.fetch(patch.id).await?;

        self.repo.update(patch).await?;

        let mut conn = connection(&self.redis_client, "note.update", patch.id).await?;
        invalidate(&mut conn, "note.update", &Self::stale_keys(&current)).await
    }

    async fn delete(&self, note_id: Uuid) -> Result<()> {
        let current = self.fetch(note_id).await?;

        self.repo.delete(note_id).await?;

        let mut conn = connection(&self.redis_client, "note.delete", note_id).await?;
        invalidate(&mut conn, "note.delete", &Self::stale_keys(&current)).await
    }
}
