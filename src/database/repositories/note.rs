use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result, StoreContext};
use crate::models::{Note, NotePatch, NoteRepository};

/// 笔记存储库实现
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: PgPool,
}

impl PgNoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn create(&self, note: &Note) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notes (id, author_id, title, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(note.id)
        .bind(note.author_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.created_at)
        .bind(note.updated_at)
        .execute(&self.pool)
        .await
        .context("note.create", note.id)?;

        Ok(())
    }

    async fn fetch(&self, note_id: Uuid) -> Result<Note> {
        sqlx::query_as::<_, Note>(
            r#"
            SELECT id, author_id, title, content, created_at, updated_at
            FROM notes
            WHERE id = $1
            "#,
        )
        .bind(note_id)
        .fetch_optional(&self.pool)
        .await
        .context("note.fetch", note_id)?
        .ok_or(Error::NoteNotExists)
    }

    async fn fetch_all(&self, user_id: Uuid) -> Result<Vec<Note>> {
        sqlx::query_as::<_, Note>(
            r#"
            SELECT id, author_id, title, content, created_at, updated_at
            FROM notes
            WHERE author_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("note.fetch_all", user_id)
    }

    async fn update(&self, patch: &NotePatch) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE notes
            SET title = $1, content = $2, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(patch.updated_at)
        .bind(patch.id)
        .execute(&self.pool)
        .await
        .context("note.update", patch.id)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotExists);
        }
        Ok(())
    }

    async fn delete(&self, note_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(note_id)
            .execute(&self.pool)
            .await
            .context("note.delete", note_id)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotExists);
        }
        Ok(())
    }
}
