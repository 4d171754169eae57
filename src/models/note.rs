use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::Result;
use crate::utils::now;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Replacement values for the mutable part of a note. Author and creation
/// time are deliberately absent: they never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePatch {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(author_id: Uuid, title: impl Into<String>, content: impl Into<String>) -> Self {
        let current = now();

        Self {
            id: Uuid::new_v4(),
            author_id,
            title: title.into(),
            content: content.into(),
            created_at: current,
            updated_at: current,
        }
    }

    pub fn apply(&mut self, patch: &NotePatch) {
        self.title = patch.title.clone();
        self.content = patch.content.clone();
        self.updated_at = patch.updated_at;
    }
}

impl NotePatch {
    pub fn new(id: Uuid, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            updated_at: now(),
        }
    }
}

#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn create(&self, note: &Note) -> Result<()>;

    /// Fails with `NoteNotExists` when there is no such note.
    async fn fetch(&self, note_id: Uuid) -> Result<Note>;

    /// Every note written by the user; empty when there are none.
    async fn fetch_all(&self, user_id: Uuid) -> Result<Vec<Note>>;

    async fn update(&self, patch: &NotePatch) -> Result<()>;

    async fn delete(&self, note_id: Uuid) -> Result<()>;
}
