//! Note operations on behalf of an authorized session. A note is visible
//! and mutable only by its author.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Note, NotePatch, NoteRepository, Session};
use crate::utils::with_deadline;

pub struct NoteService {
    notes: Arc<dyn NoteRepository>,
    timeout: Duration,
}

impl NoteService {
    pub fn new(notes: Arc<dyn NoteRepository>, timeout: Duration) -> Self {
        Self { notes, timeout }
    }

    pub async fn create(&self, session: &Session, title: &str, content: &str) -> Result<Note> {
        let note = Note::new(session.user_id, title, content);
        with_deadline("notes.create", self.timeout, self.notes.create(&note)).await?;

        tracing::info!("User {} created note {}", session.user_id, note.id);
        Ok(note)
    }

    pub async fn fetch(&self, session: &Session, note_id: Uuid) -> Result<Note> {
        self.owned("notes.fetch", session, note_id).await
    }

    pub async fn fetch_all(&self, session: &Session) -> Result<Vec<Note>> {
        with_deadline(
            "notes.fetch_all",
            self.timeout,
            self.notes.fetch_all(session.user_id),
        )
        .await
    }

    /// Replaces title and content, returning the note as stored afterwards.
    pub async fn update(
        &self,
        session: &Session,
        note_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Note> {
        self.owned("notes.update", session, note_id).await?;

        let patch = NotePatch::new(note_id, title, content);
        with_deadline("notes.update", self.timeout, self.notes.update(&patch)).await?;

        with_deadline("notes.update", self.timeout, self.notes.fetch(note_id)).await
    }

    pub async fn delete(&self, session: &Session, note_id: Uuid) -> Result<()> {
        self.owned("notes.delete", session, note_id).await?;
        with_deadline("notes.delete", self.timeout, self.notes.delete(note_id)).await
    }

    /// The note, provided the session's user wrote it.
    async fn owned(&self, op: &'static str, session: &Session, note_id: Uuid) -> Result<Note> {
        let note = with_deadline(op, self.timeout, self.notes.fetch(note_id)).await?;

        if note.author_id != session.user_id {
            tracing::debug!(
                "User {} denied access to note {} of user {}",
                session.user_id,
                note.id,
                note.author_id
            );
            return Err(Error::Forbidden);
        }
        Ok(note)
    }
}
