use async_trait::async_trait;

use crate::domain::{NewNote, Note, NotePage, TransportError};

/// Remote collection of notes.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Fetch one page of notes whose text matches `search` (empty = all).
    async fn list_notes(&self, search: &str, page: u32) -> Result<NotePage, TransportError>;

    async fn create_note(&self, note: &NewNote) -> Result<Note, TransportError>;

    /// Delete a note and return it as the server last stored it
    async fn delete_note(&self, id: &str) -> Result<Note, TransportError>;
}
