//! Persistence of notes.
//!
//! The rest of the crate only talks to [`NoteStore`]. The in-memory draft is
//! the source of truth while a note is being edited, so stores are not
//! required to offer read-after-write consistency.

mod memory_store;
mod sqlite_store;

use async_trait::async_trait;
use uuid::Uuid;

use crate::entity::Note;
use crate::error::Result;

pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;

/// Directory holding a notebook's database and configuration.
pub const NOTEBOOK_DIR: &str = ".mindjungle";

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Store `note`, replacing any record with the same id.
    async fn put(&self, note: &Note) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Note>>;

    /// Remove the note. Removing an unknown id is not an error.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Every note, most recently updated first.
    async fn list_all(&self) -> Result<Vec<Note>>;
}

/// Order notes the way `list_all` returns them.
pub(crate) fn sort_by_recency(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
}
