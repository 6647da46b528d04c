use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{sort_by_recency, NoteStore};
use crate::entity::Note;
use crate::error::{MindJungleError, Result};

/// Process-local store. Counts writes so autosave behaviour can be observed.
#[derive(Debug, Default)]
pub struct MemoryStore {
    notes: Mutex<HashMap<Uuid, Note>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `notes`. Seeding does not count as writes.
    pub fn with_notes(notes: impl IntoIterator<Item = Note>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.notes.lock() {
            map.extend(notes.into_iter().map(|n| (n.id, n)));
        }
        store
    }

    /// Number of `put` calls served so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Note>>> {
        self.notes
            .lock()
            .map_err(|_| MindJungleError::Storage("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn put(&self, note: &Note) -> Result<()> {
        self.lock()?.insert(note.id, note.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Note>> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.lock()?.remove(&id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Note>> {
        let mut notes: Vec<Note> = self.lock()?.values().cloned().collect();
        sort_by_recency(&mut notes);
        Ok(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::NoteKind;
    use chrono::Duration;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();
        let note = Note::new("Memo", NoteKind::Idea);

        store.put(&note).await.unwrap();
        assert_eq!(store.get(note.id).await.unwrap(), Some(note.clone()));
        assert_eq!(store.write_count(), 1);

        store.delete(note.id).await.unwrap();
        assert!(store.get(note.id).await.unwrap().is_none());
        store.delete(note.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_all_most_recent_first() {
        let mut old = Note::new("Old", NoteKind::Idea);
        old.updated_at = old.updated_at - Duration::hours(1);
        let new = Note::new("New", NoteKind::Idea);
        let store = MemoryStore::with_notes([old.clone(), new.clone()]);

        let titles: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["New", "Old"]);
        assert_eq!(store.write_count(), 0);
    }
}
