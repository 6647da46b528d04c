//! The in-memory note collection that link derivation reads from.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::entity::Note;
use crate::storage::sort_by_recency;

/// Shared, most-recently-updated-first list of notes.
///
/// Cloning is cheap and every clone sees the same notes, so background save
/// tasks can publish persisted records while the workspace reads.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    notes: Arc<RwLock<Vec<Note>>>,
}

impl Corpus {
    pub fn new(mut notes: Vec<Note>) -> Self {
        sort_by_recency(&mut notes);
        Self {
            notes: Arc::new(RwLock::new(notes)),
        }
    }

    /// A copy of the current notes.
    pub fn snapshot(&self) -> Vec<Note> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<Note> {
        self.read().iter().find(|n| n.id == id).cloned()
    }

    pub fn first(&self) -> Option<Note> {
        self.read().first().cloned()
    }

    /// Insert or replace a note, keeping recency order.
    pub fn upsert(&self, note: Note) {
        let mut notes = self.write();
        match notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => *existing = note,
            None => notes.push(note),
        }
        sort_by_recency(&mut notes);
    }

    pub fn remove(&self, id: Uuid) -> Option<Note> {
        let mut notes = self.write();
        let pos = notes.iter().position(|n| n.id == id)?;
        Some(notes.remove(pos))
    }

    pub fn replace(&self, mut notes: Vec<Note>) {
        sort_by_recency(&mut notes);
        *self.write() = notes;
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Note>> {
        self.notes.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Note>> {
        self.notes.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
