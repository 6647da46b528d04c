//! The editing session the UI drives.
//!
//! A workspace ties the note corpus, the active selection and the draft
//! engine together, and derives what the editor shows: the draft, its save
//! indicator, outgoing links, backlinks and counters.

mod stats;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::AutosaveConfig;
use crate::corpus::Corpus;
use crate::draft::{DraftEngine, NoteEdit, SaveEvent, SaveState, SaveStatus};
use crate::entity::{Note, NoteKind};
use crate::error::{MindJungleError, Result};
use crate::links;
use crate::storage::NoteStore;

pub use stats::{word_count, WorkspaceStats};

pub struct Workspace {
    store: Arc<dyn NoteStore>,
    corpus: Corpus,
    drafts: DraftEngine,
    selected: Option<Uuid>,
}

impl Workspace {
    /// Load every note from `store` and select the most recent one.
    pub async fn load(store: Arc<dyn NoteStore>, autosave: &AutosaveConfig) -> Result<Self> {
        let corpus = Corpus::new(store.list_all().await?);
        let drafts = DraftEngine::new(Arc::clone(&store), corpus.clone(), autosave.quiet_period());
        let mut workspace = Self {
            store,
            corpus,
            drafts,
            selected: None,
        };

        if let Some(first) = workspace.corpus.first() {
            workspace.select(Some(first.id))?;
        }
        debug!(notes = workspace.corpus.len(), "workspace loaded");
        Ok(workspace)
    }

    /// Reload the corpus from storage. Open drafts are left untouched.
    pub async fn refresh(&mut self) -> Result<()> {
        self.corpus.replace(self.store.list_all().await?);
        if let Some(id) = self.selected {
            if self.corpus.get(id).is_none() {
                self.selected = None;
            }
        }
        Ok(())
    }

    /// All notes, most recently updated first.
    pub fn notes(&self) -> Vec<Note> {
        self.corpus.snapshot()
    }

    pub fn note(&self, id: Uuid) -> Option<Note> {
        self.corpus.get(id)
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.selected
    }

    /// Create, store and select a note of `kind`.
    pub async fn create_note(&mut self, kind: NoteKind) -> Result<Note> {
        let note = Note::new(kind.default_title(), kind);
        self.add_note(note).await
    }

    /// Store a fully prepared note and select it.
    pub async fn add_note(&mut self, note: Note) -> Result<Note> {
        self.store.put(&note).await?;
        self.corpus.upsert(note.clone());
        info!(note_id = %note.id, kind = %note.kind, "note created");
        self.select(Some(note.id))?;
        Ok(note)
    }

    /// Delete a note. Its pending write is cancelled; other notes' links to
    /// its title are left dangling.
    pub async fn delete_note(&mut self, id: Uuid) -> Result<()> {
        self.drafts.discard(id).await;
        self.store.delete(id).await?;
        self.corpus.remove(id);
        info!(note_id = %id, "note deleted");

        if self.selected == Some(id) {
            self.selected = None;
            if let Some(fallback) = self.corpus.first() {
                self.select(Some(fallback.id))?;
            }
        }
        Ok(())
    }

    /// Switch the active note. `None` clears the selection.
    ///
    /// Returns `false` for an id that is not in the corpus, leaving the
    /// selection as it was. Pending writes of other notes carry on.
    pub fn select(&mut self, id: Option<Uuid>) -> Result<bool> {
        let Some(id) = id else {
            self.selected = None;
            self.drafts.prune(None);
            return Ok(true);
        };
        let Some(note) = self.corpus.get(id) else {
            return Ok(false);
        };

        self.drafts.prune(Some(id));
        self.drafts.open(&note)?;
        self.selected = Some(id);
        debug!(note_id = %id, "note selected");
        Ok(true)
    }

    /// Follow a link: select the first note titled `title`.
    ///
    /// An unresolved title is inert and returns `None`.
    pub fn select_by_title(&mut self, title: &str) -> Result<Option<Uuid>> {
        let notes = self.corpus.snapshot();
        let Some(id) = links::resolve_title(&notes, title).map(|n| n.id) else {
            debug!(title, "link target does not resolve");
            return Ok(None);
        };
        self.select(Some(id))?;
        Ok(Some(id))
    }

    /// Follow a rendered `mindjungle://note/...` reference.
    pub fn follow_href(&mut self, href: &str) -> Result<Option<Uuid>> {
        match links::parse_note_href(href) {
            Some(title) => self.select_by_title(&title),
            None => Ok(None),
        }
    }

    /// The working copy of the active note.
    pub fn draft(&self) -> Option<Note> {
        self.selected.and_then(|id| self.drafts.draft(id))
    }

    /// Apply an edit to the active draft.
    pub fn edit(&mut self, edit: NoteEdit) -> Result<SaveState> {
        let id = self.selected.ok_or(MindJungleError::NoNoteSelected)?;
        self.drafts.edit(id, edit)
    }

    pub fn save_status(&self) -> Option<SaveStatus> {
        self.selected.and_then(|id| self.drafts.status(id))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SaveEvent> {
        self.drafts.subscribe()
    }

    /// Write every pending draft now.
    pub async fn flush(&self) -> Result<()> {
        self.drafts.flush().await
    }

    /// Link targets written in the active draft.
    pub fn outgoing_links(&self) -> Vec<String> {
        self.draft()
            .map(|draft| links::outgoing_links(&draft))
            .unwrap_or_default()
    }

    /// Notes linking to the active draft's title.
    pub fn backlinks(&self) -> Vec<Note> {
        let Some(draft) = self.draft() else {
            return Vec::new();
        };
        let notes = self.corpus.snapshot();
        links::compute_backlinks(&notes, draft.id, &draft.title)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The active draft's content with wikilinks rendered as references.
    pub fn rendered_content(&self) -> Option<String> {
        self.draft()
            .map(|draft| links::render_links_as_references(&draft.content))
    }

    pub fn stats(&self) -> WorkspaceStats {
        let notes = self.corpus.snapshot();
        match self.draft() {
            Some(draft) => WorkspaceStats {
                words: word_count(&draft),
                notes: notes.len(),
                tags: draft.tags.len(),
                backlinks: self.backlinks().len(),
            },
            None => WorkspaceStats {
                words: 0,
                notes: notes.len(),
                tags: notes.iter().map(|n| n.tags.len()).sum(),
                backlinks: 0,
            },
        }
    }

    /// Whether the active draft can be exported.
    pub fn ready_for_export(&self) -> bool {
        self.draft()
            .map(|draft| !draft.title.trim().is_empty())
            .unwrap_or(false)
    }
}
