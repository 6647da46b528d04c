//! Draft reconciliation: in-memory working copies with debounced autosave.
//!
//! Every open note gets its own [`DraftSlot`] holding the draft, the
//! comparison snapshot of the last persisted record and at most one pending
//! save timer. Edits are applied synchronously; the write happens once the
//! note has been quiet for the configured period. Slots are independent, so
//! moving the selection to another note never cancels a pending write.

mod edit;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::corpus::Corpus;
use crate::entity::Note;
use crate::error::{MindJungleError, Result};
use crate::storage::NoteStore;

pub use edit::NoteEdit;

const EVENT_CAPACITY: usize = 64;

/// Where a draft stands relative to its persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveState {
    /// Draft matches the last persisted snapshot.
    Clean,
    /// Draft has unsaved changes; a write is pending or needs a retry.
    Dirty,
    /// A write is in flight.
    Saving,
}

impl std::fmt::Display for SaveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveState::Clean => write!(f, "Saved"),
            SaveState::Dirty => write!(f, "Unsaved changes"),
            SaveState::Saving => write!(f, "Saving…"),
        }
    }
}

/// Save indicator for one draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveStatus {
    pub state: SaveState,
    /// Message of the last failed write, cleared by the next successful one.
    pub last_error: Option<String>,
    pub last_saved_at: Option<DateTime<Utc>>,
}

/// Outcome of a write, broadcast to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveEvent {
    Saved { id: Uuid, updated_at: DateTime<Utc> },
    Failed { id: Uuid, error: String },
}

/// Comparison snapshot of a note: its JSON form without `updated_at`.
pub fn fingerprint(note: &Note) -> Result<String> {
    let mut value = serde_json::to_value(note)?;
    if let Some(map) = value.as_object_mut() {
        map.remove("updated_at");
    }
    Ok(value.to_string())
}

/// Write `note` with a fresh `updated_at` and return the stored record.
pub async fn persist_note(store: &dyn NoteStore, note: &Note) -> Result<Note> {
    let mut stamped = note.clone();
    stamped.updated_at = Utc::now();
    store.put(&stamped).await?;
    Ok(stamped)
}

struct PendingTimer {
    token: u64,
    handle: JoinHandle<()>,
}

struct DraftSlot {
    draft: Note,
    snapshot: String,
    state: SaveState,
    in_flight: bool,
    /// Set once the note is deleted; no write may start afterwards.
    discarded: bool,
    timer: Option<PendingTimer>,
    next_token: u64,
    last_error: Option<String>,
    last_saved_at: Option<DateTime<Utc>>,
    idle: Arc<Notify>,
}

type SharedSlot = Arc<Mutex<DraftSlot>>;

impl DraftSlot {
    fn new(note: Note) -> Result<Self> {
        Ok(Self {
            snapshot: fingerprint(&note)?,
            draft: note,
            state: SaveState::Clean,
            in_flight: false,
            discarded: false,
            timer: None,
            next_token: 0,
            last_error: None,
            last_saved_at: None,
            idle: Arc::new(Notify::new()),
        })
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
        }
    }

    /// Nothing pending and nothing in flight.
    fn is_settled(&self) -> bool {
        self.state == SaveState::Clean && !self.in_flight && self.timer.is_none()
    }

    fn status(&self) -> SaveStatus {
        SaveStatus {
            state: self.state,
            last_error: self.last_error.clone(),
            last_saved_at: self.last_saved_at,
        }
    }
}

fn lock(slot: &SharedSlot) -> MutexGuard<'_, DraftSlot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// What a save task needs, cloned into every timer.
#[derive(Clone)]
struct SaveContext {
    store: Arc<dyn NoteStore>,
    corpus: Corpus,
    events: broadcast::Sender<SaveEvent>,
    quiet_period: Duration,
}

/// Owns the drafts of every note opened in a session.
pub struct DraftEngine {
    ctx: SaveContext,
    slots: HashMap<Uuid, SharedSlot>,
}

impl DraftEngine {
    pub fn new(store: Arc<dyn NoteStore>, corpus: Corpus, quiet_period: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            ctx: SaveContext {
                store,
                corpus,
                events,
                quiet_period,
            },
            slots: HashMap::new(),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.ctx.quiet_period
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SaveEvent> {
        self.ctx.events.subscribe()
    }

    /// Start editing `note`.
    ///
    /// A settled draft is reseeded from `note`. A draft with unsaved or
    /// in-flight changes is kept as is so reopening never shows stale text.
    pub fn open(&mut self, note: &Note) -> Result<()> {
        if let Some(slot) = self.slots.get(&note.id) {
            if !lock(slot).is_settled() {
                debug!(note_id = %note.id, "reopening draft with pending changes");
                return Ok(());
            }
        }

        let slot = DraftSlot::new(note.clone())?;
        self.slots.insert(note.id, Arc::new(Mutex::new(slot)));
        debug!(note_id = %note.id, "draft opened");
        Ok(())
    }

    pub fn is_open(&self, id: Uuid) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn draft(&self, id: Uuid) -> Option<Note> {
        self.slots.get(&id).map(|slot| lock(slot).draft.clone())
    }

    pub fn status(&self, id: Uuid) -> Option<SaveStatus> {
        self.slots.get(&id).map(|slot| lock(slot).status())
    }

    /// Apply an edit to the draft of `id` and (re)start its quiet period.
    ///
    /// Returns the resulting state. An edit that brings the draft back to
    /// the persisted snapshot cancels the pending write.
    pub fn edit(&mut self, id: Uuid, edit: NoteEdit) -> Result<SaveState> {
        let slot = self
            .slots
            .get(&id)
            .ok_or_else(|| MindJungleError::NoteNotFound(id.to_string()))?;

        let mut inner = lock(slot);
        edit.apply(&mut inner.draft);

        if fingerprint(&inner.draft)? == inner.snapshot {
            inner.cancel_timer();
            if !inner.in_flight {
                inner.state = SaveState::Clean;
            }
        } else {
            if !inner.in_flight {
                inner.state = SaveState::Dirty;
            }
            schedule_save(&self.ctx, slot, &mut inner);
        }

        debug!(note_id = %id, state = ?inner.state, "draft edited");
        Ok(inner.state)
    }

    /// Forget the draft of `id`, cancelling its pending write.
    ///
    /// Waits for a write already in flight so it cannot land afterwards.
    pub async fn discard(&mut self, id: Uuid) {
        if let Some(slot) = self.slots.remove(&id) {
            {
                let mut inner = lock(&slot);
                inner.discarded = true;
                inner.cancel_timer();
            }
            wait_idle(&slot).await;
            debug!(note_id = %id, "draft discarded");
        }
    }

    /// Drop settled drafts other than `keep`.
    pub fn prune(&mut self, keep: Option<Uuid>) {
        self.slots
            .retain(|id, slot| Some(*id) == keep || !lock(slot).is_settled());
    }

    /// Write every dirty draft now and wait for writes in flight.
    ///
    /// Pending timers are cancelled. All drafts are attempted; the first
    /// failure is returned.
    pub async fn flush(&self) -> Result<()> {
        let mut first_error = None;

        for (id, slot) in &self.slots {
            loop {
                wait_idle(slot).await;
                let dirty = {
                    let mut inner = lock(slot);
                    if inner.in_flight {
                        // A timer started a write since the wait returned.
                        None
                    } else {
                        inner.cancel_timer();
                        Some(inner.state == SaveState::Dirty)
                    }
                };
                let Some(dirty) = dirty else {
                    continue;
                };
                if !dirty {
                    break;
                }
                match write_slot(&self.ctx, slot, None).await {
                    Ok(true) => break,
                    Ok(false) => continue,
                    Err(e) => {
                        warn!(note_id = %id, error = %e, "flush failed");
                        first_error.get_or_insert(e);
                        break;
                    }
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

/// Replace the slot's pending timer with a fresh one.
fn schedule_save(ctx: &SaveContext, slot: &SharedSlot, inner: &mut DraftSlot) {
    inner.cancel_timer();
    inner.next_token += 1;
    let token = inner.next_token;

    let task_ctx = ctx.clone();
    let task_slot = Arc::clone(slot);
    let handle = tokio::spawn(async move {
        loop {
            tokio::time::sleep(task_ctx.quiet_period).await;
            let busy = {
                let inner = lock(&task_slot);
                if !owns_timer(&inner, token) {
                    return;
                }
                inner.in_flight
            };
            // One write per note at a time: wait out the one in flight.
            if !busy {
                break;
            }
        }
        // Failures are recorded on the slot and broadcast.
        let _ = write_slot(&task_ctx, &task_slot, Some(token)).await;
    });

    inner.timer = Some(PendingTimer { token, handle });
}

fn owns_timer(inner: &DraftSlot, token: u64) -> bool {
    matches!(&inner.timer, Some(timer) if timer.token == token)
}

/// Persist the slot's draft if it is dirty.
///
/// `token` identifies the timer doing the write; a timer that has been
/// replaced or cancelled backs off. Returns `Ok(false)` when nothing was
/// written.
async fn write_slot(ctx: &SaveContext, slot: &SharedSlot, token: Option<u64>) -> Result<bool> {
    let (note, snapshot) = {
        let mut inner = lock(slot);
        if let Some(token) = token {
            if !owns_timer(&inner, token) {
                return Ok(false);
            }
            // From here on nobody holds a handle that could abort this write.
            inner.timer = None;
        }
        if inner.discarded || inner.in_flight || inner.state != SaveState::Dirty {
            return Ok(false);
        }
        let snapshot = fingerprint(&inner.draft)?;
        inner.state = SaveState::Saving;
        inner.in_flight = true;
        (inner.draft.clone(), snapshot)
    };

    debug!(note_id = %note.id, "writing draft");
    let result = persist_note(ctx.store.as_ref(), &note).await;

    let mut inner = lock(slot);
    inner.in_flight = false;

    let outcome = match result {
        Ok(saved) => {
            inner.snapshot = snapshot;
            inner.last_error = None;
            inner.last_saved_at = Some(saved.updated_at);
            inner.draft.updated_at = saved.updated_at;

            let current = fingerprint(&inner.draft).ok();
            if current.as_deref() == Some(inner.snapshot.as_str()) {
                inner.state = SaveState::Clean;
            } else {
                // Edited while the write was in flight.
                inner.state = SaveState::Dirty;
                if inner.timer.is_none() && !inner.discarded {
                    schedule_save(ctx, slot, &mut inner);
                }
            }

            info!(note_id = %saved.id, title = %saved.title, "note saved");
            let _ = ctx.events.send(SaveEvent::Saved {
                id: saved.id,
                updated_at: saved.updated_at,
            });
            ctx.corpus.upsert(saved);
            Ok(true)
        }
        Err(e) => {
            inner.state = SaveState::Dirty;
            inner.last_error = Some(e.to_string());
            warn!(note_id = %note.id, error = %e, "failed to save note");
            let _ = ctx.events.send(SaveEvent::Failed {
                id: note.id,
                error: e.to_string(),
            });
            Err(e)
        }
    };

    inner.idle.notify_waiters();
    outcome
}

/// Wait until the slot has no write in flight.
async fn wait_idle(slot: &SharedSlot) {
    loop {
        let idle = {
            let inner = lock(slot);
            if !inner.in_flight {
                return;
            }
            Arc::clone(&inner.idle)
        };
        let notified = idle.notified();
        let busy = lock(slot).in_flight;
        if !busy {
            return;
        }
        notified.await;
    }
}
