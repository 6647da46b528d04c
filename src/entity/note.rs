// src/entity/note.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{NoteKind, NoteStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    pub status: NoteStatus,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub outline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub references: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// A blank note with fresh timestamps.
    pub fn new(title: impl Into<String>, kind: NoteKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            kind,
            status: NoteStatus::default(),
            content: String::new(),
            outline: String::new(),
            summary: String::new(),
            references: String::new(),
            tags: Vec::new(),
            authors: Vec::new(),
            year: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `title` names this note under wikilink resolution rules.
    pub fn title_matches(&self, title: &str) -> bool {
        self.title.trim().to_lowercase() == title.trim().to_lowercase()
    }

    /// First seven characters of the id, for display.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..7].to_string()
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::new("Untitled", NoteKind::default())
    }
}
