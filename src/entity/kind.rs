use serde::{Deserialize, Serialize};

use crate::error::MindJungleError;

/// What a note is for. Drives the default title of new notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    #[default]
    Idea,
    Outline,
    Paper,
}

impl NoteKind {
    /// Title given to a freshly created note of this kind.
    pub fn default_title(&self) -> &'static str {
        match self {
            NoteKind::Idea => "New Idea",
            NoteKind::Outline => "New Outline",
            NoteKind::Paper => "New Paper Draft",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::Idea => "idea",
            NoteKind::Outline => "outline",
            NoteKind::Paper => "paper",
        }
    }
}

impl std::fmt::Display for NoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NoteKind {
    type Err = MindJungleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "idea" => Ok(NoteKind::Idea),
            "outline" => Ok(NoteKind::Outline),
            "paper" => Ok(NoteKind::Paper),
            _ => Err(MindJungleError::InvalidNoteKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NoteStatus {
    #[default]
    Draft,
    InProgress,
    Final,
}

impl NoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteStatus::Draft => "draft",
            NoteStatus::InProgress => "in-progress",
            NoteStatus::Final => "final",
        }
    }
}

impl std::fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NoteStatus {
    type Err = MindJungleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(NoteStatus::Draft),
            "in-progress" | "in_progress" | "inprogress" => Ok(NoteStatus::InProgress),
            "final" => Ok(NoteStatus::Final),
            _ => Err(MindJungleError::InvalidStatus(s.to_string())),
        }
    }
}
