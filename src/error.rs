use thiserror::Error;

#[derive(Error, Debug)]
pub enum MindJungleError {
    #[error("Not in a mindjungle notebook. Run 'mindjungle init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .mindjungle/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("No note selected")]
    NoNoteSelected,

    #[error("Ambiguous note reference '{reference}' matches {count} notes")]
    AmbiguousNote { reference: String, count: usize },

    #[error("Invalid note type: {0} (expected idea, outline or paper)")]
    InvalidNoteKind(String),

    #[error("Invalid status: {0} (expected draft, in-progress or final)")]
    InvalidStatus(String),

    #[error("Unknown note field: {0}")]
    InvalidField(String),

    #[error("Invalid export format: {0} (expected markdown, apa or json)")]
    InvalidExportFormat(String),

    #[error("Note {0} has no title; give it one before exporting")]
    UntitledExport(String),

    #[error("Invalid markdown export: {0}")]
    InvalidMarkdown(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, MindJungleError>;
