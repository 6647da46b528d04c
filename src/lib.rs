pub mod cli;
pub mod config;
pub mod corpus;
pub mod draft;
pub mod entity;
pub mod error;
pub mod export;
pub mod links;
pub mod search;
pub mod storage;
pub mod workspace;

pub use config::Config;
pub use draft::{DraftEngine, NoteEdit, SaveEvent, SaveState, SaveStatus};
pub use entity::{Note, NoteKind, NoteStatus};
pub use error::{MindJungleError, Result};
pub use storage::{MemoryStore, NoteStore, SqliteStore};
pub use workspace::Workspace;
