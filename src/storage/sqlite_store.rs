use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{NoteStore, NOTEBOOK_DIR};
use crate::entity::Note;
use crate::error::{MindJungleError, Result};

const NOTES_DB: &str = "notes.db";

const SELECT_COLUMNS: &str = "id, title, kind, status, content, outline, summary, references_text,
     tags, authors, year, created_at, updated_at";

/// SQLite-backed note store living in `.mindjungle/notes.db`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Create a new notebook under `root`.
    pub fn init(root: &Path) -> Result<Self> {
        let notebook_dir = root.join(NOTEBOOK_DIR);

        if notebook_dir.exists() {
            return Err(MindJungleError::AlreadyInitialized);
        }

        fs::create_dir_all(&notebook_dir)?;
        Self::open_path(notebook_dir.join(NOTES_DB))
    }

    /// Open the notebook under `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let path = root.join(NOTEBOOK_DIR).join(NOTES_DB);

        if !path.exists() {
            return Err(MindJungleError::NotInitialized);
        }

        Self::open_path(path)
    }

    /// A throwaway database, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn open_path(path: PathBuf) -> Result<Self> {
        let conn = Connection::open(&path)?;
        let store = Self {
            conn: Mutex::new(conn),
            path: Some(path),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Location of the database file, if it lives on disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| MindJungleError::Storage("connection lock poisoned".to_string()))
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                kind TEXT NOT NULL,
                status TEXT NOT NULL,
                content TEXT NOT NULL DEFAULT '',
                outline TEXT NOT NULL DEFAULT '',
                summary TEXT NOT NULL DEFAULT '',
                references_text TEXT NOT NULL DEFAULT '',
                tags TEXT NOT NULL DEFAULT '[]',
                authors TEXT NOT NULL DEFAULT '[]',
                year TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_notes_updated_at ON notes(updated_at)",
            [],
        )?;
        conn.execute("CREATE INDEX IF NOT EXISTS idx_notes_title ON notes(title)", [])?;

        Ok(())
    }

    fn put_blocking(&self, note: &Note) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO notes
             (id, title, kind, status, content, outline, summary, references_text,
              tags, authors, year, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                note.id.to_string(),
                note.title,
                note.kind.to_string(),
                note.status.to_string(),
                note.content,
                note.outline,
                note.summary,
                note.references,
                serde_json::to_string(&note.tags)?,
                serde_json::to_string(&note.authors)?,
                note.year,
                format_timestamp(&note.created_at),
                format_timestamp(&note.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_blocking(&self, id: Uuid) -> Result<Option<Note>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM notes WHERE id = ?1", SELECT_COLUMNS),
                [id.to_string()],
                NoteRow::from_row,
            )
            .optional()?;
        row.map(Note::try_from).transpose()
    }

    fn delete_blocking(&self, id: Uuid) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM notes WHERE id = ?1", [id.to_string()])?;
        Ok(())
    }

    fn list_blocking(&self) -> Result<Vec<Note>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM notes ORDER BY updated_at DESC, id ASC",
            SELECT_COLUMNS
        ))?;

        let rows = stmt
            .query_map([], NoteRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(Note::try_from).collect()
    }
}

#[async_trait]
impl NoteStore for SqliteStore {
    async fn put(&self, note: &Note) -> Result<()> {
        self.put_blocking(note)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Note>> {
        self.get_blocking(id)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.delete_blocking(id)
    }

    async fn list_all(&self) -> Result<Vec<Note>> {
        self.list_blocking()
    }
}

/// Fixed-width timestamps so `ORDER BY updated_at` sorts chronologically.
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| MindJungleError::Storage(format!("bad timestamp '{}': {}", raw, e)))
}

/// A note as stored, before the text columns are parsed.
struct NoteRow {
    id: String,
    title: String,
    kind: String,
    status: String,
    content: String,
    outline: String,
    summary: String,
    references: String,
    tags: String,
    authors: String,
    year: Option<String>,
    created_at: String,
    updated_at: String,
}

impl NoteRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            kind: row.get(2)?,
            status: row.get(3)?,
            content: row.get(4)?,
            outline: row.get(5)?,
            summary: row.get(6)?,
            references: row.get(7)?,
            tags: row.get(8)?,
            authors: row.get(9)?,
            year: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }
}

impl TryFrom<NoteRow> for Note {
    type Error = MindJungleError;

    fn try_from(row: NoteRow) -> Result<Self> {
        let id = row
            .id
            .parse()
            .map_err(|e| MindJungleError::Storage(format!("bad note id '{}': {}", row.id, e)))?;

        Ok(Note {
            id,
            title: row.title,
            kind: row.kind.parse()?,
            status: row.status.parse()?,
            content: row.content,
            outline: row.outline,
            summary: row.summary,
            references: row.references,
            tags: serde_json::from_str(&row.tags)?,
            authors: serde_json::from_str(&row.authors)?,
            year: row.year,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

impl From<rusqlite::Error> for MindJungleError {
    fn from(e: rusqlite::Error) -> Self {
        MindJungleError::Storage(format!("SQLite error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{NoteKind, NoteStatus};
    use chrono::Duration;
    use tempfile::TempDir;

    fn sample_note() -> Note {
        let mut note = Note::new("Sample Note", NoteKind::Paper);
        note.status = NoteStatus::InProgress;
        note.content = "Body with [[Link]]".to_string();
        note.references = "Ref 1".to_string();
        note.tags = vec!["research".to_string(), "methods".to_string()];
        note.authors = vec!["Ada Lovelace".to_string()];
        note.year = Some("1843".to_string());
        note
    }

    #[test]
    fn test_init_creates_database() {
        let tmp = TempDir::new().unwrap();
        let store = SqliteStore::init(tmp.path()).unwrap();
        assert!(tmp.path().join(".mindjungle/notes.db").exists());
        assert_eq!(
            store.path(),
            Some(tmp.path().join(".mindjungle/notes.db").as_path())
        );
    }

    #[test]
    fn test_init_twice_fails() {
        let tmp = TempDir::new().unwrap();
        SqliteStore::init(tmp.path()).unwrap();
        assert!(matches!(
            SqliteStore::init(tmp.path()),
            Err(MindJungleError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_open_without_init_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            SqliteStore::open(tmp.path()),
            Err(MindJungleError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn test_put_and_get_preserves_fields() {
        let store = SqliteStore::open_in_memory().unwrap();
        let note = sample_note();

        store.put(&note).await.unwrap();
        let loaded = store.get(note.id).await.unwrap().unwrap();
        assert_eq!(loaded, note);
    }

    #[tokio::test]
    async fn test_put_overwrites_by_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut note = sample_note();
        store.put(&note).await.unwrap();

        note.title = "Renamed".to_string();
        store.put(&note).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Renamed");
    }

    #[tokio::test]
    async fn test_list_all_orders_by_updated_desc() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut older = Note::new("Older", NoteKind::Idea);
        older.updated_at = older.updated_at - Duration::minutes(5);
        let newer = Note::new("Newer", NoteKind::Idea);

        store.put(&older).await.unwrap();
        store.put(&newer).await.unwrap();

        let titles: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = SqliteStore::open_in_memory().unwrap();
        let note = sample_note();
        store.put(&note).await.unwrap();
        store.delete(note.id).await.unwrap();
        assert!(store.get(note.id).await.unwrap().is_none());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reopen_keeps_notes() {
        let tmp = TempDir::new().unwrap();
        let note = sample_note();
        {
            let store = SqliteStore::init(tmp.path()).unwrap();
            store.put(&note).await.unwrap();
        }
        let store = SqliteStore::open(tmp.path()).unwrap();
        assert_eq!(store.get(note.id).await.unwrap(), Some(note));
    }
}
