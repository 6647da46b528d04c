use crate::entity::{
    normalize_authors, normalize_tags, normalize_year, Note, NoteKind, NoteStatus,
};
use crate::error::{MindJungleError, Result};

/// A single field change coming from the editor.
///
/// List fields take the raw comma separated text the user typed and are
/// normalized on apply.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteEdit {
    Title(String),
    Kind(NoteKind),
    Status(NoteStatus),
    Authors(String),
    /// Blank text clears the year.
    Year(String),
    Tags(String),
    Summary(String),
    Outline(String),
    Content(String),
    References(String),
}

impl NoteEdit {
    /// Build an edit from a field name and its raw text value.
    pub fn from_field(field: &str, value: String) -> Result<Self> {
        let edit = match field.trim().to_lowercase().as_str() {
            "title" => NoteEdit::Title(value),
            "type" | "kind" => NoteEdit::Kind(value.parse()?),
            "status" => NoteEdit::Status(value.parse()?),
            "authors" | "author" => NoteEdit::Authors(value),
            "year" => NoteEdit::Year(value),
            "tags" | "tag" => NoteEdit::Tags(value),
            "summary" => NoteEdit::Summary(value),
            "outline" => NoteEdit::Outline(value),
            "content" | "manuscript" => NoteEdit::Content(value),
            "references" => NoteEdit::References(value),
            other => return Err(MindJungleError::InvalidField(other.to_string())),
        };
        Ok(edit)
    }

    pub fn apply(self, note: &mut Note) {
        match self {
            NoteEdit::Title(title) => note.title = title,
            NoteEdit::Kind(kind) => note.kind = kind,
            NoteEdit::Status(status) => note.status = status,
            NoteEdit::Authors(raw) => note.authors = normalize_authors(&raw),
            NoteEdit::Year(raw) => note.year = normalize_year(&raw),
            NoteEdit::Tags(raw) => note.tags = normalize_tags(&raw),
            NoteEdit::Summary(text) => note.summary = text,
            NoteEdit::Outline(text) => note.outline = text,
            NoteEdit::Content(text) => note.content = text,
            NoteEdit::References(text) => note.references = text,
        }
    }
}
