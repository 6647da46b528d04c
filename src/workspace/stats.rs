use serde::Serialize;

use crate::entity::Note;

/// Counters shown next to the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkspaceStats {
    /// Words in the draft's summary, outline and content.
    pub words: usize,
    pub notes: usize,
    /// Tags on the draft, or across the whole notebook with no draft open.
    pub tags: usize,
    pub backlinks: usize,
}

/// Words in the prose fields of a note. References are not counted.
pub fn word_count(note: &Note) -> usize {
    [&note.summary, &note.outline, &note.content]
        .iter()
        .map(|text| text.split_whitespace().count())
        .sum()
}
