mod fields;
mod kind;
mod note;

pub use fields::{
    authors_to_string, normalize_authors, normalize_tags, normalize_year, tags_to_string,
};
pub use kind::{NoteKind, NoteStatus};
pub use note::Note;
