//! Plain-text exports of notes: markdown, APA citation and JSON.

mod citation;
mod files;
mod markdown;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ExportConfig;
use crate::entity::Note;
use crate::error::{MindJungleError, Result};

pub use citation::note_to_apa;
pub use files::{file_stem, slugify, unique_stem, write_export_file, FALLBACK_NAME};
pub use markdown::{note_to_markdown, parse_markdown_header, NoteHeader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Apa,
    Json,
}

impl ExportFormat {
    /// Suffix appended to the file stem, extension included.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => ".md",
            ExportFormat::Apa => "-apa.txt",
            ExportFormat::Json => ".json",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Markdown => write!(f, "markdown"),
            ExportFormat::Apa => write!(f, "apa"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = MindJungleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "apa" | "citation" => Ok(ExportFormat::Apa),
            "json" => Ok(ExportFormat::Json),
            _ => Err(MindJungleError::InvalidExportFormat(s.to_string())),
        }
    }
}

/// The full record as pretty JSON.
pub fn note_to_json(note: &Note) -> Result<String> {
    Ok(serde_json::to_string_pretty(note)?)
}

/// Render `note` in `format`.
pub fn render(note: &Note, format: ExportFormat, config: &ExportConfig) -> Result<String> {
    let rendered = match format {
        ExportFormat::Markdown => note_to_markdown(note),
        ExportFormat::Apa => note_to_apa(note, &config.citation_label),
        ExportFormat::Json => note_to_json(note)?,
    };
    Ok(rendered)
}

/// Default filename for exporting `note`, e.g. `Deep Work.md`.
pub fn export_filename(note: &Note, format: ExportFormat) -> String {
    format!("{}{}", file_stem(note), format.file_suffix())
}

/// Export every note into `dir`, one file each. Returns the written paths.
pub fn export_all(
    notes: &[Note],
    dir: &Path,
    format: ExportFormat,
    config: &ExportConfig,
) -> Result<Vec<PathBuf>> {
    let mut used = HashSet::new();
    let mut written = Vec::with_capacity(notes.len());

    for note in notes {
        let stem = unique_stem(note, &mut used);
        let path = dir.join(format!("{}{}", stem, format.file_suffix()));
        write_export_file(&path, &render(note, format, config)?)?;
        written.push(path);
    }

    info!(count = written.len(), dir = %dir.display(), %format, "exported notes");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::NoteKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_parse() {
        assert_eq!("MD".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("apa".parse::<ExportFormat>().unwrap(), ExportFormat::Apa);
        assert!(matches!(
            "docx".parse::<ExportFormat>(),
            Err(MindJungleError::InvalidExportFormat(_))
        ));
    }

    #[test]
    fn test_export_filename() {
        let note = Note::new("Deep Work", NoteKind::Paper);
        assert_eq!(export_filename(&note, ExportFormat::Markdown), "Deep Work.md");
        assert_eq!(export_filename(&note, ExportFormat::Apa), "Deep Work-apa.txt");
        assert_eq!(export_filename(&note, ExportFormat::Json), "Deep Work.json");

        let untitled = Note::new("", NoteKind::Idea);
        assert_eq!(
            export_filename(&untitled, ExportFormat::Markdown),
            "mindjungle-note.md"
        );
    }

    #[test]
    fn test_render_json_is_the_record() {
        let note = Note::new("As JSON", NoteKind::Outline);
        let json = render(&note, ExportFormat::Json, &ExportConfig::default()).unwrap();
        let parsed: Note = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, note);
    }

    #[test]
    fn test_export_all_writes_one_file_per_note() {
        let tmp = TempDir::new().unwrap();
        let notes = vec![
            Note::new("Same", NoteKind::Idea),
            Note::new("same", NoteKind::Idea),
            Note::new("Other", NoteKind::Paper),
        ];

        let written = export_all(
            &notes,
            tmp.path(),
            ExportFormat::Markdown,
            &ExportConfig::default(),
        )
        .unwrap();

        assert_eq!(written.len(), 3);
        assert!(tmp.path().join("same.md").exists());
        assert!(tmp.path().join("other.md").exists());
        let second = fs::read_to_string(&written[1]).unwrap();
        assert!(second.starts_with("# same"));
    }
}
