//! Markdown rendering of a note and parsing of its header.
//!
//! The header is a fixed sequence of lines: `# title`, `Type:`, `Status:`,
//! then `Authors:`, `Year:` and `Tags:` when those fields are set.

use crate::entity::{normalize_authors, Note, NoteKind, NoteStatus};
use crate::error::{MindJungleError, Result};

/// Render a note as a markdown document.
pub fn note_to_markdown(note: &Note) -> String {
    let mut header = vec![
        format!("# {}", note.title),
        format!("Type: {}", note.kind),
        format!("Status: {}", note.status),
    ];
    if !note.authors.is_empty() {
        header.push(format!("Authors: {}", note.authors.join(", ")));
    }
    if let Some(year) = note.year.as_deref().filter(|y| !y.is_empty()) {
        header.push(format!("Year: {}", year));
    }
    if !note.tags.is_empty() {
        let tags: Vec<String> = note.tags.iter().map(|t| format!("#{}", t)).collect();
        header.push(format!("Tags: {}", tags.join(" ")));
    }

    let mut blocks = vec![header.join("\n")];
    for (heading, body) in [
        ("Summary", &note.summary),
        ("Outline", &note.outline),
        ("Manuscript", &note.content),
        ("References", &note.references),
    ] {
        if !body.is_empty() {
            blocks.push(format!("## {}\n{}", heading, body));
        }
    }

    blocks.join("\n\n").trim().to_string()
}

/// Header fields recovered from an exported markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteHeader {
    pub title: String,
    pub kind: NoteKind,
    pub status: NoteStatus,
    pub authors: Vec<String>,
    pub year: Option<String>,
    pub tags: Vec<String>,
}

impl NoteHeader {
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            kind: note.kind,
            status: note.status,
            authors: note.authors.clone(),
            year: note.year.clone().filter(|y| !y.is_empty()),
            tags: note.tags.clone(),
        }
    }
}

/// Parse the header block produced by [`note_to_markdown`].
pub fn parse_markdown_header(markdown: &str) -> Result<NoteHeader> {
    let mut lines = markdown.lines().take_while(|line| !line.trim().is_empty());

    let title = lines
        .next()
        .and_then(|line| line.strip_prefix("# "))
        .ok_or_else(|| MindJungleError::InvalidMarkdown("missing '# title' line".to_string()))?
        .to_string();

    let mut kind = None;
    let mut status = None;
    let mut authors = Vec::new();
    let mut year = None;
    let mut tags = Vec::new();

    for line in lines {
        let Some((key, value)) = line.split_once(": ") else {
            return Err(MindJungleError::InvalidMarkdown(format!(
                "unexpected header line '{}'",
                line
            )));
        };
        match key {
            "Type" => kind = Some(value.parse()?),
            "Status" => status = Some(value.parse()?),
            "Authors" => authors = normalize_authors(value),
            "Year" => year = Some(value.trim().to_string()),
            "Tags" => tags = parse_tag_line(value),
            other => {
                return Err(MindJungleError::InvalidMarkdown(format!(
                    "unknown header field '{}'",
                    other
                )))
            }
        }
    }

    Ok(NoteHeader {
        title,
        kind: kind.ok_or_else(|| MindJungleError::InvalidMarkdown("missing Type".to_string()))?,
        status: status
            .ok_or_else(|| MindJungleError::InvalidMarkdown("missing Status".to_string()))?,
        authors,
        year,
        tags,
    })
}

/// `#a #b c` -> `["a", "b c"]`. Tags may hold spaces, so split on ` #`.
fn parse_tag_line(value: &str) -> Vec<String> {
    let value = value.trim();
    let value = value.strip_prefix('#').unwrap_or(value);
    value
        .split(" #")
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}
