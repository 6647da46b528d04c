use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::draft::NoteEdit;
use crate::entity::{normalize_authors, normalize_tags, normalize_year, Note, NoteKind};
use crate::error::{MindJungleError, Result};
use crate::export::{self, ExportFormat};
use crate::links::{self, ResolvedLink};
use crate::search;
use crate::storage::{SqliteStore, NOTEBOOK_DIR};
use crate::workspace::Workspace;

/// Find the notebook root by looking for .mindjungle/ or .git/
fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(NOTEBOOK_DIR).exists() || current.join(".git").exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

/// Open the notebook the current directory belongs to.
async fn open_workspace() -> Result<(Workspace, Config)> {
    let root = find_project_root();
    let store = SqliteStore::open(&root)?;
    let config = Config::load(&root.join(NOTEBOOK_DIR))?;
    let workspace = Workspace::load(Arc::new(store), &config.autosave).await?;
    debug!(root = %root.display(), "opened notebook");
    Ok((workspace, config))
}

/// Resolve a note reference: a UUID prefix first, then a title.
///
/// Several notes sharing an id prefix is an error; several notes sharing a
/// title resolve to the most recently updated one.
fn resolve_note(notes: &[Note], reference: &str) -> Result<Note> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(MindJungleError::NoteNotFound(reference.to_string()));
    }

    let prefix = reference.to_lowercase();
    let looks_like_id = prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-');
    let by_id: Vec<&Note> = notes
        .iter()
        .filter(|n| looks_like_id && n.id.to_string().starts_with(&prefix))
        .collect();
    match by_id.len() {
        1 => return Ok(by_id[0].clone()),
        0 => {}
        count => {
            return Err(MindJungleError::AmbiguousNote {
                reference: reference.to_string(),
                count,
            })
        }
    }

    links::resolve_title(notes, reference)
        .cloned()
        .ok_or_else(|| MindJungleError::NoteNotFound(reference.to_string()))
}

/// Open the workspace and select the note `reference` names.
async fn open_note(reference: &str) -> Result<(Workspace, Config, Note)> {
    let (mut workspace, config) = open_workspace().await?;
    let note = resolve_note(&workspace.notes(), reference)?;
    workspace.select(Some(note.id))?;
    Ok((workspace, config, note))
}

fn read_stdin() -> Result<String> {
    let mut content = String::new();
    io::stdin().read_to_string(&mut content)?;
    Ok(content)
}

fn parse_format(format: Option<String>, config: &Config) -> Result<ExportFormat> {
    match format {
        Some(raw) => raw.parse(),
        None => Ok(config.export.default_format),
    }
}

fn print_note_line(note: &Note) {
    println!(
        "  ({}) [{}|{}] {}",
        note.short_id(),
        note.kind,
        note.status,
        note.title
    );
    if !note.tags.is_empty() {
        println!("      tags: {}", note.tags.join(", "));
    }
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;

    let _store = SqliteStore::init(&root)?;
    Config::default().save(&root.join(NOTEBOOK_DIR))?;

    println!("Initialized mindjungle notebook in {}", root.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn handle_new(
    kind: String,
    title: Option<String>,
    tags: Vec<String>,
    authors: Vec<String>,
    year: Option<String>,
    stdin: bool,
    json: bool,
) -> Result<()> {
    let kind: NoteKind = kind.parse()?;
    let (mut workspace, _config) = open_workspace().await?;

    let title = title.unwrap_or_else(|| kind.default_title().to_string());
    let mut note = Note::new(title, kind);
    note.tags = normalize_tags(&tags.join(","));
    note.authors = normalize_authors(&authors.join(","));
    note.year = year.as_deref().and_then(normalize_year);

    if stdin {
        note.content = read_stdin()?;
    }

    let note = workspace.add_note(note).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!("Created {} ({}) - {}", note.kind, note.short_id(), note.title);
    }

    Ok(())
}

pub async fn handle_list(kind: Option<String>, query: Option<String>, json: bool) -> Result<()> {
    let (workspace, _config) = open_workspace().await?;
    let kind: Option<NoteKind> = kind.map(|k| k.parse()).transpose()?;

    let notes = workspace.notes();
    let found: Vec<&Note> = search::search(&notes, query.as_deref().unwrap_or(""))?
        .into_iter()
        .filter(|n| kind.map_or(true, |k| n.kind == k))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else if found.is_empty() {
        println!("No notes found.");
    } else {
        println!("Notes:\n");
        for note in found {
            print_note_line(note);
        }
    }

    Ok(())
}

pub async fn handle_show(reference: String, json: bool) -> Result<()> {
    let (workspace, _config) = open_workspace().await?;
    let note = resolve_note(&workspace.notes(), &reference)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!("Note {}", note.id);
        println!("Created: {}", note.created_at.format("%Y-%m-%d %H:%M"));
        println!("Updated: {}", note.updated_at.format("%Y-%m-%d %H:%M"));
        println!();
        println!("{}", export::note_to_markdown(&note));
    }

    Ok(())
}

/// Collect the requested field edits in a fixed order.
#[allow(clippy::too_many_arguments)]
fn collect_edits(
    title: Option<String>,
    kind: Option<String>,
    status: Option<String>,
    tags: Option<String>,
    authors: Option<String>,
    year: Option<String>,
    summary: Option<String>,
    outline: Option<String>,
    content: Option<String>,
    references: Option<String>,
) -> Result<Vec<NoteEdit>> {
    let mut edits = Vec::new();
    if let Some(title) = title {
        edits.push(NoteEdit::Title(title));
    }
    if let Some(kind) = kind {
        edits.push(NoteEdit::Kind(kind.parse()?));
    }
    if let Some(status) = status {
        edits.push(NoteEdit::Status(status.parse()?));
    }
    if let Some(tags) = tags {
        edits.push(NoteEdit::Tags(tags));
    }
    if let Some(authors) = authors {
        edits.push(NoteEdit::Authors(authors));
    }
    if let Some(year) = year {
        edits.push(NoteEdit::Year(year));
    }
    if let Some(summary) = summary {
        edits.push(NoteEdit::Summary(summary));
    }
    if let Some(outline) = outline {
        edits.push(NoteEdit::Outline(outline));
    }
    if let Some(content) = content {
        edits.push(NoteEdit::Content(content));
    }
    if let Some(references) = references {
        edits.push(NoteEdit::References(references));
    }
    Ok(edits)
}

#[allow(clippy::too_many_arguments)]
pub async fn handle_edit(
    reference: String,
    title: Option<String>,
    kind: Option<String>,
    status: Option<String>,
    tags: Option<String>,
    authors: Option<String>,
    year: Option<String>,
    summary: Option<String>,
    outline: Option<String>,
    content: Option<String>,
    references: Option<String>,
    stdin_field: Option<String>,
    json: bool,
) -> Result<()> {
    let mut edits = collect_edits(
        title, kind, status, tags, authors, year, summary, outline, content, references,
    )?;
    if let Some(field) = stdin_field {
        edits.push(NoteEdit::from_field(&field, read_stdin()?)?);
    }

    let (mut workspace, _config, note) = open_note(&reference).await?;

    if edits.is_empty() {
        println!("No changes for {} ({}).", note.title, note.short_id());
        return Ok(());
    }

    for edit in edits {
        workspace.edit(edit)?;
    }
    workspace.flush().await?;

    let updated = workspace
        .note(note.id)
        .ok_or_else(|| MindJungleError::NoteNotFound(reference.clone()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else if updated == note {
        println!("No changes for {} ({}).", updated.title, updated.short_id());
    } else {
        println!("Updated {} ({}) - {}", updated.kind, updated.short_id(), updated.title);
    }

    Ok(())
}

pub async fn handle_delete(reference: String, force: bool) -> Result<()> {
    let (mut workspace, _config) = open_workspace().await?;
    let note = resolve_note(&workspace.notes(), &reference)?;

    if !force {
        eprintln!("Delete {} ({}) - {}? [y/N] ", note.kind, note.short_id(), note.title);

        if io::stdin().is_terminal() {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            return Err(MindJungleError::Storage(
                "Use --force to delete in non-interactive mode".to_string(),
            ));
        }
    }

    let backlinks = links::compute_backlinks(&workspace.notes(), note.id, &note.title).len();
    workspace.delete_note(note.id).await?;

    println!("Deleted {} ({}) - {}", note.kind, note.short_id(), note.title);
    if backlinks > 0 {
        eprintln!(
            "Warning: {} note(s) still link to '{}'; those links no longer resolve",
            backlinks, note.title
        );
    }

    Ok(())
}

#[derive(Serialize)]
struct BacklinkJson {
    id: Uuid,
    title: String,
}

#[derive(Serialize)]
struct LinksJson {
    outgoing: Vec<ResolvedLink>,
    backlinks: Vec<BacklinkJson>,
}

pub async fn handle_links(reference: String, json: bool) -> Result<()> {
    let (workspace, _config, note) = open_note(&reference).await?;

    let outgoing = links::resolve_links(&note, &workspace.notes());
    let backlinks: Vec<BacklinkJson> = workspace
        .backlinks()
        .into_iter()
        .map(|n| BacklinkJson {
            id: n.id,
            title: n.title,
        })
        .collect();

    if json {
        let out = LinksJson {
            outgoing,
            backlinks,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Links for {} ({}):\n", note.title, note.short_id());
    if outgoing.is_empty() {
        println!("  No outgoing links.");
    } else {
        println!("  Outgoing:");
        for link in &outgoing {
            match link.note_id {
                Some(id) => println!("    -> {} ({})", link.target, &id.to_string()[..7]),
                None => println!("    -> {} (unresolved)", link.target),
            }
        }
    }
    if backlinks.is_empty() {
        println!("  No backlinks.");
    } else {
        println!("  Backlinks:");
        for backlink in &backlinks {
            println!("    <- {} ({})", backlink.title, &backlink.id.to_string()[..7]);
        }
    }

    Ok(())
}

pub async fn handle_render(reference: String) -> Result<()> {
    let (workspace, _config, _note) = open_note(&reference).await?;
    if let Some(rendered) = workspace.rendered_content() {
        println!("{}", rendered);
    }
    Ok(())
}

pub async fn handle_export(
    reference: String,
    format: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let (workspace, config, note) = open_note(&reference).await?;
    let format = parse_format(format, &config)?;

    if !workspace.ready_for_export() {
        return Err(MindJungleError::UntitledExport(note.short_id()));
    }

    let path = output.unwrap_or_else(|| PathBuf::from(export::export_filename(&note, format)));
    let rendered = export::render(&note, format, &config.export)?;
    export::write_export_file(&path, &rendered)?;

    println!("Exported {} as {} to {}", note.title, format, path.display());
    Ok(())
}

pub async fn handle_export_all(dir: PathBuf, format: Option<String>) -> Result<()> {
    let (workspace, config) = open_workspace().await?;
    let format = parse_format(format, &config)?;

    let written = export::export_all(&workspace.notes(), &dir, format, &config.export)?;
    println!("Exported {} note(s) to {}", written.len(), dir.display());
    Ok(())
}

pub async fn handle_stats(reference: Option<String>, json: bool) -> Result<()> {
    let (mut workspace, _config) = open_workspace().await?;
    match reference {
        Some(reference) => {
            let note = resolve_note(&workspace.notes(), &reference)?;
            workspace.select(Some(note.id))?;
        }
        None => {
            workspace.select(None)?;
        }
    }

    let stats = workspace.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Words: {}", stats.words);
        println!("Notes: {}", stats.notes);
        println!("Tags: {}", stats.tags);
        println!("Backlinks: {}", stats.backlinks);
    }
    Ok(())
}
