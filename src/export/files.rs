//! Filenames and file writing for exports.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::entity::Note;
use crate::Result;

/// Name used when a note has no title.
pub const FALLBACK_NAME: &str = "mindjungle-note";

/// Lowercase ASCII words of `title` joined by single hyphens, e.g.
/// `"Deep Work, Revisited!"` -> `deep-work-revisited`.
pub fn slugify(title: &str) -> String {
    let words: Vec<String> = title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();

    if words.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        words.join("-")
    }
}

/// The title as a file stem: path separators are replaced, blank titles
/// fall back to [`FALLBACK_NAME`].
pub fn file_stem(note: &Note) -> String {
    let title = note.title.trim();
    if title.is_empty() {
        return FALLBACK_NAME.to_string();
    }
    title.replace(['/', '\\'], "-")
}

/// Slug-based stem that is unique among `used`, disambiguated with the
/// note's short id on collision.
pub fn unique_stem(note: &Note, used: &mut HashSet<String>) -> String {
    let candidate = slugify(&note.title);
    if used.insert(candidate.clone()) {
        return candidate;
    }
    let unique = format!("{}-{}", candidate, note.short_id());
    used.insert(unique.clone());
    unique
}

/// Write content to a file, creating parent directories if needed
pub fn write_export_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::NoteKind;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Deep Work, Revisited!"), "deep-work-revisited");
    }

    #[test]
    fn test_slugify_unicode_and_empty() {
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("日本語"), FALLBACK_NAME);
        assert_eq!(slugify("---"), FALLBACK_NAME);
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(&Note::new("Either/Or", NoteKind::Idea)), "Either-Or");
        assert_eq!(file_stem(&Note::new("  ", NoteKind::Idea)), FALLBACK_NAME);
    }

    #[test]
    fn test_unique_stem_disambiguates() {
        let mut used = HashSet::new();
        let a = Note::new("Twin", NoteKind::Idea);
        let b = Note::new("twin", NoteKind::Idea);
        assert_eq!(unique_stem(&a, &mut used), "twin");
        assert_eq!(unique_stem(&b, &mut used), format!("twin-{}", b.short_id()));
    }
}
