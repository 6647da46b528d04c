//! Wikilink extraction and the derived note graph.
//!
//! Links are never stored. Outgoing links and backlinks are recomputed from
//! note text on every read, joining on titles case-insensitively. A corpus is
//! a personal notebook, so the O(notes x text) backlink scan is acceptable.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use uuid::Uuid;

use crate::entity::Note;

/// Scheme used for rendered note references.
pub const NOTE_HREF_PREFIX: &str = "mindjungle://note/";

// The inner text may not contain `]`, so a title holding the closing
// delimiter can never be a link target.
static WIKILINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("valid wikilink regex"));

/// Extract the targets of every `[[...]]` span in `text`.
///
/// Targets are trimmed, empty ones dropped, and duplicates removed keeping
/// the first occurrence, so the order follows the text.
///
/// ```
/// use mindjungle::links::extract_wiki_links;
///
/// let links = extract_wiki_links("[[Note A]] and [[Note B]] with [[Note A]] repeated.");
/// assert_eq!(links, vec!["Note A", "Note B"]);
/// ```
pub fn extract_wiki_links(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    WIKILINK_RE
        .captures_iter(text)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim()))
        .filter(|target| !target.is_empty())
        .filter(|target| seen.insert(target.to_string()))
        .map(String::from)
        .collect()
}

/// The text of a note that is scanned for links.
pub fn link_text(note: &Note) -> String {
    [
        note.summary.as_str(),
        note.outline.as_str(),
        note.content.as_str(),
        note.references.as_str(),
    ]
    .join("\n")
}

/// Link targets written anywhere in a note's text fields.
pub fn outgoing_links(note: &Note) -> Vec<String> {
    extract_wiki_links(&link_text(note))
}

/// Notes that link to `target_title`, in collection order.
///
/// The note with `target_id` is never part of the result, even when it
/// links to its own title.
pub fn compute_backlinks<'a>(notes: &'a [Note], target_id: Uuid, target_title: &str) -> Vec<&'a Note> {
    let wanted = target_title.trim().to_lowercase();
    if wanted.is_empty() {
        return Vec::new();
    }

    notes
        .iter()
        .filter(|note| note.id != target_id)
        .filter(|note| {
            outgoing_links(note)
                .iter()
                .any(|link| link.to_lowercase() == wanted)
        })
        .collect()
}

/// Resolve a link target to a note.
///
/// Matching is case-insensitive on trimmed titles. When several notes share
/// a title the first one in collection order wins. `None` means the link is
/// dangling, which is not an error.
pub fn resolve_title<'a>(notes: &'a [Note], title: &str) -> Option<&'a Note> {
    if title.trim().is_empty() {
        return None;
    }
    notes.iter().find(|note| note.title_matches(title))
}

/// Rewrite every `[[Title]]` as a markdown link to `mindjungle://note/Title`.
pub fn render_links_as_references(text: &str) -> String {
    WIKILINK_RE
        .replace_all(text, |caps: &Captures| {
            let title = caps[1].trim();
            format!("[{}]({})", title, note_href(title))
        })
        .into_owned()
}

/// The href a rendered reference to `title` points at.
pub fn note_href(title: &str) -> String {
    format!("{}{}", NOTE_HREF_PREFIX, urlencoding::encode(title.trim()))
}

/// Decode a rendered note reference back into the title it names.
///
/// Any other href (plain web links, malformed escapes) yields `None`.
pub fn parse_note_href(href: &str) -> Option<String> {
    let encoded = href.strip_prefix(NOTE_HREF_PREFIX)?;
    urlencoding::decode(encoded).ok().map(|title| title.into_owned())
}

/// A single outgoing link and the note it currently resolves to.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ResolvedLink {
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_id: Option<Uuid>,
}

/// Outgoing links of `note` paired with their resolution in `notes`.
pub fn resolve_links(note: &Note, notes: &[Note]) -> Vec<ResolvedLink> {
    outgoing_links(note)
        .into_iter()
        .map(|target| {
            let note_id = resolve_title(notes, &target).map(|n| n.id);
            ResolvedLink { target, note_id }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::NoteKind;

    fn note(title: &str, content: &str) -> Note {
        let mut note = Note::new(title, NoteKind::Idea);
        note.content = content.to_string();
        note
    }

    #[test]
    fn test_extract_unique_links_in_order() {
        let content = "[[Note A]] and [[Note B]] with [[Note A]] repeated.";
        assert_eq!(extract_wiki_links(content), vec!["Note A", "Note B"]);
    }

    #[test]
    fn test_extract_trims_and_drops_empty() {
        let content = "[[  Padded  ]] [[   ]] [[Padded]]";
        assert_eq!(extract_wiki_links(content), vec!["Padded"]);
    }

    #[test]
    fn test_extract_ignores_malformed_syntax() {
        assert!(extract_wiki_links("[[unterminated and [single] and ]]").is_empty());
        assert!(extract_wiki_links("no links here").is_empty());
    }

    #[test]
    fn test_closing_delimiter_is_not_a_target() {
        // `[[a]b]]` holds a `]` inside, so it never forms a link.
        assert!(extract_wiki_links("[[a]b]]").is_empty());
    }

    #[test]
    fn test_dedup_is_case_sensitive_on_raw_targets() {
        assert_eq!(extract_wiki_links("[[Rust]] [[rust]]"), vec!["Rust", "rust"]);
    }

    #[test]
    fn test_outgoing_links_scan_all_text_fields() {
        let mut n = Note::new("Hub", NoteKind::Outline);
        n.summary = "[[One]]".into();
        n.outline = "- [[Two]]".into();
        n.content = "[[Three]] and [[One]]".into();
        n.references = "[[Four]]".into();
        assert_eq!(outgoing_links(&n), vec!["One", "Two", "Three", "Four"]);
    }

    #[test]
    fn test_backlinks_case_insensitive() {
        let target = note("Note A", "");
        let linking = note("Other", "see [[note a]]");
        let unrelated = note("Unrelated", "see [[Note B]]");
        let notes = vec![target.clone(), linking.clone(), unrelated];

        let backlinks = compute_backlinks(&notes, target.id, &target.title);
        assert_eq!(backlinks.len(), 1);
        assert_eq!(backlinks[0].id, linking.id);
    }

    #[test]
    fn test_backlinks_exclude_self() {
        let narcissist = note("Me", "I link to [[Me]]");
        let notes = vec![narcissist.clone()];
        assert!(compute_backlinks(&notes, narcissist.id, "Me").is_empty());
    }

    #[test]
    fn test_backlinks_keep_collection_order() {
        let target = note("Target", "");
        let a = note("A", "[[Target]]");
        let b = note("B", "[[target]]");
        let notes = vec![b.clone(), target.clone(), a.clone()];
        let ids: Vec<Uuid> = compute_backlinks(&notes, target.id, "Target")
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[test]
    fn test_backlinks_for_blank_title() {
        let target = note("  ", "");
        let notes = vec![target.clone(), note("X", "[[ ]]")];
        assert!(compute_backlinks(&notes, target.id, &target.title).is_empty());
    }

    #[test]
    fn test_resolve_title_case_insensitive() {
        let notes = vec![note("Note A", "")];
        let found = resolve_title(&notes, "note a").unwrap();
        assert_eq!(found.title, "Note A");
        assert!(resolve_title(&notes, "Note B").is_none());
        assert!(resolve_title(&notes, "").is_none());
    }

    #[test]
    fn test_resolve_title_first_match_wins() {
        let first = note("Twin", "first");
        let second = note("twin", "second");
        let notes = vec![first.clone(), second];
        assert_eq!(resolve_title(&notes, "TWIN").unwrap().id, first.id);
    }

    #[test]
    fn test_render_links_as_references() {
        let rendered = render_links_as_references("See [[ Deep Work ]] and [[A/B]].");
        assert_eq!(
            rendered,
            "See [Deep Work](mindjungle://note/Deep%20Work) and [A/B](mindjungle://note/A%2FB)."
        );
    }

    #[test]
    fn test_render_leaves_plain_text_alone() {
        let text = "A [normal](https://example.com) link.";
        assert_eq!(render_links_as_references(text), text);
    }

    #[test]
    fn test_parse_note_href() {
        assert_eq!(
            parse_note_href(&note_href("Deep Work")).as_deref(),
            Some("Deep Work")
        );
        assert_eq!(parse_note_href("https://example.com"), None);
    }

    #[test]
    fn test_resolve_links_marks_dangling() {
        let known = note("Known", "");
        let source = note("Source", "[[Known]] [[Missing]]");
        let notes = vec![known.clone(), source.clone()];
        let links = resolve_links(&source, &notes);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].note_id, Some(known.id));
        assert_eq!(links[1].note_id, None);
    }
}
