use crate::entity::Note;

/// Format a note as an APA style reference.
///
/// `label` closes the citation, e.g. "MindJungle Manuscript".
pub fn note_to_apa(note: &Note, label: &str) -> String {
    let authors = note
        .authors
        .iter()
        .map(|author| apa_author(author))
        .collect::<Vec<_>>()
        .join(", ");

    let year = match note.year.as_deref().map(str::trim) {
        Some(year) if !year.is_empty() => format!("({})", year),
        _ => "(n.d.)".to_string(),
    };

    let prefix = if authors.is_empty() {
        String::new()
    } else {
        format!("{} ", authors)
    };

    format!("{}{}. {}. {}.", prefix, year, note.title, label)
}

/// "Ada King Lovelace" -> "Lovelace, A. K."; "Lovelace, Ada" is kept in
/// surname-first order; single names pass through.
fn apa_author(author: &str) -> String {
    let mut parts = author.split(',').map(str::trim);
    let last_name = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();
    if !rest.is_empty() {
        return format!("{}, {}", last_name, rest.join(" "));
    }

    let mut pieces: Vec<&str> = author.split_whitespace().collect();
    let Some(surname) = pieces.pop() else {
        return String::new();
    };
    if pieces.is_empty() {
        return surname.to_string();
    }

    let initials = pieces
        .iter()
        .filter_map(|name| name.chars().next())
        .map(|c| format!("{}.", c.to_uppercase()))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}, {}", surname, initials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::NoteKind;

    const LABEL: &str = "MindJungle Manuscript";

    fn paper(authors: &[&str], year: Option<&str>) -> Note {
        let mut note = Note::new("Sample Note", NoteKind::Paper);
        note.authors = authors.iter().map(|a| a.to_string()).collect();
        note.year = year.map(String::from);
        note
    }

    #[test]
    fn test_apa_with_authors_and_year() {
        let note = paper(&["Ada Lovelace", "alan mathison turing"], Some("1843"));
        assert_eq!(
            note_to_apa(&note, LABEL),
            "Lovelace, A., turing, A. M. (1843). Sample Note. MindJungle Manuscript."
        );
    }

    #[test]
    fn test_apa_fallback_year() {
        let citation = note_to_apa(&paper(&["Ada Lovelace"], None), LABEL);
        assert!(citation.contains("(n.d.)"));
    }

    #[test]
    fn test_apa_without_authors() {
        assert_eq!(
            note_to_apa(&paper(&[], Some("2025")), LABEL),
            "(2025). Sample Note. MindJungle Manuscript."
        );
    }

    #[test]
    fn test_apa_author_forms() {
        assert_eq!(apa_author("Plato"), "Plato");
        assert_eq!(apa_author("Lovelace, Ada"), "Lovelace, Ada");
        assert_eq!(apa_author("Grace  Brewster Hopper"), "Hopper, G. B.");
    }

    #[test]
    fn test_custom_label() {
        let citation = note_to_apa(&paper(&[], None), "Working Paper");
        assert!(citation.ends_with("Sample Note. Working Paper."));
    }
}
