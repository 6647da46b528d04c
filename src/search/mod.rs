//! Filter parsing and free-text search over the corpus.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::entity::{Note, NoteKind, NoteStatus};
use crate::error::Result;

/// Parsed search filter from query string.
///
/// Filters can be specified in the query string using prefixes:
/// - `type:paper` - Filter by note kind
/// - `status:final` - Filter by status
/// - `tag:methods` - Filter by tag (can specify multiple)
/// - `created:>2025-01-01` - Created after date
/// - `created:<2025-12-31` - Created before date
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SearchFilter {
    pub kind: Option<NoteKind>,
    pub status: Option<NoteStatus>,
    /// Note must carry all of these tags
    pub tags: Vec<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl SearchFilter {
    /// Check if filter has any constraints.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.status.is_none()
            && self.tags.is_empty()
            && self.created_after.is_none()
            && self.created_before.is_none()
    }

    pub fn matches(&self, note: &Note) -> bool {
        if self.kind.is_some_and(|kind| note.kind != kind) {
            return false;
        }
        if self.status.is_some_and(|status| note.status != status) {
            return false;
        }
        if !self.tags.iter().all(|tag| note.tags.contains(tag)) {
            return false;
        }
        if self.created_after.is_some_and(|after| note.created_at <= after) {
            return false;
        }
        if self.created_before.is_some_and(|before| note.created_at >= before) {
            return false;
        }
        true
    }
}

/// Parse a raw query string into (remaining query text, filters).
///
/// Unknown kinds or statuses are errors; unparseable dates are ignored.
///
/// ```
/// use mindjungle::entity::NoteKind;
/// use mindjungle::search::parse_query;
///
/// let (text, filter) = parse_query("type:paper tag:Methods sampling bias").unwrap();
/// assert_eq!(text, "sampling bias");
/// assert_eq!(filter.kind, Some(NoteKind::Paper));
/// assert_eq!(filter.tags, vec!["methods".to_string()]);
/// ```
pub fn parse_query(raw: &str) -> Result<(String, SearchFilter)> {
    let mut filter = SearchFilter::default();
    let mut remaining = Vec::new();

    for token in raw.split_whitespace() {
        if let Some(value) = token.strip_prefix("type:") {
            filter.kind = Some(value.parse()?);
        } else if let Some(value) = token.strip_prefix("status:") {
            filter.status = Some(value.parse()?);
        } else if let Some(value) = token.strip_prefix("tag:") {
            filter.tags.push(value.to_lowercase());
        } else if let Some(value) = token.strip_prefix("created:>") {
            filter.created_after = parse_date(value);
        } else if let Some(value) = token.strip_prefix("created:<") {
            filter.created_before = parse_date(value);
        } else {
            remaining.push(token);
        }
    }

    Ok((remaining.join(" "), filter))
}

/// `2025-06-15` (midnight UTC) or a full RFC 3339 timestamp.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(day) => day.and_hms_opt(0, 0, 0).map(|midnight| Utc.from_utc_datetime(&midnight)),
        Err(_) => DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|stamp| stamp.with_timezone(&Utc)),
    }
}

/// Title, summary, outline, content and tags joined with spaces, lowercased.
fn haystack(note: &Note) -> String {
    let mut parts = vec![
        note.title.as_str(),
        note.summary.as_str(),
        note.outline.as_str(),
        note.content.as_str(),
    ];
    parts.extend(note.tags.iter().map(String::as_str));
    parts.join(" ").to_lowercase()
}

/// Case-insensitive substring match. Blank text matches every note.
pub fn matches_text(note: &Note, text: &str) -> bool {
    let needle = text.trim().to_lowercase();
    needle.is_empty() || haystack(note).contains(&needle)
}

/// Notes matching a raw query, in corpus order.
pub fn search<'a>(notes: &'a [Note], raw: &str) -> Result<Vec<&'a Note>> {
    let (text, filter) = parse_query(raw)?;
    Ok(notes
        .iter()
        .filter(|note| filter.matches(note) && matches_text(note, &text))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MindJungleError;
    use chrono::Datelike;

    fn note(title: &str, kind: NoteKind, tags: &[&str]) -> Note {
        let mut note = Note::new(title, kind);
        note.tags = tags.iter().map(|t| t.to_string()).collect();
        note
    }

    fn corpus() -> Vec<Note> {
        let mut paper = note("Sampling Bias", NoteKind::Paper, &["methods"]);
        paper.status = NoteStatus::Final;
        paper.content = "Survivorship effects in field data.".into();
        let mut outline = note("Thesis Plan", NoteKind::Outline, &["methods", "thesis"]);
        outline.outline = "- chapter on sampling".into();
        vec![paper, outline, note("Loose thought", NoteKind::Idea, &[])]
    }

    #[test]
    fn test_parse_query_no_filters() {
        let (query, filter) = parse_query("hello world").unwrap();
        assert_eq!(query, "hello world");
        assert!(filter.is_empty());
    }

    #[test]
    fn test_parse_query_combined() {
        let (query, filter) =
            parse_query("type:outline status:in-progress tag:Thesis tag:methods chapter one")
                .unwrap();
        assert_eq!(query, "chapter one");
        assert_eq!(filter.kind, Some(NoteKind::Outline));
        assert_eq!(filter.status, Some(NoteStatus::InProgress));
        assert_eq!(filter.tags, vec!["thesis".to_string(), "methods".to_string()]);
    }

    #[test]
    fn test_parse_query_only_filters() {
        let (query, filter) = parse_query("type:idea status:draft").unwrap();
        assert_eq!(query, "");
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_parse_query_rejects_unknown_kind() {
        assert!(matches!(
            parse_query("type:essay"),
            Err(MindJungleError::InvalidNoteKind(_))
        ));
        assert!(matches!(
            parse_query("status:done"),
            Err(MindJungleError::InvalidStatus(_))
        ));
    }

    #[test]
    fn test_parse_date_iso() {
        let dt = parse_date("2025-06-15").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2025, 6, 15));
        assert!(parse_date("not-a-date").is_none());

        let stamp = parse_date("2025-06-15T08:30:00+02:00").unwrap();
        assert_eq!(stamp.to_rfc3339(), "2025-06-15T06:30:00+00:00");
    }

    #[test]
    fn test_text_search_covers_fields_and_tags() {
        let notes = corpus();
        let titles = |raw: &str| -> Vec<String> {
            search(&notes, raw)
                .unwrap()
                .into_iter()
                .map(|n| n.title.clone())
                .collect()
        };

        assert_eq!(titles("SAMPLING"), vec!["Sampling Bias", "Thesis Plan"]);
        assert_eq!(titles("survivorship"), vec!["Sampling Bias"]);
        assert_eq!(titles("thesis"), vec!["Thesis Plan"]);
        assert_eq!(titles("").len(), 3);
        assert!(titles("nothing like this").is_empty());
    }

    #[test]
    fn test_filters_narrow_results() {
        let notes = corpus();
        let found = search(&notes, "tag:methods status:final").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Sampling Bias");

        let ideas = search(&notes, "type:idea").unwrap();
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].title, "Loose thought");
    }

    #[test]
    fn test_created_window() {
        let notes = corpus();
        assert!(search(&notes, "created:>2999-01-01").unwrap().is_empty());
        assert_eq!(search(&notes, "created:>2000-01-01").unwrap().len(), 3);
    }
}
