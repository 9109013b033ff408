//! Timestamped journal snippets.

use chrono::{DateTime, Local};

use crate::buffer::{insert_text, InsertAt, TextView};
use crate::error::Result;
use crate::template::{format_braces, Vars};

pub const JOURNAL_DATE_HEADER: &str = "'''Journal, {date:%Y-%m-%d}:'''";
pub const JOURNAL_DAILY_START: &str = "'''Journal, {date:%Y-%m-%d}:'''\n* {date:%H:%M} > ";
pub const JOURNAL_TIMESTAMP: &str = "* {date:%H:%M} > ";

pub const SNIPPETS: [(&str, &str); 3] = [
    ("journal_date_header", JOURNAL_DATE_HEADER),
    ("journal_daily_start", JOURNAL_DAILY_START),
    ("journal_timestamp", JOURNAL_TIMESTAMP),
];

/// Template text for a named snippet; an unknown name is taken as the
/// template itself.
pub fn lookup(name: &str) -> &str {
    SNIPPETS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, text)| *text)
        .unwrap_or(name)
}

/// Render a snippet (by name or literal template) at time `now`.
pub fn render(snippet: &str, now: DateTime<Local>) -> Result<String> {
    let mut vars = Vars::new();
    vars.insert("date".to_string(), now.into());
    format_braces(lookup(snippet), &vars)
}

/// Render `snippet` and insert it into `view`; returns the rendered text.
pub fn insert_snippet<V: TextView + ?Sized>(
    view: &mut V,
    snippet: &str,
    at: InsertAt,
    now: DateTime<Local>,
) -> Result<String> {
    let text = render(snippet, now)?;
    insert_text(view, &text, at)?;
    Ok(text)
}
