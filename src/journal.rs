//! Moving quick notes from external journal files into the notebook.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{debug, info, warn};
use regex::Regex;

use crate::buffer::{insert_text, InsertAt, StatusSink, TextView};
use crate::error::{ElnError, Result};
use crate::settings::Settings;
use crate::snippets;

fn compile(pattern: &str, anchored: bool) -> Result<Regex> {
    let source = if anchored {
        format!("^(?:{})", pattern)
    } else {
        pattern.to_string()
    };
    Regex::new(&source).map_err(|source| ElnError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Shell-style wildcard (`*`, `?`) as an anchored regex.
pub fn wildcard(pattern: &str) -> Result<Regex> {
    let escaped = regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");
    compile(&format!("{}$", escaped), true)
}

/// Directories to look in: the configured ones, or the current file's own.
pub fn journal_dirs(settings: &Settings, view_file: Option<&Path>) -> Result<Vec<PathBuf>> {
    if !settings.external_journal_dirs.is_empty() {
        return Ok(settings.external_journal_dirs.clone());
    }
    info!("Setting key 'external_journal_dirs' not found, using current file dir");
    match view_file {
        // A bare file name has an empty parent: the working directory.
        Some(file) => {
            let dir = file
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            Ok(vec![dir.to_path_buf()])
        }
        None => Err(ElnError::MissingSetting("external_journal_dirs".to_string())),
    }
}

/// Regular files in `dirs` whose name matches `pattern` and that hold at
/// least `min_size` bytes. Sorted by name within each directory.
pub fn discover(dirs: &[PathBuf], pattern: &str, min_size: u64) -> Result<Vec<PathBuf>> {
    let matcher = wildcard(pattern)?;
    let mut found = Vec::new();
    for dir in dirs {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read journal dir {}: {}", dir.display(), e);
                continue;
            }
        };
        let mut in_dir = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            if !matcher.is_match(&name.to_string_lossy()) {
                continue;
            }
            let meta = entry.metadata()?;
            if meta.is_file() && meta.len() >= min_size {
                in_dir.push(entry.path());
            }
        }
        in_dir.sort();
        debug!("{}: {:?}", dir.display(), in_dir);
        found.extend(in_dir);
    }
    if found.is_empty() {
        return Err(ElnError::NoJournalFiles {
            min_size,
            dirs: dirs.to_vec(),
        });
    }
    Ok(found)
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Index of the notes file that best fits the current file.
///
/// Starts from where the current file name would sort among the notes
/// files. If `view_filename_pat` and `notes_filename_pat` are set, the first
/// notes file whose `notes_filename_keys` groups equal the current file's
/// wins; failing that, the last file used is picked if still present.
pub fn select_candidate(files: &[PathBuf], view_file: Option<&Path>, settings: &Settings) -> Result<usize> {
    let names: Vec<String> = files.iter().map(|p| basename(p)).collect();
    let view_name = view_file.map(basename);
    let mut selected = match &view_name {
        Some(view_name) => names.iter().filter(|n| *n < view_name).count(),
        None => 0,
    };

    if let (Some(view_name), Some(view_pat)) = (&view_name, &settings.view_filename_pat) {
        let view_regex = compile(view_pat, true)?;
        match view_regex.captures(view_name) {
            None => warn!("{} did not match view file basename: {}", view_pat, view_name),
            Some(view_caps) => {
                if let (Some(notes_pat), false) = (
                    &settings.notes_filename_pat,
                    settings.notes_filename_keys.is_empty(),
                ) {
                    let notes_regex = compile(notes_pat, true)?;
                    let keys = &settings.notes_filename_keys;
                    let hit = names.iter().position(|name| {
                        notes_regex.captures(name).is_some_and(|caps| {
                            keys.iter().all(|key| {
                                caps.name(key).map(|m| m.as_str())
                                    == view_caps.name(key).map(|m| m.as_str())
                            })
                        })
                    });
                    match hit {
                        Some(i) => selected = i,
                        None => {
                            info!(
                                "notes_filename_keys {:?} do not match any filenames; using closest alphabetic match",
                                keys
                            );
                            if let Some(last) = &settings.last_external_journal {
                                if let Some(i) = files
                                    .iter()
                                    .position(|p| p.to_string_lossy() == *last || basename(p) == *last)
                                {
                                    selected = i;
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(selected.min(files.len().saturating_sub(1)))
}

/// How notes are reshaped before insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteFormat {
    pub paragraphs_to_bullet: bool,
    pub add_timestamp: bool,
    pub add_journal_header: bool,
}

impl Default for NoteFormat {
    fn default() -> Self {
        Self {
            paragraphs_to_bullet: true,
            add_timestamp: true,
            add_journal_header: true,
        }
    }
}

/// Turn raw notes into journal text.
pub fn format_notes(content: &str, format: &NoteFormat, now: DateTime<Local>) -> Result<String> {
    let prefix = if format.add_timestamp {
        snippets::render(snippets::JOURNAL_TIMESTAMP, now)?
    } else if format.paragraphs_to_bullet {
        "* ".to_string()
    } else {
        String::new()
    };
    let mut text = if format.paragraphs_to_bullet {
        content
            .trim()
            .split("\n\n")
            .map(|paragraph| format!("{}{}", prefix, paragraph))
            .collect::<Vec<_>>()
            .join("\n")
    } else if format.add_timestamp {
        format!("{}{}", prefix, content)
    } else {
        content.to_string()
    };
    if format.add_journal_header {
        let header = snippets::render(snippets::JOURNAL_DATE_HEADER, now)?;
        text = format!("{}\n{}", header, text);
    }
    Ok(text)
}

/// Read `notes`, format it and insert it into `view`. Returns the inserted
/// text. The notes file is not touched; call [`clear_notes`] once the view
/// has been saved to complete a move.
pub fn merge_notes<V, S>(
    view: &mut V,
    notes: &Path,
    format: &NoteFormat,
    at: InsertAt,
    now: DateTime<Local>,
    status: &mut S,
) -> Result<String>
where
    V: TextView + ?Sized,
    S: StatusSink + ?Sized,
{
    info!("Selected file: {}", notes.display());
    let content = fs::read_to_string(notes)?;
    if content.is_empty() {
        warn!("File does not contain any content: {}", notes.display());
    }
    let text = format_notes(&content, format, now)?;
    let pos = insert_text(view, &text, at)?;
    debug!("Inserted {} chars at pos {}", text.chars().count(), pos);
    status.status_message(&format!(
        "Moved notes from {} to current cursor position.",
        notes.display()
    ));
    Ok(text)
}

/// Empty a notes file after its content has been merged and saved.
pub fn clear_notes(notes: &Path) -> Result<()> {
    fs::write(notes, "\n")?;
    info!("Removed content from {}", notes.display());
    Ok(())
}
