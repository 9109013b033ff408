use chrono::{Local, TimeZone};
use eln_utils::buffer::{InsertAt, TextBuffer};
use eln_utils::journal::{
    clear_notes, discover, journal_dirs, merge_notes, select_candidate, NoteFormat,
};
use eln_utils::{ElnError, Settings};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_discover_filters_by_pattern_and_size() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("RS002 notes.txt"), "some longer notes").unwrap();
    fs::write(dir.path().join("RS001 notes.txt"), "also long enough").unwrap();
    fs::write(dir.path().join("tiny.txt"), "x").unwrap();
    fs::write(dir.path().join("other.md"), "long enough but wrong pattern").unwrap();
    fs::create_dir(dir.path().join("sub.txt")).unwrap();

    let files = discover(&[dir.path().to_path_buf()], "*.txt", 10).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["RS001 notes.txt", "RS002 notes.txt"]);
}

#[test]
fn test_discover_nothing_found() {
    let dir = tempdir().unwrap();
    let err = discover(&[dir.path().to_path_buf()], "*", 10).unwrap_err();
    assert!(matches!(err, ElnError::NoJournalFiles { min_size: 10, .. }));
}

#[test]
fn test_journal_dirs_default_to_view_dir() {
    let settings = Settings::default();
    let dirs = journal_dirs(&settings, Some(std::path::Path::new("/lab/exp/RS001.md"))).unwrap();
    assert_eq!(dirs, vec![std::path::PathBuf::from("/lab/exp")]);
    assert!(matches!(
        journal_dirs(&settings, None),
        Err(ElnError::MissingSetting(_))
    ));
}

#[test]
fn test_relative_view_file_searches_working_dir() {
    // cargo runs integration tests from the package root
    let dirs = journal_dirs(&Settings::default(), Some(std::path::Path::new("nb.md"))).unwrap();
    let files = discover(&dirs, "Cargo.toml", 10).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name().unwrap(), "Cargo.toml");
}

#[test]
fn test_merge_moves_notes_into_buffer() {
    let dir = tempdir().unwrap();
    let notes = dir.path().join("RS001 notes.txt");
    fs::write(&notes, "Made buffer.\n\nRan gel.\n").unwrap();
    let view_file = dir.path().join("RS001 Buffer.md");

    let settings = Settings {
        view_filename_pat: Some(r"(?P<expid>RS\d+)".to_string()),
        notes_filename_pat: Some(r"(?P<expid>RS\d+) notes".to_string()),
        notes_filename_keys: vec!["expid".to_string()],
        ..Default::default()
    };
    let files = discover(&[dir.path().to_path_buf()], "*notes*", settings.min_file_size).unwrap();
    let index = select_candidate(&files, Some(&view_file), &settings).unwrap();
    assert_eq!(files[index], notes);

    let now = Local.with_ymd_and_hms(2021, 6, 1, 16, 45, 0).unwrap();
    let mut buffer = TextBuffer::from_string("= RS001 =\n");
    let mut status: Vec<String> = Vec::new();
    merge_notes(
        &mut buffer,
        &files[index],
        &NoteFormat::default(),
        InsertAt::End,
        now,
        &mut status,
    )
    .unwrap();
    // nothing is removed until the notebook is saved
    assert_eq!(fs::read_to_string(&notes).unwrap(), "Made buffer.\n\nRan gel.\n");
    fs::write(&view_file, buffer.as_str()).unwrap();
    clear_notes(&notes).unwrap();

    assert_eq!(
        buffer.as_str(),
        "= RS001 =\n'''Journal, 2021-06-01:'''\n* 16:45 > Made buffer.\n* 16:45 > Ran gel."
    );
    assert_eq!(fs::read_to_string(&notes).unwrap(), "\n");
    assert_eq!(status.len(), 1);
    assert!(status[0].starts_with("Moved notes from"));
}

#[test]
fn test_merge_leaves_notes_file() {
    let dir = tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, "keep me around").unwrap();
    let mut buffer = TextBuffer::new();
    let format = NoteFormat {
        paragraphs_to_bullet: false,
        add_timestamp: false,
        add_journal_header: false,
    };
    merge_notes(
        &mut buffer,
        &notes,
        &format,
        InsertAt::Offset(0),
        Local::now(),
        &mut Vec::<String>::new(),
    )
    .unwrap();
    assert_eq!(buffer.as_str(), "keep me around");
    assert_eq!(fs::read_to_string(&notes).unwrap(), "keep me around");
}
