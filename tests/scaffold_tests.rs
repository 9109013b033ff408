use chrono::NaiveDate;
use eln_utils::scaffold::{create, QuoteMode, ScaffoldKind, ScaffoldSettings};
use eln_utils::template::SubstMode;
use eln_utils::ElnError;
use std::fs;
use tempfile::tempdir;

fn inputs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 9, 14).unwrap()
}

#[test]
fn test_new_experiment_with_template() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("exp_template.md");
    fs::write(
        &template,
        "# {title}\nStarted {startdate}, year {date:%Y}\nFolder: {foldername}\nLab: {lab}\n",
    )
    .unwrap();

    let mut settings = ScaffoldSettings::new(ScaffoldKind::Experiment);
    settings.basedir = Some(dir.path().to_path_buf());
    settings.template = Some(template);
    settings.template_kwargs.insert("lab".to_string(), "B12".to_string());

    let mut status: Vec<String> = Vec::new();
    let page = create(
        &settings,
        &inputs(&[("expid", "RS001"), ("titledesc", "Buffer test")]),
        today(),
        &mut status,
    )
    .unwrap()
    .unwrap();

    let folder = dir.path().join("RS001 Buffer test");
    assert!(folder.is_dir());
    assert_eq!(page.title, "RS001 Buffer test");
    assert_eq!(page.filepath, folder.join("RS001.md"));
    assert_eq!(
        page.content,
        "# RS001 Buffer test\nStarted 2023-09-14, year 2023\nFolder: RS001 Buffer test\nLab: B12\n"
    );
    assert!(status[0].starts_with("OK: Created new experiment directory"));

    assert!(page.save().unwrap());
    assert_eq!(fs::read_to_string(&page.filepath).unwrap(), page.content);
    // an existing file is never overwritten
    assert!(!page.save().unwrap());
}

#[test]
fn test_existing_folder_is_a_notice() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("P1 Cloning")).unwrap();
    let mut settings = ScaffoldSettings::new(ScaffoldKind::Project);
    settings.basedir = Some(dir.path().to_path_buf());

    let mut status: Vec<String> = Vec::new();
    let page = create(
        &settings,
        &inputs(&[("projectid", "P1"), ("titledesc", "Cloning")]),
        today(),
        &mut status,
    )
    .unwrap()
    .unwrap();
    assert!(status[0].starts_with("NOTICE"));
    assert_eq!(page.content, "");
    assert_eq!(page.filename, "P1.md");
}

#[test]
fn test_quoted_filename_and_percent_template() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("t.txt");
    fs::write(&template, "%(title)s -> %(filename)s").unwrap();

    let mut settings = ScaffoldSettings::new(ScaffoldKind::Experiment);
    settings.basedir = Some(dir.path().to_path_buf());
    settings.filename_fmt = "{expid} {titledesc}.md".to_string();
    settings.filename_quote = Some(QuoteMode::QuotePlus);
    settings.foldername_fmt = Some("{expid}".to_string());
    settings.template = Some(template);
    settings.template_subst_mode = SubstMode::PythonPercent;

    let page = create(
        &settings,
        &inputs(&[("expid", "RS9"), ("titledesc", "pH 7/8")]),
        today(),
        &mut Vec::<String>::new(),
    )
    .unwrap()
    .unwrap();
    assert_eq!(page.filename, "RS9+pH+7%2F8.md");
    assert_eq!(page.content, "RS9 pH 7/8 -> RS9+pH+7%2F8.md");
    assert_eq!(page.filepath, dir.path().join("RS9").join("RS9+pH+7%2F8.md"));
}

#[test]
fn test_all_inputs_empty_creates_nothing() {
    let dir = tempdir().unwrap();
    let mut settings = ScaffoldSettings::new(ScaffoldKind::Experiment);
    settings.basedir = Some(dir.path().to_path_buf());
    let result = create(
        &settings,
        &inputs(&[("expid", ""), ("titledesc", "")]),
        today(),
        &mut Vec::<String>::new(),
    )
    .unwrap();
    assert!(result.is_none());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_unknown_template_variable() {
    let dir = tempdir().unwrap();
    let mut settings = ScaffoldSettings::new(ScaffoldKind::Experiment);
    settings.basedir = Some(dir.path().to_path_buf());
    settings.title_fmt = "{expid} {operator}".to_string();
    settings.foldername_fmt = Some(String::new());
    let err = create(
        &settings,
        &inputs(&[("expid", "RS1"), ("titledesc", "x")]),
        today(),
        &mut Vec::<String>::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ElnError::UnknownTemplateVariable(k) if k == "operator"));
}
