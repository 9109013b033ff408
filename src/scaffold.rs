//! New project / experiment scaffolding: collect a few inputs, make a
//! folder, and fill a page from a template.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::buffer::StatusSink;
use crate::error::{ElnError, Result};
use crate::template::{SubstMode, Value, Vars};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaffoldKind {
    Project,
    Experiment,
}

impl ScaffoldKind {
    fn settings_prefix(&self) -> &'static str {
        match self {
            ScaffoldKind::Project => "eln_projects",
            ScaffoldKind::Experiment => "eln_experiments",
        }
    }
}

impl fmt::Display for ScaffoldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaffoldKind::Project => f.write_str("project"),
            ScaffoldKind::Experiment => f.write_str("experiment"),
        }
    }
}

/// URL quoting applied to generated file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QuoteMode {
    /// Percent-encode, spaces become `%20`
    Quote,
    /// Percent-encode, spaces become `+`
    QuotePlus,
}

impl QuoteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteMode::Quote => "quote",
            QuoteMode::QuotePlus => "quote_plus",
        }
    }

    /// Percent-encode `s`. ASCII letters, digits and `_.-~` are never
    /// encoded; characters in `safe` are left alone too.
    pub fn apply(&self, s: &str, safe: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            if c.is_ascii_alphanumeric() || "_.-~".contains(c) || safe.contains(c) {
                out.push(c);
            } else if c == ' ' && *self == QuoteMode::QuotePlus {
                out.push('+');
            } else {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("%{:02X}", byte));
                }
            }
        }
        out
    }
}

impl FromStr for QuoteMode {
    type Err = ElnError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "quote" => Ok(QuoteMode::Quote),
            "quote_plus" => Ok(QuoteMode::QuotePlus),
            other => Err(ElnError::UnknownQuoteMode(other.to_string())),
        }
    }
}

impl TryFrom<String> for QuoteMode {
    type Error = ElnError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<QuoteMode> for String {
    fn from(mode: QuoteMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Ordered prompts answered one at a time.
#[derive(Debug, Clone, Default)]
pub struct InputChain {
    requested: VecDeque<(String, String)>,
    collected: Vec<(String, String)>,
}

impl InputChain {
    pub fn new(requested: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            requested: requested.into_iter().collect(),
            collected: Vec::new(),
        }
    }

    /// `(key, prompt)` waiting for an answer.
    pub fn next_prompt(&self) -> Option<(&str, &str)> {
        self.requested
            .front()
            .map(|(key, prompt)| (key.as_str(), prompt.as_str()))
    }

    /// Answer the current prompt. Leading and trailing whitespace is dropped;
    /// an empty answer is fine.
    pub fn submit(&mut self, value: &str) -> bool {
        match self.requested.pop_front() {
            Some((key, _)) => {
                self.collected.push((key, value.trim().to_string()));
                true
            }
            None => false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.requested.is_empty()
    }

    pub fn into_values(self) -> Vec<(String, String)> {
        self.collected
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaffoldSettings {
    pub kind: ScaffoldKind,
    pub userinput: Vec<(String, String)>,
    pub basedir: Option<PathBuf>,
    pub title_fmt: String,
    pub filename_fmt: String,
    pub filename_quote: Option<QuoteMode>,
    pub filename_quote_safe: String,
    /// Defaults to the last `/` segment of `title_fmt`
    pub foldername_fmt: Option<String>,
    pub template: Option<PathBuf>,
    pub template_subst_mode: SubstMode,
    pub template_kwargs: BTreeMap<String, String>,
}

impl ScaffoldSettings {
    pub fn new(kind: ScaffoldKind) -> Self {
        let (userinput, title_fmt, filename_fmt) = match kind {
            ScaffoldKind::Experiment => (
                vec![
                    ("expid".to_string(), "Experiment ID:".to_string()),
                    ("titledesc".to_string(), "Exp title desc:".to_string()),
                ],
                "{expid} {titledesc}",
                "{expid}.md",
            ),
            ScaffoldKind::Project => (
                vec![
                    ("projectid".to_string(), "Project Identifier".to_string()),
                    ("titledesc".to_string(), "Title description".to_string()),
                ],
                "{projectid} {titledesc}",
                "{projectid}.md",
            ),
        };
        Self {
            kind,
            userinput,
            basedir: None,
            title_fmt: title_fmt.to_string(),
            filename_fmt: filename_fmt.to_string(),
            filename_quote: None,
            filename_quote_safe: String::new(),
            foldername_fmt: None,
            template: None,
            template_subst_mode: SubstMode::default(),
            template_kwargs: BTreeMap::new(),
        }
    }

    pub fn input_chain(&self) -> InputChain {
        InputChain::new(self.userinput.clone())
    }

    fn foldername_fmt(&self) -> &str {
        match &self.foldername_fmt {
            Some(fmt) => fmt,
            None => self.title_fmt.rsplit('/').next().unwrap_or_default(),
        }
    }
}

/// What [`create`] produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Scaffold {
    pub title: String,
    pub filename: String,
    pub folderpath: Option<PathBuf>,
    pub filepath: PathBuf,
    pub content: String,
}

/// Expand a leading `~` to the home directory.
pub fn expand_user(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

/// Build a project or experiment from collected `inputs`.
///
/// Returns `Ok(None)` when every input is empty. The experiment folder is
/// created under the base dir if it does not exist yet; the page itself is
/// only rendered, see [`Scaffold::save`].
pub fn create<S: StatusSink + ?Sized>(
    settings: &ScaffoldSettings,
    inputs: &[(String, String)],
    today: NaiveDate,
    status: &mut S,
) -> Result<Option<Scaffold>> {
    let basedir = settings.basedir.as_deref().ok_or_else(|| {
        ElnError::MissingSetting(format!("{}_basedir", settings.kind.settings_prefix()))
    })?;
    let basedir = std::path::absolute(expand_user(basedir))?;

    if inputs.iter().all(|(_, v)| v.is_empty()) {
        info!("All {} inputs were empty, aborting", settings.kind);
        return Ok(None);
    }
    info!("Creating new {}: {:?}", settings.kind, inputs);

    let mut vars: Vars = settings
        .template_kwargs
        .iter()
        .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
        .collect();
    for (key, value) in inputs {
        vars.insert(key.clone(), value.as_str().into());
    }
    let mode = settings.template_subst_mode;

    let mut foldername = None;
    let mut folderpath = None;
    let foldername_fmt = settings.foldername_fmt();
    if foldername_fmt.is_empty() {
        warn!("No folder name format for {}; not creating a folder", settings.kind);
    } else if basedir.is_dir() {
        let name = mode.render(foldername_fmt, &vars)?.trim().to_string();
        let path = basedir.join(&name);
        let msg = if path.is_dir() {
            format!("NOTICE: The folderpath for the new {} already exists: {}", settings.kind, path.display())
        } else {
            fs::create_dir(&path)?;
            format!("OK: Created new {} directory: {}", settings.kind, path.display())
        };
        info!("{}", msg);
        status.status_message(&msg);
        foldername = Some(name);
        folderpath = Some(path);
    } else {
        let msg = format!(
            "ERROR: Configured {} base dir does not exist: {}",
            settings.kind,
            basedir.display()
        );
        warn!("{}", msg);
        status.status_message(&msg);
    }

    let title = mode.render(&settings.title_fmt, &vars)?;
    vars.insert("title".to_string(), title.as_str().into());
    vars.insert("pagetitle".to_string(), title.as_str().into());

    let mut filename = mode.render(&settings.filename_fmt, &vars)?;
    if let Some(quote) = settings.filename_quote {
        filename = quote.apply(&filename, &settings.filename_quote_safe);
    }
    let filepath = folderpath.as_deref().unwrap_or(basedir.as_path()).join(&filename);

    let content = match &settings.template {
        Some(template) => {
            let template = expand_user(template);
            info!("Using template: {}", template.display());
            let text = fs::read_to_string(&template)?;
            let path_value = |p: &Option<PathBuf>| match p {
                Some(p) => Value::from(p.display().to_string()),
                None => Value::Missing,
            };
            vars.insert("filename".to_string(), filename.as_str().into());
            vars.insert(
                "foldername".to_string(),
                foldername.clone().map(Value::from).unwrap_or(Value::Missing),
            );
            vars.insert("filepath".to_string(), filepath.display().to_string().into());
            vars.insert("folderpath".to_string(), path_value(&folderpath));
            vars.insert("startdate".to_string(), today.into());
            vars.insert("date".to_string(), today.into());
            mode.render(&text, &vars)?
        }
        None => {
            let msg = format!(
                "No template specified (settings key \"{}_template\")",
                settings.kind.settings_prefix()
            );
            info!("{}", msg);
            status.status_message(&msg);
            String::new()
        }
    };

    Ok(Some(Scaffold {
        title,
        filename,
        folderpath,
        filepath,
        content,
    }))
}

impl Scaffold {
    /// Write the page to `filepath`. An existing file is left untouched and
    /// `false` is returned.
    pub fn save(&self) -> Result<bool> {
        if self.filepath.exists() {
            warn!("{} already exists, not overwriting", self.filepath.display());
            return Ok(false);
        }
        fs::write(&self.filepath, &self.content)?;
        info!("Wrote {} chars to {}", self.content.chars().count(), self.filepath.display());
        Ok(true)
    }
}
