//! The `eln_utils.sublime-settings` file.
//!
//! A flat JSON object; every key is optional. Names that select a behaviour
//! (`wc_map`, quote and substitution modes, modification patterns) are
//! parsed while loading, so a typo fails here rather than mid-command.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pipeline::TransformConfig;
use crate::scaffold::{QuoteMode, ScaffoldKind, ScaffoldSettings};
use crate::template::SubstMode;

pub const SETTINGS_NAME: &str = "eln_utils.sublime-settings";

fn default_notes_pattern() -> String {
    "*".to_string()
}

fn default_min_file_size() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub external_journal_dirs: Vec<PathBuf>,
    #[serde(default = "default_notes_pattern")]
    pub journal_notes_pattern: String,
    #[serde(default = "default_min_file_size")]
    pub min_file_size: u64,
    pub view_filename_pat: Option<String>,
    pub notes_filename_pat: Option<String>,
    pub notes_filename_keys: Vec<String>,
    pub last_external_journal: Option<String>,

    pub eln_experiments_basedir: Option<PathBuf>,
    pub eln_experiments_title_fmt: Option<String>,
    pub eln_experiments_filename_fmt: Option<String>,
    pub eln_experiments_filename_quote: Option<QuoteMode>,
    pub eln_experiments_filename_quote_safe: String,
    pub eln_experiments_foldername_fmt: Option<String>,
    pub eln_experiments_template: Option<PathBuf>,
    pub eln_experiments_template_subst_mode: SubstMode,
    pub eln_experiments_template_kwargs: BTreeMap<String, String>,
    #[serde(default = "default_true")]
    pub eln_experiments_save_to_file: bool,

    pub eln_projects_basedir: Option<PathBuf>,
    pub eln_projects_userinput: Option<Vec<(String, String)>>,
    pub eln_projects_title_fmt: Option<String>,
    pub eln_projects_filename_fmt: Option<String>,
    pub eln_projects_filename_quote: Option<QuoteMode>,
    pub eln_projects_filename_quote_safe: String,
    pub eln_projects_foldername_fmt: Option<String>,
    pub eln_projects_template: Option<PathBuf>,
    pub eln_projects_template_subst_mode: SubstMode,
    pub eln_projects_template_kwargs: BTreeMap<String, String>,

    /// Defaults for the sequence-transform command
    pub sequence_transform: TransformConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            external_journal_dirs: Vec::new(),
            journal_notes_pattern: default_notes_pattern(),
            min_file_size: default_min_file_size(),
            view_filename_pat: None,
            notes_filename_pat: None,
            notes_filename_keys: Vec::new(),
            last_external_journal: None,
            eln_experiments_basedir: None,
            eln_experiments_title_fmt: None,
            eln_experiments_filename_fmt: None,
            eln_experiments_filename_quote: None,
            eln_experiments_filename_quote_safe: String::new(),
            eln_experiments_foldername_fmt: None,
            eln_experiments_template: None,
            eln_experiments_template_subst_mode: SubstMode::default(),
            eln_experiments_template_kwargs: BTreeMap::new(),
            eln_experiments_save_to_file: true,
            eln_projects_basedir: None,
            eln_projects_userinput: None,
            eln_projects_title_fmt: None,
            eln_projects_filename_fmt: None,
            eln_projects_filename_quote: None,
            eln_projects_filename_quote_safe: String::new(),
            eln_projects_foldername_fmt: None,
            eln_projects_template: None,
            eln_projects_template_subst_mode: SubstMode::default(),
            eln_projects_template_kwargs: BTreeMap::new(),
            sequence_transform: TransformConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading settings from {}", path.display());
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            debug!("{} not found, using default settings", path.display());
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Scaffolding settings for projects or experiments.
    pub fn scaffold(&self, kind: ScaffoldKind) -> ScaffoldSettings {
        let (
            basedir,
            title_fmt,
            filename_fmt,
            filename_quote,
            quote_safe,
            foldername_fmt,
            template,
            subst_mode,
            kwargs,
        ) = match kind {
            ScaffoldKind::Experiment => (
                &self.eln_experiments_basedir,
                &self.eln_experiments_title_fmt,
                &self.eln_experiments_filename_fmt,
                self.eln_experiments_filename_quote,
                &self.eln_experiments_filename_quote_safe,
                &self.eln_experiments_foldername_fmt,
                &self.eln_experiments_template,
                self.eln_experiments_template_subst_mode,
                &self.eln_experiments_template_kwargs,
            ),
            ScaffoldKind::Project => (
                &self.eln_projects_basedir,
                &self.eln_projects_title_fmt,
                &self.eln_projects_filename_fmt,
                self.eln_projects_filename_quote,
                &self.eln_projects_filename_quote_safe,
                &self.eln_projects_foldername_fmt,
                &self.eln_projects_template,
                self.eln_projects_template_subst_mode,
                &self.eln_projects_template_kwargs,
            ),
        };
        let mut settings = ScaffoldSettings::new(kind);
        settings.basedir = basedir.clone();
        if let Some(fmt) = title_fmt {
            settings.title_fmt = fmt.clone();
        }
        if let Some(fmt) = filename_fmt {
            settings.filename_fmt = fmt.clone();
        }
        settings.filename_quote = filename_quote;
        settings.filename_quote_safe = quote_safe.clone();
        settings.foldername_fmt = foldername_fmt.clone();
        settings.template = template.clone();
        settings.template_subst_mode = subst_mode;
        settings.template_kwargs = kwargs.clone();
        if kind == ScaffoldKind::Project {
            if let Some(inputs) = &self.eln_projects_userinput {
                settings.userinput = inputs.clone();
            }
        }
        settings
    }
}
