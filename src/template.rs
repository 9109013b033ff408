//! String interpolation for snippets, names and templates.
//!
//! Two styles are understood. `python-fmt` replaces `{key}` and
//! `{key:%Y-%m-%d}` (a strftime format, for date values), with `{{` and `}}`
//! as literal braces. `python-%` replaces `%(key)s`, with `%%` as a literal
//! percent sign.

use std::collections::BTreeMap;
use std::fmt::{self, Write};
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ElnError, Result};

/// A value that can be interpolated.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Date(NaiveDate),
    DateTime(DateTime<Local>),
    /// Renders as `None`, like an unset folder path
    Missing,
}

impl Value {
    fn render(&self, spec: Option<&str>) -> Result<String> {
        let out = match (self, spec) {
            (Value::Text(s), _) => s.clone(),
            (Value::Missing, _) => "None".to_string(),
            (Value::Date(d), Some(f)) => format_time(|items| d.format_with_items(items), f)?,
            (Value::Date(d), None) => d.format("%Y-%m-%d").to_string(),
            (Value::DateTime(t), Some(f)) => format_time(|items| t.format_with_items(items), f)?,
            (Value::DateTime(t), None) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        Ok(out)
    }
}

fn format_time<'a, F, D>(format: F, spec: &'a str) -> Result<String>
where
    F: FnOnce(std::vec::IntoIter<chrono::format::Item<'a>>) -> D,
    D: fmt::Display,
{
    let items: Vec<_> = chrono::format::StrftimeItems::new(spec).collect();
    if items.iter().any(|i| matches!(i, chrono::format::Item::Error)) {
        return Err(ElnError::MalformedTemplate(format!(
            "invalid date format {spec:?}"
        )));
    }
    let mut out = String::new();
    write!(out, "{}", format(items.into_iter())).map_err(|_| {
        ElnError::MalformedTemplate(format!("date format {spec:?} does not fit the value"))
    })?;
    Ok(out)
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<DateTime<Local>> for Value {
    fn from(t: DateTime<Local>) -> Self {
        Value::DateTime(t)
    }
}

pub type Vars = BTreeMap<String, Value>;

/// Template substitution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SubstMode {
    #[default]
    PythonFmt,
    PythonPercent,
}

impl SubstMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubstMode::PythonFmt => "python-fmt",
            SubstMode::PythonPercent => "python-%",
        }
    }

    pub fn render(&self, template: &str, vars: &Vars) -> Result<String> {
        match self {
            SubstMode::PythonFmt => format_braces(template, vars),
            SubstMode::PythonPercent => format_percent(template, vars),
        }
    }
}

impl FromStr for SubstMode {
    type Err = ElnError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "python-fmt" => Ok(SubstMode::PythonFmt),
            "python-%" => Ok(SubstMode::PythonPercent),
            other => Err(ElnError::UnknownSubstMode(other.to_string())),
        }
    }
}

impl TryFrom<String> for SubstMode {
    type Error = ElnError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SubstMode> for String {
    fn from(mode: SubstMode) -> Self {
        mode.as_str().to_string()
    }
}

fn lookup<'v>(vars: &'v Vars, key: &str) -> Result<&'v Value> {
    vars.get(key)
        .ok_or_else(|| ElnError::UnknownTemplateVariable(key.to_string()))
}

/// `{key}` / `{key:spec}` interpolation.
pub fn format_braces(template: &str, vars: &Vars) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(i) = rest.find(['{', '}']) {
        out.push_str(&rest[..i]);
        let tail = &rest[i..];
        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
        } else if tail.starts_with('}') {
            return Err(ElnError::MalformedTemplate(
                "single '}' encountered".to_string(),
            ));
        } else {
            let close = tail.find('}').ok_or_else(|| {
                ElnError::MalformedTemplate("unclosed '{' in template".to_string())
            })?;
            let field = &tail[1..close];
            let (key, spec) = match field.split_once(':') {
                Some((key, spec)) => (key, Some(spec)),
                None => (field, None),
            };
            out.push_str(&lookup(vars, key.trim())?.render(spec)?);
            rest = &tail[close + 1..];
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// `%(key)s` interpolation.
pub fn format_percent(template: &str, vars: &Vars) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(i) = rest.find('%') {
        out.push_str(&rest[..i]);
        let tail = &rest[i..];
        if tail.starts_with("%%") {
            out.push('%');
            rest = &tail[2..];
            continue;
        }
        let Some(inner) = tail.strip_prefix("%(") else {
            return Err(ElnError::MalformedTemplate(
                "'%' must be followed by '(key)s' or '%'".to_string(),
            ));
        };
        let close = inner.find(")s").ok_or_else(|| {
            ElnError::MalformedTemplate("unclosed '%(' in template".to_string())
        })?;
        out.push_str(&lookup(vars, &inner[..close])?.render(None)?);
        rest = &inner[close + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn vars() -> Vars {
        let mut vars = Vars::new();
        vars.insert("expid".into(), "RS123".into());
        vars.insert("titledesc".into(), "Buffer test".into());
        vars.insert(
            "date".into(),
            Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap().into(),
        );
        vars
    }

    #[test]
    fn braces_with_date_spec() {
        let out = format_braces("'''Journal, {date:%Y-%m-%d}:'''\n* {date:%H:%M} > ", &vars()).unwrap();
        assert_eq!(out, "'''Journal, 2024-03-07:'''\n* 09:05 > ");
    }

    #[test]
    fn braces_escape_and_keys() {
        let out = format_braces("{{{expid}}} {titledesc}", &vars()).unwrap();
        assert_eq!(out, "{RS123} Buffer test");
    }

    #[test]
    fn unknown_key_is_reported() {
        let err = format_braces("{nope}", &vars()).unwrap_err();
        assert!(matches!(err, ElnError::UnknownTemplateVariable(k) if k == "nope"));
    }

    #[test]
    fn unbalanced_braces() {
        assert!(matches!(
            format_braces("{expid", &vars()),
            Err(ElnError::MalformedTemplate(_))
        ));
        assert!(matches!(
            format_braces("x}", &vars()),
            Err(ElnError::MalformedTemplate(_))
        ));
    }

    #[test]
    fn percent_style() {
        let out = format_percent("%(expid)s: 100%% %(titledesc)s", &vars()).unwrap();
        assert_eq!(out, "RS123: 100% Buffer test");
    }

    #[test]
    fn subst_mode_names() {
        assert_eq!("python-%".parse::<SubstMode>().unwrap(), SubstMode::PythonPercent);
        assert_eq!("".parse::<SubstMode>().unwrap(), SubstMode::PythonFmt);
        assert!("mediawiki".parse::<SubstMode>().is_err());
    }
}
