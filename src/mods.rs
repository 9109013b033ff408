//! Modification tags embedded in a sequence, e.g. `/5Biosg/`.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ElnError, Result};

/// IDT order notation: modifications are written between slashes.
pub const IDT_PATTERN: &str = r"/[^/]+/";

/// Compiled modification-detection pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModPattern {
    name: String,
    regex: Regex,
}

impl ModPattern {
    pub fn idt() -> Self {
        Self {
            name: "IDT".to_string(),
            regex: Regex::new(IDT_PATTERN).expect("IDT pattern is valid"),
        }
    }

    /// Compile a custom pattern.
    pub fn custom(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| ElnError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            name: pattern.to_string(),
            regex,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }

    /// Split `seq` into `(chunk, modification)` pairs. The last pair always
    /// carries an empty modification, so concatenating every pair gives back
    /// the input.
    pub fn split<'s>(&self, seq: &'s str) -> Vec<(&'s str, &'s str)> {
        let mut pairs = Vec::new();
        let mut last = 0;
        for m in self.regex.find_iter(seq) {
            pairs.push((&seq[last..m.start()], m.as_str()));
            last = m.end();
        }
        pairs.push((&seq[last..], ""));
        pairs
    }

    pub fn strip<'s>(&self, seq: &'s str) -> Cow<'s, str> {
        self.regex.replace_all(seq, "")
    }
}

impl PartialEq for ModPattern {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str()
    }
}

impl Eq for ModPattern {}

impl Default for ModPattern {
    fn default() -> Self {
        Self::idt()
    }
}

impl fmt::Display for ModPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for ModPattern {
    type Err = ElnError;

    /// `IDT` (any case) selects the preset; anything else is compiled as a regex.
    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("idt") {
            Ok(Self::idt())
        } else {
            Self::custom(s)
        }
    }
}

impl TryFrom<String> for ModPattern {
    type Error = ElnError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ModPattern> for String {
    fn from(pattern: ModPattern) -> Self {
        pattern.name
    }
}
