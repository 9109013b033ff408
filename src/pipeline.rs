//! The sequence-transform command: run every selection through the
//! normalisation and transformation steps and write the results back.

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::buffer::{Region, StatusSink, TextView};
use crate::error::{ElnError, Result};
use crate::mods::ModPattern;
use crate::transform::{self, ComplementOptions};
use crate::wc_map::PairingMap;

/// Alphabet conversion applied before complementing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Conversion {
    DnaToRna,
    RnaToDna,
}

impl Conversion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conversion::DnaToRna => "dna-to-rna",
            Conversion::RnaToDna => "rna-to-dna",
        }
    }

    pub fn apply(&self, seq: &str) -> String {
        match self {
            Conversion::DnaToRna => transform::dna_to_rna(seq),
            Conversion::RnaToDna => transform::rna_to_dna(seq),
        }
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Conversion {
    type Err = ElnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dna-to-rna" => Ok(Conversion::DnaToRna),
            "rna-to-dna" => Ok(Conversion::RnaToDna),
            _ => Err(ElnError::UnknownConversion(s.to_string())),
        }
    }
}

impl TryFrom<String> for Conversion {
    type Error = ElnError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Conversion> for String {
    fn from(conversion: Conversion) -> Self {
        conversion.as_str().to_string()
    }
}

fn default_true() -> bool {
    true
}

fn default_mod_regex() -> Option<ModPattern> {
    Some(ModPattern::idt())
}

/// Flags of the transform command. Missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    #[serde(default = "default_true")]
    pub complement: bool,
    pub reverse: bool,
    pub dna_only: bool,
    /// Replace the selection; otherwise append the result at the end of the buffer
    #[serde(default = "default_true")]
    pub replace: bool,
    pub wc_map: PairingMap,
    pub convert: Option<Conversion>,
    pub strict: bool,
    pub toupper: bool,
    pub remove_whitespace: bool,
    pub remove_dashes: bool,
    pub remove_mods: bool,
    pub preserve_marks_and_mods: bool,
    #[serde(default = "default_mod_regex")]
    pub mod_regex: Option<ModPattern>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            complement: true,
            reverse: false,
            dna_only: false,
            replace: true,
            wc_map: PairingMap::default(),
            convert: None,
            strict: false,
            toupper: false,
            remove_whitespace: false,
            remove_dashes: false,
            remove_mods: false,
            preserve_marks_and_mods: false,
            mod_regex: default_mod_regex(),
        }
    }
}

impl TransformConfig {
    pub fn complement_options(&self) -> ComplementOptions {
        ComplementOptions::new(self.wc_map)
            .strict(self.strict)
            .toupper(self.toupper)
    }

    /// Reject flag combinations that cannot both be honoured.
    pub fn validate(&self) -> Result<()> {
        if self.remove_mods && self.preserve_marks_and_mods {
            return Err(ElnError::ConflictingOptions(
                "remove_mods and preserve_marks_and_mods cannot both be set".to_string(),
            ));
        }
        if self.dna_only && self.preserve_marks_and_mods {
            return Err(ElnError::ConflictingOptions(
                "dna_only drops the marks and mods that preserve_marks_and_mods keeps".to_string(),
            ));
        }
        Ok(())
    }
}

/// Run one selection's text through the pipeline.
pub fn transform_text(seq: &str, config: &TransformConfig) -> Result<String> {
    let mut seq = seq.to_string();
    if config.remove_whitespace {
        seq.retain(|c| !c.is_whitespace());
    }
    if config.remove_dashes {
        seq.retain(|c| c != '-');
    }
    if config.remove_mods {
        let idt;
        let pattern = match &config.mod_regex {
            Some(pattern) => pattern,
            None => {
                idt = ModPattern::idt();
                &idt
            }
        };
        seq = pattern.strip(&seq).into_owned();
    }
    if let Some(conversion) = config.convert {
        seq = conversion.apply(&seq);
    }
    if config.dna_only {
        seq = transform::dna_filter(&seq);
    }

    let opts = config.complement_options();
    let pattern = if config.preserve_marks_and_mods {
        config.mod_regex.as_ref()
    } else {
        None
    };
    let text = match (config.complement, config.reverse) {
        // Complement plus reverse never takes the preserving path.
        (true, true) => transform::rcompl(&seq, &opts)?,
        (true, false) if config.preserve_marks_and_mods => {
            transform::mod_preserving_compl(&seq, pattern, &opts)?
        }
        (true, false) => transform::compl(&seq, &opts)?,
        (false, true) => transform::mod_preserving_reversed(&seq, pattern),
        (false, false) => seq,
    };
    Ok(text)
}

/// One write made by [`transform_selections`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    /// Char offset the text was written at, before later edits shifted it
    pub position: usize,
    pub chars: usize,
}

/// Selections may touch but not overlap.
fn check_disjoint(regions: &[Region]) -> Result<()> {
    let mut sorted = regions.to_vec();
    sorted.sort_by_key(|r| (r.begin(), r.end()));
    for pair in sorted.windows(2) {
        if pair[1].begin() < pair[0].end() {
            return Err(ElnError::OverlappingSelections {
                first_begin: pair[0].begin(),
                first_end: pair[0].end(),
                second_begin: pair[1].begin(),
                second_end: pair[1].end(),
            });
        }
    }
    Ok(())
}

/// Transform every non-empty selection of `view`.
///
/// Overlapping selections are rejected, and all selections are transformed
/// before anything is written, so a failure leaves the buffer untouched.
pub fn transform_selections<V, S>(
    view: &mut V,
    config: &TransformConfig,
    status: &mut S,
) -> Result<Vec<Edit>>
where
    V: TextView + ?Sized,
    S: StatusSink + ?Sized,
{
    config.validate()?;

    let regions: Vec<Region> = view
        .selections()
        .into_iter()
        .filter(|r| !r.is_empty())
        .collect();
    check_disjoint(&regions)?;

    let mut pending: Vec<(Region, String)> = Vec::with_capacity(regions.len());
    for region in regions {
        let seq = view.substr(region)?;
        let text = transform_text(&seq, config)?;
        debug!("{:?}: {:?} -> {:?}", region, seq, text);
        pending.push((region, text));
    }

    let mut edits = Vec::with_capacity(pending.len());
    if config.replace {
        // Back to front, so earlier regions keep their offsets.
        let mut order: Vec<usize> = (0..pending.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(pending[i].0.begin()));
        for i in order {
            let (region, text) = &pending[i];
            view.replace(*region, text)?;
        }
        for (region, text) in &pending {
            edits.push(Edit {
                position: region.begin(),
                chars: text.chars().count(),
            });
        }
    } else {
        for (_, text) in &pending {
            let position = view.size();
            let chars = view.insert(position, text)?;
            edits.push(Edit { position, chars });
        }
    }

    for edit in &edits {
        debug!("Inserted {} chars at pos {}", edit.chars, edit.position);
    }
    let total: usize = edits.iter().map(|e| e.chars).sum();
    let msg = format!(
        "Transformed {} selection(s), {} chars written",
        edits.len(),
        total
    );
    info!("{}", msg);
    status.status_message(&msg);
    Ok(edits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_plain_complement() {
        let config = TransformConfig::default();
        assert_eq!(transform_text("ATGC", &config).unwrap(), "TACG");
    }

    #[test]
    fn json_config_parses_names_early() {
        let config: TransformConfig =
            serde_json::from_str(r#"{"reverse": true, "wc_map": "rna+", "convert": "dna-to-rna"}"#)
                .unwrap();
        assert!(config.complement);
        assert!(config.reverse);
        assert_eq!(config.wc_map.to_string(), "rna+");
        assert_eq!(config.convert, Some(Conversion::DnaToRna));
        assert_eq!(config.mod_regex, Some(ModPattern::idt()));

        assert!(serde_json::from_str::<TransformConfig>(r#"{"wc_map": "protein"}"#).is_err());
        assert!(serde_json::from_str::<TransformConfig>(r#"{"mod_regex": "(["}"#).is_err());
    }

    #[test]
    fn conflicting_mod_flags_are_rejected() {
        let config = TransformConfig {
            remove_mods: true,
            preserve_marks_and_mods: true,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ElnError::ConflictingOptions(_))));
    }

    #[test]
    fn normalisation_runs_before_complement() {
        let config = TransformConfig {
            remove_whitespace: true,
            remove_dashes: true,
            remove_mods: true,
            strict: true,
            ..Default::default()
        };
        assert_eq!(transform_text("AT G-/5Biosg/C\n", &config).unwrap(), "TACG");
    }

    #[test]
    fn conversion_then_rna_complement() {
        let config = TransformConfig {
            convert: Some(Conversion::DnaToRna),
            wc_map: "rna".parse().unwrap(),
            strict: true,
            reverse: true,
            ..Default::default()
        };
        assert_eq!(transform_text("ATGC", &config).unwrap(), "GCAU");
    }

    #[test]
    fn reverse_only() {
        let config = TransformConfig {
            complement: false,
            reverse: true,
            ..Default::default()
        };
        assert_eq!(transform_text("5'-ATG-3'", &config).unwrap(), "3'-GTA-5'");
    }

    #[test]
    fn reverse_complement_ignores_preserve_flag() {
        let config = TransformConfig {
            reverse: true,
            preserve_marks_and_mods: true,
            ..Default::default()
        };
        let opts = config.complement_options();
        assert_eq!(
            transform_text("AT/5Biosg/GC", &config).unwrap(),
            transform::rcompl("AT/5Biosg/GC", &opts).unwrap()
        );
        assert_eq!(transform_text("AT/5Biosg/GC", &config).unwrap(), "GC/csoiB5/AT");
    }
}
