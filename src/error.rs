//! Error types for eln-utils

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ElnError>;

#[derive(Debug, Error)]
pub enum ElnError {
    /// A base has no partner in the selected pairing map (strict mode only)
    #[error("unknown base '{base}' at position {position} for map '{map}'")]
    UnmappedBase {
        base: char,
        position: usize,
        map: String,
    },

    #[error("invalid modification pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown pairing map '{0}' (expected dna, rna, rna-to-dna or dna-to-rna, optionally with '+')")]
    UnknownMap(String),

    #[error("unknown conversion '{0}' (expected dna-to-rna or rna-to-dna)")]
    UnknownConversion(String),

    #[error("unknown filename quote mode '{0}' (expected quote or quote_plus)")]
    UnknownQuoteMode(String),

    #[error("unknown template substitution mode '{0}' (expected python-fmt or python-%)")]
    UnknownSubstMode(String),

    #[error("conflicting options: {0}")]
    ConflictingOptions(String),

    #[error("unknown template variable '{0}'")]
    UnknownTemplateVariable(String),

    #[error("malformed template: {0}")]
    MalformedTemplate(String),

    #[error("setting '{0}' must be defined in your configuration")]
    MissingSetting(String),

    #[error("region {begin}..{end} is outside the buffer (size {size})")]
    InvalidRegion {
        begin: usize,
        end: usize,
        size: usize,
    },

    #[error("selections {first_begin}..{first_end} and {second_begin}..{second_end} overlap")]
    OverlappingSelections {
        first_begin: usize,
        first_end: usize,
        second_begin: usize,
        second_end: usize,
    },

    #[error("no files larger than {min_size} bytes found in {dirs:?}")]
    NoJournalFiles { min_size: u64, dirs: Vec<PathBuf> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),
}
