//! Sequence transforms and notebook helpers behind the `eln` command.

pub mod buffer;
pub mod error;
pub mod journal;
pub mod mods;
pub mod pipeline;
pub mod scaffold;
pub mod settings;
pub mod snippets;
pub mod stats;
pub mod template;
pub mod termini;
pub mod transform;
pub mod wc_map;

pub use buffer::{InsertAt, Region, StatusSink, TextBuffer, TextView};
pub use error::{ElnError, Result};
pub use mods::ModPattern;
pub use pipeline::{transform_selections, transform_text, Conversion, Edit, TransformConfig};
pub use settings::Settings;
pub use stats::{sequence_stats, SequenceStats};
pub use transform::{
    compl, dna_filter, dna_to_rna, mod_preserving_compl, mod_preserving_rcompl,
    mod_preserving_reversed, rcompl, reversed, rna_to_dna, ComplementOptions,
};
pub use wc_map::{PairingMap, WcMap};
