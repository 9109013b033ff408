//! Watson-Crick pairing maps.
//!
//! A map is picked by name once, when the configuration is read, and is then
//! a plain lookup: `dna`, `rna`, `rna-to-dna` and `dna-to-rna`. A trailing
//! `+` selects the structural variant, which additionally maps spaces,
//! dashes, digits and quote marks onto themselves so they survive a strict
//! complement unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ElnError;

/// Base alphabet pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WcMap {
    #[default]
    Dna,
    Rna,
    /// RNA template, DNA complement (U pairs with A, A pairs with T)
    RnaToDna,
    /// DNA template, RNA complement (T pairs with A, A pairs with U)
    DnaToRna,
}

impl WcMap {
    pub fn as_str(&self) -> &'static str {
        match self {
            WcMap::Dna => "dna",
            WcMap::Rna => "rna",
            WcMap::RnaToDna => "rna-to-dna",
            WcMap::DnaToRna => "dna-to-rna",
        }
    }

    /// Partner of an uppercase base, or `None` if the base is not in the map.
    fn pair_upper(&self, base: char) -> Option<char> {
        let partner = match (self, base) {
            (_, 'G') => 'C',
            (_, 'C') => 'G',
            (_, 'N') => 'N',
            (WcMap::Dna, 'A') => 'T',
            (WcMap::Dna, 'T') => 'A',
            (WcMap::Rna, 'A') => 'U',
            (WcMap::Rna, 'U') => 'A',
            (WcMap::RnaToDna, 'A') => 'T',
            (WcMap::RnaToDna, 'U') => 'A',
            (WcMap::DnaToRna, 'A') => 'U',
            (WcMap::DnaToRna, 'T') => 'A',
            _ => return None,
        };
        Some(partner)
    }
}

/// A pairing map together with its structural flag, e.g. `dna+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PairingMap {
    pub alphabet: WcMap,
    /// Map structural characters (space, dash, digits, quotes) onto themselves
    pub structural: bool,
}

impl PairingMap {
    pub const fn new(alphabet: WcMap) -> Self {
        Self {
            alphabet,
            structural: false,
        }
    }

    pub const fn structural(alphabet: WcMap) -> Self {
        Self {
            alphabet,
            structural: true,
        }
    }

    /// Look up the partner of `base`. Case is preserved: `a` pairs with `t`.
    pub fn complement(&self, base: char) -> Option<char> {
        if base.is_ascii_lowercase() {
            return self
                .alphabet
                .pair_upper(base.to_ascii_uppercase())
                .map(|p| p.to_ascii_lowercase());
        }
        if let Some(partner) = self.alphabet.pair_upper(base) {
            return Some(partner);
        }
        if self.structural && is_structural(base) {
            return Some(base);
        }
        None
    }

    /// True when complementing twice gives back the input for every mapped base.
    pub fn is_involutive(&self) -> bool {
        matches!(self.alphabet, WcMap::Dna | WcMap::Rna)
    }
}

fn is_structural(c: char) -> bool {
    matches!(c, ' ' | '-' | '\'' | '"' | 'ʹ' | '′') || c.is_ascii_digit()
}

impl fmt::Display for PairingMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.alphabet.as_str())?;
        if self.structural {
            write!(f, "+")?;
        }
        Ok(())
    }
}

impl FromStr for PairingMap {
    type Err = ElnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let (base, structural) = match name.strip_suffix('+') {
            Some(base) => (base, true),
            None => (name, false),
        };
        let alphabet = match base.to_ascii_lowercase().as_str() {
            "dna" => WcMap::Dna,
            "rna" => WcMap::Rna,
            "rna-to-dna" => WcMap::RnaToDna,
            "dna-to-rna" => WcMap::DnaToRna,
            _ => return Err(ElnError::UnknownMap(s.to_string())),
        };
        Ok(Self {
            alphabet,
            structural,
        })
    }
}

impl TryFrom<String> for PairingMap {
    type Error = ElnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PairingMap> for String {
    fn from(map: PairingMap) -> Self {
        map.to_string()
    }
}
