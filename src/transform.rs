//! Complement, reverse complement and alphabet conversion of sequence text.

use crate::error::{ElnError, Result};
use crate::mods::ModPattern;
use crate::termini::Termini;
use crate::wc_map::PairingMap;

/// How bases are paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComplementOptions {
    pub map: PairingMap,
    /// Fail on characters the map does not know instead of passing them through
    pub strict: bool,
    /// Uppercase input before lookup
    pub toupper: bool,
}

impl ComplementOptions {
    pub fn new(map: PairingMap) -> Self {
        Self {
            map,
            ..Default::default()
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn toupper(mut self, toupper: bool) -> Self {
        self.toupper = toupper;
        self
    }
}

/// Complement `chars` into `out`. Positions are char offsets into the
/// caller's input, used for error reporting.
fn complement_into<I>(out: &mut String, chars: I, opts: &ComplementOptions) -> Result<()>
where
    I: Iterator<Item = (usize, char)>,
{
    for (position, c) in chars {
        let base = if opts.toupper { c.to_ascii_uppercase() } else { c };
        match opts.map.complement(base) {
            Some(partner) => out.push(partner),
            None if opts.strict => {
                return Err(ElnError::UnmappedBase {
                    base,
                    position,
                    map: opts.map.to_string(),
                })
            }
            None => out.push(base),
        }
    }
    Ok(())
}

/// Reverse complement of `chunk`, which starts `offset` chars into the input.
fn rcompl_into(out: &mut String, chunk: &str, offset: usize, opts: &ComplementOptions) -> Result<()> {
    let n = chunk.chars().count();
    let chars = chunk
        .chars()
        .rev()
        .enumerate()
        .map(|(i, c)| (offset + n - 1 - i, c));
    complement_into(out, chars, opts)
}

fn marker_len(marker: Option<&str>) -> usize {
    marker.map(|m| m.chars().count()).unwrap_or(0)
}

/// Complement of `seq`, not reversed. Output has as many chars as the input.
pub fn compl(seq: &str, opts: &ComplementOptions) -> Result<String> {
    let mut out = String::with_capacity(seq.len());
    complement_into(&mut out, seq.chars().enumerate(), opts)?;
    Ok(out)
}

/// Reverse complement of `seq`.
///
/// Terminus markers are taken off before the core is reversed and put back
/// on the opposite ends relabelled, so `5'-ATGC-3'` becomes `5'-GCAT-3'`.
pub fn rcompl(seq: &str, opts: &ComplementOptions) -> Result<String> {
    let (termini, core) = Termini::split(seq);
    let mut out = String::with_capacity(core.len());
    rcompl_into(&mut out, core, marker_len(termini.leading), opts)?;
    Ok(termini.swapped_relabelled().wrap(&out))
}

/// Character-order reversal without complementing; terminus markers swap ends.
pub fn reversed(seq: &str) -> String {
    let (termini, core) = Termini::split(seq);
    let core: String = core.chars().rev().collect();
    termini.swapped().wrap(&core)
}

/// Complement that leaves modification tags and terminus markers in place.
pub fn mod_preserving_compl(
    seq: &str,
    pattern: Option<&ModPattern>,
    opts: &ComplementOptions,
) -> Result<String> {
    let Some(pattern) = pattern else {
        return compl(seq, opts);
    };
    let (termini, core) = Termini::split(seq);
    let mut out = String::with_capacity(core.len());
    let mut offset = marker_len(termini.leading);
    for (chunk, modification) in pattern.split(core) {
        let chars = chunk.chars().enumerate().map(|(i, c)| (offset + i, c));
        complement_into(&mut out, chars, opts)?;
        out.push_str(modification);
        offset += chunk.chars().count() + modification.chars().count();
    }
    Ok(termini.wrap(&out))
}

/// Reverse complement that keeps modification tags intact.
///
/// Chunks are emitted last to first, each reverse-complemented, with the tag
/// that followed a chunk placed in front of it: `AT/5Biosg/GC` becomes
/// `GC/5Biosg/AT`.
pub fn mod_preserving_rcompl(
    seq: &str,
    pattern: Option<&ModPattern>,
    opts: &ComplementOptions,
) -> Result<String> {
    let Some(pattern) = pattern else {
        return rcompl(seq, opts);
    };
    let (termini, core) = Termini::split(seq);
    let mut offset = marker_len(termini.leading);
    let mut pairs = Vec::new();
    for (chunk, modification) in pattern.split(core) {
        pairs.push((chunk, modification, offset));
        offset += chunk.chars().count() + modification.chars().count();
    }
    let mut out = String::with_capacity(core.len());
    for (chunk, modification, offset) in pairs.into_iter().rev() {
        out.push_str(modification);
        rcompl_into(&mut out, chunk, offset, opts)?;
    }
    Ok(termini.swapped_relabelled().wrap(&out))
}

/// Reversal that keeps modification tags intact; see [`mod_preserving_rcompl`].
pub fn mod_preserving_reversed(seq: &str, pattern: Option<&ModPattern>) -> String {
    let Some(pattern) = pattern else {
        return reversed(seq);
    };
    let (termini, core) = Termini::split(seq);
    let mut out = String::with_capacity(core.len());
    for (chunk, modification) in pattern.split(core).into_iter().rev() {
        out.push_str(modification);
        out.extend(chunk.chars().rev());
    }
    termini.swapped().wrap(&out)
}

/// T -> U, case preserved.
pub fn dna_to_rna(seq: &str) -> String {
    seq.chars()
        .map(|c| match c {
            'T' => 'U',
            't' => 'u',
            other => other,
        })
        .collect()
}

/// Maps both `U` and `u` to lowercase `u`; `T` is never produced.
///
/// This mirrors the behaviour ELN notebooks have relied on so far and is
/// kept as-is; see the `rna_to_dna_*` tests.
pub fn rna_to_dna(seq: &str) -> String {
    seq.chars()
        .map(|c| match c {
            'U' | 'u' => 'u',
            other => other,
        })
        .collect()
}

/// Uppercase and keep only `A`, `T`, `C`, `G` and `U`.
pub fn dna_filter(seq: &str) -> String {
    seq.chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| matches!(c, 'A' | 'T' | 'C' | 'G' | 'U'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wc_map::WcMap;

    fn dna() -> ComplementOptions {
        ComplementOptions::new(PairingMap::new(WcMap::Dna))
    }

    #[test]
    fn compl_basic() {
        assert_eq!(compl("ATGC", &dna()).unwrap(), "TACG");
        assert_eq!(compl("atgc", &dna()).unwrap(), "tacg");
    }

    #[test]
    fn compl_toupper() {
        assert_eq!(compl("atgc", &dna().toupper(true)).unwrap(), "TACG");
    }

    #[test]
    fn compl_lenient_passes_unknown_through() {
        assert_eq!(compl("AT-GX", &dna()).unwrap(), "TA-CX");
    }

    #[test]
    fn compl_strict_names_offending_base() {
        match compl("ATGX", &dna().strict(true)) {
            Err(ElnError::UnmappedBase { base, position, .. }) => {
                assert_eq!(base, 'X');
                assert_eq!(position, 3);
            }
            other => panic!("expected UnmappedBase, got {other:?}"),
        }
    }

    #[test]
    fn rcompl_swaps_and_relabels_termini() {
        assert_eq!(rcompl("5'-ATGC-3'", &dna()).unwrap(), "5'-GCAT-3'");
        assert_eq!(rcompl("5'-AAC", &dna()).unwrap(), "GTT-3'");
        assert_eq!(rcompl("5'", &dna()).unwrap(), "3'");
    }

    #[test]
    fn rcompl_strict_reports_input_position() {
        let err = rcompl("5'AXGC", &dna().strict(true)).unwrap_err();
        assert!(matches!(err, ElnError::UnmappedBase { base: 'X', position: 3, .. }));
    }

    #[test]
    fn rcompl_strict_structural_map_accepts_dashes() {
        let opts = ComplementOptions::new(PairingMap::structural(WcMap::Dna)).strict(true);
        assert_eq!(rcompl("5'-ATGC-3'", &opts).unwrap(), "5'-GCAT-3'");
        assert!(rcompl("5'-ATGC-3'", &dna().strict(true)).is_err());
    }

    #[test]
    fn reversed_swaps_termini_only() {
        assert_eq!(reversed("5'-ATGC-3'"), "3'-CGTA-5'");
        assert_eq!(reversed("ATG"), "GTA");
    }

    #[test]
    fn mod_preserving_compl_keeps_tag() {
        let idt = ModPattern::idt();
        assert_eq!(
            mod_preserving_compl("AT/5Biosg/GC", Some(&idt), &dna()).unwrap(),
            "TA/5Biosg/CG"
        );
    }

    #[test]
    fn mod_preserving_compl_never_uppercases_tags() {
        let idt = ModPattern::idt();
        let opts = dna().toupper(true);
        assert_eq!(
            mod_preserving_compl("at/iSp18/gc", Some(&idt), &opts).unwrap(),
            "TA/iSp18/CG"
        );
    }

    #[test]
    fn mod_preserving_rcompl_moves_tag_with_its_chunk() {
        let idt = ModPattern::idt();
        assert_eq!(
            mod_preserving_rcompl("AT/5Biosg/GC", Some(&idt), &dna()).unwrap(),
            "GC/5Biosg/AT"
        );
        assert_eq!(
            mod_preserving_rcompl("5'-/5Phos/AAC-3'", Some(&idt), &dna()).unwrap(),
            "5'-GTT/5Phos/-3'"
        );
    }

    #[test]
    fn mod_preserving_strict_skips_tags() {
        let idt = ModPattern::idt();
        let opts = dna().strict(true);
        assert_eq!(
            mod_preserving_rcompl("AAC/3BHQ_1/", Some(&idt), &opts).unwrap(),
            "/3BHQ_1/GTT"
        );
        let err = mod_preserving_compl("AT/x/GQ", Some(&idt), &opts).unwrap_err();
        assert!(matches!(err, ElnError::UnmappedBase { base: 'Q', position: 6, .. }));
    }

    #[test]
    fn mod_preserving_without_pattern_degrades() {
        assert_eq!(
            mod_preserving_compl("AT/x/GC", None, &dna()).unwrap(),
            compl("AT/x/GC", &dna()).unwrap()
        );
        assert_eq!(
            mod_preserving_rcompl("5'-AT/x/GC-3'", None, &dna()).unwrap(),
            rcompl("5'-AT/x/GC-3'", &dna()).unwrap()
        );
        assert_eq!(mod_preserving_reversed("5'AT", None), reversed("5'AT"));
    }

    #[test]
    fn mod_preserving_reversed_keeps_tag_text() {
        let idt = ModPattern::idt();
        assert_eq!(
            mod_preserving_reversed("5'AT/5Biosg/GC", Some(&idt)),
            "CG/5Biosg/TA5'"
        );
    }

    #[test]
    fn dna_to_rna_preserves_case() {
        assert_eq!(dna_to_rna("ATGCatgc"), "AUGCaugc");
    }

    #[test]
    fn rna_to_dna_lowercases_u_and_never_emits_t() {
        assert_eq!(rna_to_dna("AUGCaugc"), "AuGCaugc");
        assert_eq!(rna_to_dna(&dna_to_rna("ATGCatgc")), "AuGCaugc");
    }

    #[test]
    fn dna_filter_drops_everything_else() {
        assert_eq!(dna_filter("xAtGc123"), "ATGC");
        assert_eq!(dna_filter("5'-/5Phos/acgu-3'"), "ACGU");
    }
}
